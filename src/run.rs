//! The top-level driver: parse arguments, load configuration, assemble
//! the graph, run the work, summarize.

use crate::fs::RealFileSystem;
use crate::progress::ConsoleProgress;
use crate::{config, load, progress, signal, work};
use argh::FromArgs;

#[derive(FromArgs)]
/// incrementally rebuild one C++ binary from the current directory
struct Args {
    /// print the resolved dependency tree before building
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// configuration file to read [default=ccsimplebuild.conf]
    #[argh(positional)]
    config: Option<String>,
}

pub fn run() -> anyhow::Result<i32> {
    let args: Args = argh::from_env();

    signal::register_sigint();

    let fs = RealFileSystem::new();
    let config = config::load(&fs, args.config.as_deref())?;
    let mut state = load::read(&fs, config)?;

    let progress = ConsoleProgress::new();
    if args.verbose {
        progress::print_tree(&progress, &state.graph, state.target);
    }

    let target_name = state.graph.node(state.target).name.clone();
    let mut work = work::Work::new(&mut state.graph, &state.config, &progress);
    match work.run(state.target)? {
        work::BuildResult::Failed(code) => {
            // No summary; the failing command is enough info.
            Ok(code)
        }
        work::BuildResult::Success(0) => {
            println!("ccsimplebuild: '{}' is up to date.", target_name);
            Ok(0)
        }
        work::BuildResult::Success(n) => {
            println!(
                "ccsimplebuild: ran {} tasks, '{}' is now up to date.",
                n, target_name
            );
            Ok(0)
        }
    }
}
