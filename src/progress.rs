//! Build progress reporting on a plain console, without any
//! overprinting.

use crate::graph::{Graph, NodeId};
use crate::task::{TaskResult, Termination};
use crate::work::MAX_CHAIN;
use std::io::Write;

/// Consumes build events and renders them to the user.
pub trait Progress {
    /// A command is about to run.
    fn task_started(&self, cmdline: &str);

    /// A command finished; `result` carries its termination and output.
    fn task_finished(&self, cmdline: &str, result: &TaskResult);

    /// Log a line of driver chatter.
    fn log(&self, msg: &str);
}

#[derive(Default)]
pub struct ConsoleProgress {}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for ConsoleProgress {
    fn task_started(&self, cmdline: &str) {
        // Every command is echoed before it runs.
        self.log(cmdline);
    }

    fn task_finished(&self, cmdline: &str, result: &TaskResult) {
        match result.termination {
            Termination::Success => {}
            Termination::Interrupted => self.log(&format!("interrupted: {}", cmdline)),
            Termination::Failure(_) => self.log(&format!("failed: {}", cmdline)),
        }
        if !result.output.is_empty() {
            std::io::stdout().write_all(&result.output).unwrap();
        }
    }

    fn log(&self, msg: &str) {
        println!("{}", msg);
    }
}

/// Render the dependency tree below `id`, one node per line, two dashes
/// per level of depth.  Recursion stops at MAX_CHAIN levels so a cyclic
/// graph cannot hang the printer; the build proper reports the cycle.
pub fn print_tree(progress: &dyn Progress, graph: &Graph, id: NodeId) {
    print_subtree(progress, graph, id, 0);
}

fn print_subtree(progress: &dyn Progress, graph: &Graph, id: NodeId, depth: usize) {
    if depth > MAX_CHAIN {
        return;
    }
    let node = graph.node(id);
    progress.log(&format!("{}{}", "--".repeat(depth), node.name));
    for &dep in node.deps() {
        print_subtree(progress, graph, dep, depth + 1);
    }
}
