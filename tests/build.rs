//! In-process tests: drive the loader and the engine against an
//! in-memory filesystem.  Commands use `echo` as the compiler, so a
//! "rebuild" runs a real subprocess but touches nothing; staleness is
//! steered through crafted stamps instead.

use std::collections::HashMap;

use ccsimplebuild::fs::MTime;
use ccsimplebuild::work::BuildResult;

/// Implementation of Progress that prints nothing.
struct NoProgress {}
impl ccsimplebuild::progress::Progress for NoProgress {
    fn task_started(&self, _cmdline: &str) {}
    fn task_finished(&self, _cmdline: &str, _result: &ccsimplebuild::task::TaskResult) {}
    fn log(&self, _msg: &str) {}
}

struct File {
    content: String,
    mtime: MTime,
}

/// Implementation of fs::FileSystem that is memory-backed.
struct TestFileSystem {
    files: HashMap<String, File>,
}
impl TestFileSystem {
    fn new() -> Self {
        TestFileSystem {
            files: HashMap::new(),
        }
    }

    fn add(&mut self, path: &str, content: impl Into<String>) {
        self.add_at(path, content, 1);
    }

    fn add_at(&mut self, path: &str, content: impl Into<String>, stamp: u64) {
        self.files.insert(
            path.to_string(),
            File {
                content: content.into(),
                mtime: MTime::Stamp(stamp),
            },
        );
    }
}

impl ccsimplebuild::fs::FileSystem for TestFileSystem {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        match self.files.get(path) {
            Some(file) => Ok(file.content.as_bytes().to_vec()),
            None => Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
        }
    }

    fn stat(&self, path: &str) -> std::io::Result<MTime> {
        match self.files.get(path) {
            Some(file) => Ok(file.mtime),
            None => Ok(MTime::Missing),
        }
    }

    fn read_dir(&self, _path: &str) -> std::io::Result<Vec<String>> {
        Ok(self
            .files
            .keys()
            .filter(|name| !name.contains('/'))
            .cloned()
            .collect())
    }

    fn create_dir_all(&self, _path: &str) -> std::io::Result<()> {
        Ok(())
    }
}

fn load(fs: &TestFileSystem, config_text: &str) -> anyhow::Result<ccsimplebuild::load::State> {
    let config = ccsimplebuild::config::parse("test.conf", config_text.as_bytes().to_vec())?;
    ccsimplebuild::load::read(fs, config)
}

fn build(fs: &TestFileSystem, config_text: &str) -> anyhow::Result<BuildResult> {
    let mut state = load(fs, config_text)?;
    let progress = NoProgress {};
    let mut work =
        ccsimplebuild::work::Work::new(&mut state.graph, &state.config, &progress);
    work.run(state.target)
}

const ECHO_CONFIG: &str = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
";

#[test]
fn first_build_compiles_every_source_and_links() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add("main.cc", "#include \"util.h\"\nint main() {}\n");
    fs.add("util.cc", "#include \"util.h\"\n");
    fs.add("util.h", "");
    assert_eq!(build(&fs, ECHO_CONFIG)?, BuildResult::Success(3));
    Ok(())
}

#[test]
fn fresh_artifacts_run_nothing() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add_at("main.cc", "", 1);
    fs.add_at("util.cc", "", 1);
    fs.add_at("obj/main.o", "", 5);
    fs.add_at("obj/util.o", "", 5);
    fs.add_at("prog", "", 5);
    assert_eq!(build(&fs, ECHO_CONFIG)?, BuildResult::Success(0));
    Ok(())
}

#[test]
fn touched_header_rebuilds_only_dependents() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add_at("main.cc", "#include \"util.h\"\n", 1);
    fs.add_at("other.cc", "", 1);
    fs.add_at("util.h", "", 9);
    fs.add_at("obj/main.o", "", 5);
    fs.add_at("obj/other.o", "", 5);
    fs.add_at("prog", "", 5);
    // One recompile plus the relink; other.o stays.
    assert_eq!(build(&fs, ECHO_CONFIG)?, BuildResult::Success(2));
    Ok(())
}

#[test]
fn header_chain_propagates_through_headers() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add_at("main.cc", "#include \"a.h\"\n", 1);
    fs.add_at("a.h", "#include \"b.h\"\n", 1);
    fs.add_at("b.h", "", 9);
    fs.add_at("obj/main.o", "", 5);
    fs.add_at("prog", "", 5);
    assert_eq!(build(&fs, ECHO_CONFIG)?, BuildResult::Success(2));
    Ok(())
}

#[test]
fn diamond_header_rebuilds_both_objects_one_link() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add_at("left.cc", "#include \"shared.h\"\n", 1);
    fs.add_at("right.cc", "#include \"shared.h\"\n", 1);
    fs.add_at("shared.h", "", 9);
    fs.add_at("obj/left.o", "", 5);
    fs.add_at("obj/right.o", "", 5);
    fs.add_at("prog", "", 5);
    assert_eq!(build(&fs, ECHO_CONFIG)?, BuildResult::Success(3));
    Ok(())
}

#[test]
fn explicit_artifact_outranks_header_kind() -> anyhow::Result<()> {
    // gen.h is declared as a buildable artifact, so a fresher input
    // regenerates it and the rebuild ripples up to its includer.
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
ExplicitDependency:
Output=gen.h
CompileSuffix=-DGEN -o gen.h
DependsOn=gen.in
";
    let mut fs = TestFileSystem::new();
    fs.add_at("main.cc", "#include \"gen.h\"\n", 1);
    fs.add_at("gen.in", "", 9);
    fs.add_at("gen.h", "", 5);
    fs.add_at("obj/main.o", "", 6);
    fs.add_at("prog", "", 6);
    // Regenerate gen.h, recompile main.o, relink.
    assert_eq!(build(&fs, config)?, BuildResult::Success(3));
    Ok(())
}

#[test]
fn shared_artifact_rebuilds_at_most_once() -> anyhow::Result<()> {
    // libshared.a is both a target input and a DependsOn of final.o, so
    // it is reachable through two parents.
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
ExplicitDependency:
Output=libshared.a
CompileSuffix=-make libshared.a
DependsOn=shared.in
ExplicitDependency:
Output=final.o
CompileSuffix=-make final.o
DependsOn=libshared.a
";
    let mut fs = TestFileSystem::new();
    fs.add_at("shared.in", "", 9);
    fs.add_at("libshared.a", "", 5);
    fs.add_at("final.o", "", 5);
    fs.add_at("prog", "", 5);
    // libshared.a once, final.o once, link once; a duplicate rebuild
    // would make this 4.
    assert_eq!(build(&fs, config)?, BuildResult::Success(3));
    Ok(())
}

#[test]
fn cycle_is_fatal_and_names_the_chain() {
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
ExplicitDependency:
Output=first.gen
CompileSuffix=-make first.gen
DependsOn=second.gen
ExplicitDependency:
Output=second.gen
CompileSuffix=-make second.gen
DependsOn=first.gen
";
    let fs = TestFileSystem::new();
    let err = build(&fs, config).unwrap_err().to_string();
    assert!(err.contains("dependency cycle"), "got: {}", err);
    assert!(
        err.contains("first.gen -> second.gen -> first.gen"),
        "got: {}",
        err
    );
}

#[test]
fn self_cycle_is_fatal() {
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
ExplicitDependency:
Output=loop.gen
CompileSuffix=-make loop.gen
DependsOn=loop.gen
";
    let fs = TestFileSystem::new();
    let err = build(&fs, config).unwrap_err().to_string();
    assert!(err.contains("dependency cycle"), "got: {}", err);
    assert!(err.contains("loop.gen -> loop.gen"), "got: {}", err);
}

#[test]
fn unsafe_discovered_filename_is_fatal() {
    let mut fs = TestFileSystem::new();
    fs.add("ok.cc", "");
    fs.add("evil;rm.cc", "");
    let err = build(&fs, ECHO_CONFIG).unwrap_err().to_string();
    assert!(err.contains("unsafe path"), "got: {}", err);
}

#[test]
fn unsafe_include_is_fatal() {
    let mut fs = TestFileSystem::new();
    fs.add("main.cc", "#include \"bad`tick.h\"\n");
    let err = build(&fs, ECHO_CONFIG).unwrap_err().to_string();
    assert!(err.contains("unsafe path"), "got: {}", err);
}

#[test]
fn unsafe_explicit_output_is_fatal() {
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=echo
LibrariesToLink=
ExplicitDependency:
Output=out$(x).o
CompileSuffix=-make it
DependsOn=
";
    let fs = TestFileSystem::new();
    let err = build(&fs, config).unwrap_err().to_string();
    assert!(err.contains("unsafe path"), "got: {}", err);
}

#[test]
fn object_per_source_with_single_source_dep() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add("main.cc", "#include \"util.h\"\n");
    fs.add("util.h", "");
    let state = load(&fs, ECHO_CONFIG)?;
    let obj = state.graph.lookup("obj/main.o").expect("object node");
    let src = state.graph.lookup("main.cc").expect("source node");
    assert_eq!(state.graph.node(obj).deps(), &[src]);
    // The include edge hangs off the source, not the object.
    let hdr = state.graph.lookup("util.h").expect("header node");
    assert_eq!(state.graph.node(src).deps(), &[hdr]);
    assert_eq!(state.graph.node(state.target).deps(), &[obj]);
    Ok(())
}

#[test]
fn include_spelling_aliases_to_one_node() -> anyhow::Result<()> {
    let mut fs = TestFileSystem::new();
    fs.add("main.cc", "#include \"./util.h\"\n");
    fs.add("util.cc", "#include \"util.h\"\n");
    fs.add("util.h", "");
    let state = load(&fs, ECHO_CONFIG)?;
    assert!(state.graph.lookup("util.h").is_some());
    assert!(state.graph.lookup("./util.h").is_none());
    Ok(())
}

#[test]
fn failing_command_surfaces_its_exit_code() -> anyhow::Result<()> {
    let config = "OutputBinaryFilename=prog
CompileCommandPrefix=false
LibrariesToLink=
";
    let mut fs = TestFileSystem::new();
    fs.add("main.cc", "");
    assert_eq!(build(&fs, config)?, BuildResult::Failed(1));
    Ok(())
}

#[test]
fn default_config_when_file_absent() -> anyhow::Result<()> {
    let fs = TestFileSystem::new();
    let config = ccsimplebuild::config::load(&fs, None)?;
    assert_eq!(config.output_binary, "default_ccsimplebuild_output");
    assert_eq!(config.compile_prefix, "g++");
    assert_eq!(config.libraries, "");
    assert!(config.explicit_deps.is_empty());
    let state = ccsimplebuild::load::read(&fs, config)?;
    assert_eq!(
        state.graph.node(state.target).name,
        "default_ccsimplebuild_output"
    );
    Ok(())
}

#[test]
fn named_config_must_exist() {
    let fs = TestFileSystem::new();
    let err = ccsimplebuild::config::load(&fs, Some("missing.conf"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("missing.conf"), "got: {}", err);
}
