//! Builds the dependency graph: scans the working directory for C++
//! sources and headers, reads their include lines, and folds in the
//! artifacts declared in configuration.

use crate::canon::{canon_path, is_safe_path};
use crate::config::Config;
use crate::fs::FileSystem;
use crate::graph::{Graph, NodeId, HEADER_SUFFIX, OBJECT_DIR, OBJECT_SUFFIX, SOURCE_SUFFIX};
use crate::includes;
use crate::scanner::Scanner;
use anyhow::bail;

/// Everything the build engine needs: the graph, the node to bring up
/// to date, and the configuration used for command construction.
pub struct State {
    pub graph: Graph,
    pub target: NodeId,
    pub config: Config,
}

struct Loader<'a> {
    fs: &'a dyn FileSystem,
    graph: Graph,
}

impl<'a> Loader<'a> {
    /// Look up or create the node for a path.  Paths are canonicalized
    /// so spellings like `./x.h` and `x.h` share a node, and checked
    /// against the safe-character list before they can ever reach a
    /// command line.  New nodes are stat'd once, here.
    fn node(&mut self, path: &str) -> anyhow::Result<NodeId> {
        let name = canon_path(path);
        if !is_safe_path(&name) {
            bail!(
                "unsafe path {:?}: only letters, digits, and _-+./ are allowed",
                path
            );
        }
        if let Some(id) = self.graph.lookup(&name) {
            return Ok(id);
        }
        let mtime = match self.fs.stat(&name) {
            Ok(mtime) => mtime,
            Err(err) => bail!("stat {}: {}", name, err),
        };
        Ok(self.graph.add_node(name, mtime))
    }
}

/// Where the object for a source file goes: `obj/<stem>.o`.
fn object_path(source: &str) -> String {
    let stem = source.strip_suffix(SOURCE_SUFFIX).unwrap_or(source);
    format!("{}/{}{}", OBJECT_DIR, stem, OBJECT_SUFFIX)
}

/// Assemble the graph for one build of `config.output_binary`.
pub fn read(fs: &dyn FileSystem, config: Config) -> anyhow::Result<State> {
    let mut loader = Loader {
        fs,
        graph: Graph::new(),
    };
    let target = loader.node(&config.output_binary)?;

    let mut names = match fs.read_dir(".") {
        Ok(names) => names,
        Err(err) => bail!("scan source directory: {}", err),
    };
    // Sorted so command order is stable across runs and filesystems.
    names.sort();

    let mut scanned = Vec::new();
    for name in &names {
        if name.ends_with(SOURCE_SUFFIX) {
            let source = loader.node(name)?;
            scanned.push(source);
            let object = loader.node(&object_path(name))?;
            loader.graph.add_dep(object, source);
            loader.graph.add_dep(target, object);
        } else if name.ends_with(HEADER_SUFFIX) {
            scanned.push(loader.node(name)?);
        }
    }

    if let Err(err) = fs.create_dir_all(OBJECT_DIR) {
        bail!("create {}: {}", OBJECT_DIR, err);
    }

    // Include pass: only files found by the directory scan are read.
    // A header pulled in from some other directory becomes a node whose
    // mtime matters, but its own includes are not followed.
    for &id in &scanned {
        let name = loader.graph.node(id).name.clone();
        let mut bytes = match fs.read(&name) {
            Ok(bytes) => bytes,
            Err(err) => bail!("read {}: {}", name, err),
        };
        bytes.push(0);
        let mut scanner = Scanner::new(&bytes);
        for include in includes::scan(&mut scanner) {
            let dep = loader.node(&include)?;
            loader.graph.add_dep(id, dep);
        }
    }

    for (output, explicit) in config.explicit_deps.iter() {
        let artifact = loader.node(output)?;
        for path in &explicit.dep_paths {
            let dep = loader.node(path)?;
            loader.graph.add_dep(artifact, dep);
        }
        loader.graph.add_dep(target, artifact);
    }

    Ok(State {
        graph: loader.graph,
        target,
        config,
    })
}
