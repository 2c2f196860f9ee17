//! The dependency graph: one node per file-system artifact, keyed by
//! canonicalized path.

use crate::config::Config;
use crate::fs::MTime;
use rustc_hash::FxHashMap;

pub const SOURCE_SUFFIX: &str = ".cc";
pub const HEADER_SUFFIX: &str = ".h";
pub const OBJECT_SUFFIX: &str = ".o";
pub const ARCHIVE_SUFFIX: &str = ".a";
/// Directory that synthesized object files are placed in.
pub const OBJECT_DIR: &str = "obj";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(usize);
impl NodeId {
    fn index(&self) -> usize {
        self.0
    }
}

/// What a node is.  Derived from its name and the configuration, never
/// stored: the target name wins, then membership in the explicit
/// dependency table (an explicit artifact is often itself a `.o`), then
/// the object/source suffixes.  Anything else behaves like a header.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodeKind {
    Source,
    Header,
    Object,
    ExplicitArtifact,
    FinalBinary,
}

impl NodeKind {
    pub fn of(name: &str, config: &Config) -> NodeKind {
        if name == config.output_binary {
            NodeKind::FinalBinary
        } else if config.explicit_deps.get(name).is_some() {
            NodeKind::ExplicitArtifact
        } else if name.ends_with(OBJECT_SUFFIX) {
            NodeKind::Object
        } else if name.ends_with(SOURCE_SUFFIX) {
            NodeKind::Source
        } else {
            NodeKind::Header
        }
    }

    /// Real build products get rebuild actions; sources and headers only
    /// ever propagate their timestamps.
    pub fn is_product(self) -> bool {
        matches!(
            self,
            NodeKind::Object | NodeKind::ExplicitArtifact | NodeKind::FinalBinary
        )
    }
}

/// One file-system artifact plus its direct dependency edges.
#[derive(Debug)]
pub struct Node {
    pub name: String,
    mtime: MTime,
    deps: Vec<NodeId>,
}

impl Node {
    /// Last modification as observed at graph construction, or the stamp
    /// of this run's rebuild if one has happened.
    pub fn mtime(&self) -> MTime {
        self.mtime
    }

    pub fn deps(&self) -> &[NodeId] {
        &self.deps
    }
}

pub struct Graph {
    nodes: Vec<Node>,
    node_to_id: FxHashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph {
            nodes: Vec::new(),
            node_to_id: FxHashMap::default(),
        }
    }

    /// Register a new node.  Callers check `lookup` first; names map to
    /// exactly one node.
    pub fn add_node(&mut self, name: String, mtime: MTime) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.node_to_id.insert(name.clone(), id);
        self.nodes.push(Node {
            name,
            mtime,
            deps: Vec::new(),
        });
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.node_to_id.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Register the directed edge "`node` depends on `dep`".  Re-adding
    /// an edge is a no-op: a path maps to one id, so the edge list can't
    /// hold duplicates, and first-added order is preserved (the link
    /// command line depends on it).
    pub fn add_dep(&mut self, node: NodeId, dep: NodeId) {
        let deps = &mut self.nodes[node.index()].deps;
        if !deps.contains(&dep) {
            deps.push(dep);
        }
    }

    /// The one mtime mutation: a successful rebuild advances the node to
    /// the present, and that stamp is what propagates to dependents.
    pub fn stamp_rebuilt(&mut self, id: NodeId, stamp: MTime) {
        self.nodes[id.index()].mtime = stamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplicitDep;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.output_binary = "prog".to_string();
        config.explicit_deps.insert(
            "obj/vendor.o".to_string(),
            ExplicitDep {
                dep_paths: vec!["vendor/impl.cpp".to_string()],
                suffix: "-c vendor/impl.cpp -o obj/vendor.o".to_string(),
            },
        );
        config
    }

    #[test]
    fn kind_precedence() {
        let config = test_config();
        assert_eq!(NodeKind::of("prog", &config), NodeKind::FinalBinary);
        // Explicit artifacts win over the .o suffix.
        assert_eq!(
            NodeKind::of("obj/vendor.o", &config),
            NodeKind::ExplicitArtifact
        );
        assert_eq!(NodeKind::of("obj/main.o", &config), NodeKind::Object);
        assert_eq!(NodeKind::of("main.cc", &config), NodeKind::Source);
        assert_eq!(NodeKind::of("main.h", &config), NodeKind::Header);
        assert_eq!(NodeKind::of("README", &config), NodeKind::Header);
    }

    #[test]
    fn add_dep_is_idempotent_and_ordered() {
        let mut graph = Graph::new();
        let a = graph.add_node("a".to_string(), MTime::Missing);
        let b = graph.add_node("b".to_string(), MTime::Stamp(1));
        let c = graph.add_node("c".to_string(), MTime::Stamp(2));
        graph.add_dep(a, c);
        graph.add_dep(a, b);
        graph.add_dep(a, c);
        assert_eq!(graph.node(a).deps(), &[c, b]);
    }

    #[test]
    fn stamp_rebuilt_advances_mtime() {
        let mut graph = Graph::new();
        let a = graph.add_node("a".to_string(), MTime::Missing);
        graph.stamp_rebuilt(a, MTime::Stamp(7));
        assert_eq!(graph.node(a).mtime(), MTime::Stamp(7));
        assert_eq!(graph.lookup("a"), Some(a));
        assert_eq!(graph.lookup("zzz"), None);
    }
}
