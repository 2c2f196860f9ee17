//! Construction of the shell commands that bring out-of-date nodes up
//! to date.

use crate::config::Config;
use crate::graph::{Graph, NodeId, NodeKind, ARCHIVE_SUFFIX};
use anyhow::bail;

/// The command that rebuilds `id`.  Only product nodes (objects,
/// explicitly declared artifacts, the final binary) have commands;
/// asking for any other kind is a graph bug.
pub fn build_command(config: &Config, graph: &Graph, id: NodeId) -> anyhow::Result<String> {
    let node = graph.node(id);
    match NodeKind::of(&node.name, config) {
        NodeKind::Object => object_command(config, graph, id),
        NodeKind::ExplicitArtifact => {
            let explicit = match config.explicit_deps.get(&node.name) {
                Some(explicit) => explicit,
                None => bail!("no explicit dependency entry for {}", node.name),
            };
            Ok(format!("{} {}", config.compile_prefix, explicit.suffix))
        }
        NodeKind::FinalBinary => Ok(link_command(config, graph, id)),
        NodeKind::Source | NodeKind::Header => {
            bail!("{} is not a buildable artifact", node.name)
        }
    }
}

/// `<prefix> -c -o <obj> <src>`.  An object compiles from exactly one
/// source file; anything else means the configuration or the source
/// tree is mangled, and building blind would do damage.
fn object_command(config: &Config, graph: &Graph, id: NodeId) -> anyhow::Result<String> {
    let node = graph.node(id);
    let source = match node.deps() {
        [source] => graph.node(*source),
        deps => bail!(
            "object {} must depend on exactly one source file, has {} dependencies",
            node.name,
            deps.len()
        ),
    };
    if !matches!(NodeKind::of(&source.name, config), NodeKind::Source) {
        bail!(
            "object {} must be compiled from a source file, not {}",
            node.name,
            source.name
        );
    }
    Ok(format!(
        "{} -c -o {} {}",
        config.compile_prefix, node.name, source.name
    ))
}

/// `<prefix> <inputs> -o <target> <libraries>`, with static archives
/// moved after every other input so their symbols resolve.
fn link_command(config: &Config, graph: &Graph, id: NodeId) -> String {
    let node = graph.node(id);
    let mut cmd = config.compile_prefix.clone();
    let mut archives = Vec::new();
    for &dep in node.deps() {
        let name = &graph.node(dep).name;
        if name.ends_with(ARCHIVE_SUFFIX) {
            archives.push(name.as_str());
        } else {
            cmd.push(' ');
            cmd.push_str(name);
        }
    }
    for name in archives {
        cmd.push(' ');
        cmd.push_str(name);
    }
    cmd.push_str(" -o ");
    cmd.push_str(&node.name);
    if !config.libraries.is_empty() {
        cmd.push(' ');
        cmd.push_str(&config.libraries);
    }
    cmd
}
