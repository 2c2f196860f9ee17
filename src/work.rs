//! The incremental engine: walks the dependency graph from the target,
//! decides what is out of date, and runs the commands that bring it up
//! to date.

use crate::cmdline;
use crate::config::Config;
use crate::fs::MTime;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::progress::Progress;
use crate::task::{self, Termination};
use anyhow::bail;
use rustc_hash::FxHashSet;

/// Bound on dependency chain depth.  A chain deeper than this is almost
/// certainly a misconfiguration, and bounding it keeps the error
/// readable when the cycle check itself is somehow bypassed.
pub const MAX_CHAIN: usize = 100;

/// How a build run ended, when the driver itself did not fail.
#[derive(Debug, PartialEq)]
pub enum BuildResult {
    /// Everything came up to date; carries the number of commands run.
    Success(usize),
    /// A command failed; carries its exit code to surface as our own.
    Failed(i32),
}

/// What one subtree visit resolved to.
enum Outcome {
    /// The newest stamp in the subtree, the node's own included.
    Clean(MTime),
    /// A command failed; unwind without running anything else.
    Failed(i32),
}

pub struct Work<'a> {
    graph: &'a mut Graph,
    config: &'a Config,
    progress: &'a dyn Progress,
    /// Path from the target down to the node currently being visited.
    stack: Vec<NodeId>,
    /// Same contents as `stack`, for O(1) cycle checks.
    on_stack: FxHashSet<NodeId>,
    /// Nodes already rebuilt during this run.  A node can be reached
    /// through more than one parent when a DependsOn list names another
    /// artifact's output; it still rebuilds at most once.
    rebuilt: FxHashSet<NodeId>,
    ran: usize,
}

impl<'a> Work<'a> {
    pub fn new(graph: &'a mut Graph, config: &'a Config, progress: &'a dyn Progress) -> Self {
        Work {
            graph,
            config,
            progress,
            stack: Vec::new(),
            on_stack: FxHashSet::default(),
            rebuilt: FxHashSet::default(),
            ran: 0,
        }
    }

    /// Bring `target` up to date.  Err means a driver-level problem
    /// (cycle, broken configuration); a failing command is a
    /// `BuildResult::Failed` value instead, so its exit code survives.
    pub fn run(&mut self, target: NodeId) -> anyhow::Result<BuildResult> {
        match self.visit(target)? {
            Outcome::Clean(_) => Ok(BuildResult::Success(self.ran)),
            Outcome::Failed(code) => Ok(BuildResult::Failed(code)),
        }
    }

    fn visit(&mut self, id: NodeId) -> anyhow::Result<Outcome> {
        if self.on_stack.contains(&id) {
            bail!("dependency cycle: {}", self.chain(id));
        }
        if self.stack.len() >= MAX_CHAIN {
            bail!(
                "dependency chain too deep (limit {}): {}",
                MAX_CHAIN,
                self.chain(id)
            );
        }
        self.stack.push(id);
        self.on_stack.insert(id);
        let outcome = self.visit_node(id);
        self.stack.pop();
        self.on_stack.remove(&id);
        outcome
    }

    /// Resolve the subtree under `id`, then act if `id` is a stale
    /// product.  Acting only after every dependency has resolved means a
    /// cycle error can never follow a command that depended on it.
    fn visit_node(&mut self, id: NodeId) -> anyhow::Result<Outcome> {
        if self.rebuilt.contains(&id) {
            return Ok(Outcome::Clean(self.graph.node(id).mtime()));
        }

        let deps = self.graph.node(id).deps().to_vec();
        let own = self.graph.node(id).mtime();
        let mut newest = own;
        for dep in deps {
            match self.visit(dep)? {
                Outcome::Clean(stamp) => newest = newest.max(stamp),
                failed => return Ok(failed),
            }
        }

        let kind = NodeKind::of(&self.graph.node(id).name, self.config);
        if !kind.is_product() {
            // Sources and headers are never built; they hand the newest
            // stamp seen below them up to whoever consumes them.
            return Ok(Outcome::Clean(newest));
        }

        let stale = own == MTime::Missing || newest > own;
        if !stale {
            return Ok(Outcome::Clean(own));
        }

        let cmdline = cmdline::build_command(self.config, self.graph, id)?;
        self.progress.task_started(&cmdline);
        let result = task::run_command(&cmdline)?;
        self.progress.task_finished(&cmdline, &result);
        match result.termination {
            Termination::Success => {}
            Termination::Interrupted => return Ok(Outcome::Failed(130)),
            Termination::Failure(code) => return Ok(Outcome::Failed(code)),
        }
        self.ran += 1;
        let now = MTime::now();
        self.graph.stamp_rebuilt(id, now);
        self.rebuilt.insert(id);
        Ok(Outcome::Clean(now))
    }

    /// The visit path plus `id`, rendered for a cycle report.
    fn chain(&self, id: NodeId) -> String {
        let mut names = self
            .stack
            .iter()
            .map(|&n| self.graph.node(n).name.as_str())
            .collect::<Vec<_>>();
        names.push(self.graph.node(id).name.as_str());
        names.join(" -> ")
    }
}
