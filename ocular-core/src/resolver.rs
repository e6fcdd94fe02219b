//! Build-order resolution.
//!
//! Every package gets a rank: `0` when it has no dependencies, otherwise one
//! more than the highest rank among its dependencies. Sorting by rank yields
//! an order in which each package comes after everything it depends on.
//!
//! Ranks are computed with an explicit depth-first walk. A package is marked
//! in progress while its dependencies are being ranked; reaching an
//! in-progress package again means the dependency relation has a cycle.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::package::Package;

/// What to do with a dependency that names a package outside the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDependencyPolicy {
    /// Skip the reference; it contributes nothing to the rank.
    #[default]
    Ignore,
    /// Fail with [`Error::MissingDependency`].
    Error,
}

impl MissingDependencyPolicy {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingDependencyPolicy::Ignore => "ignore",
            MissingDependencyPolicy::Error => "error",
        }
    }
}

/// Package ids mapped to the ids they depend on, in insertion order.
///
/// Insertion order is the tie-break among packages of equal rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTable {
    entries: IndexMap<String, Vec<String>>,
}

impl DependencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package, replacing any previous entry with the same id.
    pub fn insert(&mut self, id: impl Into<String>, deps: Vec<String>) {
        self.entries.insert(id.into(), deps);
    }

    pub fn from_packages(packages: &[Package]) -> Self {
        packages
            .iter()
            .map(|p| (p.id.clone(), p.deps.to_vec()))
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for DependencyTable {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (id, deps) in iter {
            table.insert(id, deps);
        }
        table
    }
}

/// Resolved build order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOrder {
    order: Vec<String>,
    ranks: IndexMap<String, usize>,
}

impl BuildOrder {
    /// Package ids, dependencies before dependents.
    #[inline]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[inline]
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    /// Ids grouped by rank. Packages within a level do not depend on each
    /// other.
    pub fn levels(&self) -> Vec<Vec<String>> {
        let mut levels: Vec<Vec<String>> = Vec::new();
        for id in &self.order {
            let rank = self.ranks[id.as_str()];
            while levels.len() <= rank {
                levels.push(Vec::new());
            }
            levels[rank].push(id.clone());
        }
        levels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    InProgress,
    Done(usize),
}

struct Frame<'a> {
    id: &'a str,
    deps: &'a [String],
    next: usize,
    rank: usize,
}

impl<'a> Frame<'a> {
    fn new(id: &'a str, deps: &'a [String]) -> Self {
        Self {
            id,
            deps,
            next: 0,
            rank: 0,
        }
    }

    #[inline]
    fn raise_above(&mut self, dep_rank: usize) {
        self.rank = self.rank.max(dep_rank + 1);
    }
}

/// Computes the build order of `table`.
///
/// # Errors
///
/// Returns [`Error::CyclicDependency`] if the dependencies form a cycle, and
/// [`Error::MissingDependency`] if a dependency is not in the table while
/// `policy` is [`MissingDependencyPolicy::Error`].
pub fn resolve_order(table: &DependencyTable, policy: MissingDependencyPolicy) -> Result<BuildOrder> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(table.len());

    for (root, root_deps) in table.iter() {
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        let mut stack = vec![Frame::new(root, root_deps)];

        while let Some(frame) = stack.last_mut() {
            let deps = frame.deps;
            let Some(dep) = deps.get(frame.next) else {
                let rank = frame.rank;
                let id = frame.id;
                stack.pop();
                trace!(package = id, rank, "resolved");
                marks.insert(id, Mark::Done(rank));
                if let Some(parent) = stack.last_mut() {
                    parent.raise_above(rank);
                }
                continue;
            };
            frame.next += 1;
            let dep = dep.as_str();

            match marks.get(dep).copied() {
                Some(Mark::Done(rank)) => frame.raise_above(rank),
                Some(Mark::InProgress) => {
                    let start = stack.iter().position(|f| f.id == dep).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|f| f.id.to_string()).collect();
                    cycle.push(dep.to_string());
                    return Err(Error::CyclicDependency { cycle });
                }
                None => match table.entries.get_key_value(dep) {
                    Some((dep_id, dep_deps)) => {
                        marks.insert(dep_id.as_str(), Mark::InProgress);
                        stack.push(Frame::new(dep_id.as_str(), dep_deps.as_slice()));
                    }
                    None => match policy {
                        MissingDependencyPolicy::Ignore => {
                            debug!(package = frame.id, dependency = dep, "skipping unknown dependency");
                        }
                        MissingDependencyPolicy::Error => {
                            return Err(Error::MissingDependency {
                                package: frame.id.to_string(),
                                dependency: dep.to_string(),
                            });
                        }
                    },
                },
            }
        }
    }

    let mut ranks = IndexMap::with_capacity(table.len());
    for id in table.ids() {
        let rank = match marks.get(id) {
            Some(Mark::Done(rank)) => *rank,
            _ => 0,
        };
        ranks.insert(id.to_string(), rank);
    }

    let mut order: Vec<String> = ranks.keys().cloned().collect();
    order.sort_by_key(|id| ranks[id.as_str()]);

    debug!(packages = order.len(), "build order resolved");
    Ok(BuildOrder { order, ranks })
}
