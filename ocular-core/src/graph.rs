//! Dependency graph queries using petgraph.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::package::Package;
use crate::resolver::{resolve_order, BuildOrder, DependencyTable, MissingDependencyPolicy};

/// Directed acyclic graph of package dependencies.
///
/// Edges point from a package to the packages it depends on. Dependencies
/// outside the package set have no edge.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    packages: HashMap<NodeIndex, Package>,
    build_order: BuildOrder,
}

impl DependencyGraph {
    /// Creates a new dependency graph from a list of packages.
    ///
    /// # Errors
    ///
    /// Returns an error if the packages cannot be ordered: a cycle, or a
    /// dependency outside the set under [`MissingDependencyPolicy::Error`].
    pub fn new(packages: Vec<Package>, policy: MissingDependencyPolicy) -> Result<Self> {
        let table = DependencyTable::from_packages(&packages);
        let build_order = resolve_order(&table, policy)?;

        let mut graph = DiGraph::with_capacity(packages.len(), 0);
        let mut node_map = HashMap::with_capacity(packages.len());
        for package in &packages {
            let node = graph.add_node(package.id.clone());
            node_map.insert(package.id.clone(), node);
        }

        for package in &packages {
            let from_node = node_map[&package.id];
            for dep in &package.deps {
                if let Some(&to_node) = node_map.get(dep) {
                    graph.update_edge(from_node, to_node, ());
                }
            }
        }

        let packages = packages
            .into_iter()
            .map(|p| (node_map[&p.id], p))
            .collect();

        Ok(Self {
            graph,
            node_map,
            packages,
            build_order,
        })
    }

    fn not_found(&self, name: &str) -> Error {
        let mut available: Vec<&str> = self.node_map.keys().map(String::as_str).collect();
        available.sort_unstable();
        Error::PackageNotFound {
            name: name.to_string(),
            available: available.join(", "),
        }
    }

    fn node(&self, package_id: &str) -> Result<NodeIndex> {
        self.node_map
            .get(package_id)
            .copied()
            .ok_or_else(|| self.not_found(package_id))
    }

    fn neighbors(&self, package_id: &str, direction: Direction) -> Result<Vec<String>> {
        let node = self.node(package_id)?;
        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|idx| self.graph[idx].clone())
            .collect();
        self.sort_by_build_order(&mut ids);
        Ok(ids)
    }

    fn sort_by_build_order(&self, ids: &mut [String]) {
        let position: HashMap<&str, usize> = self
            .build_order
            .order()
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        ids.sort_by_key(|id| position.get(id.as_str()).copied().unwrap_or(usize::MAX));
    }

    /// Retrieves a package by id.
    #[inline]
    pub fn get_package(&self, id: &str) -> Option<&Package> {
        self.node_map
            .get(id)
            .and_then(|idx| self.packages.get(idx))
    }

    /// Looks a package up by id, npm name, or directory name, in that order
    /// of preference.
    pub fn find_package(&self, query: &str) -> Option<&Package> {
        if let Some(package) = self.get_package(query) {
            return Some(package);
        }
        let packages = self.all_packages();
        packages
            .iter()
            .find(|p| p.name.as_deref() == Some(query))
            .or_else(|| {
                packages
                    .iter()
                    .find(|p| p.path.file_name().is_some_and(|name| name == query))
            })
            .copied()
    }

    /// Like [`find_package`](Self::find_package), but an unknown reference
    /// is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] listing the available ids.
    pub fn lookup(&self, query: &str) -> Result<&Package> {
        self.find_package(query)
            .ok_or_else(|| self.not_found(query))
    }

    #[inline]
    pub fn build_order(&self) -> &BuildOrder {
        &self.build_order
    }

    /// Returns package ids in build order (dependencies before dependents).
    #[inline]
    pub fn topological_order(&self) -> &[String] {
        self.build_order.order()
    }

    /// Returns package ids grouped by rank.
    ///
    /// Each level only depends on earlier levels.
    pub fn dependency_levels(&self) -> Vec<Vec<String>> {
        self.build_order.levels()
    }

    /// Returns direct dependencies of a package that are part of the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not found in the graph.
    pub fn dependencies(&self, package_id: &str) -> Result<Vec<String>> {
        self.neighbors(package_id, Direction::Outgoing)
    }

    /// Returns direct dependents of a package (packages that depend on it).
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not found in the graph.
    pub fn dependents(&self, package_id: &str) -> Result<Vec<String>> {
        self.neighbors(package_id, Direction::Incoming)
    }

    /// Returns all transitive dependents of a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not found in the graph.
    pub fn all_dependents(&self, package_id: &str) -> Result<HashSet<String>> {
        let start = self.node(package_id)?;
        let mut result = HashSet::new();
        let mut stack = vec![start];
        let mut seen = HashSet::from([start]);

        while let Some(current) = stack.pop() {
            for dependent in self.graph.neighbors_directed(current, Direction::Incoming) {
                if seen.insert(dependent) {
                    result.insert(self.graph[dependent].clone());
                    stack.push(dependent);
                }
            }
        }

        Ok(result)
    }

    /// Returns the changed packages plus all their transitive dependents, in
    /// build order.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the changed packages are not found.
    pub fn affected_packages(&self, changed: &[String]) -> Result<Vec<String>> {
        let mut affected = HashSet::new();
        for package_id in changed {
            self.node(package_id)?;
            affected.insert(package_id.clone());
            affected.extend(self.all_dependents(package_id)?);
        }

        let mut affected: Vec<String> = affected.into_iter().collect();
        self.sort_by_build_order(&mut affected);
        Ok(affected)
    }

    /// Returns all packages in build order.
    pub fn all_packages(&self) -> Vec<&Package> {
        self.topological_order()
            .iter()
            .filter_map(|id| self.get_package(id))
            .collect()
    }
}
