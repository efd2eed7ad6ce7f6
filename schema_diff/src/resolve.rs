//! Dependency resolution for safe DDL ordering
//!
//! Differences form a directed graph through `parent_object_name` and
//! `dependencies` (table before index, referenced table before foreign key,
//! relation before view). The apply order places parents before dependents;
//! the teardown order is its reverse. A cycle only invalidates ordering for
//! the implicated strongly-connected subgraph: its members are reported and
//! skipped while everything else is still ordered.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use crate::model::difference::ObjectDifference;
use crate::model::types::DifferenceType;

/// The orderings produced for one difference set
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Indices of orderable differences, parents before dependents
    pub apply_order: Vec<usize>,
    /// Indices of orderable differences, dependents before parents
    pub teardown_order: Vec<usize>,
    /// Script order: EXTRA differences in teardown order (drops first),
    /// then MISSING and MODIFIED differences in apply order
    pub script_order: Vec<usize>,
    /// Qualified names caught in dependency cycles; their differences are
    /// excluded from the orderings above
    pub cycle_members: Vec<String>,
}

/// Builds the dependency graph for one difference set and orders it
pub struct DependencyResolver {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyResolver {
    pub fn new(differences: &[ObjectDifference]) -> Self {
        let mut resolver = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };

        for diff in differences {
            let node = resolver.add_node(&diff.qualified_name());
            if let Some(parent) = &diff.parent_object_name {
                let parent_node = resolver.add_node(parent);
                resolver.add_edge(parent_node, node);
            }
            for dependency in &diff.dependencies {
                let dep_node = resolver.add_node(dependency);
                resolver.add_edge(dep_node, node);
            }
        }

        resolver
    }

    fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), idx);
            idx
        }
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if from != to && !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Order the difference set. Never fails: cycles degrade to partial
    /// ordering with the implicated members reported.
    pub fn resolve(&self, differences: &[ObjectDifference]) -> Resolution {
        let (ranked_nodes, cycle_nodes) = match toposort(&self.graph, None) {
            Ok(order) => (order, HashSet::new()),
            Err(_) => self.partial_order(),
        };

        let mut rank: HashMap<&str, usize> = HashMap::new();
        for (position, node) in ranked_nodes.iter().enumerate() {
            rank.insert(self.graph[*node].as_str(), position);
        }

        let cycle_members: Vec<String> = cycle_nodes
            .iter()
            .map(|n| self.graph[*n].clone())
            .collect();
        let cyclic: HashSet<&str> = cycle_members.iter().map(|s| s.as_str()).collect();

        let names: Vec<String> = differences.iter().map(|d| d.qualified_name()).collect();
        let mut orderable: Vec<usize> = (0..differences.len())
            .filter(|&i| !cyclic.contains(names[i].as_str()))
            .collect();
        // Rank sort with the original index as tie-break keeps the output
        // deterministic for equal inputs
        orderable.sort_by_key(|&i| (rank.get(names[i].as_str()).copied().unwrap_or(usize::MAX), i));

        let apply_order = orderable.clone();
        let mut teardown_order = orderable;
        teardown_order.reverse();

        let mut script_order: Vec<usize> = teardown_order
            .iter()
            .copied()
            .filter(|&i| differences[i].difference_type == DifferenceType::Extra)
            .collect();
        script_order.extend(
            apply_order
                .iter()
                .copied()
                .filter(|&i| differences[i].difference_type != DifferenceType::Extra),
        );

        Resolution {
            apply_order,
            teardown_order,
            script_order,
            cycle_members,
        }
    }

    /// Tarjan SCC fallback when the graph is cyclic: components come out in
    /// reverse topological order, so reversing them yields an apply order
    /// over the acyclic remainder
    fn partial_order(&self) -> (Vec<NodeIndex>, HashSet<NodeIndex>) {
        let mut components = tarjan_scc(&self.graph);
        components.reverse();

        let mut order = Vec::new();
        let mut cyclic = HashSet::new();
        for component in components {
            let is_cycle = component.len() > 1
                || component
                    .iter()
                    .any(|&n| self.graph.contains_edge(n, n));
            if is_cycle {
                cyclic.extend(component);
            } else {
                order.extend(component);
            }
        }
        (order, cyclic)
    }

    /// One representative path through a cycle, for error reporting
    pub fn cycle_path(&self, start_name: &str) -> String {
        let Some(&start) = self.node_map.get(start_name) else {
            return start_name.to_string();
        };
        let mut path = vec![self.graph[start].clone()];
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut current = start;

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].clone());
            if target == start || visited.contains(&target) {
                break;
            }
            visited.insert(target);
            current = target;
        }
        path.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::ObjectKey;
    use crate::model::types::ObjectType;
    use pretty_assertions::assert_eq;

    fn missing(name: &str, object_type: ObjectType) -> ObjectDifference {
        let key = ObjectKey::new("public", name, object_type);
        ObjectDifference::missing(&key, String::new())
    }

    fn extra(name: &str, object_type: ObjectType) -> ObjectDifference {
        let key = ObjectKey::new("public", name, object_type);
        ObjectDifference::extra(&key, String::new())
    }

    fn position(order: &[usize], index: usize) -> usize {
        order.iter().position(|&i| i == index).unwrap()
    }

    #[test]
    fn apply_creates_table_before_index_and_foreign_key() {
        let differences = vec![
            missing("ix_t_col", ObjectType::Index).with_parent("public.t"),
            missing("t", ObjectType::Table),
            missing("fk_t2_t", ObjectType::ConstraintForeign)
                .with_parent("public.t2")
                .with_dependency("public.t"),
        ];

        let resolver = DependencyResolver::new(&differences);
        let resolution = resolver.resolve(&differences);

        let table = position(&resolution.apply_order, 1);
        assert!(table < position(&resolution.apply_order, 0));
        assert!(table < position(&resolution.apply_order, 2));
        assert!(resolution.cycle_members.is_empty());
    }

    #[test]
    fn teardown_drops_index_and_foreign_key_before_table() {
        let differences = vec![
            extra("t", ObjectType::Table),
            extra("ix_t_col", ObjectType::Index).with_parent("public.t"),
            extra("fk_t2_t", ObjectType::ConstraintForeign)
                .with_parent("public.t2")
                .with_dependency("public.t"),
        ];

        let resolver = DependencyResolver::new(&differences);
        let resolution = resolver.resolve(&differences);

        let table = position(&resolution.teardown_order, 0);
        assert!(position(&resolution.teardown_order, 1) < table);
        assert!(position(&resolution.teardown_order, 2) < table);
    }

    #[test]
    fn script_places_drops_before_creates() {
        let differences = vec![
            missing("users", ObjectType::Table),
            extra("legacy_users", ObjectType::Table),
        ];

        let resolver = DependencyResolver::new(&differences);
        let resolution = resolver.resolve(&differences);
        assert_eq!(resolution.script_order, vec![1, 0]);
    }

    #[test]
    fn cycle_is_isolated_and_remainder_still_ordered() {
        let differences = vec![
            missing("a", ObjectType::View).with_dependency("public.b"),
            missing("b", ObjectType::View).with_dependency("public.a"),
            missing("standalone", ObjectType::Table),
        ];

        let resolver = DependencyResolver::new(&differences);
        let resolution = resolver.resolve(&differences);

        assert_eq!(resolution.apply_order, vec![2]);
        let mut members = resolution.cycle_members.clone();
        members.sort();
        assert_eq!(members, vec!["public.a".to_string(), "public.b".to_string()]);
    }

    #[test]
    fn cycle_path_reports_a_loop() {
        let differences = vec![
            missing("a", ObjectType::View).with_dependency("public.b"),
            missing("b", ObjectType::View).with_dependency("public.a"),
        ];
        let resolver = DependencyResolver::new(&differences);
        let path = resolver.cycle_path("public.a");
        assert!(path.contains("public.a") && path.contains("public.b"));
    }
}
