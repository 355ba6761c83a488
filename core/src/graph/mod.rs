//! Dependency graph over named units (DAG).
//!
//! Validation is a Kahn's-algorithm reduction: compute per-node in-degrees,
//! repeatedly remove zero-in-degree nodes. If the reduction cannot consume
//! every node, the leftovers are precisely the cycle members and validation
//! fails naming them. The reduction order doubles as the topological order,
//! with ties broken by insertion order for determinism.

use std::collections::{HashMap, HashSet};

use crate::error::OrchestratorError;

/// Node interface shared by agent units and wave tasks.
pub trait NodeLike: Clone + Send + Sync {
    fn name(&self) -> &str;
    fn depends_on(&self) -> &[String];
}

#[derive(Debug, Clone)]
pub struct UnitGraph<N: NodeLike> {
    nodes: HashMap<String, N>,

    /// name -> declared dependencies
    edges: HashMap<String, Vec<String>>,

    /// name -> units that depend on it
    reverse_edges: HashMap<String, Vec<String>>,

    insertion_order: Vec<String>,

    /// Memoized result of `validate()`, cleared on mutation.
    cached_order: Option<Vec<String>>,
}

impl<N: NodeLike> Default for UnitGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeLike> UnitGraph<N> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            reverse_edges: HashMap::new(),
            insertion_order: Vec::new(),
            cached_order: None,
        }
    }

    pub fn from_nodes(nodes: &[N]) -> Result<Self, OrchestratorError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_unit(node.clone())?;
        }
        Ok(graph)
    }

    /// Registers a unit and its declared dependencies. Invalidates any cached
    /// validation result.
    pub fn add_unit(&mut self, node: N) -> Result<(), OrchestratorError> {
        let name = node.name().to_string();
        if self.nodes.contains_key(&name) {
            return Err(OrchestratorError::DuplicateUnit(name));
        }

        let deps = node.depends_on().to_vec();
        for dep in &deps {
            self.reverse_edges
                .entry(dep.clone())
                .or_default()
                .push(name.clone());
        }
        self.edges.insert(name.clone(), deps);
        self.insertion_order.push(name.clone());
        self.nodes.insert(name, node);
        self.cached_order = None;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, name: &str) -> Option<&N> {
        self.nodes.get(name)
    }

    /// Unit names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.insertion_order
    }

    /// Dependency pairs `(unit, dependency)` where the dependency is not a
    /// node of this graph. References like these are lenient at execution
    /// time (treated as satisfied) but strict config validation rejects them.
    pub fn missing_dependencies(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for name in &self.insertion_order {
            for dep in &self.edges[name] {
                if !self.nodes.contains_key(dep) {
                    missing.push((name.clone(), dep.clone()));
                }
            }
        }
        missing
    }

    /// Kahn's-algorithm reduction. Only dependencies that exist in the graph
    /// contribute to in-degrees; a self-dependency is a 1-cycle.
    fn reduce(&self) -> Result<Vec<String>, OrchestratorError> {
        let position: HashMap<&str, usize> = self
            .insertion_order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for name in &self.insertion_order {
            let degree = self.edges[name]
                .iter()
                .filter(|dep| self.nodes.contains_key(*dep))
                .count();
            in_degree.insert(name.as_str(), degree);
        }

        let mut order: Vec<String> = Vec::with_capacity(self.nodes.len());
        let mut ready: Vec<&str> = self
            .insertion_order
            .iter()
            .map(String::as_str)
            .filter(|n| in_degree[n] == 0)
            .collect();

        let mut next = 0;
        while next < ready.len() {
            let name = ready[next];
            next += 1;
            order.push(name.to_string());

            if let Some(dependents) = self.reverse_edges.get(name) {
                let mut unlocked: Vec<&str> = Vec::new();
                for dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            unlocked.push(dependent.as_str());
                        }
                    }
                }
                // Ties broken by insertion order for a stable result.
                unlocked.sort_by_key(|n| position[n]);
                ready.extend(unlocked);
            }
        }

        if order.len() != self.nodes.len() {
            let processed: HashSet<&str> = order.iter().map(String::as_str).collect();
            let members: Vec<String> = self
                .insertion_order
                .iter()
                .filter(|n| !processed.contains(n.as_str()))
                .cloned()
                .collect();
            return Err(OrchestratorError::CycleDetected { members });
        }

        Ok(order)
    }

    /// Validates acyclicity. Idempotent and memoized: repeat calls are O(1)
    /// until the graph is mutated again.
    pub fn validate(&mut self) -> Result<(), OrchestratorError> {
        if self.cached_order.is_some() {
            return Ok(());
        }
        self.cached_order = Some(self.reduce()?);
        Ok(())
    }

    /// Flat order in which dependencies strictly precede dependents.
    pub fn topological_order(&self) -> Result<Vec<String>, OrchestratorError> {
        match &self.cached_order {
            Some(order) => Ok(order.clone()),
            None => self.reduce(),
        }
    }

    /// Level-parallel batches: every unit lands in the first stage after all
    /// of its existing dependencies. Concatenating the stages yields a valid
    /// topological order.
    pub fn execution_stages(&self) -> Result<Vec<Vec<String>>, OrchestratorError> {
        // Cheap cycle check up front so staging can't loop forever.
        let _ = self.topological_order()?;

        let skipped: HashSet<String> = HashSet::new();
        let mut placed: HashSet<String> = HashSet::new();
        let mut stages: Vec<Vec<String>> = Vec::new();
        while placed.len() < self.nodes.len() {
            let stage = self.find_runnable(&placed, &skipped);
            placed.extend(stage.iter().cloned());
            stages.push(stage);
        }
        Ok(stages)
    }

    /// Units not yet completed or skipped whose every *existing* dependency
    /// is in `completed ∪ skipped`. Dependencies naming a unit absent from
    /// the graph are treated as already satisfied.
    pub fn find_runnable(
        &self,
        completed: &HashSet<String>,
        skipped: &HashSet<String>,
    ) -> Vec<String> {
        self.insertion_order
            .iter()
            .filter(|name| !completed.contains(*name) && !skipped.contains(*name))
            .filter(|name| {
                self.edges[*name]
                    .iter()
                    .filter(|dep| self.nodes.contains_key(*dep))
                    .all(|dep| completed.contains(dep) || skipped.contains(dep))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Node {
        name: String,
        deps: Vec<String>,
    }

    impl NodeLike for Node {
        fn name(&self) -> &str {
            &self.name
        }

        fn depends_on(&self) -> &[String] {
            &self.deps
        }
    }

    fn node(name: &str, deps: &[&str]) -> Node {
        Node {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn graph(nodes: &[Node]) -> UnitGraph<Node> {
        UnitGraph::from_nodes(nodes).unwrap()
    }

    #[test]
    fn empty_graph_validates_trivially() {
        let mut g: UnitGraph<Node> = UnitGraph::new();
        g.validate().unwrap();
        assert!(g.topological_order().unwrap().is_empty());
    }

    #[test]
    fn duplicate_unit_rejected() {
        let mut g = graph(&[node("a", &[])]);
        let err = g.add_unit(node("a", &[])).unwrap_err();
        assert!(matches!(err, OrchestratorError::DuplicateUnit(name) if name == "a"));
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let g = graph(&[
            node("d", &["b", "c"]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("a", &[]),
        ]);
        let order = g.topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
        // ties broken by insertion order
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn execution_stages_are_level_parallel() {
        let g = graph(&[
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("d", &["b", "c"]),
            node("lone", &[]),
        ]);
        let stages = g.execution_stages().unwrap();
        assert_eq!(
            stages,
            vec![
                vec!["a".to_string(), "lone".to_string()],
                vec!["b".to_string(), "c".to_string()],
                vec!["d".to_string()],
            ]
        );
    }

    #[test]
    fn execution_stages_reject_cycles() {
        let g = graph(&[node("x", &["y"]), node("y", &["x"])]);
        assert!(g.execution_stages().is_err());
    }

    #[test]
    fn cycle_members_are_exactly_the_unreduced_units() {
        let mut g = graph(&[
            node("ok", &[]),
            node("x", &["y"]),
            node("y", &["x"]),
            node("downstream", &["x"]),
        ]);
        let err = g.validate().unwrap_err();
        match err {
            OrchestratorError::CycleDetected { members } => {
                let set: HashSet<_> = members.iter().map(String::as_str).collect();
                // downstream is unreachable by the reduction too: it can
                // never be unlocked while the cycle holds x.
                assert_eq!(set, HashSet::from(["x", "y", "downstream"]));
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_one_cycle() {
        let mut g = graph(&[node("a", &["a"])]);
        let err = g.validate().unwrap_err();
        assert!(
            matches!(err, OrchestratorError::CycleDetected { members } if members == vec!["a".to_string()])
        );
    }

    #[test]
    fn validation_is_memoized_and_invalidated_by_mutation() {
        let mut g = graph(&[node("a", &[]), node("b", &["a"])]);
        g.validate().unwrap();
        g.validate().unwrap();

        g.add_unit(node("c", &["c"])).unwrap();
        assert!(g.validate().is_err());
    }

    #[test]
    fn missing_dependencies_are_lenient_in_ordering() {
        // "ghost" is not a node; b must still reduce.
        let mut g = graph(&[node("b", &["ghost"])]);
        g.validate().unwrap();
        assert_eq!(g.missing_dependencies(), vec![(
            "b".to_string(),
            "ghost".to_string()
        )]);
    }

    #[test]
    fn find_runnable_respects_existing_dependencies_only() {
        let g = graph(&[
            node("a", &[]),
            node("b", &["a", "ghost"]),
            node("c", &["b"]),
        ]);

        let none = HashSet::new();
        assert_eq!(g.find_runnable(&none, &none), vec!["a"]);

        let completed: HashSet<String> = ["a".to_string()].into();
        assert_eq!(g.find_runnable(&completed, &none), vec!["b"]);

        // skipped dependencies satisfy dependents as well
        let skipped: HashSet<String> = ["b".to_string()].into();
        assert_eq!(g.find_runnable(&completed, &skipped), vec!["c"]);
    }
}
