//! The `relativeTo` reference graph

use std::collections::{HashMap, VecDeque};

use crate::model::Element;

use super::error::LayoutError;

/// Each element references at most one other element, so the graph is a
/// forest plus, in malformed input, cycles hanging off it.
pub(crate) struct ReferenceGraph<'a> {
    pub elements: &'a [Element],
    /// Index of the referenced element, after dropping unusable edges
    pub references: Vec<Option<usize>>,
    /// Problems found while building the graph, in input order
    pub issues: Vec<LayoutError>,
    /// Cycles found (each ends where it starts)
    pub cycles: Vec<Vec<String>>,
}

impl<'a> ReferenceGraph<'a> {
    /// Build the graph, recording duplicate ids, unknown references and
    /// cycles. Edges that take part in a cycle are cut so that the remaining
    /// graph is always acyclic.
    pub fn build(elements: &'a [Element]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(elements.len());
        let mut issues = Vec::new();

        for (i, element) in elements.iter().enumerate() {
            if index.contains_key(element.id.as_str()) {
                issues.push(LayoutError::duplicate(&element.id));
            } else {
                index.insert(element.id.as_str(), i);
            }
        }

        let references = elements
            .iter()
            .map(|element| {
                let reference = element.relative_to.as_deref()?;
                match index.get(reference) {
                    Some(&target) => Some(target),
                    None => {
                        let suggestions = super::find_similar(index.keys().copied(), reference, 2);
                        issues.push(LayoutError::undefined(&element.id, reference, suggestions));
                        None
                    }
                }
            })
            .collect();

        let mut graph = Self {
            elements,
            references,
            issues,
            cycles: Vec::new(),
        };
        graph.cut_cycles();
        graph
    }

    /// Find every cycle by following reference chains and cut its edges.
    fn cut_cycles(&mut self) {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            New,
            OnPath,
            Done,
        }

        let n = self.elements.len();
        let mut state = vec![Visit::New; n];
        let mut members: Vec<usize> = Vec::new();

        for start in 0..n {
            let mut path = Vec::new();
            let mut current = Some(start);

            while let Some(node) = current {
                if state[node] != Visit::New {
                    break;
                }
                state[node] = Visit::OnPath;
                path.push(node);
                current = self.references[node];
            }

            if let Some(node) = current {
                if state[node] == Visit::OnPath {
                    if let Some(pos) = path.iter().position(|&p| p == node) {
                        let cycle_nodes = &path[pos..];
                        let mut cycle: Vec<String> = cycle_nodes
                            .iter()
                            .map(|&i| self.elements[i].id.clone())
                            .collect();
                        cycle.push(self.elements[node].id.clone());
                        members.extend_from_slice(cycle_nodes);
                        self.cycles.push(cycle);
                    }
                }
            }

            for node in path {
                state[node] = Visit::Done;
            }
        }

        for node in members {
            self.references[node] = None;
        }
    }

    /// Kahn's algorithm over the (acyclic) graph; ties keep input order
    pub fn topological_order(&self) -> Vec<usize> {
        let n = self.elements.len();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut queue = VecDeque::with_capacity(n);

        for (i, reference) in self.references.iter().enumerate() {
            match reference {
                Some(target) => dependents[*target].push(i),
                None => queue.push_back(i),
            }
        }

        let mut order = Vec::with_capacity(n);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            queue.extend(dependents[node].iter().copied());
        }
        order
    }

    /// Whether the element asked for a reference that could not be used
    pub fn is_degraded(&self, i: usize) -> bool {
        self.elements[i].relative_to.is_some() && self.references[i].is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    fn el(id: &str, reference: Option<&str>) -> Element {
        let e = Element::new(id, ElementKind::Text);
        match reference {
            Some(r) => e.relative_to(r),
            None => e,
        }
    }

    fn ids(graph: &ReferenceGraph, order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| graph.elements[i].id.clone()).collect()
    }

    #[test]
    fn test_order_follows_dependencies() {
        let elements = vec![el("c", Some("b")), el("b", Some("a")), el("a", None)];
        let graph = ReferenceGraph::build(&elements);
        assert!(graph.issues.is_empty());
        assert_eq!(ids(&graph, &graph.topological_order()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_is_cut() {
        let elements = vec![el("a", Some("b")), el("b", Some("a")), el("c", Some("a"))];
        let graph = ReferenceGraph::build(&elements);
        assert_eq!(
            graph.cycles,
            vec![vec!["a".to_string(), "b".to_string(), "a".to_string()]]
        );
        assert_eq!(graph.references, vec![None, None, Some(0)]);
        assert_eq!(graph.topological_order().len(), 3);
        assert!(graph.is_degraded(0));
        assert!(!graph.is_degraded(2));
    }

    #[test]
    fn test_tail_into_cycle_reports_only_cycle() {
        let elements = vec![el("x", Some("a")), el("a", Some("b")), el("b", Some("a"))];
        let graph = ReferenceGraph::build(&elements);
        assert_eq!(
            graph.cycles,
            vec![vec!["a".to_string(), "b".to_string(), "a".to_string()]]
        );
        assert_eq!(graph.references[0], Some(1));
    }

    #[test]
    fn test_self_reference() {
        let elements = vec![el("a", Some("a"))];
        let graph = ReferenceGraph::build(&elements);
        assert_eq!(graph.cycles, vec![vec!["a".to_string(), "a".to_string()]]);
    }

    #[test]
    fn test_undefined_and_duplicate() {
        let elements = vec![el("header", None), el("header", None), el("t", Some("heder"))];
        let graph = ReferenceGraph::build(&elements);
        assert_eq!(graph.issues.len(), 2);
        assert_eq!(graph.issues[0], LayoutError::duplicate("header"));
        assert_eq!(
            graph.issues[1],
            LayoutError::undefined("t", "heder", vec!["header".to_string()])
        );
    }
}
