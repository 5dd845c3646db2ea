//! Topologische utilities.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{Graph, node::NodeId};

/// Resultaat van een topologische sortering.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Topology {
    pub order: Vec<NodeId>,
}

/// Fouttype voor topologische sortering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// De graph bevat een cyclus. Bevat de nodes die niet gesorteerd konden
    /// worden.
    Cycle { nodes: Vec<NodeId> },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { nodes } => {
                let members = nodes
                    .iter()
                    .map(|NodeId(id)| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "graph bevat een cyclus tussen nodes [{members}]")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

impl Topology {
    /// Kahn-sortering; bij gelijke rang komt het laagste node-id eerst.
    pub fn sort(graph: &Graph) -> Result<Self, TopologyError> {
        let mut indegree: BTreeMap<NodeId, usize> =
            graph.nodes().iter().map(|node| (node.id, 0)).collect();
        for wire in graph.wires() {
            *indegree.entry(wire.to_node).or_insert(0) += 1;
        }

        let mut ready: BTreeSet<NodeId> = indegree
            .iter()
            .filter_map(|(node, &count)| (count == 0).then_some(*node))
            .collect();
        let mut order = Vec::with_capacity(graph.node_count());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for wire in graph.outgoing(node) {
                if let Some(count) = indegree.get_mut(&wire.to_node) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(wire.to_node);
                    }
                }
            }
        }

        if order.len() == indegree.len() {
            return Ok(Self { order });
        }

        let nodes = indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect();
        Err(TopologyError::Cycle { nodes })
    }

    /// Positie van een node in de volgorde.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.order.iter().position(|&id| id == node)
    }
}

#[cfg(test)]
mod tests {
    use super::{Topology, TopologyError};
    use crate::graph::Graph;
    use crate::graph::node::{Node, NodeId};
    use crate::graph::value::Value;
    use crate::graph::wire::Wire;

    fn relay(graph: &mut Graph, nickname: &str) -> NodeId {
        let mut node = Node::component("Relay", nickname);
        node.add_input_pin("in");
        node.set_output("out", Value::Number(0.0));
        graph.add_node(node).unwrap()
    }

    #[test]
    fn empty_graph_sorts_to_empty_order() {
        let topology = Topology::sort(&Graph::new()).expect("topologie");
        assert!(topology.order.is_empty());
    }

    #[test]
    fn sorts_chain_sources_first() {
        let mut graph = Graph::new();
        let sink = relay(&mut graph, "mesh");
        let spline = relay(&mut graph, "twist_bsp");
        let source = relay(&mut graph, "indep_vars");

        graph.add_wire(Wire::new(source, "out", spline, "in")).unwrap();
        graph.add_wire(Wire::new(spline, "out", sink, "in")).unwrap();

        let topology = Topology::sort(&graph).expect("topologie");
        assert_eq!(topology.order, vec![source, spline, sink]);
        assert_eq!(topology.position(sink), Some(2));
    }

    #[test]
    fn detects_cycle() {
        let mut graph = Graph::new();
        let node_a = relay(&mut graph, "a");
        let node_b = relay(&mut graph, "b");
        let free = relay(&mut graph, "c");

        graph.add_wire(Wire::new(node_a, "out", node_b, "in")).unwrap();
        graph.add_wire(Wire::new(node_b, "out", node_a, "in")).unwrap();

        let err = Topology::sort(&graph).expect_err("cyclus gedetecteerd");
        let TopologyError::Cycle { nodes } = err;
        assert_eq!(nodes, vec![node_a, node_b]);
        assert!(!nodes.contains(&free));
    }
}
