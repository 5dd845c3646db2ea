//! Kern datastructuren voor het modelleren van ontwerpvariabelen-grafen.

use std::collections::HashMap;
use std::fmt;

pub mod evaluator;
pub mod node;
pub mod topo;
pub mod value;
pub mod wire;

use node::{Node, NodeId};
use wire::Wire;

/// Graph container met indices voor snelle lookups.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    wires: Vec<Wire>,
    node_index: HashMap<NodeId, usize>,
    name_index: HashMap<String, Vec<NodeId>>,
    next_id: usize,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Voeg een node toe aan de graph. Als `node.id` niet gezet is, wordt een nieuw
    /// id uitgegeven.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        let id = if node.id == NodeId::default() {
            let assigned = NodeId::new(self.next_id);
            self.next_id += 1;
            node.id = assigned;
            assigned
        } else {
            self.next_id = self.next_id.max(node.id.0 + 1);
            node.id
        };

        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }

        let idx = self.nodes.len();
        self.node_index.insert(id, idx);

        if let Some(name) = node.name.as_deref() {
            self.index_name(id, name);
        }
        if let Some(nickname) = node.nickname.as_deref() {
            self.index_name(id, nickname);
        }

        self.nodes.push(node);
        Ok(id)
    }

    /// Voeg een verbinding toe tussen twee bestaande nodes. Beide pinnen moeten
    /// gedeclareerd zijn en een inputpin kan maar door één wire gevoed worden.
    pub fn add_wire(&mut self, wire: Wire) -> Result<(), GraphError> {
        let from = self
            .node(wire.from_node)
            .ok_or(GraphError::UnknownNode(wire.from_node))?;
        if !from.has_output_pin(&wire.from_pin.0) {
            return Err(GraphError::UnknownPin {
                node: wire.from_node,
                pin: wire.from_pin.0.clone(),
            });
        }

        let to = self
            .node(wire.to_node)
            .ok_or(GraphError::UnknownNode(wire.to_node))?;
        if !to.has_input_pin(&wire.to_pin.0) {
            return Err(GraphError::UnknownPin {
                node: wire.to_node,
                pin: wire.to_pin.0.clone(),
            });
        }

        if self.incoming(wire.to_node, &wire.to_pin.0).is_some() {
            return Err(GraphError::PinAlreadyConnected {
                node: wire.to_node,
                pin: wire.to_pin.0.clone(),
            });
        }

        self.wires.push(wire);
        Ok(())
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index
            .get(&id)
            .and_then(|idx| self.nodes.get(*idx))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.node_index
            .get(&id)
            .copied()
            .and_then(move |idx| self.nodes.get_mut(idx))
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// De wire die een inputpin voedt, indien aanwezig.
    #[must_use]
    pub fn incoming(&self, node: NodeId, pin: &str) -> Option<&Wire> {
        self.wires
            .iter()
            .find(|wire| wire.to_node == node && wire.to_pin.0 == pin)
    }

    /// Alle wires die vanuit een node vertrekken.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Wire> {
        self.wires.iter().filter(move |wire| wire.from_node == node)
    }

    #[must_use]
    pub fn nodes_with_name(&self, name: &str) -> Option<&[NodeId]> {
        self.name_index
            .get(&normalize_name(name))
            .map(|ids| ids.as_slice())
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    fn index_name(&mut self, id: NodeId, name: &str) {
        let key = normalize_name(name);
        let ids = self.name_index.entry(key).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

/// Fouten die kunnen optreden bij het opbouwen van de graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateNode(NodeId),
    UnknownNode(NodeId),
    UnknownPin { node: NodeId, pin: String },
    PinAlreadyConnected { node: NodeId, pin: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode(id) => write!(f, "node {:?} bestaat al in de graph", id.0),
            Self::UnknownNode(id) => write!(f, "node {:?} niet gevonden in graph", id.0),
            Self::UnknownPin { node, pin } => {
                write!(f, "node {} heeft geen pin `{pin}`", node.0)
            }
            Self::PinAlreadyConnected { node, pin } => {
                write!(f, "pin `{pin}` van node {} is al verbonden", node.0)
            }
        }
    }
}

impl std::error::Error for GraphError {}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
