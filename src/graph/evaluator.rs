//! Evaluatie van grafen in topologische volgorde.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::components::{ComponentError, ComponentRegistry, OutputMap};
use crate::graph::Graph;
use crate::graph::node::NodeId;
use crate::graph::topo::{Topology, TopologyError};
use crate::graph::value::Value;

/// Resultaat van een evaluatie-run.
#[derive(Debug, Default, Clone)]
pub struct EvaluationResult {
    /// Uitgangen per node.
    pub node_outputs: HashMap<NodeId, BTreeMap<String, Value>>,
}

impl EvaluationResult {
    /// Haal één output van een node op.
    #[must_use]
    pub fn output(&self, node: NodeId, pin: &str) -> Option<&Value> {
        self.node_outputs.get(&node).and_then(|outputs| outputs.get(pin))
    }
}

/// Voorbereide metadata die hergebruik van topologie en verbindingen mogelijk maakt.
#[derive(Debug, Clone, Default)]
pub struct EvaluationPlan {
    order: Vec<NodeId>,
    incoming: HashMap<NodeId, HashMap<String, (NodeId, String)>>,
}

impl EvaluationPlan {
    /// Bouwt een evaluatieplan op basis van een graph.
    pub fn new(graph: &Graph) -> Result<Self, EvaluationError> {
        let topology = Topology::sort(graph)?;

        let mut incoming: HashMap<NodeId, HashMap<String, (NodeId, String)>> = HashMap::new();
        for wire in graph.wires() {
            incoming
                .entry(wire.to_node)
                .or_default()
                .insert(wire.to_pin.0.clone(), (wire.from_node, wire.from_pin.0.clone()));
        }

        Ok(Self {
            order: topology.order,
            incoming,
        })
    }

    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    fn incoming_connection(&self, node: NodeId, pin: &str) -> Option<&(NodeId, String)> {
        self.incoming
            .get(&node)
            .and_then(|node_map| node_map.get(pin))
    }
}

/// Fouttype voor evaluatieproblemen.
#[derive(Debug)]
pub enum EvaluationError {
    /// Topologiesortering is mislukt.
    Topology(TopologyError),
    /// De node heeft geen bijbehorend component.
    ComponentNotFound {
        node_id: NodeId,
        name: Option<String>,
        nickname: Option<String>,
    },
    /// Een inputpin is niet verbonden en heeft geen standaardwaarde.
    MissingInput { node_id: NodeId, pin: String },
    /// Een output van een afhankelijke node ontbreekt.
    MissingDependencyOutput {
        node_id: NodeId,
        dependency: NodeId,
        pin: String,
    },
    /// Het component gaf een foutmelding tijdens evaluatie.
    ComponentFailed {
        node_id: NodeId,
        component: String,
        source: ComponentError,
    },
    /// De node kon niet teruggevonden worden in de graph (inconsistentie).
    UnknownNode(NodeId),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(err) => write!(f, "topologiesortering mislukt: {err}"),
            Self::ComponentNotFound {
                node_id,
                name,
                nickname,
            } => write!(
                f,
                "geen component gevonden voor node {} (name={:?}, nickname={:?})",
                node_id.0, name, nickname
            ),
            Self::MissingInput { node_id, pin } => {
                write!(f, "node {} mist verplichte input `{pin}`", node_id.0)
            }
            Self::MissingDependencyOutput {
                node_id,
                dependency,
                pin,
            } => write!(
                f,
                "node {} mist output `{pin}` van afhankelijke node {}",
                node_id.0, dependency.0
            ),
            Self::ComponentFailed {
                node_id,
                component,
                source,
            } => write!(
                f,
                "component `{component}` (node {}) faalde: {}",
                node_id.0, source
            ),
            Self::UnknownNode(node_id) => {
                write!(f, "node {} bestaat niet in de graph", node_id.0)
            }
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ComponentFailed { source, .. } => Some(source),
            Self::Topology(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopologyError> for EvaluationError {
    fn from(error: TopologyError) -> Self {
        Self::Topology(error)
    }
}

/// Evalueert een graph met behulp van de opgegeven componentregistry.
pub fn evaluate(
    graph: &Graph,
    registry: &ComponentRegistry,
) -> Result<EvaluationResult, EvaluationError> {
    let plan = EvaluationPlan::new(graph)?;
    evaluate_with_plan(graph, registry, &plan)
}

/// Evalueert een graph met behulp van een vooraf opgebouwd evaluatieplan.
pub fn evaluate_with_plan(
    graph: &Graph,
    registry: &ComponentRegistry,
    plan: &EvaluationPlan,
) -> Result<EvaluationResult, EvaluationError> {
    let mut result = EvaluationResult::default();

    for &node_id in plan.order() {
        let node = graph
            .node(node_id)
            .ok_or(EvaluationError::UnknownNode(node_id))?;

        let component = registry
            .resolve(node.name.as_deref(), node.nickname.as_deref())
            .ok_or_else(|| EvaluationError::ComponentNotFound {
                node_id,
                name: node.name.clone(),
                nickname: node.nickname.clone(),
            })?;

        let mut input_values = Vec::with_capacity(node.input_order().len());
        for pin in node.input_order() {
            let value = if let Some((from_node, from_pin)) = plan.incoming_connection(node_id, pin)
            {
                result
                    .output(*from_node, from_pin)
                    .cloned()
                    .ok_or_else(|| EvaluationError::MissingDependencyOutput {
                        node_id,
                        dependency: *from_node,
                        pin: from_pin.clone(),
                    })?
            } else if let Some(default) = node.inputs.get(pin) {
                default.clone()
            } else {
                return Err(EvaluationError::MissingInput {
                    node_id,
                    pin: pin.clone(),
                });
            };

            input_values.push(value);
        }

        let outputs = component
            .evaluate(&input_values, &node.meta)
            .map_err(|error| EvaluationError::ComponentFailed {
                node_id,
                component: component.name().to_owned(),
                source: error,
            })?;

        log::debug!(
            "node {} ({}) geëvalueerd: {} outputs",
            node_id.0,
            node.label(),
            outputs.len()
        );
        result
            .node_outputs
            .insert(node_id, merge_outputs(node.outputs.clone(), outputs));
    }

    Ok(result)
}

fn merge_outputs(
    mut existing: BTreeMap<String, Value>,
    new_outputs: OutputMap,
) -> BTreeMap<String, Value> {
    for (pin, value) in new_outputs {
        existing.insert(pin, value);
    }
    existing
}
