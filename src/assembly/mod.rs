//! Opbouw van de ontwerpvariabelen-graph voor één oppervlak.
//!
//! De assembler kijkt welke variabelen een oppervlak opgeeft en maakt
//! precies de nodes aan die nodig zijn om ze naar de geometriegenerator te
//! brengen: hooguit één bronnode (`indep_vars`), één interpolatienode per
//! verdeelde variabele (`<uitvoer>_bsp`) en altijd één geometrie-invoernode
//! (`mesh`). Verbindingen lopen op pinnaam.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::components::{ComponentRegistry, geometry_inputs, independent, spline};
use crate::geom::{DEFAULT_ORDER, effective_order};
use crate::graph::Graph;
use crate::graph::GraphError;
use crate::graph::evaluator::{self, EvaluationError};
use crate::graph::node::{Node, NodeId};
use crate::graph::value::{Matrix, Value, ValueKind};
use crate::graph::wire::Wire;
use crate::surface::{
    SurfaceSpec, VariableDefinition, VariableDescriptor, VariableId, check_lattice,
};

mod ports;

pub use ports::{ExposedPort, FreeVariable, PortShape, PortValues};

/// Fouten bij het opbouwen van een ontwerpvariabelen-graph. Elke fout breekt
/// het hele oppervlak af; er worden geen halve grafen teruggegeven.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("`{variable}` heeft geen controlepunten")]
    InvalidControlPoints { variable: &'static str },
    #[error("`{key}` is geen getal of reeks getallen (kreeg {found})")]
    AmbiguousVariableDefinition { key: String, found: String },
    #[error("vrije variabele `{variable}` heeft geen bronpoort")]
    MissingFreeVariableSource { variable: String },
    #[error("free-form-deformatie vereist roosterafmetingen (mx, my)")]
    MissingLatticeSize,
    #[error("ongeldig FFD-rooster {rows}x{columns}")]
    InvalidLatticeSize { rows: usize, columns: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl AssemblyError {
    pub(crate) fn ambiguous(key: &str, found: &Value) -> Self {
        Self::AmbiguousVariableDefinition {
            key: key.to_owned(),
            found: found.kind().to_string(),
        }
    }

    pub(crate) fn repeated(key: &str) -> Self {
        Self::AmbiguousVariableDefinition {
            key: key.to_owned(),
            found: "meerdere definities".to_owned(),
        }
    }
}

/// Fouten bij het aansturen of evalueren van een opgebouwde graph.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("onbekende vrije variabele `{name}`")]
    UnknownVariable { name: String },
    #[error("`{name}` is al verbonden met de bronnode")]
    AlreadyConnected { name: String },
    #[error("`{name}` verwacht {expected}, kreeg {found}")]
    ShapeMismatch {
        name: String,
        expected: PortShape,
        found: PortShape,
    },
    #[error("`{name}` kan geen {found} dragen")]
    InvalidValue { name: String, found: ValueKind },
    #[error("evaluatie mislukt: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Externe vormdeformatie (FFD) waaraan de geometrie wordt overgelaten.
pub trait ShapeHandle: fmt::Debug + Send + Sync {
    fn label(&self) -> &str;
}

/// Eenvoudige handle die alleen een naam draagt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedShape(pub String);

impl ShapeHandle for NamedShape {
    fn label(&self) -> &str {
        &self.0
    }
}

/// Welke geometriegenerator de poorten afneemt.
#[derive(Debug, Clone, Default)]
pub enum GeometryMode {
    #[default]
    StandardParametric,
    FreeFormDeformation(Arc<dyn ShapeHandle>),
}

impl GeometryMode {
    #[must_use]
    pub fn free_form(handle: impl ShapeHandle + 'static) -> Self {
        Self::FreeFormDeformation(Arc::new(handle))
    }

    #[must_use]
    pub fn is_free_form(&self) -> bool {
        matches!(self, Self::FreeFormDeformation(_))
    }

    /// Variabelen die in deze modus gemodelleerd worden.
    fn models(&self, id: VariableId) -> bool {
        match self {
            Self::StandardParametric => true,
            Self::FreeFormDeformation(_) => id == VariableId::ThicknessRatio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Verbind vrije variabelen met de bronnode. Zonder verbinding worden de
    /// pinnen wel gedeclareerd maar door een externe driver gevoed.
    pub connect_free_variables: bool,
    pub mode: GeometryMode,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            connect_free_variables: true,
            mode: GeometryMode::StandardParametric,
        }
    }
}

/// Resultaat van de assembler: de graph plus de blootgestelde poorten.
#[derive(Debug, Clone)]
pub struct DesignVariableGraph {
    surface: String,
    graph: Graph,
    source: Option<NodeId>,
    interpolations: Vec<(VariableId, NodeId)>,
    sink: NodeId,
    ports: Vec<ExposedPort>,
    free_variables: Vec<FreeVariable>,
    connected: bool,
    shape_label: Option<String>,
}

/// Assembleert in standaardmodus.
pub fn assemble(
    spec: &SurfaceSpec,
    connect_free_variables: bool,
) -> Result<DesignVariableGraph, AssemblyError> {
    assemble_with(
        spec,
        &AssemblyOptions {
            connect_free_variables,
            mode: GeometryMode::StandardParametric,
        },
    )
}

/// Assembleert meerdere onafhankelijke oppervlakken.
#[cfg(feature = "parallel")]
pub fn assemble_all(
    specs: &[SurfaceSpec],
    options: &AssemblyOptions,
) -> Vec<Result<DesignVariableGraph, AssemblyError>> {
    specs
        .par_iter()
        .map(|spec| assemble_with(spec, options))
        .collect()
}

/// Assembleert meerdere onafhankelijke oppervlakken.
#[cfg(not(feature = "parallel"))]
pub fn assemble_all(
    specs: &[SurfaceSpec],
    options: &AssemblyOptions,
) -> Vec<Result<DesignVariableGraph, AssemblyError>> {
    specs
        .iter()
        .map(|spec| assemble_with(spec, options))
        .collect()
}

/// Eén poort zoals de planningsstap die vastlegt, voordat er nodes zijn.
#[derive(Debug)]
struct PlannedPort {
    port: ExposedPort,
    /// Waarde die de bron of de consumerende pin draagt.
    value: Value,
    /// Controlepunten voor een interpolatienode.
    control_points: Option<(&'static str, usize)>,
}

pub fn assemble_with(
    spec: &SurfaceSpec,
    options: &AssemblyOptions,
) -> Result<DesignVariableGraph, AssemblyError> {
    let lattice = match &options.mode {
        GeometryMode::StandardParametric => None,
        GeometryMode::FreeFormDeformation(_) => {
            let (rows, columns) = spec.ffd_lattice.ok_or(AssemblyError::MissingLatticeSize)?;
            Some(check_lattice(rows, columns)?)
        }
    };

    let mut planned = Vec::new();
    if let Some((rows, columns)) = lattice {
        planned.push(shape_port(rows, columns));
    }
    for (descriptor, definition) in spec.present() {
        if !options.mode.models(descriptor.id) {
            log::debug!(
                "oppervlak `{}`: `{}` wordt niet gemodelleerd in FFD-modus",
                spec.name,
                descriptor.key
            );
            continue;
        }
        planned.push(plan_variable(spec, descriptor, definition)?);
    }

    let needs_source = lattice.is_some() || planned.iter().any(|entry| entry.port.free);

    let mut graph = Graph::new();
    let source = if needs_source {
        let mut node = Node::component(independent::NAME, independent::NICKNAME);
        node.insert_meta("role", "source");
        for entry in planned.iter().filter(|entry| entry.port.free) {
            node.set_output(entry.source_pin(), entry.value.clone());
            if let Some(units) = entry.port.units {
                node.insert_meta(format!("units.{}", entry.source_pin()), units);
            }
        }
        Some(graph.add_node(node)?)
    } else {
        None
    };

    let mut interpolations = Vec::new();
    let mut spline_nodes = Vec::with_capacity(planned.len());
    for entry in &planned {
        let Some((control_name, control_count)) = entry.control_points else {
            spline_nodes.push(None);
            continue;
        };
        let num_points = entry.port.shape.len();
        let order = effective_order(DEFAULT_ORDER, control_count);

        let mut node = Node::component(spline::NAME, &format!("{}_bsp", entry.port.name));
        node.insert_meta("role", "interpolation");
        node.insert_meta(spline::META_NUM_POINTS, num_points);
        node.insert_meta(spline::META_NUM_CP, control_count);
        node.insert_meta(spline::META_ORDER, order);
        node.insert_meta(spline::META_REQUESTED_ORDER, DEFAULT_ORDER);
        node.insert_meta(spline::META_OUTPUT, entry.port.name.as_str());
        if let Some(units) = entry.port.units {
            node.insert_meta(spline::META_UNITS, units);
        }
        if entry.port.free {
            node.add_input_pin(control_name);
        } else {
            node.set_input(control_name, entry.value.clone());
        }
        node.add_output_pin(entry.port.name.as_str());

        let id = graph.add_node(node)?;
        if let Some(variable) = entry.port.variable {
            interpolations.push((variable, id));
        }
        log::debug!(
            "oppervlak `{}`: {} controlepunten -> {num_points} waarden voor `{}` (orde {order})",
            spec.name,
            control_count,
            entry.port.name
        );
        spline_nodes.push(Some(id));
    }

    let sink_kind = if lattice.is_some() {
        geometry_inputs::ComponentKind::FreeForm
    } else {
        geometry_inputs::ComponentKind::Parametric
    };
    let mut sink_node = Node::component(sink_kind.name(), geometry_inputs::NICKNAME);
    sink_node.insert_meta("role", "geometry");
    sink_node.insert_meta(
        geometry_inputs::META_PORTS,
        planned
            .iter()
            .map(|entry| entry.port.name.clone())
            .collect::<Vec<_>>(),
    );
    if let Some((rows, columns)) = lattice {
        sink_node.insert_meta(geometry_inputs::META_LATTICE_ROWS, rows);
        sink_node.insert_meta(geometry_inputs::META_LATTICE_COLUMNS, columns);
    }
    for (entry, spline_node) in planned.iter().zip(&spline_nodes) {
        if spline_node.is_none() && !entry.port.free {
            sink_node.set_input(entry.port.name.as_str(), entry.value.clone());
        } else {
            sink_node.add_input_pin(entry.port.name.as_str());
        }
    }
    let sink = graph.add_node(sink_node)?;

    let mut free_variables = Vec::new();
    for (entry, spline_node) in planned.iter().zip(&spline_nodes) {
        if let Some(spline_node) = *spline_node {
            graph.add_wire(Wire::promoted(spline_node, sink, &entry.port.name))?;
        }
        if !entry.port.free {
            continue;
        }

        let consumer = spline_node.unwrap_or(sink);
        free_variables.push(FreeVariable {
            name: entry.source_pin().to_owned(),
            port: entry.port.name.clone(),
            shape: entry.source_shape(),
            consumer,
        });
        if options.connect_free_variables {
            if let Some(source) = source {
                graph.add_wire(Wire::promoted(source, consumer, entry.source_pin()))?;
            }
        }
    }

    let dv_graph = DesignVariableGraph {
        surface: spec.name.clone(),
        graph,
        source,
        interpolations,
        sink,
        ports: planned.into_iter().map(|entry| entry.port).collect(),
        free_variables,
        connected: options.connect_free_variables,
        shape_label: match &options.mode {
            GeometryMode::StandardParametric => None,
            GeometryMode::FreeFormDeformation(handle) => Some(handle.label().to_owned()),
        },
    };
    dv_graph.check_free_sources()?;

    log::debug!(
        "oppervlak `{}` geassembleerd: {} nodes, {} wires, {} poorten",
        dv_graph.surface,
        dv_graph.graph.node_count(),
        dv_graph.graph.wire_count(),
        dv_graph.ports.len()
    );
    Ok(dv_graph)
}

impl PlannedPort {
    /// Naam van de bronpoort die deze variabele voedt.
    fn source_pin(&self) -> &str {
        self.control_points
            .map_or(self.port.name.as_str(), |(name, _)| name)
    }

    fn source_shape(&self) -> PortShape {
        match self.control_points {
            Some((_, count)) => PortShape::Distributed { length: count },
            None => self.port.shape,
        }
    }
}

fn plan_variable(
    spec: &SurfaceSpec,
    descriptor: &'static VariableDescriptor,
    definition: &VariableDefinition,
) -> Result<PlannedPort, AssemblyError> {
    let free = spec.is_free(descriptor);
    let units = descriptor.units.symbol();

    let (shape, control_points) = match (descriptor.control_point_name, definition) {
        (Some(control_name), VariableDefinition::ControlPoints(values)) => {
            if values.is_empty() {
                return Err(AssemblyError::InvalidControlPoints {
                    variable: descriptor.key,
                });
            }
            let length = descriptor.length.resolve(&spec.mesh);
            (
                PortShape::Distributed { length },
                Some((control_name, values.len())),
            )
        }
        (_, VariableDefinition::Uniform(_)) => (PortShape::Scalar, None),
        (None, VariableDefinition::ControlPoints(_)) => {
            return Err(AssemblyError::ambiguous(descriptor.key, &definition.to_value()));
        }
    };

    Ok(PlannedPort {
        port: ExposedPort {
            name: descriptor.output_name.to_owned(),
            variable: Some(descriptor.id),
            shape,
            units,
            free,
            interpolated: control_points.is_some(),
        },
        value: definition.to_value(),
        control_points,
    })
}

fn shape_port(rows: usize, columns: usize) -> PlannedPort {
    PlannedPort {
        port: ExposedPort {
            name: geometry_inputs::SHAPE_PORT.to_owned(),
            variable: None,
            shape: PortShape::Grid { rows, columns },
            units: Some("m"),
            free: true,
            interpolated: false,
        },
        value: Value::Matrix(Matrix::zeros(rows, columns)),
        control_points: None,
    }
}

impl DesignVariableGraph {
    #[must_use]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    #[must_use]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// Interpolatienodes per variabele, in vaste volgorde.
    #[must_use]
    pub fn interpolations(&self) -> &[(VariableId, NodeId)] {
        &self.interpolations
    }

    #[must_use]
    pub fn interpolation(&self, variable: VariableId) -> Option<NodeId> {
        self.interpolations
            .iter()
            .find_map(|(id, node)| (*id == variable).then_some(*node))
    }

    #[must_use]
    pub fn ports(&self) -> &[ExposedPort] {
        &self.ports
    }

    #[must_use]
    pub fn port(&self, name: &str) -> Option<&ExposedPort> {
        self.ports.iter().find(|port| port.name == name)
    }

    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.ports.iter().map(|port| port.name.as_str())
    }

    #[must_use]
    pub fn free_variables(&self) -> &[FreeVariable] {
        &self.free_variables
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Label van de externe vormdeformatie, alleen in FFD-modus.
    #[must_use]
    pub fn shape_label(&self) -> Option<&str> {
        self.shape_label.as_deref()
    }

    /// Huidige waarde van een vrije variabele op de bronnode.
    #[must_use]
    pub fn free_variable_value(&self, name: &str) -> Option<&Value> {
        self.graph.node(self.source?)?.output(name)
    }

    /// Evalueert de graph en geeft de waarde van elke blootgestelde poort.
    pub fn evaluate(&self, registry: &ComponentRegistry) -> Result<PortValues, PortError> {
        let result = evaluator::evaluate(&self.graph, registry)?;
        Ok(self
            .ports
            .iter()
            .filter_map(|port| {
                result
                    .output(self.sink, &port.name)
                    .map(|value| (port.name.clone(), value.clone()))
            })
            .collect())
    }

    /// Past de waarde van een vrije variabele op de bronnode aan. De vorm
    /// moet overeenkomen met wat bij het assembleren is vastgelegd.
    pub fn set_free_variable(&mut self, name: &str, value: Value) -> Result<(), PortError> {
        let variable = self.lookup_free(name)?;
        check_shape(variable, &value)?;
        let source = self.source.ok_or_else(|| PortError::UnknownVariable {
            name: name.to_owned(),
        })?;
        if let Some(node) = self.graph.node_mut(source) {
            node.set_output(name, value);
        }
        Ok(())
    }

    /// Voedt een niet-verbonden pin van een vrije variabele rechtstreeks,
    /// zoals een externe driver dat doet.
    pub fn drive(&mut self, name: &str, value: Value) -> Result<(), PortError> {
        let variable = self.lookup_free(name)?;
        check_shape(variable, &value)?;
        let consumer = variable.consumer;
        if self.graph.incoming(consumer, name).is_some() {
            return Err(PortError::AlreadyConnected {
                name: name.to_owned(),
            });
        }
        if let Some(node) = self.graph.node_mut(consumer) {
            node.set_input(name, value);
        }
        Ok(())
    }

    fn lookup_free(&self, name: &str) -> Result<&FreeVariable, PortError> {
        self.free_variables
            .iter()
            .find(|variable| variable.name == name)
            .ok_or_else(|| PortError::UnknownVariable {
                name: name.to_owned(),
            })
    }

    fn check_free_sources(&self) -> Result<(), AssemblyError> {
        for variable in &self.free_variables {
            let has_output = self
                .source
                .and_then(|source| self.graph.node(source))
                .is_some_and(|node| node.has_output_pin(&variable.name));
            let wired = !self.connected
                || self
                    .graph
                    .incoming(variable.consumer, &variable.name)
                    .is_some_and(|wire| Some(wire.from_node) == self.source);
            if !has_output || !wired {
                return Err(AssemblyError::MissingFreeVariableSource {
                    variable: variable.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn check_shape(variable: &FreeVariable, value: &Value) -> Result<(), PortError> {
    match PortShape::of(value) {
        Some(found) if found == variable.shape => Ok(()),
        Some(found) => Err(PortError::ShapeMismatch {
            name: variable.name.clone(),
            expected: variable.shape,
            found,
        }),
        None => Err(PortError::InvalidValue {
            name: variable.name.clone(),
            found: value.kind(),
        }),
    }
}

#[cfg(test)]
mod tests;
