#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembly;
pub mod components;
pub mod geom;
pub mod graph;
pub mod parse;
pub mod surface;

use std::collections::BTreeMap;
use std::fmt;

use assembly::{
    AssemblyError, AssemblyOptions, DesignVariableGraph, ExposedPort, GeometryMode, NamedShape,
    PortError, PortShape, PortValues,
};
use components::ComponentRegistry;
use geom::ReferenceMesh;
use graph::topo::Topology;
use graph::value::{Matrix, Value};
use parse::surface_xml::{self, ParseError};
use serde::Serialize;
use surface::SurfaceSpec;
use thiserror::Error;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;
use wildmatch::WildMatch;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten van de engine, los van de JS-grens.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Port(#[from] PortError),
    #[error("er is geen oppervlak geladen")]
    NotLoaded,
    #[error("onbekende ontwerpvariabele `{0}`")]
    UnknownVariable(String),
    #[error("onbekend oppervlak `{0}`")]
    UnknownSurface(String),
    #[error("ontwerpwaarden moeten eindige getallen zijn")]
    NonFinite,
}

/// Een geladen oppervlak: de definitie en de opgebouwde graph.
#[derive(Debug, Clone)]
pub struct LoadedSurface {
    pub spec: SurfaceSpec,
    pub graph: DesignVariableGraph,
}

#[derive(Debug, Serialize)]
pub struct DesignVariableExport<'a> {
    pub surface: &'a str,
    pub name: &'a str,
    pub port: &'a str,
    pub shape: PortShape,
    pub value: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct PortExport<'a> {
    pub surface: &'a str,
    #[serde(flatten)]
    pub port: &'a ExposedPort,
    pub value: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct TopologyEntry {
    surface: String,
    nodes: Vec<String>,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    registry: ComponentRegistry,
    surfaces: Vec<LoadedSurface>,
    last_values: BTreeMap<String, PortValues>,
    result_dirty: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            registry: ComponentRegistry::default(),
            surfaces: Vec::new(),
            last_values: BTreeMap::new(),
            result_dirty: false,
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Laad een XML-oppervlakdefinitie en assembleer de graph(s).
    #[wasm_bindgen]
    pub fn load_surface(&mut self, xml: &str, connect: bool) -> Result<(), JsValue> {
        let options = AssemblyOptions {
            connect_free_variables: connect,
            mode: GeometryMode::StandardParametric,
        };
        self.load_surface_with(xml, &options)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Laad een oppervlak voor een externe free-form-deformatie.
    #[wasm_bindgen]
    pub fn load_surface_ffd(
        &mut self,
        xml: &str,
        shape_label: &str,
        connect: bool,
    ) -> Result<(), JsValue> {
        let options = AssemblyOptions {
            connect_free_variables: connect,
            mode: GeometryMode::free_form(NamedShape(shape_label.to_owned())),
        };
        self.load_surface_with(xml, &options)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Haal de vrije ontwerpvariabelen op met hun huidige waarde.
    #[wasm_bindgen]
    pub fn get_design_variables(&self) -> Result<JsValue, JsValue> {
        if self.surfaces.is_empty() {
            return Err(js_error("er is geen oppervlak geladen"));
        }
        serde_wasm_bindgen::to_value(&self.design_variables())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Stel een vrije variabele in, op naam of als `oppervlak.naam`.
    #[wasm_bindgen]
    pub fn set_design_variable(&mut self, name: &str, values: Vec<f64>) -> Result<(), JsValue> {
        self.set_design_variable_values(name, &values)
            .map_err(to_js_error)
    }

    /// Evalueer alle geladen oppervlakken.
    #[wasm_bindgen]
    pub fn evaluate(&mut self) -> Result<(), JsValue> {
        self.evaluate_ports().map(|_| ()).map_err(to_js_error)
    }

    /// Haal de blootgestelde poorten op, met waarden van de laatste evaluatie.
    #[wasm_bindgen]
    pub fn get_ports(&self) -> Result<JsValue, JsValue> {
        if self.surfaces.is_empty() {
            return Err(js_error("er is geen oppervlak geladen"));
        }
        serde_wasm_bindgen::to_value(&self.port_exports())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Zoek poorten met een wildcardmasker, bv. `*shear` of `wing.t*`.
    #[wasm_bindgen]
    pub fn find_ports(&self, mask: &str) -> Vec<String> {
        self.matching_ports(mask)
    }

    /// Referentiemesh van een geladen oppervlak, of de CRM-mesh.
    #[wasm_bindgen]
    pub fn get_reference_mesh(&self, surface: Option<String>) -> Result<JsValue, JsValue> {
        let mesh = self.reference_mesh(surface.as_deref()).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&mesh).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Haalt per oppervlak de nodes in topologische volgorde op.
    #[wasm_bindgen]
    pub fn get_topology_map(&self) -> Result<JsValue, JsValue> {
        let mut entries = Vec::with_capacity(self.surfaces.len());
        for loaded in &self.surfaces {
            let graph = loaded.graph.graph();
            let topology = Topology::sort(graph).map_err(to_js_error)?;
            let nodes = topology
                .order
                .iter()
                .filter_map(|id| graph.node(*id))
                .map(|node| node.label().to_owned())
                .collect();
            entries.push(TopologyEntry {
                surface: loaded.graph.surface().to_owned(),
                nodes,
            });
        }
        serde_wasm_bindgen::to_value(&entries).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Engine {
    /// Laadt een document en vervangt alle eerder geladen oppervlakken.
    /// Geeft het aantal geladen oppervlakken terug.
    pub fn load_surface_with(
        &mut self,
        xml: &str,
        options: &AssemblyOptions,
    ) -> Result<usize, EngineError> {
        let specs = surface_xml::parse_str(xml)?;
        let graphs = assembly::assemble_all(&specs, options)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        self.surfaces = specs
            .into_iter()
            .zip(graphs)
            .map(|(spec, graph)| LoadedSurface { spec, graph })
            .collect();
        self.last_values.clear();
        self.result_dirty = true;

        log::debug!("{} oppervlakken geladen", self.surfaces.len());
        debug_log!(
            "oppervlakken geladen: {}",
            self.surfaces
                .iter()
                .map(|loaded| loaded.spec.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(self.surfaces.len())
    }

    #[must_use]
    pub fn surfaces(&self) -> &[LoadedSurface] {
        &self.surfaces
    }

    #[must_use]
    pub fn design_variables(&self) -> Vec<DesignVariableExport<'_>> {
        self.surfaces
            .iter()
            .flat_map(|loaded| {
                let graph = &loaded.graph;
                graph
                    .free_variables()
                    .iter()
                    .map(move |variable| DesignVariableExport {
                        surface: graph.surface(),
                        name: &variable.name,
                        port: &variable.port,
                        shape: variable.shape,
                        value: graph.free_variable_value(&variable.name),
                    })
            })
            .collect()
    }

    /// Zet een vrije variabele. Een niet-verbonden graph krijgt de waarde
    /// ook rechtstreeks op de consumerende pin.
    pub fn set_design_variable_values(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> Result<(), EngineError> {
        if values.iter().any(|value| !value.is_finite()) {
            return Err(EngineError::NonFinite);
        }
        if self.surfaces.is_empty() {
            return Err(EngineError::NotLoaded);
        }

        let (index, variable) = self
            .locate_variable(name)
            .ok_or_else(|| EngineError::UnknownVariable(name.to_owned()))?;
        let graph = &mut self.surfaces[index].graph;
        let shape = graph
            .free_variables()
            .iter()
            .find(|free| free.name == variable)
            .map(|free| free.shape)
            .ok_or_else(|| EngineError::UnknownVariable(name.to_owned()))?;

        let value = value_for_shape(shape, values)
            .unwrap_or_else(|| Value::numbers(values.iter().copied()));
        graph.set_free_variable(&variable, value.clone())?;
        if !graph.is_connected() {
            graph.drive(&variable, value)?;
        }

        self.result_dirty = true;
        Ok(())
    }

    /// Evalueert alle oppervlakken; het resultaat blijft bewaard tot een
    /// volgende wijziging.
    pub fn evaluate_ports(&mut self) -> Result<&BTreeMap<String, PortValues>, EngineError> {
        if self.surfaces.is_empty() {
            return Err(EngineError::NotLoaded);
        }
        if self.result_dirty {
            let mut values = BTreeMap::new();
            for loaded in &self.surfaces {
                let ports = loaded.graph.evaluate(&self.registry)?;
                values.insert(loaded.graph.surface().to_owned(), ports);
            }
            self.last_values = values;
            self.result_dirty = false;
        }
        Ok(&self.last_values)
    }

    #[must_use]
    pub fn port_exports(&self) -> Vec<PortExport<'_>> {
        self.surfaces
            .iter()
            .flat_map(|loaded| {
                let surface = loaded.graph.surface();
                let values = self.last_values.get(surface);
                loaded.graph.ports().iter().map(move |port| PortExport {
                    surface,
                    port,
                    value: values.and_then(|values| values.get(&port.name)),
                })
            })
            .collect()
    }

    /// Poortnamen (`oppervlak.poort`) die op het masker passen. Het masker
    /// wordt zowel met als zonder oppervlaknaam geprobeerd.
    #[must_use]
    pub fn matching_ports(&self, mask: &str) -> Vec<String> {
        let pattern = WildMatch::new(mask.trim());
        self.surfaces
            .iter()
            .flat_map(|loaded| {
                let surface = loaded.graph.surface();
                loaded
                    .graph
                    .port_names()
                    .map(move |port| (port, format!("{surface}.{port}")))
            })
            .filter(|(port, qualified)| pattern.matches(port) || pattern.matches(qualified))
            .map(|(_, qualified)| qualified)
            .collect()
    }

    pub fn reference_mesh(&self, surface: Option<&str>) -> Result<ReferenceMesh, EngineError> {
        match surface {
            None => Ok(geom::crm_reference_mesh()),
            Some(name) => self
                .surfaces
                .iter()
                .find(|loaded| loaded.spec.name == name)
                .map(|loaded| loaded.spec.mesh.clone())
                .ok_or_else(|| EngineError::UnknownSurface(name.to_owned())),
        }
    }

    fn locate_variable(&self, name: &str) -> Option<(usize, String)> {
        let trimmed = name.trim();
        if let Some((surface, variable)) = trimmed.split_once('.') {
            if let Some(index) = self
                .surfaces
                .iter()
                .position(|loaded| loaded.graph.surface() == surface)
            {
                return Some((index, variable.to_owned()));
            }
        }

        self.surfaces
            .iter()
            .position(|loaded| {
                loaded
                    .graph
                    .free_variables()
                    .iter()
                    .any(|free| free.name == trimmed)
            })
            .map(|index| (index, trimmed.to_owned()))
    }
}

fn value_for_shape(shape: PortShape, values: &[f64]) -> Option<Value> {
    match shape {
        PortShape::Scalar => match values {
            [value] => Some(Value::Number(*value)),
            _ => None,
        },
        PortShape::Distributed { .. } => Some(Value::numbers(values.iter().copied())),
        PortShape::Grid { rows, columns } => {
            Matrix::new(rows, columns, values.to_vec()).map(Value::Matrix)
        }
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
