//! Component registry en evaluatie-logica.

use std::collections::HashMap;
use std::fmt;

use crate::graph::node::MetaMap;
use crate::graph::value::Value;

pub mod coerce;
pub mod geometry_inputs;
pub mod independent;
pub mod spline;

/// Output-map van een component: pinnaam → waarde.
pub type OutputMap = std::collections::BTreeMap<String, Value>;

/// Fouttype voor component-evaluaties.
#[derive(Debug, Clone)]
pub enum ComponentError {
    /// Een generieke fout met een bericht.
    Message(String),
}

impl ComponentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Message(s) => s,
        }
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ComponentError {}

/// Resultaat van een component-executie.
pub type ComponentResult = Result<OutputMap, ComponentError>;

/// Trait die alle componentimplementaties dienen te implementeren.
pub trait Component {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult;
}

/// Beschikbare componenttypen binnen de registry.
#[derive(Debug, Clone, Copy)]
pub enum ComponentKind {
    IndependentVariables(independent::ComponentImpl),
    BSpline(spline::ComponentImpl),
    GeometryInputs(geometry_inputs::ComponentKind),
}

impl ComponentKind {
    pub fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        match self {
            Self::IndependentVariables(component) => component.evaluate(inputs, meta),
            Self::BSpline(component) => component.evaluate(inputs, meta),
            Self::GeometryInputs(component) => component.evaluate(inputs, meta),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::IndependentVariables(_) => independent::NAME,
            Self::BSpline(_) => spline::NAME,
            Self::GeometryInputs(component) => component.name(),
        }
    }
}

/// Registry die componentimplementaties opzoekt op naam.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    by_name: HashMap<String, ComponentKind>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        let independent = ComponentKind::IndependentVariables(independent::ComponentImpl);
        registry.register_names(&[independent::NAME, "IndepVarComp"], independent);

        let spline = ComponentKind::BSpline(spline::ComponentImpl);
        registry.register_names(&[spline::NAME, "SplineComp"], spline);

        for registration in geometry_inputs::REGISTRATIONS {
            let kind = ComponentKind::GeometryInputs(registration.kind);
            registry.register_names(registration.names, kind);
        }

        registry
    }
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    pub fn register_names(&mut self, names: &[&str], kind: ComponentKind) {
        for name in names {
            let key = normalize_name(name);
            self.by_name.insert(key, kind);
        }
    }

    /// Zoekt eerst op componentnaam, daarna op instantienaam.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>, nickname: Option<&str>) -> Option<ComponentKind> {
        [name, nickname]
            .into_iter()
            .flatten()
            .find_map(|candidate| self.by_name.get(&normalize_name(candidate)).copied())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{ComponentKind, ComponentRegistry, geometry_inputs};

    #[test]
    fn lookup_by_name_and_alias() {
        let registry = ComponentRegistry::default();

        let spline = registry.resolve(Some("b-spline interpolation"), None).unwrap();
        assert!(matches!(spline, ComponentKind::BSpline(_)));

        let source = registry.resolve(None, Some("IndepVarComp")).unwrap();
        assert!(matches!(source, ComponentKind::IndependentVariables(_)));
        assert_eq!(source.name(), "Independent Variables");

        let ffd = registry.resolve(Some("FFD Geometry Mesh"), Some("mesh")).unwrap();
        assert!(matches!(
            ffd,
            ComponentKind::GeometryInputs(geometry_inputs::ComponentKind::FreeForm)
        ));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let registry = ComponentRegistry::default();
        assert!(registry.resolve(Some("Extrude"), Some("extr")).is_none());
        assert!(registry.resolve(None, None).is_none());
    }
}
