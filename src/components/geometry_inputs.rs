//! Invoernode van de externe geometriegenerator.
//!
//! De eigenlijke mesh-deformatie valt buiten deze crate. Deze node staat voor
//! de generator in de graph: zijn inputpinnen zijn precies de blootgestelde
//! poorten van het oppervlak, en bij evaluatie geeft hij elke input onder
//! dezelfde naam door zodat de poortwaarden uitleesbaar zijn.

use std::collections::BTreeMap;

use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::coerce::{meta_count, meta_names};
use super::{Component, ComponentError, ComponentResult};

pub const NICKNAME: &str = "mesh";
pub const META_PORTS: &str = "ports";
pub const META_LATTICE_ROWS: &str = "mx";
pub const META_LATTICE_COLUMNS: &str = "my";
pub const SHAPE_PORT: &str = "shape";

/// Beschikbare componenten binnen deze module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Parametrische generator: twist, chord, shear, ... per station.
    Parametric,
    /// Free-form-deformatie: één `shape` rooster van controlepunten.
    FreeForm,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        names: &["Geometry Mesh", "GeometryMesh"],
        kind: ComponentKind::Parametric,
    },
    Registration {
        names: &["FFD Geometry Mesh", "FfdGeometryMesh"],
        kind: ComponentKind::FreeForm,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        let ports = meta_names(meta, META_PORTS)?;
        if ports.len() != inputs.len() {
            return Err(ComponentError::new(format!(
                "{} verwacht {} poorten maar kreeg {} inputs",
                self.name(),
                ports.len(),
                inputs.len()
            )));
        }

        if *self == Self::FreeForm {
            if let Some(index) = ports.iter().position(|port| *port == SHAPE_PORT) {
                check_lattice(&inputs[index], meta)?;
            }
        }

        Ok(ports
            .into_iter()
            .zip(inputs)
            .map(|(port, value)| (port.to_owned(), value.clone()))
            .collect::<BTreeMap<_, _>>())
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Parametric => "Geometry Mesh",
            Self::FreeForm => "FFD Geometry Mesh",
        }
    }
}

fn check_lattice(value: &Value, meta: &MetaMap) -> Result<(), ComponentError> {
    let rows = meta_count(meta, META_LATTICE_ROWS)?;
    let columns = meta_count(meta, META_LATTICE_COLUMNS)?;
    let matrix = value
        .expect_matrix()
        .map_err(|err| ComponentError::new(format!("`{SHAPE_PORT}`: {err}")))?;

    if matrix.rows != rows || matrix.columns != columns {
        return Err(ComponentError::new(format!(
            "`{SHAPE_PORT}` heeft afmetingen {}x{}, verwacht {rows}x{columns}",
            matrix.rows, matrix.columns
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ComponentKind, META_LATTICE_COLUMNS, META_LATTICE_ROWS, META_PORTS};
    use crate::components::Component;
    use crate::graph::node::{MetaMap, MetaValue};
    use crate::graph::value::{Matrix, Value};

    fn meta(ports: Vec<&str>) -> MetaMap {
        let mut meta = MetaMap::new();
        meta.insert(META_PORTS.to_owned(), MetaValue::from(ports));
        meta.insert(META_LATTICE_ROWS.to_owned(), MetaValue::Integer(2));
        meta.insert(META_LATTICE_COLUMNS.to_owned(), MetaValue::Integer(3));
        meta
    }

    #[test]
    fn parametric_inputs_are_echoed_by_port_name() {
        let inputs = [Value::numbers([0.0, 1.0]), Value::Number(50.0)];
        let outputs = ComponentKind::Parametric
            .evaluate(&inputs, &meta(vec!["twist", "span"]))
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs["span"], Value::Number(50.0));
        assert_eq!(outputs["twist"], Value::numbers([0.0, 1.0]));
    }

    #[test]
    fn port_count_must_match_inputs() {
        let err = ComponentKind::Parametric
            .evaluate(&[Value::Number(1.0)], &meta(vec!["twist", "span"]))
            .unwrap_err();
        assert!(err.message().contains("2 poorten"));
    }

    #[test]
    fn free_form_checks_lattice_size() {
        let good = [Value::Matrix(Matrix::zeros(2, 3))];
        assert!(
            ComponentKind::FreeForm
                .evaluate(&good, &meta(vec!["shape"]))
                .is_ok()
        );

        let bad = [Value::Matrix(Matrix::zeros(3, 2))];
        assert!(
            ComponentKind::FreeForm
                .evaluate(&bad, &meta(vec!["shape"]))
                .is_err()
        );
    }
}
