//! Beschrijving van blootgestelde poorten en vrije variabelen.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::graph::node::NodeId;
use crate::graph::value::Value;
use crate::surface::VariableId;

/// Waarden van de blootgestelde poorten na evaluatie, op poortnaam.
pub type PortValues = BTreeMap<String, Value>;

/// Vorm van een poortwaarde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortShape {
    Scalar,
    Distributed { length: usize },
    Grid { rows: usize, columns: usize },
}

impl PortShape {
    /// Vorm van een waarde; booleans hebben geen poortvorm.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) => Some(Self::Scalar),
            Value::List(values) => Some(Self::Distributed {
                length: values.len(),
            }),
            Value::Matrix(matrix) => Some(Self::Grid {
                rows: matrix.rows,
                columns: matrix.columns,
            }),
            Value::Boolean(_) => None,
        }
    }

    /// Totaal aantal waarden.
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Distributed { length } => length,
            Self::Grid { rows, columns } => rows * columns,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PortShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("een scalar"),
            Self::Distributed { length } => write!(f, "een reeks van {length} waarden"),
            Self::Grid { rows, columns } => write!(f, "een {rows}x{columns} rooster"),
        }
    }
}

/// Poort die de geometriegenerator afneemt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposedPort {
    pub name: String,
    /// `None` voor het FFD-rooster `shape`.
    pub variable: Option<VariableId>,
    pub shape: PortShape,
    pub units: Option<&'static str>,
    pub free: bool,
    /// Gevoed door een interpolatienode.
    pub interpolated: bool,
}

/// Vrije variabele: een uitgang van de bronnode die een optimizer aanpast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeVariable {
    /// Pinnaam op de bronnode, bv. `twist_cp` of `span`.
    pub name: String,
    /// Blootgestelde poort die deze variabele uiteindelijk bepaalt.
    pub port: String,
    pub shape: PortShape,
    /// Node die de variabele consumeert (interpolatie of geometrie-invoer).
    #[serde(skip)]
    pub consumer: NodeId,
}
