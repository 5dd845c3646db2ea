//! Basis Value-enum waarin poortwaarden en componentresultaten worden
//! opgeslagen.

use core::fmt;

use serde::Serialize;

/// Beschikbare waardetypes binnen de evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Een enkele numerieke waarde (uniforme variabele).
    Number(f64),
    /// Een booleaanse waarde, gebruikt voor `_dv`-vlaggen.
    Boolean(bool),
    /// Een lijst van waarden, bv. controlepunten of een verdeling.
    List(Vec<Value>),
    /// Een matrix van numerieke waarden, bv. het FFD-`shape` rooster.
    Matrix(Matrix),
}

impl Value {
    /// Bouwt een lijst van `Number`-waarden.
    #[must_use]
    pub fn numbers<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::List(values.into_iter().map(Self::Number).collect())
    }

    /// Geeft de variantnaam terug. Wordt gebruikt in foutmeldingen.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::List(_) => ValueKind::List,
            Self::Matrix(_) => ValueKind::Matrix,
        }
    }

    /// Verwacht een `Number` en retourneert de f64-waarde.
    pub fn expect_number(&self) -> Result<f64, ValueError> {
        match self {
            Self::Number(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Number", self.kind())),
        }
    }

    /// Verwacht een `Boolean` en retourneert de waarde.
    pub fn expect_boolean(&self) -> Result<bool, ValueError> {
        match self {
            Self::Boolean(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Boolean", self.kind())),
        }
    }

    /// Verwacht een lijst en geeft een slice terug.
    pub fn expect_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Self::List(values) => Ok(values),
            _ => Err(ValueError::type_mismatch("List", self.kind())),
        }
    }

    /// Verwacht een lijst van getallen en kopieert ze naar een vector.
    pub fn expect_numbers(&self) -> Result<Vec<f64>, ValueError> {
        self.expect_list()?
            .iter()
            .map(Value::expect_number)
            .collect()
    }

    /// Verwacht een `Matrix` en retourneert een verwijzing.
    pub fn expect_matrix(&self) -> Result<&Matrix, ValueError> {
        match self {
            Self::Matrix(matrix) => Ok(matrix),
            _ => Err(ValueError::type_mismatch("Matrix", self.kind())),
        }
    }

    /// Aantal elementen: 1 voor een scalar, de lengte voor een lijst.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Number(_) | Self::Boolean(_) => 1,
            Self::List(values) => values.len(),
            Self::Matrix(matrix) => matrix.values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Self::numbers(values)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::List(values) => {
                f.write_str("[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Matrix(matrix) => write!(f, "Matrix({}x{})", matrix.rows, matrix.columns),
        }
    }
}

/// Typefout voor wanneer een `Value` naar het verkeerde type wordt
/// geconverteerd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    expected: &'static str,
    found: ValueKind,
}

impl ValueError {
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: ValueKind) -> Self {
        Self { expected, found }
    }

    /// Hulptoegang voor tests en foutafhandeling.
    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> ValueKind {
        self.found
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verwachtte type `{}` maar kreeg `{}`",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ValueError {}

/// Beschrijft het soort `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
    List,
    Matrix,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Matrix => "Matrix",
            Self::List => "List",
        };
        f.write_str(name)
    }
}

/// Rijgewijze matrix, gebruikt voor het FFD-controlerooster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    pub rows: usize,
    pub columns: usize,
    pub values: Vec<f64>,
}

impl Matrix {
    /// Maakt een matrix aan wanneer de afmetingen en waarden overeenkomen.
    #[must_use]
    pub fn new(rows: usize, columns: usize, values: Vec<f64>) -> Option<Self> {
        if rows == 0 || columns == 0 || values.len() != rows * columns {
            return None;
        }
        Some(Self {
            rows,
            columns,
            values,
        })
    }

    /// Nulmatrix van `rows` x `columns`.
    #[must_use]
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.0; rows * columns],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Matrix, Value, ValueError, ValueKind};

    #[test]
    fn expect_number_accepts_number() {
        let value = Value::Number(42.0);
        assert_eq!(value.expect_number().unwrap(), 42.0);
    }

    #[test]
    fn expect_number_rejects_wrong_type() {
        let value = Value::Boolean(false);
        let err = value.expect_number().unwrap_err();
        assert_eq!(err.expected(), "Number");
        assert_eq!(err.found(), ValueKind::Boolean);
    }

    #[test]
    fn expect_numbers_reads_numeric_lists() {
        let value = Value::numbers([1.0, 2.0, 3.0]);
        assert_eq!(value.expect_numbers().unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(value.len(), 3);

        let mixed = Value::List(vec![Value::Number(1.0), Value::Boolean(true)]);
        let err = mixed.expect_numbers().unwrap_err();
        assert_eq!(err.found(), ValueKind::Boolean);
    }

    #[test]
    fn list_expectation_requires_list() {
        let value = Value::List(vec![Value::Number(1.0)]);
        assert_eq!(value.expect_list().unwrap().len(), 1);

        let non_list = Value::Number(3.0);
        assert!(matches!(non_list.expect_list(), Err(ValueError { .. })));
    }

    #[test]
    fn matrix_dimensions_are_validated() {
        assert!(Matrix::new(2, 3, vec![0.0; 6]).is_some());
        assert!(Matrix::new(2, 3, vec![0.0; 5]).is_none());
        assert!(Matrix::new(0, 3, Vec::new()).is_none());

        let zeros = Value::Matrix(Matrix::zeros(2, 2));
        assert_eq!(zeros.expect_matrix().unwrap().values, vec![0.0; 4]);
        assert_eq!(zeros.to_string(), "Matrix(2x2)");
    }

    #[test]
    fn display_formats_lists() {
        let value = Value::numbers([1.5, -2.0]);
        assert_eq!(value.to_string(), "[1.5, -2]");
    }
}
