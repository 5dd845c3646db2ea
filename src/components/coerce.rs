//! Conversiehulpen voor componentinputs en meta-informatie.

use crate::graph::node::{MetaMap, MetaValue};
use crate::graph::value::Value;

use super::ComponentError;

pub fn coerce_number(value: &Value) -> Result<f64, ComponentError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::List(l) if l.len() == 1 => coerce_number(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een getal, kreeg {}",
            other.kind()
        ))),
    }
}

/// Leest een reeks getallen; een losse `Number` telt als reeks van lengte 1.
pub fn coerce_number_list(value: &Value) -> Result<Vec<f64>, ComponentError> {
    match value {
        Value::Number(n) => Ok(vec![*n]),
        Value::List(values) => values.iter().map(coerce_number).collect(),
        other => Err(ComponentError::new(format!(
            "Verwachtte een reeks getallen, kreeg {}",
            other.kind()
        ))),
    }
}

/// Leest een verplicht aantal uit de meta-informatie van een node.
pub fn meta_count(meta: &MetaMap, key: &str) -> Result<usize, ComponentError> {
    meta.get(key)
        .and_then(MetaValue::as_count)
        .ok_or_else(|| ComponentError::new(format!("meta `{key}` ontbreekt of is geen aantal")))
}

/// Leest een verplichte tekst uit de meta-informatie van een node.
pub fn meta_text<'a>(meta: &'a MetaMap, key: &str) -> Result<&'a str, ComponentError> {
    meta.get(key)
        .and_then(MetaValue::as_text)
        .ok_or_else(|| ComponentError::new(format!("meta `{key}` ontbreekt of is geen tekst")))
}

/// Leest een lijst van namen uit de meta-informatie van een node.
pub fn meta_names<'a>(meta: &'a MetaMap, key: &str) -> Result<Vec<&'a str>, ComponentError> {
    let list = meta
        .get(key)
        .and_then(MetaValue::as_list)
        .ok_or_else(|| ComponentError::new(format!("meta `{key}` ontbreekt of is geen lijst")))?;

    list.iter()
        .map(|entry| {
            entry
                .as_text()
                .ok_or_else(|| ComponentError::new(format!("meta `{key}` bevat geen tekst")))
        })
        .collect()
}
