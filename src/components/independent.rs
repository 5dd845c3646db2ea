//! Onafhankelijke variabelen van een oppervlak (de bronnode).
//!
//! De node bewaart de waarden van alle vrije ontwerpvariabelen als
//! outputwaarden; een optimizer of de engine past die rechtstreeks aan. De
//! evaluatie zelf levert dus niets nieuws op: de evaluator neemt de bewaarde
//! outputs over.

use std::collections::BTreeMap;

use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::{Component, ComponentResult};

pub const NAME: &str = "Independent Variables";
pub const NICKNAME: &str = "indep_vars";

/// Markerstruct voor een component.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentImpl;

impl Component for ComponentImpl {
    fn evaluate(&self, _inputs: &[Value], _meta: &MetaMap) -> ComponentResult {
        Ok(BTreeMap::new())
    }
}
