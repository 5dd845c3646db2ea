//! B-spline interpolatiecomponent: controlepunten → dichte verdeling.

use std::collections::BTreeMap;

use crate::geom;
use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::coerce::{coerce_number_list, meta_count, meta_text};
use super::{Component, ComponentError, ComponentResult};

pub const NAME: &str = "B-Spline Interpolation";

/// Meta-sleutels die de assembler op elke interpolatienode zet.
pub const META_NUM_POINTS: &str = "num_points";
pub const META_NUM_CP: &str = "num_cp";
pub const META_ORDER: &str = "order";
pub const META_REQUESTED_ORDER: &str = "requested_order";
pub const META_OUTPUT: &str = "output";
pub const META_UNITS: &str = "units";

/// Markerstruct voor een component.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentImpl;

impl Component for ComponentImpl {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        let [control] = inputs else {
            return Err(ComponentError::new(format!(
                "B-spline component verwacht precies één reeks controlepunten, kreeg {} inputs",
                inputs.len()
            )));
        };

        let control_points = coerce_number_list(control)?;
        let num_points = meta_count(meta, META_NUM_POINTS)?;
        let requested_order = meta_count(meta, META_REQUESTED_ORDER)
            .unwrap_or(geom::DEFAULT_ORDER);
        let output = meta_text(meta, META_OUTPUT)?;

        let dense = geom::interpolate(&control_points, num_points, requested_order)
            .map_err(|err| ComponentError::new(err.to_string()))?;

        let mut outputs = BTreeMap::new();
        outputs.insert(output.to_owned(), Value::numbers(dense));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentImpl, META_NUM_POINTS, META_OUTPUT, META_REQUESTED_ORDER};
    use crate::components::Component;
    use crate::graph::node::{MetaMap, MetaValue};
    use crate::graph::value::Value;

    fn meta(num_points: i64) -> MetaMap {
        let mut meta = MetaMap::new();
        meta.insert(META_NUM_POINTS.to_owned(), MetaValue::Integer(num_points));
        meta.insert(META_REQUESTED_ORDER.to_owned(), MetaValue::Integer(4));
        meta.insert(META_OUTPUT.to_owned(), MetaValue::from("twist"));
        meta
    }

    #[test]
    fn interpolates_to_requested_point_count() {
        let outputs = ComponentImpl
            .evaluate(&[Value::numbers([1.0, 1.0, 1.0])], &meta(20))
            .unwrap();
        let twist = outputs["twist"].expect_numbers().unwrap();
        assert_eq!(twist.len(), 20);
        assert!(twist.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn empty_control_points_fail() {
        let err = ComponentImpl
            .evaluate(&[Value::List(Vec::new())], &meta(20))
            .unwrap_err();
        assert!(err.message().contains("control point"));
    }

    #[test]
    fn missing_input_fails() {
        assert!(ComponentImpl.evaluate(&[], &meta(5)).is_err());
    }
}
