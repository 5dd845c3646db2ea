mod bspline;
mod planform;

pub use bspline::{
    DEFAULT_ORDER, SplineError, clamped_knots, effective_order, interpolate, uniform_parameters,
};
pub use planform::{
    CRM_STATIONS, PlanformStation, ReferenceMesh, build_reference_mesh, chord_distribution,
    crm_reference_mesh, twist_distribution,
};
