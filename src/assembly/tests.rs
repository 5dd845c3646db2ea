use super::{
    AssemblyError, AssemblyOptions, GeometryMode, NamedShape, PortError, PortShape, assemble,
    assemble_all, assemble_with,
};
use crate::components::{ComponentRegistry, geometry_inputs, independent, spline};
use crate::geom::crm_reference_mesh;
use crate::graph::node::MetaValue;
use crate::graph::value::{Matrix, Value};
use crate::surface::{SurfaceSpec, VariableId};

fn wing() -> SurfaceSpec {
    SurfaceSpec::new("wing", crm_reference_mesh())
}

fn names(graph: &super::DesignVariableGraph) -> Vec<&str> {
    graph.port_names().collect()
}

#[test]
fn scalar_span_exposes_single_free_port() {
    let spec = SurfaceSpec::from_entries("wing", crm_reference_mesh(), [("span", Value::Number(50.0))])
        .unwrap();
    let graph = assemble(&spec, true).expect("assemblage");

    assert_eq!(names(&graph), vec!["span"]);
    let span = graph.port("span").unwrap();
    assert!(span.free);
    assert_eq!(span.shape, PortShape::Scalar);
    assert!(graph.interpolations().is_empty());

    let source = graph.source().expect("vrije variabele vraagt een bronnode");
    let source_node = graph.graph().node(source).unwrap();
    assert_eq!(source_node.nickname.as_deref(), Some(independent::NICKNAME));
    assert_eq!(source_node.output("span"), Some(&Value::Number(50.0)));
    assert_eq!(graph.graph().node_count(), 2);
    assert_eq!(graph.graph().wire_count(), 1);
}

#[test]
fn fixed_twist_is_interpolated_without_source() {
    let spec = SurfaceSpec::from_entries(
        "wing",
        crm_reference_mesh(),
        [
            ("twist_cp", Value::numbers([2.0, 0.0, -2.0])),
            ("twist_cp_dv", Value::Boolean(false)),
        ],
    )
    .unwrap();
    let graph = assemble(&spec, true).expect("assemblage");

    assert_eq!(names(&graph), vec!["twist"]);
    assert!(graph.port("twist").unwrap().interpolated);
    assert!(graph.source().is_none());
    assert!(graph.free_variables().is_empty());

    let spline_id = graph.interpolation(VariableId::Twist).expect("twist_bsp");
    let spline_node = graph.graph().node(spline_id).unwrap();
    assert_eq!(spline_node.nickname.as_deref(), Some("twist_bsp"));
    assert_eq!(
        spline_node.input("twist_cp"),
        Some(&Value::numbers([2.0, 0.0, -2.0]))
    );
    assert_eq!(spline_node.meta(spline::META_ORDER), Some(&MetaValue::Integer(3)));
    assert_eq!(spline_node.meta(spline::META_NUM_POINTS), Some(&MetaValue::Integer(20)));
    assert_eq!(spline_node.meta(spline::META_UNITS), Some(&MetaValue::from("deg")));

    let values = graph.evaluate(&ComponentRegistry::default()).expect("evaluatie");
    let twist = values["twist"].expect_numbers().unwrap();
    assert_eq!(twist.len(), 20);
    assert!((twist[0] - 2.0).abs() < 1e-12);
    assert!((twist[19] + 2.0).abs() < 1e-12);
}

#[test]
fn exposed_ports_match_present_variables() {
    let spec = wing()
        .with(VariableId::Taper, 0.3)
        .with(VariableId::Chord, vec![5.0, 3.0])
        .with(VariableId::Twist, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .with(VariableId::Sweep, 30.0)
        .with(VariableId::DihedralDistribution, vec![0.0, 1.0])
        .with(VariableId::ThicknessRatio, vec![0.12, 0.1, 0.08]);
    let graph = assemble(&spec, true).unwrap();

    assert_eq!(
        names(&graph),
        vec!["twist", "chord", "t_over_c", "dihedral_distrib", "sweep", "taper"]
    );
    assert_eq!(graph.interpolations().len(), 4);

    let shape = |name: &str| graph.port(name).unwrap().shape;
    assert_eq!(shape("twist"), PortShape::Distributed { length: 20 });
    assert_eq!(shape("chord"), PortShape::Distributed { length: 20 });
    assert_eq!(shape("t_over_c"), PortShape::Distributed { length: 19 });
    assert_eq!(shape("dihedral_distrib"), PortShape::Distributed { length: 19 });
    assert_eq!(shape("sweep"), PortShape::Scalar);

    let order = |id| {
        let node = graph.graph().node(graph.interpolation(id).unwrap()).unwrap();
        node.meta(spline::META_ORDER).and_then(MetaValue::as_count)
    };
    assert_eq!(order(VariableId::Chord), Some(2));
    assert_eq!(order(VariableId::Twist), Some(4));

    let values = graph.evaluate(&ComponentRegistry::default()).unwrap();
    assert_eq!(values.len(), 6);
    assert_eq!(values["t_over_c"].len(), 19);
    assert_eq!(values["taper"], Value::Number(0.3));
}

#[test]
fn free_control_points_are_wired_from_source() {
    let spec = wing().with(VariableId::Chord, vec![4.0, 4.0, 4.0]);
    let graph = assemble(&spec, true).unwrap();

    let source = graph.source().unwrap();
    let spline_id = graph.interpolation(VariableId::Chord).unwrap();
    let wire = graph.graph().incoming(spline_id, "chord_cp").expect("verbonden");
    assert_eq!(wire.from_node, source);
    assert!(wire.is_promotion());
    assert!(graph.graph().incoming(graph.sink(), "chord").is_some());

    let free = &graph.free_variables()[0];
    assert_eq!(free.name, "chord_cp");
    assert_eq!(free.port, "chord");
    assert_eq!(free.shape, PortShape::Distributed { length: 3 });

    let values = graph.evaluate(&ComponentRegistry::default()).unwrap();
    let chord = values["chord"].expect_numbers().unwrap();
    assert!(chord.iter().all(|value| (value - 4.0).abs() < 1e-12));
}

#[test]
fn distributed_variable_given_scalar_is_uniform_port() {
    let spec = wing().with(VariableId::Twist, 1.5);
    let graph = assemble(&spec, true).unwrap();

    let twist = graph.port("twist").unwrap();
    assert_eq!(twist.shape, PortShape::Scalar);
    assert!(!twist.interpolated);
    assert!(graph.interpolations().is_empty());
    assert_eq!(graph.free_variables()[0].name, "twist");
}

#[test]
fn empty_control_points_are_rejected() {
    let spec = wing().with(VariableId::XShear, Vec::<f64>::new());
    let err = assemble(&spec, true).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::InvalidControlPoints { variable: "xshear_cp" }
    ));
}

#[test]
fn global_scalar_given_sequence_is_ambiguous() {
    let spec = wing().with(VariableId::Span, vec![50.0, 60.0]);
    let err = assemble(&spec, true).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::AmbiguousVariableDefinition { ref key, .. } if key == "span"
    ));
}

#[test]
fn disconnected_ports_need_an_external_driver() {
    let spec = wing()
        .with(VariableId::Span, 58.7)
        .with(VariableId::Twist, vec![0.0, 0.0]);
    let mut graph = assemble(&spec, false).unwrap();

    assert!(!graph.is_connected());
    assert!(graph.source().is_some());
    let spline_id = graph.interpolation(VariableId::Twist).unwrap();
    assert!(graph.graph().incoming(spline_id, "twist_cp").is_none());
    assert!(graph.graph().incoming(graph.sink(), "span").is_none());

    let registry = ComponentRegistry::default();
    assert!(matches!(
        graph.evaluate(&registry),
        Err(PortError::Evaluation(_))
    ));

    graph.drive("twist_cp", Value::numbers([1.0, 3.0])).unwrap();
    graph.drive("span", Value::Number(60.0)).unwrap();
    let values = graph.evaluate(&registry).expect("alle pinnen gevoed");
    assert_eq!(values["span"], Value::Number(60.0));
    let twist = values["twist"].expect_numbers().unwrap();
    assert!((twist[0] - 1.0).abs() < 1e-12);
    assert!((twist[19] - 3.0).abs() < 1e-12);
}

#[test]
fn connected_ports_cannot_be_driven() {
    let spec = wing().with(VariableId::Span, 58.7);
    let mut graph = assemble(&spec, true).unwrap();
    let err = graph.drive("span", Value::Number(1.0)).unwrap_err();
    assert!(matches!(err, PortError::AlreadyConnected { .. }));
}

#[test]
fn set_free_variable_checks_shape() {
    let spec = wing().with(VariableId::Twist, vec![0.0, 0.0, 0.0]);
    let mut graph = assemble(&spec, true).unwrap();

    let err = graph
        .set_free_variable("twist_cp", Value::numbers([1.0, 2.0]))
        .unwrap_err();
    assert!(matches!(err, PortError::ShapeMismatch { .. }));
    assert!(matches!(
        graph.set_free_variable("chord_cp", Value::numbers([1.0])),
        Err(PortError::UnknownVariable { .. })
    ));
    assert!(matches!(
        graph.set_free_variable("twist_cp", Value::Boolean(true)),
        Err(PortError::InvalidValue { .. })
    ));

    graph
        .set_free_variable("twist_cp", Value::numbers([5.0, 5.0, 5.0]))
        .unwrap();
    assert_eq!(
        graph.free_variable_value("twist_cp"),
        Some(&Value::numbers([5.0, 5.0, 5.0]))
    );
    let values = graph.evaluate(&ComponentRegistry::default()).unwrap();
    let twist = values["twist"].expect_numbers().unwrap();
    assert!(twist.iter().all(|value| (value - 5.0).abs() < 1e-12));
}

#[test]
fn free_form_mode_exposes_shape_and_thickness_only() {
    let spec = wing()
        .with(VariableId::Twist, vec![1.0, 2.0])
        .with(VariableId::ThicknessRatio, vec![0.12, 0.1])
        .with(VariableId::Span, 58.7)
        .with_ffd_lattice(2, 3);
    let options = AssemblyOptions {
        connect_free_variables: true,
        mode: GeometryMode::free_form(NamedShape("crm-box".to_owned())),
    };
    let graph = assemble_with(&spec, &options).unwrap();

    assert_eq!(names(&graph), vec!["shape", "t_over_c"]);
    assert_eq!(graph.shape_label(), Some("crm-box"));
    let shape = graph.port("shape").unwrap();
    assert_eq!(shape.shape, PortShape::Grid { rows: 2, columns: 3 });
    assert_eq!(shape.units, Some("m"));

    let sink = graph.graph().node(graph.sink()).unwrap();
    assert_eq!(sink.name.as_deref(), Some(geometry_inputs::ComponentKind::FreeForm.name()));

    let values = graph.evaluate(&ComponentRegistry::default()).unwrap();
    assert_eq!(values["shape"], Value::Matrix(Matrix::zeros(2, 3)));
    assert_eq!(values["t_over_c"].len(), 19);
}

#[test]
fn free_form_mode_creates_source_even_when_everything_is_fixed() {
    let spec = wing()
        .with(VariableId::ThicknessRatio, vec![0.12])
        .with_design_flag(VariableId::ThicknessRatio, false)
        .with_ffd_lattice(2, 2);
    let options = AssemblyOptions {
        connect_free_variables: false,
        mode: GeometryMode::free_form(NamedShape("box".to_owned())),
    };
    let graph = assemble_with(&spec, &options).unwrap();

    assert!(graph.source().is_some());
    assert_eq!(graph.free_variables().len(), 1);
    assert_eq!(graph.free_variables()[0].name, "shape");
}

#[test]
fn free_form_mode_requires_lattice_size() {
    let options = AssemblyOptions {
        connect_free_variables: true,
        mode: GeometryMode::free_form(NamedShape("box".to_owned())),
    };
    let err = assemble_with(&wing(), &options).unwrap_err();
    assert!(matches!(err, AssemblyError::MissingLatticeSize));
}

#[test]
fn empty_surface_has_only_geometry_node() {
    let graph = assemble(&wing(), true).unwrap();
    assert_eq!(graph.ports().len(), 0);
    assert!(graph.source().is_none());
    assert_eq!(graph.graph().node_count(), 1);
    assert!(graph.evaluate(&ComponentRegistry::default()).unwrap().is_empty());
}

#[test]
fn assemble_all_keeps_surfaces_independent() {
    let good = wing().with(VariableId::Span, 40.0);
    let bad = SurfaceSpec::new("tail", crm_reference_mesh()).with(VariableId::Chord, Vec::<f64>::new());
    let results = assemble_all(&[good, bad], &AssemblyOptions::default());

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().surface(), "wing");
    assert!(matches!(
        results[1],
        Err(AssemblyError::InvalidControlPoints { .. })
    ));
}

#[test]
fn all_variables_follow_fixed_order() {
    let spec = wing()
        .with(VariableId::Twist, vec![4.0, 1.0, -2.0])
        .with(VariableId::Chord, vec![10.0, 4.0])
        .with(VariableId::ThicknessRatio, vec![0.14, 0.1, 0.09])
        .with(VariableId::XShear, vec![0.0, 1.0])
        .with(VariableId::YShear, vec![0.0, 0.5])
        .with(VariableId::ZShear, vec![0.0, 2.0])
        .with(VariableId::DihedralDistribution, vec![0.0, 2.0, 4.0])
        .with(VariableId::Sweep, 30.0)
        .with(VariableId::Span, 58.7)
        .with(VariableId::Dihedral, 5.0)
        .with(VariableId::Taper, 0.3)
        .with_design_flag(VariableId::Chord, false)
        .with_design_flag(VariableId::Dihedral, false);
    let graph = assemble(&spec, true).expect("assemblage");

    assert_eq!(
        names(&graph),
        vec![
            "twist",
            "chord",
            "t_over_c",
            "xshear",
            "yshear",
            "zshear",
            "dihedral_distrib",
            "sweep",
            "span",
            "dihedral",
            "taper",
        ]
    );

    let lengths: Vec<usize> = graph.ports().iter().map(|port| port.shape.len()).collect();
    assert_eq!(lengths, vec![20, 20, 19, 20, 20, 20, 19, 1, 1, 1, 1]);
    assert_eq!(graph.interpolations().len(), 7);

    let mut free: Vec<&str> = graph
        .free_variables()
        .iter()
        .map(|variable| variable.name.as_str())
        .collect();
    assert_eq!(
        free,
        vec![
            "twist_cp",
            "t_over_c_cp",
            "xshear_cp",
            "yshear_cp",
            "zshear_cp",
            "dihedral_distrib_cp",
            "sweep",
            "span",
            "taper",
        ]
    );

    let source = graph.graph().node(graph.source().unwrap()).unwrap();
    let mut outputs: Vec<&str> = source.outputs.keys().map(String::as_str).collect();
    outputs.sort_unstable();
    free.sort_unstable();
    assert_eq!(outputs, free);
    assert!(source.output("chord_cp").is_none());
    assert!(source.output("dihedral").is_none());

    // 7 interpolaties naar de sink, 9 vrije variabelen uit de bron
    assert_eq!(graph.graph().wire_count(), 16);

    let values = graph.evaluate(&ComponentRegistry::default()).unwrap();
    assert_eq!(values.len(), 11);
    assert_eq!(values["yshear"].len(), 20);
    assert_eq!(values["dihedral_distrib"].len(), 19);
    assert_eq!(values["dihedral"], Value::Number(5.0));
    let zshear = values["zshear"].expect_numbers().unwrap();
    assert!((zshear[0] - 0.0).abs() < 1e-12);
    assert!((zshear[19] - 2.0).abs() < 1e-12);
}

#[test]
fn invalid_lattice_is_rejected_at_assembly() {
    let options = AssemblyOptions {
        connect_free_variables: true,
        mode: GeometryMode::free_form(NamedShape("ffd".to_owned())),
    };
    let spec = wing().with_ffd_lattice(0, 3);
    assert!(matches!(
        assemble_with(&spec, &options),
        Err(AssemblyError::InvalidLatticeSize { rows: 0, columns: 3 })
    ));

    let spec = wing().with_ffd_lattice(usize::MAX, 2);
    assert!(matches!(
        assemble_with(&spec, &options),
        Err(AssemblyError::InvalidLatticeSize { .. })
    ));
}
