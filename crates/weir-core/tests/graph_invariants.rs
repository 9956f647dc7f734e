//! Structural invariants of the builder over systematic graph families.

use weir_core::attribute::CommunicationPattern as Cp;
use weir_core::builder::DagBuilder;
use weir_core::edge::IrEdge;
use weir_core::error::Error;
use weir_core::vertex::{IrVertex, Transform};
use weir_core::IrDag;

fn chain_vertices(len: usize) -> Vec<IrVertex> {
    let mut vertices = vec![IrVertex::source("v0", "memory://input")];
    for i in 1..len - 1 {
        vertices.push(IrVertex::operator(
            format!("v{i}"),
            Transform::Named {
                name: "map".to_string(),
            },
        ));
    }
    vertices.push(IrVertex::operator(
        format!("v{}", len - 1),
        Transform::Do {
            name: "collect".to_string(),
        },
    ));
    vertices
}

fn chain_builder(len: usize) -> DagBuilder<IrVertex, IrEdge> {
    let vertices = chain_vertices(len);
    let mut builder = DagBuilder::new();
    for v in &vertices {
        builder.add_vertex(v.clone());
    }
    for (i, pair) in vertices.windows(2).enumerate() {
        builder
            .connect(IrEdge::new(
                format!("e{i}"),
                Cp::OneToOne,
                &pair[0],
                &pair[1],
            ))
            .unwrap();
    }
    builder
}

#[test]
fn chains_of_any_length_build_acyclic() {
    for len in 2..=20 {
        let dag = chain_builder(len).build().unwrap();
        assert_eq!(dag.vertex_count(), len);
        assert_eq!(dag.edge_count(), len - 1);
        let order: Vec<String> = dag.topological().iter().map(|v| v.id().to_string()).collect();
        let expected: Vec<String> = (0..len).map(|i| format!("v{i}")).collect();
        assert_eq!(order, expected);
    }
}

#[test]
fn any_back_edge_in_a_chain_is_a_cycle() {
    for len in 3..=10 {
        for back_to in 1..len - 1 {
            let mut builder = chain_builder(len);
            let vertices = chain_vertices(len);
            builder
                .connect(IrEdge::new(
                    "back",
                    Cp::OneToOne,
                    &vertices[len - 1],
                    &vertices[back_to],
                ))
                .unwrap();
            assert_eq!(
                builder.build().unwrap_err(),
                Error::CycleDetected,
                "chain of {len} with a back edge to v{back_to}"
            );
        }
    }
}

fn looped_dag() -> IrDag {
    let body = DagBuilder::<IrVertex, IrEdge>::new().build().unwrap();
    let lv = IrVertex::loop_container("lv", body);
    let s = IrVertex::source("s", "memory://input").with_parallelism(2);
    let a = IrVertex::operator(
        "a",
        Transform::Named {
            name: "map".to_string(),
        },
    )
    .with_parallelism(2);
    let t = IrVertex::operator(
        "t",
        Transform::Do {
            name: "collect".to_string(),
        },
    );
    let mut builder = DagBuilder::new();
    builder.add_vertex(s.clone());
    builder.add_vertex_in_loops(a.clone(), &[lv.clone()]);
    builder.add_vertex(t.clone());
    builder.connect(IrEdge::new("e0", Cp::OneToOne, &s, &a)).unwrap();
    builder.connect(IrEdge::new("e1", Cp::Shuffle, &a, &t)).unwrap();
    builder.build().unwrap()
}

#[test]
fn rebuilding_from_a_dag_is_structure_preserving() {
    let dag = looped_dag();
    let copy = DagBuilder::from_dag(&dag).unwrap().build().unwrap();
    assert_eq!(copy, dag);
    assert_eq!(copy.assigned_loop_of("a"), Some("lv"));
    assert_eq!(copy.loop_depth_of("a"), Some(1));
}

#[test]
fn rebuilding_twice_is_stable() {
    let dag = looped_dag();
    let once = DagBuilder::from_dag(&dag).unwrap().build().unwrap();
    let twice = DagBuilder::from_dag(&once).unwrap().build().unwrap();
    assert_eq!(once, twice);
}
