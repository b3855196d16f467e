use approx::assert_relative_eq;
use glam::{DVec2, IVec2};

use fvtransport::physics::bc::fill_side;
use fvtransport::{
    BoundaryConditions, BoundarySide, ConvectionScheme, FieldArray, FieldChannel, FvError, Mesh,
    RelaxationSolver,
};

fn uniform_flow(mesh: &Mesh, velocity: DVec2) -> FieldArray {
    let mut field = FieldArray::zeros(mesh);
    field.fill(FieldChannel::U, velocity.x);
    field.fill(FieldChannel::V, velocity.y);
    field
}

fn phi(field: &FieldArray, i: i32, j: i32) -> f64 {
    field.get(IVec2::new(i, j), FieldChannel::Phi).unwrap()
}

// Pure upwind convection of a step entering through the bottom edge:
//   u . grad(phi) = 0,  phi = 1 on y = 0,  phi = 0 on x = 0
#[test]
fn step_inflow_first_order_exact_in_one_sweep() {
    let mesh = Mesh::build(3, 3).unwrap();
    let velocity = DVec2::ONE;
    let mut field = uniform_flow(&mesh, velocity);
    fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);

    let solver = RelaxationSolver::default()
        .with_relaxation(1.0)
        .with_boundaries(BoundaryConditions::upwind_outflow(velocity));
    let result = solver.run(&mesh, &mut field, 2).unwrap();

    // Sweeping along the flow, every upstream value is final when read.
    let expected = [
        [0.5, 0.25, 0.125],
        [0.75, 0.5, 0.3125],
        [0.875, 0.6875, 0.5],
    ];
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(phi(&field, i, j), expected[i as usize][j as usize], epsilon = 1e-14);
        }
    }
    assert_eq!(result.residual_history[1][2], 0.0);

    // Outflow sides mirror the last interior layer.
    for k in 0..3 {
        assert_eq!(phi(&field, 3, k), phi(&field, 2, k));
        assert_eq!(phi(&field, 4, k), phi(&field, 2, k));
        assert_eq!(phi(&field, k, 3), phi(&field, k, 2));
        assert_eq!(phi(&field, k, 4), phi(&field, k, 2));
    }
}

fn step_inflow(mesh: &Mesh) -> FieldArray {
    let mut field = uniform_flow(mesh, DVec2::ONE);
    fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);
    field
}

#[test]
fn single_sweep_stays_within_inflow_bounds() {
    let mesh = Mesh::build(3, 3).unwrap();
    let mut field = step_inflow(&mesh);

    let residual = RelaxationSolver::default()
        .with_relaxation(1.0)
        .with_boundaries(BoundaryConditions::upwind_outflow(DVec2::ONE))
        .sweep(&mesh, &mut field)
        .unwrap();

    for cell in mesh.interior_cells() {
        let value = field.get(cell, FieldChannel::Phi).unwrap();
        assert!((0.0..=1.0).contains(&value), "{cell:?} = {value}");
    }
    assert_relative_eq!(residual[2], 0.875, epsilon = 1e-14);
    assert_eq!(&residual[..2], &[0.0, 0.0]);
}

#[test]
fn step_inflow_residual_decreases_after_transient() {
    let mesh = Mesh::build(3, 3).unwrap();
    let mut field = step_inflow(&mesh);

    let result = RelaxationSolver::default()
        .with_relaxation(0.99)
        .with_convection(Some(ConvectionScheme::FirstOrderUpwind))
        .with_boundaries(BoundaryConditions::upwind_outflow(DVec2::ONE))
        .run(&mesh, &mut field, 10)
        .unwrap();

    let phi_history: Vec<f64> = result.residual_history.iter().map(|r| r[2]).collect();
    assert_eq!(phi_history.len(), 10);
    for pair in phi_history[2..].windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "residual grew: {phi_history:?}");
    }
    assert!(phi_history[9] < 1e-10);
}

#[test]
fn residual_does_not_grow_with_under_relaxation() {
    let mesh = Mesh::build(6, 6).unwrap();
    let velocity = DVec2::new(1.0, 0.5);
    let mut field = uniform_flow(&mesh, velocity);
    fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);

    let solver = RelaxationSolver::default()
        .with_diffusivity(0.01)
        .with_boundaries(BoundaryConditions::upwind_outflow(velocity));
    let result = solver.run(&mesh, &mut field, 10).unwrap();

    let phi_history: Vec<f64> = result.residual_history.iter().map(|r| r[2]).collect();
    for pair in phi_history.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "residual grew: {phi_history:?}");
    }
    assert!(phi_history[9] < phi_history[0]);
}

#[test]
fn first_order_values_stay_bounded() {
    let mesh = Mesh::build(8, 5).unwrap();
    let velocity = DVec2::new(0.7, 1.3);
    let mut field = uniform_flow(&mesh, velocity);
    fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);

    RelaxationSolver::default()
        .with_diffusivity(0.05)
        .with_boundaries(BoundaryConditions::upwind_outflow(velocity))
        .run(&mesh, &mut field, 40)
        .unwrap();

    let interior = field.interior(FieldChannel::Phi);
    assert!(interior.min() >= 0.0);
    assert!(interior.max() <= 1.0);
}

#[test]
fn negative_flow_mirrors_positive_flow() {
    let mesh = Mesh::build(4, 4).unwrap();
    let solver = RelaxationSolver::default().with_relaxation(1.0);

    let forward = DVec2::ONE;
    let mut pos = uniform_flow(&mesh, forward);
    fill_side(&mut pos, BoundarySide::Bottom, FieldChannel::Phi, 1.0);
    solver
        .clone()
        .with_boundaries(BoundaryConditions::upwind_outflow(forward))
        .run(&mesh, &mut pos, 100)
        .unwrap();

    let backward = -DVec2::ONE;
    let mut neg = uniform_flow(&mesh, backward);
    fill_side(&mut neg, BoundarySide::Top, FieldChannel::Phi, 1.0);
    solver
        .with_boundaries(BoundaryConditions::upwind_outflow(backward))
        .run(&mesh, &mut neg, 100)
        .unwrap();

    for i in 0..4 {
        for j in 0..4 {
            assert_relative_eq!(phi(&neg, 3 - i, 3 - j), phi(&pos, i, j), epsilon = 1e-12);
        }
    }
}

#[test]
fn second_order_keeps_uniform_state() {
    let mesh = Mesh::from_lattice(&[0.0, 0.2, 0.5, 0.6, 1.0], &[0.0, 0.1, 0.4, 0.7, 1.0]).unwrap();
    let velocity = DVec2::new(1.0, 2.0);
    let mut field = uniform_flow(&mesh, velocity);
    field.fill(FieldChannel::Phi, 1.0);

    let result = RelaxationSolver::default()
        .with_convection(Some(ConvectionScheme::SecondOrderUpwind))
        .with_boundaries(BoundaryConditions::upwind_outflow(velocity))
        .run(&mesh, &mut field, 5)
        .unwrap();

    for cell in mesh.interior_cells() {
        assert_relative_eq!(field.get(cell, FieldChannel::Phi).unwrap(), 1.0, epsilon = 1e-12);
    }
    assert!(result.final_residual[2] < 1e-12);
}

#[test]
fn stagnant_flow_reports_division_singularity() {
    let mesh = Mesh::build(3, 3).unwrap();
    let mut field = FieldArray::zeros(&mesh);
    fill_side(&mut field, BoundarySide::Left, FieldChannel::Phi, 1.0);

    let err = RelaxationSolver::default().run(&mesh, &mut field, 5).unwrap_err();
    match err {
        FvError::DivisionSingularity { i, j, value } => {
            assert_eq!((i, j), (0, 0));
            assert_eq!(value, 0.0);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn boundary_layers_mirror_interior_widths() {
    let mesh = Mesh::from_lattice(&[0.0, 0.1, 0.4, 1.0], &[0.0, 0.3, 1.0]).unwrap();
    for i in 0..3 {
        let bottom = mesh.cell(i, -1).unwrap();
        let first = mesh.cell(i, 0).unwrap();
        assert_eq!(bottom.width, first.width);
        assert_eq!(bottom.centroid.y, 0.0);
        assert_eq!(bottom.centroid.x, first.centroid.x);
        assert_eq!(mesh.cell(i, -2).unwrap().width, first.width);

        let top = mesh.cell(i, 2).unwrap();
        assert_eq!(top.width, mesh.cell(i, 1).unwrap().width);
        assert_eq!(top.centroid.y, 1.0);
    }
}
