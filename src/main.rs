use std::env;
use std::fs;
use std::ops::ControlFlow;

use fvtransport::discretization::generator::create_regular_mesh;
use fvtransport::numerics::{Convergence, Tolerance};
use fvtransport::physics::bc::fill_side;
use fvtransport::processing::csv_writer;
use fvtransport::processing::summary::RunSummary;
use fvtransport::{
    BoundaryConditions, BoundarySide, ConvectionScheme, FieldArray, FieldChannel,
    RelaxationSolver,
};
use glam::DVec2;

const OUTPUT_DIR: &str = "output/main";

/// Step inflow on the bottom edge carried diagonally across the unit square
/// by pure first-order upwind convection.
///
/// Usage: `fvtransport [n] [sweeps]`, defaults 11 and 30.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let n: usize = args.get(1).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(11);
    let sweeps: usize = args.get(2).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(30);

    fs::create_dir_all(OUTPUT_DIR)?;

    let mesh = create_regular_mesh([1.0, 1.0], n, n)?;
    mesh.log_geometry();

    let velocity = DVec2::new(1.0, 1.0);
    let mut field = FieldArray::zeros(&mesh);
    field.fill(FieldChannel::U, velocity.x);
    field.fill(FieldChannel::V, velocity.y);
    fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);

    let solver = RelaxationSolver::default()
        .with_relaxation(0.99)
        .with_convection(Some(ConvectionScheme::FirstOrderUpwind))
        .with_boundaries(BoundaryConditions::upwind_outflow(velocity))
        .with_logging(true);

    let convergence = Convergence {
        tolerance: Tolerance::Absolute(1e-10),
        ..Convergence::default()
    };
    let mut initial = None;
    let result = solver.solve(&mesh, &mut field, sweeps, |it, residual, _| {
        let first = *initial.get_or_insert(*residual);
        if convergence.is_converged(residual, &first) {
            log::info!("converged after {it} sweeps");
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    csv_writer::write_field(format!("{OUTPUT_DIR}/field.csv"), &mesh, &field)?;
    csv_writer::write_residual_history(
        format!("{OUTPUT_DIR}/residuals.csv"),
        &result.residual_history,
    )?;

    let summary = RunSummary::from_run(&mesh, &solver, &result, &field);
    summary.write_to_file(format!("{OUTPUT_DIR}/run_summary.txt"))?;
    summary.log();

    log::info!("Results saved to {OUTPUT_DIR}/");
    Ok(())
}
