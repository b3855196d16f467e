use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::discretization::mesh::{Axis, Mesh};
use crate::numerics::solver::{RelaxationSolver, SolverResult};
use crate::physics::{FieldArray, FieldChannel};

pub struct RunSummary {
    // Mesh info
    pub nx: usize,
    pub ny: usize,
    pub domain_extent: ([f64; 2], [f64; 2]),
    pub min_cell_width: [f64; 2],
    pub max_cell_width: [f64; 2],

    // Solver settings
    pub relaxation: f64,
    pub diffusivity: f64,
    pub convection: String,
    pub diffusion: String,

    // Solver results
    pub sweeps: usize,
    pub final_residual: [f64; 3],

    // Scalar range over the interior
    pub phi_min: f64,
    pub phi_max: f64,
}

impl RunSummary {
    pub fn from_run(
        mesh: &Mesh,
        solver: &RelaxationSolver,
        result: &SolverResult,
        field: &FieldArray,
    ) -> Self {
        let xs = mesh.points(Axis::X);
        let ys = mesh.points(Axis::Y);
        let extent = |p: &[f64]| {
            [
                p.first().copied().unwrap_or(0.0),
                p.last().copied().unwrap_or(0.0),
            ]
        };
        let spacing = |p: &[f64]| {
            p.windows(2).map(|w| w[1] - w[0]).fold((f64::INFINITY, 0.0_f64), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
        };
        let (min_dx, max_dx) = spacing(xs);
        let (min_dy, max_dy) = spacing(ys);

        let phi = field.interior(FieldChannel::Phi);

        Self {
            nx: mesh.nx,
            ny: mesh.ny,
            domain_extent: (extent(xs), extent(ys)),
            min_cell_width: [min_dx, min_dy],
            max_cell_width: [max_dx, max_dy],
            relaxation: solver.relaxation,
            diffusivity: solver.diffusivity,
            convection: solver
                .convection
                .map_or_else(|| "none".to_string(), |s| format!("{s:?}")),
            diffusion: solver
                .diffusion
                .map_or_else(|| "none".to_string(), |s| format!("{s:?}")),
            sweeps: result.sweeps,
            final_residual: result.final_residual,
            phi_min: phi.min(),
            phi_max: phi.max(),
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "SCALAR TRANSPORT RUN SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "MESH STATISTICS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Interior cells:      {} x {}", self.nx, self.ny)?;
        writeln!(
            file,
            "Domain x:            {:.6e} to {:.6e}",
            self.domain_extent.0[0], self.domain_extent.0[1]
        )?;
        writeln!(
            file,
            "Domain y:            {:.6e} to {:.6e}",
            self.domain_extent.1[0], self.domain_extent.1[1]
        )?;
        writeln!(
            file,
            "Cell width x:        {:.6e} .. {:.6e}",
            self.min_cell_width[0], self.max_cell_width[0]
        )?;
        writeln!(
            file,
            "Cell width y:        {:.6e} .. {:.6e}",
            self.min_cell_width[1], self.max_cell_width[1]
        )?;
        writeln!(file)?;

        writeln!(file, "SOLVER SETTINGS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Relaxation factor:   {}", self.relaxation)?;
        writeln!(file, "Diffusivity:         {:.6e}", self.diffusivity)?;
        writeln!(file, "Convection scheme:   {}", self.convection)?;
        writeln!(file, "Diffusion scheme:    {}", self.diffusion)?;
        writeln!(file)?;

        writeln!(file, "RESULTS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Sweeps:              {}", self.sweeps)?;
        writeln!(file, "Final residual u:    {:.6e}", self.final_residual[0])?;
        writeln!(file, "Final residual v:    {:.6e}", self.final_residual[1])?;
        writeln!(file, "Final residual phi:  {:.6e}", self.final_residual[2])?;
        writeln!(file, "phi range:           {:.6e} to {:.6e}", self.phi_min, self.phi_max)?;
        writeln!(file)?;

        writeln!(file, "{}", "=".repeat(60))?;
        Ok(())
    }

    pub fn log(&self) {
        log::info!("{}", "=".repeat(60));
        log::info!("RUN SUMMARY");
        log::info!("Mesh:          {} x {} cells", self.nx, self.ny);
        log::info!(
            "Schemes:       convection {}, diffusion {} (Γ = {:.3e})",
            self.convection,
            self.diffusion,
            self.diffusivity
        );
        log::info!("Sweeps:        {} (ω = {})", self.sweeps, self.relaxation);
        log::info!("Residual phi:  {:.3e}", self.final_residual[2]);
        log::info!("phi range:     [{:.4}, {:.4}]", self.phi_min, self.phi_max);
        log::info!("{}", "=".repeat(60));
    }
}
