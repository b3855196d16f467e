use std::ops::ControlFlow;
use std::time::Instant;

use glam::IVec2;

use crate::discretization::interpolate;
use crate::discretization::mesh::{Axis, Mesh};
use crate::discretization::schemes::{Coefficients, ConvectionScheme, DiffusionScheme};
use crate::discretization::stencil::{FaceDirection, OWNER_SLOT};
use crate::error::{FvError, Result};
use crate::numerics::timing::{finalize_and_log, record_sweep, reset_timing};
use crate::physics::bc::BoundaryConditions;
use crate::physics::{FieldArray, FieldChannel};

/// Owner coefficients at or below this fraction of the total coefficient
/// magnitude are treated as cancelled.
const SINGULAR_FRACTION: f64 = 1e-12;

/// Gauss-Seidel relaxation of the steady scalar transport equation by direct
/// stencil substitution.
///
/// Cells are visited `i` outer, `j` inner. Each update is written back at once
/// and the zero-gradient boundary copies are re-applied before the next cell,
/// so later cells see the newest values.
#[derive(Clone, Debug)]
pub struct RelaxationSolver {
    /// Under-relaxation factor ω in `(0, 1]`.
    pub relaxation: f64,
    /// Diffusion coefficient multiplying the diffusion scheme.
    pub diffusivity: f64,
    pub convection: Option<ConvectionScheme>,
    pub diffusion: Option<DiffusionScheme>,
    pub boundaries: BoundaryConditions,
    /// Log one `info` line per sweep.
    pub logging: bool,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self {
            relaxation: 0.99,
            diffusivity: 0.0,
            convection: Some(ConvectionScheme::FirstOrderUpwind),
            diffusion: Some(DiffusionScheme::CentralDifference),
            boundaries: BoundaryConditions::fixed(),
            logging: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SolverResult {
    pub sweeps: usize,
    /// Residual `[u, v, phi]` of every completed sweep.
    pub residual_history: Vec<[f64; 3]>,
    pub final_residual: [f64; 3],
}

impl RelaxationSolver {
    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_diffusivity(mut self, diffusivity: f64) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    pub fn with_convection(mut self, scheme: Option<ConvectionScheme>) -> Self {
        self.convection = scheme;
        self
    }

    pub fn with_diffusion(mut self, scheme: Option<DiffusionScheme>) -> Self {
        self.diffusion = scheme;
        self
    }

    pub fn with_boundaries(mut self, boundaries: BoundaryConditions) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(FvError::config(format!(
                "relaxation factor must lie in (0, 1], got {}",
                self.relaxation
            )));
        }
        if !(self.diffusivity >= 0.0) || !self.diffusivity.is_finite() {
            return Err(FvError::config(format!(
                "diffusivity must be finite and non-negative, got {}",
                self.diffusivity
            )));
        }
        Ok(())
    }

    fn check_field(mesh: &Mesh, field: &FieldArray) -> Result<()> {
        if field.nx() != mesh.nx || field.ny() != mesh.ny {
            return Err(FvError::config(format!(
                "field is {}x{} but mesh is {}x{}",
                field.nx(),
                field.ny(),
                mesh.nx,
                mesh.ny
            )));
        }
        Ok(())
    }

    /// Per-axis coefficient vectors `(Apx, Apy)` of one interior cell.
    pub fn assemble(
        &self,
        cell: IVec2,
        mesh: &Mesh,
        field: &FieldArray,
    ) -> Result<(Coefficients, Coefficients)> {
        let mut apx = Coefficients::zeros();
        let mut apy = Coefficients::zeros();

        for direction in FaceDirection::ALL {
            let axis = direction.axis();
            let target = match axis {
                Axis::X => &mut apx,
                Axis::Y => &mut apy,
            };

            if let Some(scheme) = self.convection {
                let channel = match axis {
                    Axis::X => FieldChannel::U,
                    Axis::Y => FieldChannel::V,
                };
                // Upwinding and the signed flux both use the face value of the
                // normal velocity.
                let normal_velocity = interpolate::linear(cell, mesh, field, direction, channel)?;
                let face_velocity = axis.unit().as_dvec2() * normal_velocity;
                let flux = normal_velocity * mesh.width_at(cell, axis.tangent())?;
                *target +=
                    scheme.balance_coefficients(cell, mesh, direction, face_velocity)? * flux;
            }

            if let Some(scheme) = self.diffusion {
                if self.diffusivity > 0.0 {
                    *target +=
                        scheme.balance_coefficients(cell, mesh, direction)? * self.diffusivity;
                }
            }
        }

        log::trace!("Apx {:?} {:?}", apx.as_slice(), cell);
        log::trace!("Apy {:?} {:?}", apy.as_slice(), cell);
        Ok((apx, apy))
    }

    /// Solve the single-cell balance for the scalar, before relaxation.
    pub fn solve_cell(&self, cell: IVec2, mesh: &Mesh, field: &FieldArray) -> Result<f64> {
        let (apx, apy) = self.assemble(cell, mesh, field)?;
        let a_p = owner_coefficient(cell, &apx, &apy)?;

        let phi = |di: i32, dj: i32| field.get(cell + IVec2::new(di, dj), FieldChannel::Phi);
        let rhs = apx[0] * phi(-2, 0)?
            + apx[1] * phi(-1, 0)?
            + apx[3] * phi(1, 0)?
            + apx[4] * phi(2, 0)?
            + apy[4] * phi(0, 2)?
            + apy[3] * phi(0, 1)?
            + apy[1] * phi(0, -1)?
            + apy[0] * phi(0, -2)?;

        Ok(rhs / a_p)
    }

    /// One relaxation sweep over every interior cell. Returns the largest
    /// absolute change per channel over the extended index space.
    ///
    /// On error the cells already visited keep their new values; the field
    /// is then not a converged state.
    pub fn sweep(&self, mesh: &Mesh, field: &mut FieldArray) -> Result<[f64; 3]> {
        self.validate()?;
        Self::check_field(mesh, field)?;
        let previous = field.clone();
        let omega = self.relaxation;

        for cell in mesh.interior_cells() {
            let solved = self.solve_cell(cell, mesh, field)?;
            let old = field.get(cell, FieldChannel::Phi)?;
            let relaxed = old * (1.0 - omega) + omega * solved;
            if !relaxed.is_finite() {
                return Err(FvError::NonFinite {
                    i: cell.x,
                    j: cell.y,
                    value: relaxed,
                });
            }
            field.set(cell, FieldChannel::Phi, relaxed)?;
            self.boundaries.apply(field);
        }

        Ok(field.max_abs_difference(&previous))
    }

    /// Run `sweeps` sweeps, handing each residual to `callback`. Returning
    /// `ControlFlow::Break` stops early.
    pub fn solve<F>(
        &self,
        mesh: &Mesh,
        field: &mut FieldArray,
        sweeps: usize,
        mut callback: F,
    ) -> Result<SolverResult>
    where
        F: FnMut(usize, &[f64; 3], &FieldArray) -> ControlFlow<()>,
    {
        self.validate()?;
        Self::check_field(mesh, field)?;
        reset_timing();
        let start = Instant::now();

        let mut history = Vec::with_capacity(sweeps);
        for it in 1..=sweeps {
            let residual = record_sweep(|| self.sweep(mesh, field))?;
            history.push(residual);
            log_sweep(it, sweeps, &residual, self.logging);

            if callback(it, &residual, field).is_break() {
                break;
            }
        }

        finalize_and_log(start.elapsed());
        let final_residual = history.last().copied().unwrap_or([0.0; 3]);
        Ok(SolverResult {
            sweeps: history.len(),
            residual_history: history,
            final_residual,
        })
    }

    /// Run a fixed number of sweeps.
    pub fn run(&self, mesh: &Mesh, field: &mut FieldArray, sweeps: usize) -> Result<SolverResult> {
        self.solve(mesh, field, sweeps, |_, _, _| ControlFlow::Continue(()))
    }
}

/// Combined diagonal `Apx[2] + Apy[2]`, rejected unless it is clearly
/// positive against the magnitude of the whole stencil.
fn owner_coefficient(cell: IVec2, apx: &Coefficients, apy: &Coefficients) -> Result<f64> {
    let a_p = apx[OWNER_SLOT] + apy[OWNER_SLOT];
    let scale = apx.abs().sum() + apy.abs().sum();
    if !(a_p > SINGULAR_FRACTION * scale) {
        return Err(FvError::DivisionSingularity {
            i: cell.x,
            j: cell.y,
            value: a_p,
        });
    }
    Ok(a_p)
}

fn log_sweep(it: usize, total: usize, residual: &[f64; 3], logging: bool) {
    if logging {
        log::info!(
            "sweep {it:>4}/{total} | residuals u {:.6e} v {:.6e} phi {:.6e}",
            residual[0],
            residual[1],
            residual[2]
        );
    } else {
        log::debug!("sweep {it} residuals {residual:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bc::{fill_side, BoundarySide};
    use glam::DVec2;
    use approx::assert_relative_eq;

    fn uniform_flow(mesh: &Mesh, velocity: DVec2) -> FieldArray {
        let mut field = FieldArray::zeros(mesh);
        field.fill(FieldChannel::U, velocity.x);
        field.fill(FieldChannel::V, velocity.y);
        field
    }

    #[test]
    fn first_order_balance_averages_upstream_values() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::ONE);
        field.set(IVec2::new(0, 1), FieldChannel::Phi, 0.2).unwrap();
        field.set(IVec2::new(1, 0), FieldChannel::Phi, 0.6).unwrap();

        let solver = RelaxationSolver::default();
        let (apx, apy) = solver.assemble(IVec2::new(1, 1), &mesh, &field).unwrap();
        let f = 1.0 / 3.0;
        assert_relative_eq!(apx, Coefficients::new(0.0, f, f, 0.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(apy, Coefficients::new(0.0, f, f, 0.0, 0.0), epsilon = 1e-15);

        let value = solver.solve_cell(IVec2::new(1, 1), &mesh, &field).unwrap();
        assert_relative_eq!(value, 0.4, epsilon = 1e-14);
    }

    #[test]
    fn negative_flow_keeps_owner_positive() {
        let mesh = Mesh::build(3, 3).unwrap();
        let field = uniform_flow(&mesh, DVec2::new(-1.0, -2.0));
        let solver = RelaxationSolver::default();
        let (apx, apy) = solver.assemble(IVec2::new(1, 1), &mesh, &field).unwrap();
        assert!(apx[2] > 0.0 && apy[2] > 0.0);
        assert!(apx[3] > 0.0 && apy[3] > 0.0);
        assert_eq!(apx[1], 0.0);
        assert_eq!(apy[1], 0.0);
    }

    #[test]
    fn zero_velocity_without_diffusion_is_singular() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = FieldArray::zeros(&mesh);
        let err = RelaxationSolver::default().sweep(&mesh, &mut field);
        assert!(matches!(
            err,
            Err(FvError::DivisionSingularity { i: 0, j: 0, .. })
        ));
    }

    #[test]
    fn central_convection_of_uniform_flow_is_singular() {
        let mesh = Mesh::build(4, 4).unwrap();
        let field = uniform_flow(&mesh, DVec2::new(1.0, 0.5));
        let solver = RelaxationSolver::default().with_convection(Some(ConvectionScheme::Linear));
        let err = solver.solve_cell(IVec2::new(2, 2), &mesh, &field);
        assert!(matches!(err, Err(FvError::DivisionSingularity { .. })));
    }

    #[test]
    fn diffusion_only_conductances() {
        let mesh = Mesh::build(4, 2).unwrap();
        let field = FieldArray::zeros(&mesh);
        let solver = RelaxationSolver::default()
            .with_convection(None)
            .with_diffusivity(0.5);
        let (apx, apy) = solver.assemble(IVec2::new(1, 0), &mesh, &field).unwrap();
        // x faces: 2 * 0.5 / (0.25 + 0.25); y faces: 2 * 0.25 / (0.5 + 0.5).
        assert_relative_eq!(apx, Coefficients::new(0.0, 2.0, 4.0, 2.0, 0.0) * 0.5, epsilon = 1e-14);
        assert_relative_eq!(apy, Coefficients::new(0.0, 0.5, 1.0, 0.5, 0.0) * 0.5, epsilon = 1e-14);
    }

    #[test]
    fn upwinds_from_face_velocity() {
        // Stagnant owner with a strong leftward jet in its right neighbor.
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::new(0.0, 1.0));
        field.set(IVec2::new(2, 1), FieldChannel::U, -2.0).unwrap();
        field.set(IVec2::new(1, 0), FieldChannel::Phi, 1.0).unwrap();
        field.set(IVec2::new(2, 1), FieldChannel::Phi, 1.0).unwrap();

        let solver = RelaxationSolver::default();
        let cell = IVec2::new(1, 1);
        let (apx, apy) = solver.assemble(cell, &mesh, &field).unwrap();
        let f = 1.0 / 3.0;
        // Inflow through the right face lands on the right neighbor only.
        assert_relative_eq!(apx, Coefficients::new(0.0, 0.0, 0.0, f, 0.0), epsilon = 1e-15);
        assert_relative_eq!(apy, Coefficients::new(0.0, f, f, 0.0, 0.0), epsilon = 1e-15);

        let value = solver.solve_cell(cell, &mesh, &field).unwrap();
        assert_relative_eq!(value, 2.0, epsilon = 1e-14);
    }

    #[test]
    fn cancelled_owner_coefficient_is_singular() {
        let cell = IVec2::new(1, 2);
        let apx = Coefficients::new(0.0, 1.0, 5.551115123125783e-17, 0.0, 0.0);
        let apy = Coefficients::new(0.0, 0.5, 0.0, 0.5, 0.0);
        assert!(matches!(
            owner_coefficient(cell, &apx, &apy),
            Err(FvError::DivisionSingularity { i: 1, j: 2, .. })
        ));

        let apx = Coefficients::new(0.0, 1.0, 1.0, 0.0, 0.0);
        assert_eq!(owner_coefficient(cell, &apx, &apy), Ok(1.0));

        let apx = Coefficients::new(0.0, 1.0, f64::NAN, 0.0, 0.0);
        assert!(owner_coefficient(cell, &apx, &apy).is_err());
    }

    #[test]
    fn single_sweep_validates_relaxation() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::ONE);
        fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);
        let before = field.clone();

        for omega in [f64::NAN, 2.0, 0.0] {
            let solver = RelaxationSolver::default().with_relaxation(omega);
            assert!(matches!(
                solver.sweep(&mesh, &mut field),
                Err(FvError::Config { .. })
            ));
        }
        assert_eq!(field, before);
    }

    #[test]
    fn non_finite_update_is_reported() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::ONE);
        fill_side(&mut field, BoundarySide::Left, FieldChannel::Phi, f64::NAN);

        let err = RelaxationSolver::default().sweep(&mesh, &mut field);
        assert!(matches!(err, Err(FvError::NonFinite { i: 0, j: 0, .. })));
        assert_eq!(field.get(IVec2::new(0, 0), FieldChannel::Phi).unwrap(), 0.0);
    }

    #[test]
    fn rejects_bad_configuration() {
        let mesh = Mesh::build(2, 2).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::ONE);
        for solver in [
            RelaxationSolver::default().with_relaxation(0.0),
            RelaxationSolver::default().with_relaxation(1.5),
            RelaxationSolver::default().with_diffusivity(-1.0),
        ] {
            assert!(matches!(
                solver.run(&mesh, &mut field, 1),
                Err(FvError::Config { .. })
            ));
        }

        let other = Mesh::build(3, 2).unwrap();
        assert!(matches!(
            RelaxationSolver::default().sweep(&other, &mut field),
            Err(FvError::Config { .. })
        ));
    }

    #[test]
    fn callback_can_stop_early() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::ONE);
        fill_side(&mut field, BoundarySide::Bottom, FieldChannel::Phi, 1.0);
        let solver = RelaxationSolver::default()
            .with_boundaries(BoundaryConditions::upwind_outflow(DVec2::ONE));

        let result = solver
            .solve(&mesh, &mut field, 50, |it, _, _| {
                if it == 4 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(result.sweeps, 4);
        assert_eq!(result.residual_history.len(), 4);
        assert_eq!(result.final_residual, result.residual_history[3]);
    }

    #[test]
    fn velocity_channels_are_untouched() {
        let mesh = Mesh::build(3, 3).unwrap();
        let mut field = uniform_flow(&mesh, DVec2::new(1.0, 0.5));
        fill_side(&mut field, BoundarySide::Left, FieldChannel::Phi, 1.0);
        let result = RelaxationSolver::default()
            .with_boundaries(BoundaryConditions::zero_gradient().with(
                BoundarySide::Left,
                crate::physics::bc::BoundaryRule::Fixed,
            ))
            .run(&mesh, &mut field, 3)
            .unwrap();
        for r in &result.residual_history {
            assert_eq!(r[0], 0.0);
            assert_eq!(r[1], 0.0);
        }
    }
}
