pub mod solver;
pub mod timing;

use crate::physics::FieldChannel;

/// Stopping tolerance applied by a caller to sweep residuals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    Absolute(f64),
    Relative(f64),
    Combined(f64, f64),
}

/// Which residual channels feed the convergence norm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvergenceMetric {
    /// Scalar channel only.
    #[default]
    Scalar,
    /// Largest residual over all channels.
    MaxNorm,
}

/// Caller-side convergence check. The relaxation core never stops on its
/// own; drivers use this from the sweep callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    pub tolerance: Tolerance,
    pub metric: ConvergenceMetric,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::Absolute(1e-8),
            metric: ConvergenceMetric::Scalar,
        }
    }
}

impl Convergence {
    pub fn norm(&self, residual: &[f64; 3]) -> f64 {
        match self.metric {
            ConvergenceMetric::Scalar => residual[FieldChannel::Phi.index()],
            ConvergenceMetric::MaxNorm => residual.iter().copied().fold(0.0, f64::max),
        }
    }

    pub fn check_tolerance(&self, norm: f64, initial_norm: f64) -> bool {
        match self.tolerance {
            Tolerance::Absolute(tol) => norm < tol,
            Tolerance::Relative(tol) => initial_norm > 0.0 && norm / initial_norm < tol,
            Tolerance::Combined(abs_tol, rel_tol) => {
                norm < abs_tol || (initial_norm > 0.0 && norm / initial_norm < rel_tol)
            }
        }
    }

    pub fn is_converged(&self, residual: &[f64; 3], initial_residual: &[f64; 3]) -> bool {
        self.check_tolerance(self.norm(residual), self.norm(initial_residual))
    }
}
