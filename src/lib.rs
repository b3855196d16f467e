//! Steady two-dimensional scalar transport on structured, non-uniform
//! finite-volume meshes.
//!
//! A [`Mesh`] pads the interior with one boundary and one ghost layer per
//! side. Face stencils feed the convection and diffusion schemes, and the
//! [`RelaxationSolver`] relaxes the scalar channel of a [`FieldArray`] by
//! Gauss-Seidel substitution.

pub mod discretization;
pub mod error;
pub mod numerics;
pub mod physics;
pub mod processing;

pub use discretization::mesh::{Axis, Mesh};
pub use discretization::schemes::{Coefficients, ConvectionScheme, DiffusionScheme};
pub use discretization::stencil::{FaceDirection, FaceStencil};
pub use error::{FvError, Result};
pub use numerics::solver::{RelaxationSolver, SolverResult};
pub use physics::bc::{BoundaryConditions, BoundaryRule, BoundarySide};
pub use physics::{FieldArray, FieldChannel};
