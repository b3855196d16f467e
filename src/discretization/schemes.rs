//! Face discretization schemes.
//!
//! Every function returns a 5-slot [`Coefficients`] vector for the axis the
//! face normal points along, ordered `LL L P R RR` (x) or `BB B P T TT` (y).

use glam::{DVec2, IVec2};
use nalgebra::Vector5;

use super::mesh::Mesh;
use super::stencil::{FaceDirection, FaceStencil};
use crate::error::{FvError, Result};

pub type Coefficients = Vector5<f64>;

/// Converts owner-side contributions to the right-hand-side sign convention of
/// the assembled cell balance.
pub fn balance_flip() -> Coefficients {
    Coefficients::new(-1.0, -1.0, 1.0, -1.0, -1.0)
}

/// Unit weight on the first upstream cell.
pub fn first_order_upwind(
    cell: IVec2,
    mesh: &Mesh,
    direction: FaceDirection,
    velocity: DVec2,
) -> Result<Coefficients> {
    let face = FaceStencil::build(cell, direction, mesh, Some(velocity))?;
    let mut apn = Coefficients::zeros();
    apn[face.neighbor1_slot] = 1.0;

    log::trace!("FOU {direction} {:?}: {:?}", cell, apn.as_slice());
    Ok(apn)
}

/// Linear extrapolation from the two upstream cells, already in balance form
/// for a signed face flux.
pub fn second_order_upwind(
    cell: IVec2,
    mesh: &Mesh,
    direction: FaceDirection,
    velocity: DVec2,
) -> Result<Coefficients> {
    let face = FaceStencil::build(cell, direction, mesh, Some(velocity))?;
    let w1 = mesh.width_at(face.neighbor1, face.size_axis)?;
    let w2 = mesh.width_at(face.neighbor2, face.size_axis)?;
    let ratio = width_ratio(cell, w1, w2)?;

    // Accumulate so a degenerate stencil (neighbor1 == neighbor2) keeps a
    // unit weight.
    let mut apn = Coefficients::zeros();
    apn[face.neighbor1_slot] += 1.0 + ratio;
    apn[face.neighbor2_slot] -= ratio;

    let side = DVec2::ONE.dot(face.normal.as_dvec2());
    let apn = (apn * side).component_mul(&balance_flip());

    log::trace!("SOU {direction} {:?}: {:?}", cell, apn.as_slice());
    Ok(apn)
}

/// Distance-weighted interpolation between the owner and the cell across the
/// face.
pub fn linear(cell: IVec2, mesh: &Mesh, direction: FaceDirection) -> Result<Coefficients> {
    let face = FaceStencil::build(cell, direction, mesh, None)?;
    let cell_size = mesh.width_at(face.owner, face.size_axis)?;
    let neighbor_size = mesh.width_at(face.neighbor1, face.size_axis)?;
    let total = positive_sum(cell, cell_size, neighbor_size)?;

    let mut apn = Coefficients::zeros();
    apn[face.neighbor1_slot] = cell_size / total;
    apn[face.owner_slot] = neighbor_size / total;

    log::trace!("LIN {direction} {:?}: {:?}", cell, apn.as_slice());
    Ok(apn)
}

/// Two-point gradient conductance `2 A / (w_P + w_N)` on both the owner and
/// the neighbor.
pub fn central_difference(
    cell: IVec2,
    mesh: &Mesh,
    direction: FaceDirection,
) -> Result<Coefficients> {
    let face = FaceStencil::build(cell, direction, mesh, None)?;
    let cell_size = mesh.width_at(face.owner, face.size_axis)?;
    let neighbor_size = mesh.width_at(face.neighbor1, face.size_axis)?;
    let conductance = 2.0 * face.area / positive_sum(cell, cell_size, neighbor_size)?;

    let mut apn = Coefficients::zeros();
    apn[face.neighbor1_slot] = conductance;
    apn[face.owner_slot] = conductance;

    log::trace!("CD  {direction} {:?}: {:?}", cell, apn.as_slice());
    Ok(apn)
}

fn positive_sum(cell: IVec2, a: f64, b: f64) -> Result<f64> {
    let total = a + b;
    if !(total > 0.0) {
        return Err(FvError::DivisionSingularity {
            i: cell.x,
            j: cell.y,
            value: total,
        });
    }
    Ok(total)
}

fn width_ratio(cell: IVec2, w1: f64, w2: f64) -> Result<f64> {
    Ok(w1 / positive_sum(cell, w1, w2)?)
}

/// Convection term discretization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvectionScheme {
    #[default]
    FirstOrderUpwind,
    SecondOrderUpwind,
    Linear,
}

impl ConvectionScheme {
    /// Contribution of one face per unit signed flux, in balance form: the
    /// owner slot adds to the diagonal, the others multiply neighbor values on
    /// the right-hand side.
    ///
    /// The upstream side follows the sign of `velocity` along the face normal,
    /// so it must be the velocity on the face that produced the flux.
    pub fn balance_coefficients(
        self,
        cell: IVec2,
        mesh: &Mesh,
        direction: FaceDirection,
        velocity: DVec2,
    ) -> Result<Coefficients> {
        let side = direction.sign() as f64;
        match self {
            ConvectionScheme::FirstOrderUpwind => {
                let raw = first_order_upwind(cell, mesh, direction, velocity)?;
                Ok((raw * side).component_mul(&balance_flip()))
            }
            ConvectionScheme::SecondOrderUpwind => {
                second_order_upwind(cell, mesh, direction, velocity)
            }
            ConvectionScheme::Linear => {
                let raw = linear(cell, mesh, direction)?;
                Ok((raw * side).component_mul(&balance_flip()))
            }
        }
    }
}

/// Diffusion term discretization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffusionScheme {
    #[default]
    CentralDifference,
}

impl DiffusionScheme {
    /// Contribution of one face per unit diffusivity, already in balance form.
    pub fn balance_coefficients(
        self,
        cell: IVec2,
        mesh: &Mesh,
        direction: FaceDirection,
    ) -> Result<Coefficients> {
        match self {
            DiffusionScheme::CentralDifference => central_difference(cell, mesh, direction),
        }
    }
}
