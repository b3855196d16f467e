use glam::IVec2;

use super::mesh::Mesh;
use super::stencil::FaceDirection;
use crate::error::{FvError, Result};
use crate::physics::{FieldArray, FieldChannel};

/// Linearly interpolate `channel` from cell `(i, j)` and the cell across
/// `direction` onto their shared face. Exact for linear profiles on
/// non-uniform meshes.
pub fn linear(
    cell: IVec2,
    mesh: &Mesh,
    field: &FieldArray,
    direction: FaceDirection,
    channel: FieldChannel,
) -> Result<f64> {
    let axis = direction.axis();
    let neighbor = cell + direction.normal();

    let width = mesh.width_at(cell, axis)?;
    let neighbor_width = mesh.width_at(neighbor, axis)?;
    let total = width + neighbor_width;
    if !(total > 0.0) {
        return Err(FvError::DivisionSingularity {
            i: cell.x,
            j: cell.y,
            value: total,
        });
    }

    Ok((field.get(cell, channel)? * neighbor_width + field.get(neighbor, channel)? * width) / total)
}
