use std::fmt;
use std::str::FromStr;

use glam::{DVec2, IVec2};

use super::mesh::{Axis, Mesh};
use crate::error::{FvError, Result};

/// Slot of the owner cell in a 5-slot coefficient vector.
pub const OWNER_SLOT: usize = 2;

/// One of the four faces of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    Top,
    Bottom,
    Left,
    Right,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 4] = [
        FaceDirection::Top,
        FaceDirection::Bottom,
        FaceDirection::Left,
        FaceDirection::Right,
    ];

    /// Outward unit normal in index space.
    pub fn normal(self) -> IVec2 {
        match self {
            FaceDirection::Top => IVec2::new(0, 1),
            FaceDirection::Bottom => IVec2::new(0, -1),
            FaceDirection::Left => IVec2::new(-1, 0),
            FaceDirection::Right => IVec2::new(1, 0),
        }
    }

    /// Axis the normal points along. Also the coefficient vector this face
    /// contributes to.
    pub fn axis(self) -> Axis {
        match self {
            FaceDirection::Top | FaceDirection::Bottom => Axis::Y,
            FaceDirection::Left | FaceDirection::Right => Axis::X,
        }
    }

    /// `sum(normal)`: `+1` for Top/Right, `-1` for Bottom/Left.
    pub fn sign(self) -> i32 {
        let n = self.normal();
        n.x + n.y
    }
}

impl FromStr for FaceDirection {
    type Err = FvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "t" | "top" => Ok(FaceDirection::Top),
            "b" | "bottom" => Ok(FaceDirection::Bottom),
            "l" | "left" => Ok(FaceDirection::Left),
            "r" | "right" => Ok(FaceDirection::Right),
            _ => Err(FvError::InvalidFace(s.to_string())),
        }
    }
}

impl fmt::Display for FaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaceDirection::Top => "T",
            FaceDirection::Bottom => "B",
            FaceDirection::Left => "L",
            FaceDirection::Right => "R",
        };
        write!(f, "{s}")
    }
}

/// Cells referenced by the discretization of a single face, in mesh index
/// space and in coefficient-slot space.
///
/// Without a velocity the stencil is centered: `neighbor1` is across the face
/// and `neighbor2` one further. With a velocity both step upstream from the
/// face and `neighbor_downwind` is the cell on the other side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceStencil {
    pub direction: FaceDirection,
    pub normal: IVec2,
    /// Direction stepped from the face to reach `neighbor1`. Equals `normal`
    /// for centered stencils, zero when the normal velocity vanishes.
    pub upstream: IVec2,
    pub area: f64,
    pub owner: IVec2,
    pub owner_slot: usize,
    /// Face position in half-index units.
    pub face_position: DVec2,
    pub neighbor1: IVec2,
    pub neighbor1_slot: usize,
    pub neighbor2: IVec2,
    pub neighbor2_slot: usize,
    pub neighbor_downwind: Option<IVec2>,
    pub neighbor_downwind_slot: Option<usize>,
    /// Width component read for cells along the normal.
    pub size_axis: Axis,
}

impl FaceStencil {
    pub fn build(
        cell: IVec2,
        direction: FaceDirection,
        mesh: &Mesh,
        velocity: Option<DVec2>,
    ) -> Result<Self> {
        let axis = direction.axis();
        let normal = direction.normal();
        let area = mesh.width_at(cell, axis.tangent())?;
        let face_position = cell.as_dvec2() + 0.5 * normal.as_dvec2();

        let slot = |target: IVec2| slot_for(cell, target, axis);

        let Some(velocity) = velocity else {
            let neighbor1 = cell + normal;
            let neighbor2 = cell + normal * 2;
            return Ok(Self {
                direction,
                normal,
                upstream: normal,
                area,
                owner: cell,
                owner_slot: OWNER_SLOT,
                face_position,
                neighbor1,
                neighbor1_slot: slot(neighbor1),
                neighbor2,
                neighbor2_slot: slot(neighbor2),
                neighbor_downwind: None,
                neighbor_downwind_slot: None,
                size_axis: axis,
            });
        };

        // Upstream is against the velocity, restricted to the normal axis.
        let up = -sign(axis.component(velocity));
        let upstream = axis.unit() * up;

        // Work in doubled coordinates so the half-index face position stays
        // integral; `div_euclid` floors for ghost indices as well.
        let face2 = 2 * cell + normal;
        let half_step = |offset: i32| {
            let mut target = cell;
            let along = (axis_component(face2, axis) + offset).div_euclid(2);
            set_axis_component(&mut target, axis, along);
            target
        };

        let neighbor1 = half_step(up);
        let neighbor2 = neighbor1 + upstream;
        let downwind = half_step(-up);

        Ok(Self {
            direction,
            normal,
            upstream,
            area,
            owner: cell,
            owner_slot: OWNER_SLOT,
            face_position,
            neighbor1,
            neighbor1_slot: slot(neighbor1),
            neighbor2,
            neighbor2_slot: slot(neighbor2),
            neighbor_downwind: Some(downwind),
            neighbor_downwind_slot: Some(slot(downwind)),
            size_axis: axis,
        })
    }

    /// True when the normal velocity was zero and the upstream cells
    /// coincide.
    pub fn is_degenerate(&self) -> bool {
        self.upstream == IVec2::ZERO
    }
}

fn sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn axis_component(v: IVec2, axis: Axis) -> i32 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
    }
}

fn set_axis_component(v: &mut IVec2, axis: Axis, value: i32) {
    match axis {
        Axis::X => v.x = value,
        Axis::Y => v.y = value,
    }
}

// Stencils reach at most two cells from the owner, so the slot is in [0, 4].
fn slot_for(owner: IVec2, target: IVec2, axis: Axis) -> usize {
    let offset = axis_component(target - owner, axis);
    debug_assert!((-2..=2).contains(&offset), "stencil offset {offset} out of range");
    (OWNER_SLOT as i32 + offset) as usize
}
