use glam::DVec2;

use super::{FieldArray, FieldChannel};
use crate::discretization::mesh::HALO;

/// Side of the rectangular domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    Left,
    Right,
    Bottom,
    Top,
}

impl BoundarySide {
    pub const ALL: [BoundarySide; 4] = [
        BoundarySide::Left,
        BoundarySide::Right,
        BoundarySide::Bottom,
        BoundarySide::Top,
    ];
}

/// How the boundary and ghost layers of one side are maintained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryRule {
    /// Values are held as supplied by the caller (Dirichlet data).
    #[default]
    Fixed,
    /// Boundary and ghost cells mirror the nearest interior cell.
    ZeroGradient,
}

/// Boundary rules for the scalar channel, one per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryConditions {
    pub left: BoundaryRule,
    pub right: BoundaryRule,
    pub bottom: BoundaryRule,
    pub top: BoundaryRule,
}

impl BoundaryConditions {
    pub fn fixed() -> Self {
        Self::default()
    }

    pub fn zero_gradient() -> Self {
        Self {
            left: BoundaryRule::ZeroGradient,
            right: BoundaryRule::ZeroGradient,
            bottom: BoundaryRule::ZeroGradient,
            top: BoundaryRule::ZeroGradient,
        }
    }

    /// Zero-gradient on the sides the flow leaves through, fixed on the sides
    /// it enters through. A zero velocity component fixes both sides of that
    /// axis.
    pub fn upwind_outflow(velocity: DVec2) -> Self {
        let pick = |outflow: bool| {
            if outflow {
                BoundaryRule::ZeroGradient
            } else {
                BoundaryRule::Fixed
            }
        };
        Self {
            left: pick(velocity.x < 0.0),
            right: pick(velocity.x > 0.0),
            bottom: pick(velocity.y < 0.0),
            top: pick(velocity.y > 0.0),
        }
    }

    pub fn with(mut self, side: BoundarySide, rule: BoundaryRule) -> Self {
        *self.rule_mut(side) = rule;
        self
    }

    pub fn rule(&self, side: BoundarySide) -> BoundaryRule {
        match side {
            BoundarySide::Left => self.left,
            BoundarySide::Right => self.right,
            BoundarySide::Bottom => self.bottom,
            BoundarySide::Top => self.top,
        }
    }

    fn rule_mut(&mut self, side: BoundarySide) -> &mut BoundaryRule {
        match side {
            BoundarySide::Left => &mut self.left,
            BoundarySide::Right => &mut self.right,
            BoundarySide::Bottom => &mut self.bottom,
            BoundarySide::Top => &mut self.top,
        }
    }

    /// Re-apply every zero-gradient copy to the scalar channel. Velocity
    /// channels are left to the caller.
    pub fn apply(&self, field: &mut FieldArray) {
        for side in BoundarySide::ALL {
            if self.rule(side) == BoundaryRule::ZeroGradient {
                mirror_side(field, side, FieldChannel::Phi);
            }
        }
    }
}

/// Copy the nearest interior value into the boundary and ghost cells of one
/// side. Corners are untouched.
pub fn mirror_side(field: &mut FieldArray, side: BoundarySide, channel: FieldChannel) {
    let h = HALO as usize;
    let (nx, ny) = (field.nx(), field.ny());
    let m = field.channel_mut(channel);
    match side {
        BoundarySide::Left => {
            for b in h..h + ny {
                let v = m[(h, b)];
                m[(h - 1, b)] = v;
                m[(h - 2, b)] = v;
            }
        }
        BoundarySide::Right => {
            for b in h..h + ny {
                let v = m[(h + nx - 1, b)];
                m[(h + nx, b)] = v;
                m[(h + nx + 1, b)] = v;
            }
        }
        BoundarySide::Bottom => {
            for a in h..h + nx {
                let v = m[(a, h)];
                m[(a, h - 1)] = v;
                m[(a, h - 2)] = v;
            }
        }
        BoundarySide::Top => {
            for a in h..h + nx {
                let v = m[(a, h + ny - 1)];
                m[(a, h + ny)] = v;
                m[(a, h + ny + 1)] = v;
            }
        }
    }
}

/// Set the boundary and ghost cells of one side (corners excluded) to a
/// constant, e.g. Dirichlet inflow data.
pub fn fill_side(field: &mut FieldArray, side: BoundarySide, channel: FieldChannel, value: f64) {
    let h = HALO as usize;
    let (nx, ny) = (field.nx(), field.ny());
    let m = field.channel_mut(channel);
    match side {
        BoundarySide::Left => {
            for b in h..h + ny {
                m[(0, b)] = value;
                m[(1, b)] = value;
            }
        }
        BoundarySide::Right => {
            for b in h..h + ny {
                m[(h + nx, b)] = value;
                m[(h + nx + 1, b)] = value;
            }
        }
        BoundarySide::Bottom => {
            for a in h..h + nx {
                m[(a, 0)] = value;
                m[(a, 1)] = value;
            }
        }
        BoundarySide::Top => {
            for a in h..h + nx {
                m[(a, h + ny)] = value;
                m[(a, h + ny + 1)] = value;
            }
        }
    }
}
