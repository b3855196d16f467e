pub mod bc;

use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use nalgebra::DMatrix;

use crate::discretization::mesh::{Mesh, HALO};
use crate::error::{FvError, Result};

/// Transported quantities stored per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldChannel {
    U,
    V,
    Phi,
}

impl FieldChannel {
    pub const ALL: [FieldChannel; 3] = [FieldChannel::U, FieldChannel::V, FieldChannel::Phi];

    pub fn index(self) -> usize {
        match self {
            FieldChannel::U => 0,
            FieldChannel::V => 1,
            FieldChannel::Phi => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        FieldChannel::ALL
            .get(index)
            .copied()
            .ok_or_else(|| FvError::InvalidField(index.to_string()))
    }
}

impl FromStr for FieldChannel {
    type Err = FvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u" => Ok(FieldChannel::U),
            "v" => Ok(FieldChannel::V),
            "phi" => Ok(FieldChannel::Phi),
            _ => Err(FvError::InvalidField(s.to_string())),
        }
    }
}

impl fmt::Display for FieldChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChannel::U => write!(f, "u"),
            FieldChannel::V => write!(f, "v"),
            FieldChannel::Phi => write!(f, "phi"),
        }
    }
}

/// Solution `(u, v, phi)` over the extended index space. Matrix entry
/// `(i + 2, j + 2)` holds cell `(i, j)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    nx: usize,
    ny: usize,
    channels: [DMatrix<f64>; 3],
}

impl FieldArray {
    pub fn zeros(mesh: &Mesh) -> Self {
        let (w, h) = mesh.extended_shape();
        Self {
            nx: mesh.nx,
            ny: mesh.ny,
            channels: std::array::from_fn(|_| DMatrix::zeros(w, h)),
        }
    }

    /// Wrap caller-supplied `(nx+4) × (ny+4)` arrays.
    pub fn from_channels(
        mesh: &Mesh,
        u: DMatrix<f64>,
        v: DMatrix<f64>,
        phi: DMatrix<f64>,
    ) -> Result<Self> {
        let shape = mesh.extended_shape();
        for (name, m) in [("u", &u), ("v", &v), ("phi", &phi)] {
            if m.shape() != shape {
                return Err(FvError::config(format!(
                    "{name} has shape {:?}, expected {:?}",
                    m.shape(),
                    shape
                )));
            }
        }
        Ok(Self {
            nx: mesh.nx,
            ny: mesh.ny,
            channels: [u, v, phi],
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    fn position(&self, cell: IVec2) -> Result<(usize, usize)> {
        let (a, b) = (cell.x + HALO, cell.y + HALO);
        let (w, h) = self.channels[0].shape();
        if a < 0 || b < 0 || a as usize >= w || b as usize >= h {
            return Err(FvError::Index {
                i: cell.x,
                j: cell.y,
            });
        }
        Ok((a as usize, b as usize))
    }

    pub fn get(&self, cell: IVec2, channel: FieldChannel) -> Result<f64> {
        let pos = self.position(cell)?;
        Ok(self.channels[channel.index()][pos])
    }

    pub fn set(&mut self, cell: IVec2, channel: FieldChannel, value: f64) -> Result<()> {
        let pos = self.position(cell)?;
        self.channels[channel.index()][pos] = value;
        Ok(())
    }

    pub fn channel(&self, channel: FieldChannel) -> &DMatrix<f64> {
        &self.channels[channel.index()]
    }

    pub fn channel_mut(&mut self, channel: FieldChannel) -> &mut DMatrix<f64> {
        &mut self.channels[channel.index()]
    }

    /// Set every entry of a channel, boundary and ghost layers included.
    pub fn fill(&mut self, channel: FieldChannel, value: f64) {
        self.channels[channel.index()].fill(value);
    }

    /// Interior values of a channel as an `nx × ny` matrix.
    pub fn interior(&self, channel: FieldChannel) -> DMatrix<f64> {
        let h = HALO as usize;
        self.channels[channel.index()]
            .view((h, h), (self.nx, self.ny))
            .into_owned()
    }

    /// Largest absolute entrywise change per channel relative to `previous`.
    /// A NaN anywhere in a channel makes that channel's entry NaN.
    pub fn max_abs_difference(&self, previous: &FieldArray) -> [f64; 3] {
        std::array::from_fn(|k| {
            (&self.channels[k] - &previous.channels[k])
                .iter()
                .fold(0.0_f64, |acc, d| {
                    if acc.is_nan() || d.is_nan() {
                        f64::NAN
                    } else {
                        acc.max(d.abs())
                    }
                })
        })
    }
}
