use std::fmt;
use std::str::FromStr;

use glam::{DVec2, IVec2};

use crate::error::{FvError, Result};

/// Number of layers (boundary + ghost) padded onto every side of the interior.
pub const HALO: i32 = 2;

/// Mesh axis selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The other in-plane axis.
    pub fn tangent(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Unit index step along this axis.
    pub fn unit(self) -> IVec2 {
        match self {
            Axis::X => IVec2::X,
            Axis::Y => IVec2::Y,
        }
    }

    pub fn component(self, v: DVec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }
}

impl FromStr for Axis {
    type Err = FvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            other => Err(FvError::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Geometry of a single control volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellGeometry {
    pub centroid: DVec2,
    pub width: DVec2,
}

/// Structured, non-uniform, collocated mesh over the extended index space
/// `[-2, nx+1] × [-2, ny+1]`.
///
/// Interior cells `0 ≤ i < nx`, `0 ≤ j < ny` come from the corner lattice.
/// Layer `-1` / `nx` (resp. `ny`) is the boundary layer and `-2` / `nx+1` the
/// ghost layer read by second-order stencils.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub nx: usize,
    pub ny: usize,
    points_x: Vec<f64>,
    points_y: Vec<f64>,
    cells: Vec<CellGeometry>,
}

impl Mesh {
    /// Uniform mesh of the unit square with `nx × ny` interior cells.
    pub fn build(nx: usize, ny: usize) -> Result<Self> {
        if nx < 1 || ny < 1 {
            return Err(FvError::config(format!(
                "mesh needs at least one cell per axis, got {nx}x{ny}"
            )));
        }
        let xs = super::generator::uniform_points(0.0, 1.0, nx);
        let ys = super::generator::uniform_points(0.0, 1.0, ny);
        Self::from_lattice(&xs, &ys)
    }

    /// Tensor-product mesh from strictly increasing corner coordinates.
    pub fn from_lattice(xs: &[f64], ys: &[f64]) -> Result<Self> {
        validate_points("x", xs)?;
        validate_points("y", ys)?;

        let nx = xs.len() - 1;
        let ny = ys.len() - 1;
        let mut mesh = Mesh {
            nx,
            ny,
            points_x: xs.to_vec(),
            points_y: ys.to_vec(),
            cells: vec![CellGeometry::default(); (nx + 4) * (ny + 4)],
        };
        mesh.populate();
        Ok(mesh)
    }

    fn populate(&mut self) {
        let (nx, ny) = (self.nx as i32, self.ny as i32);
        let (x0, x1) = (self.points_x[0], self.points_x[self.nx]);
        let (y0, y1) = (self.points_y[0], self.points_y[self.ny]);

        for i in 0..nx {
            for j in 0..ny {
                let (iu, ju) = (i as usize, j as usize);
                let cell = CellGeometry {
                    centroid: DVec2::new(
                        0.5 * (self.points_x[iu] + self.points_x[iu + 1]),
                        0.5 * (self.points_y[ju] + self.points_y[ju + 1]),
                    ),
                    width: DVec2::new(
                        self.points_x[iu + 1] - self.points_x[iu],
                        self.points_y[ju + 1] - self.points_y[ju],
                    ),
                };
                self.set(i, j, cell);
            }
        }

        // Bottom and top: boundary and ghost rows copy the widths of the
        // adjacent interior row, the y centroid sits on the domain edge.
        for i in 0..nx {
            let bottom = self.get(i, 0);
            let top = self.get(i, ny - 1);
            for j in [-1, -2] {
                self.set(
                    i,
                    j,
                    CellGeometry {
                        centroid: DVec2::new(bottom.centroid.x, y0),
                        width: bottom.width,
                    },
                );
            }
            for j in [ny, ny + 1] {
                self.set(
                    i,
                    j,
                    CellGeometry {
                        centroid: DVec2::new(top.centroid.x, y1),
                        width: top.width,
                    },
                );
            }
        }

        for j in 0..ny {
            let left = self.get(0, j);
            let right = self.get(nx - 1, j);
            for i in [-1, -2] {
                self.set(
                    i,
                    j,
                    CellGeometry {
                        centroid: DVec2::new(x0, left.centroid.y),
                        width: left.width,
                    },
                );
            }
            for i in [nx, nx + 1] {
                self.set(
                    i,
                    j,
                    CellGeometry {
                        centroid: DVec2::new(x1, right.centroid.y),
                        width: right.width,
                    },
                );
            }
        }

        // Boundary-layer corners only carry the domain corner position.
        for (i, j, corner) in [
            (-1, -1, DVec2::new(x0, y0)),
            (nx, -1, DVec2::new(x1, y0)),
            (-1, ny, DVec2::new(x0, y1)),
            (nx, ny, DVec2::new(x1, y1)),
        ] {
            self.set(
                i,
                j,
                CellGeometry {
                    centroid: corner,
                    width: DVec2::ZERO,
                },
            );
        }
    }

    #[inline]
    fn offset(&self, i: i32, j: i32) -> Option<usize> {
        let (w, h) = (self.nx as i32 + 2 * HALO, self.ny as i32 + 2 * HALO);
        let (a, b) = (i + HALO, j + HALO);
        if a < 0 || b < 0 || a >= w || b >= h {
            return None;
        }
        Some(a as usize * h as usize + b as usize)
    }

    // Only called with indices produced by `populate`'s own loops.
    fn get(&self, i: i32, j: i32) -> CellGeometry {
        self.offset(i, j).map(|k| self.cells[k]).unwrap_or_default()
    }

    fn set(&mut self, i: i32, j: i32, cell: CellGeometry) {
        if let Some(k) = self.offset(i, j) {
            self.cells[k] = cell;
        }
    }

    /// Whether `(i, j)` lies inside the extended index space.
    pub fn contains(&self, cell: IVec2) -> bool {
        self.offset(cell.x, cell.y).is_some()
    }

    /// Whether `(i, j)` is a real (interior) cell.
    pub fn is_interior(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.nx as i32 && cell.y < self.ny as i32
    }

    pub fn cell(&self, i: i32, j: i32) -> Result<&CellGeometry> {
        self.offset(i, j)
            .map(|k| &self.cells[k])
            .ok_or(FvError::Index { i, j })
    }

    pub fn centroid(&self, i: i32, j: i32, axis: Axis) -> Result<f64> {
        self.cell(i, j).map(|c| axis.component(c.centroid))
    }

    pub fn width(&self, i: i32, j: i32, axis: Axis) -> Result<f64> {
        self.cell(i, j).map(|c| axis.component(c.width))
    }

    /// Width lookup keyed by an index pair.
    pub fn width_at(&self, cell: IVec2, axis: Axis) -> Result<f64> {
        self.width(cell.x, cell.y, axis)
    }

    /// Corner coordinates along `axis`.
    pub fn points(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.points_x,
            Axis::Y => &self.points_y,
        }
    }

    /// Number of cells along each axis of the extended index space.
    pub fn extended_shape(&self) -> (usize, usize) {
        (self.nx + 4, self.ny + 4)
    }

    /// Iterate interior cells in sweep order (`i` outer, `j` inner).
    pub fn interior_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.nx as i32).flat_map(move |i| (0..self.ny as i32).map(move |j| IVec2::new(i, j)))
    }

    /// Dump the geometry arrays at `debug` level, top row first.
    pub fn log_geometry(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let tables: [(&str, fn(&CellGeometry) -> f64); 4] = [
            ("centroid position x", |c| c.centroid.x),
            ("centroid position y", |c| c.centroid.y),
            ("cell width x", |c| c.width.x),
            ("cell width y", |c| c.width.y),
        ];
        let (imax, jmax) = (self.nx as i32 + HALO, self.ny as i32 + HALO);
        for (title, value) in tables {
            let mut out = String::new();
            for j in (-HALO..jmax).rev() {
                let row: Vec<String> = (-HALO..imax)
                    .map(|i| format!("{:8.4}", value(&self.get(i, j))))
                    .collect();
                out.push_str(&row.join(" "));
                out.push('\n');
            }
            log::debug!("{title}\n{out}");
        }
    }
}

fn validate_points(name: &str, points: &[f64]) -> Result<()> {
    if points.len() < 2 {
        return Err(FvError::config(format!(
            "{name} lattice needs at least two points, got {}",
            points.len()
        )));
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(FvError::config(format!("{name} lattice has non-finite points")));
    }
    if points.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FvError::config(format!(
            "{name} lattice must be strictly increasing"
        )));
    }
    Ok(())
}
