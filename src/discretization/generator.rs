use super::mesh::Mesh;
use crate::error::{FvError, Result};

/// `n + 1` evenly spaced corner coordinates spanning `[start, end]`.
pub fn uniform_points(start: f64, end: f64, n: usize) -> Vec<f64> {
    let h = (end - start) / n as f64;
    (0..=n)
        .map(|k| if k == n { end } else { start + k as f64 * h })
        .collect()
}

/// `n + 1` corner coordinates on `[start, end]` whose spacing grows by
/// `ratio` from one cell to the next.
pub fn stretched_points(start: f64, end: f64, n: usize, ratio: f64) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(FvError::config("stretched lattice needs at least one cell"));
    }
    if !(ratio > 0.0) || !ratio.is_finite() {
        return Err(FvError::config(format!("stretching ratio must be positive, got {ratio}")));
    }
    if (ratio - 1.0).abs() < 1e-12 {
        return Ok(uniform_points(start, end, n));
    }

    // First spacing from the geometric series h0 * (r^n - 1) / (r - 1) = L.
    let length = end - start;
    let h0 = length * (ratio - 1.0) / (ratio.powi(n as i32) - 1.0);

    let mut points = Vec::with_capacity(n + 1);
    let mut x = start;
    let mut h = h0;
    points.push(x);
    for _ in 1..n {
        x += h;
        points.push(x);
        h *= ratio;
    }
    points.push(end);
    Ok(points)
}

/// Uniform mesh on `[0, width[0]] × [0, width[1]]`.
pub fn create_regular_mesh(width: [f64; 2], nx: usize, ny: usize) -> Result<Mesh> {
    if nx < 1 || ny < 1 {
        return Err(FvError::config(format!(
            "mesh needs at least one cell per axis, got {nx}x{ny}"
        )));
    }
    Mesh::from_lattice(
        &uniform_points(0.0, width[0], nx),
        &uniform_points(0.0, width[1], ny),
    )
}

/// Mesh on `[0, width[0]] × [0, width[1]]` geometrically stretched along both
/// axes.
pub fn create_stretched_mesh(
    width: [f64; 2],
    nx: usize,
    ny: usize,
    ratio: [f64; 2],
) -> Result<Mesh> {
    Mesh::from_lattice(
        &stretched_points(0.0, width[0], nx, ratio[0])?,
        &stretched_points(0.0, width[1], ny, ratio[1])?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_points_hit_both_ends() {
        let p = uniform_points(0.0, 1.0, 3);
        assert_eq!(p.len(), 4);
        assert_eq!(p[0], 0.0);
        assert_eq!(p[3], 1.0);
        assert!((p[1] - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn stretched_spacing_grows_by_ratio() {
        let p = stretched_points(0.0, 1.0, 4, 2.0).unwrap();
        let h: Vec<f64> = p.windows(2).map(|w| w[1] - w[0]).collect();
        for k in 1..h.len() {
            assert!((h[k] / h[k - 1] - 2.0).abs() < 1e-9);
        }
        assert_eq!(*p.last().unwrap(), 1.0);
    }

    #[test]
    fn stretched_rejects_bad_ratio() {
        assert!(stretched_points(0.0, 1.0, 4, 0.0).is_err());
        assert!(stretched_points(0.0, 1.0, 4, f64::NAN).is_err());
    }
}
