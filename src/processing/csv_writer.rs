use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::discretization::mesh::{Axis, Mesh};
use crate::physics::{FieldArray, FieldChannel};

/// Write column data to a CSV file with a header row
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = File::create(path)?;
    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);
    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| col.get(i).map(|v| format!("{v:.15e}")).unwrap_or_default())
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

/// Interior cells as rows of `x, y, u, v, phi`, in sweep order.
pub fn write_field<P: AsRef<Path>>(path: P, mesh: &Mesh, field: &FieldArray) -> io::Result<()> {
    if field.nx() != mesh.nx || field.ny() != mesh.ny {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "field is {}x{} but mesh is {}x{}",
                field.nx(),
                field.ny(),
                mesh.nx,
                mesh.ny
            ),
        ));
    }

    let n = mesh.nx * mesh.ny;
    let mut columns: [Vec<f64>; 5] = std::array::from_fn(|_| Vec::with_capacity(n));
    for cell in mesh.interior_cells() {
        let geometry = mesh
            .cell(cell.x, cell.y)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        columns[0].push(Axis::X.component(geometry.centroid));
        columns[1].push(Axis::Y.component(geometry.centroid));
        for (k, channel) in FieldChannel::ALL.into_iter().enumerate() {
            let value = field
                .get(cell, channel)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            columns[2 + k].push(value);
        }
    }

    write_csv(path, &["x", "y", "u", "v", "phi"], &columns)
}

/// One row per sweep: `sweep, u, v, phi`.
pub fn write_residual_history<P: AsRef<Path>>(path: P, history: &[[f64; 3]]) -> io::Result<()> {
    let mut columns: [Vec<f64>; 4] = std::array::from_fn(|_| Vec::with_capacity(history.len()));
    for (it, residual) in history.iter().enumerate() {
        columns[0].push((it + 1) as f64);
        for k in 0..3 {
            columns[1 + k].push(residual[k]);
        }
    }
    write_csv(path, &["sweep", "u", "v", "phi"], &columns)
}
