use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use frep_tree::{Expression, ShapeArchive};

use super::PersistError;

/// Writes a single-shape archive of `expr` to `path`.
pub fn export_shape(
    archive: &dyn ShapeArchive,
    expr: &Expression,
    path: &Path,
) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|e| PersistError::io(path, e))?;
    let mut out = BufWriter::new(file);
    archive.write_shape(expr.tree(), &mut out)?;
    out.flush().map_err(|e| PersistError::io(path, e))?;
    log::info!("exported {} to {}", expr.id(), path.display());
    Ok(())
}
