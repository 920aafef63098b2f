use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::dynamics::Sample;

pub const HEADER: &str = "t,y,v,u,error";

/// Write recorded history to CSV format.
///
/// Columns: t (time), y (position), v (velocity), u (output), error.
/// Values use `f64`'s `Display` form, rows in recording order.
pub fn write_history<W: Write>(writer: &mut W, history: &[Sample]) -> io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for s in history {
        let (t, y, v, u, error) = s.as_tuple();
        writeln!(writer, "{t},{y},{v},{u},{error}")?;
    }
    Ok(())
}

/// Write history to a CSV file at the given path.
pub fn write_history_file<P: AsRef<Path>>(path: P, history: &[Sample]) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);
    write_history(&mut file, history)?;
    file.flush()?;
    info!(path = %path.display(), rows = history.len(), "exported history");
    Ok(())
}
