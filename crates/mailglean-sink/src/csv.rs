use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::table::BatchTable;

pub fn write_table<W: Write>(writer: W, table: &BatchTable) -> Result<()> {
    write_inner(csv::Writer::from_writer(writer), table)
}

pub fn write_table_file(path: &Path, table: &BatchTable) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_inner(writer, table)?;
    info!(path = %path.display(), rows = table.rows.len(), "csv export written");
    Ok(())
}

fn write_inner<W: Write>(mut out: csv::Writer<W>, table: &BatchTable) -> Result<()> {
    out.write_record(&table.headers)?;
    for row in &table.rows {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}
