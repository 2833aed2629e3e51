use std::io::{self, Write};

use crate::store::SimulationRecord;

/// Write stored results as a pretty-printed JSON array.
pub fn write_records<W: Write>(writer: &mut W, records: &[SimulationRecord]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writeln!(writer)
}
