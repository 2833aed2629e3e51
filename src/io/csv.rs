use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::solver::SolutionRow;
use crate::store::{SimulationRecord, TIMESTAMP_FORMAT};

/// Write solver rows as CSV.
///
/// Columns: time, x, y, z, vx, vy, vz, e0, e1, e2, e3, w1, w2, w3
#[rustfmt::skip]
pub fn write_trajectory<W: Write>(writer: &mut W, rows: &[SolutionRow]) -> io::Result<()> {
    writeln!(writer, "time,x,y,z,vx,vy,vz,e0,e1,e2,e3,w1,w2,w3")?;

    for r in rows {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            r[0], r[1], r[2], r[3], r[4], r[5], r[6],
            r[7], r[8], r[9], r[10], r[11], r[12], r[13],
        )?;
    }

    Ok(())
}

pub fn write_trajectory_file(path: &Path, rows: &[SolutionRow]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, rows)
}

const RECORD_HEADER: [&str; 12] = [
    "id",
    "timestamp",
    "inclination",
    "heading",
    "rail_length",
    "cansat_mass",
    "drag_coefficient",
    "burn_time",
    "average_thrust",
    "elevation",
    "apogee",
    "graph_image_path",
];

/// One exported record, fields in [`RECORD_HEADER`] order.
#[derive(Serialize)]
struct RecordRow<'a> {
    id: i64,
    timestamp: String,
    inclination: f64,
    heading: f64,
    rail_length: f64,
    cansat_mass: f64,
    drag_coefficient: f64,
    burn_time: f64,
    average_thrust: f64,
    elevation: f64,
    apogee: Option<String>,
    graph_image_path: Option<&'a str>,
}

impl<'a> From<&'a SimulationRecord> for RecordRow<'a> {
    fn from(r: &'a SimulationRecord) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            inclination: r.inclination,
            heading: r.heading,
            rail_length: r.rail_length,
            cansat_mass: r.cansat_mass,
            drag_coefficient: r.drag_coefficient,
            burn_time: r.burn_time,
            average_thrust: r.average_thrust,
            elevation: r.elevation,
            apogee: r.apogee.map(|a| format!("{a:.2}")),
            graph_image_path: r.graph_image_path.as_deref(),
        }
    }
}

/// Write stored results as CSV, in table column order. Missing values are
/// left empty.
pub fn write_records<W: Write>(writer: W, records: &[SimulationRecord]) -> io::Result<()> {
    let mut wtr = ::csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(RECORD_HEADER)?;
    for r in records {
        wtr.serialize(RecordRow::from(r))?;
    }
    wtr.flush()
}
