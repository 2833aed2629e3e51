//! Trajectory figures rendered to PNG with plotters.
//!
//! The profile figure (altitude and vertical velocity against time) is always
//! written. The 3D trajectory figure is optional, see [`PlotSettings::save_3d`].

use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::TrajectorySample;

const FONT: &str = "sans-serif";

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("cannot create plot directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("drawing {} failed: {message}", path.display())]
    Draw { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How image files are named from the run timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FileNaming {
    /// `YYYYMMDD_HHMMSS.png`; runs within the same second overwrite each other.
    #[default]
    Seconds,
    /// `YYYYMMDD_HHMMSS_mmm.png`.
    Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSettings {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    /// Also write the 3D trajectory figure.
    pub save_3d: bool,
    pub naming: FileNaming,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_in: 10.0,
            height_in: 8.0,
            save_3d: false,
            naming: FileNaming::Seconds,
        }
    }
}

impl PlotSettings {
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Typographic points to pixels.
    fn px(&self, points: f64) -> u32 {
        (points * f64::from(self.dpi) / 72.0).round().max(1.0) as u32
    }
}

/// Files written by one [`render`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlots {
    pub file_name: String,
    pub path: PathBuf,
    pub path_3d: Option<PathBuf>,
}

pub fn file_stem(run_timestamp: NaiveDateTime, naming: FileNaming) -> String {
    match naming {
        FileNaming::Seconds => run_timestamp.format("%Y%m%d_%H%M%S").to_string(),
        FileNaming::Millis => run_timestamp.format("%Y%m%d_%H%M%S_%3f").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the trajectory into `output_dir`, creating it if needed.
///
/// On failure nothing produced by this call is left on disk.
pub fn render(
    trajectory: &[TrajectorySample],
    output_dir: &Path,
    run_timestamp: NaiveDateTime,
    settings: &PlotSettings,
) -> Result<RenderedPlots, PlotError> {
    fs::create_dir_all(output_dir).map_err(|source| PlotError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let stem = file_stem(run_timestamp, settings.naming);
    let file_name = format!("{stem}.png");
    let path = output_dir.join(&file_name);

    write_or_remove(&path, |p| draw_profile(p, trajectory, settings))?;

    let path_3d = if settings.save_3d {
        let p3 = output_dir.join(format!("{stem}_3d.png"));
        if let Err(e) = write_or_remove(&p3, |p| draw_trajectory_3d(p, trajectory, settings)) {
            remove_quietly(&path);
            return Err(e);
        }
        Some(p3)
    } else {
        None
    };

    debug!(image = %path.display(), samples = trajectory.len(), "plots written");
    Ok(RenderedPlots { file_name, path, path_3d })
}

fn write_or_remove<F>(path: &Path, draw: F) -> Result<(), PlotError>
where
    F: FnOnce(&Path) -> Result<(), Box<dyn Error>>,
{
    draw(path).map_err(|e| {
        remove_quietly(path);
        PlotError::Draw { path: path.to_path_buf(), message: e.to_string() }
    })
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(image = %path.display(), error = %e, "could not remove partial plot");
        }
    }
}

/// Bounds with a 5 % pad; a flat series gets a unit-wide window.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span < 1e-9 {
        return (lo - 0.5)..(hi + 0.5);
    }
    (lo - 0.05 * span)..(hi + 0.05 * span)
}

fn draw_profile(
    path: &Path,
    trajectory: &[TrajectorySample],
    settings: &PlotSettings,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, settings.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(
        "Altitude and Vertical Velocity vs Time",
        (FONT, settings.px(14.0)).into_font(),
    )?;
    let panels = body.split_evenly((2, 1));
    let time = axis_range(trajectory.iter().map(|s| s.time));

    draw_panel(&panels[0], settings, trajectory, time.clone(), ("Altitude", "Altitude (m)"), BLUE, |s| s.z)?;
    draw_panel(
        &panels[1],
        settings,
        trajectory,
        time,
        ("Vertical Velocity", "Vertical Velocity (m/s)"),
        RED,
        |s| s.vz,
    )?;

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    settings: &PlotSettings,
    trajectory: &[TrajectorySample],
    time: Range<f64>,
    (label, y_desc): (&str, &str),
    color: RGBColor,
    value: impl Fn(&TrajectorySample) -> f64,
) -> Result<(), Box<dyn Error>> {
    let stroke = settings.px(1.5);
    let mut chart = ChartBuilder::on(area)
        .margin(settings.px(6.0))
        .x_label_area_size(settings.px(24.0))
        .y_label_area_size(settings.px(40.0))
        .build_cartesian_2d(time, axis_range(trajectory.iter().map(&value)))?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(y_desc)
        .label_style((FONT, settings.px(9.0)).into_font())
        .axis_desc_style((FONT, settings.px(10.0)).into_font())
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            trajectory.iter().map(|s| (s.time, value(s))),
            color.stroke_width(stroke),
        ))?
        .label(label)
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke))
        });

    chart
        .configure_series_labels()
        .label_font((FONT, settings.px(9.0)).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_trajectory_3d(
    path: &Path,
    trajectory: &[TrajectorySample],
    settings: &PlotSettings,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, settings.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let east = axis_range(trajectory.iter().map(|s| s.x));
    let north = axis_range(trajectory.iter().map(|s| s.y));
    let altitude = axis_range(trajectory.iter().map(|s| s.z));

    // plotters draws its second 3D axis vertically
    let mut chart = ChartBuilder::on(&root)
        .caption("3D Flight Trajectory", (FONT, settings.px(14.0)).into_font())
        .margin(settings.px(6.0))
        .build_cartesian_3d(east, altitude, north)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .label_style((FONT, settings.px(8.0)).into_font())
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .x_formatter(&|v| format!("X {v:.0} m"))
        .y_formatter(&|v| format!("Alt {v:.0} m"))
        .z_formatter(&|v| format!("Y {v:.0} m"))
        .draw()?;

    let stroke = settings.px(1.5);
    chart
        .draw_series(LineSeries::new(
            trajectory.iter().map(|s| (s.x, s.z, s.y)),
            BLUE.stroke_width(stroke),
        ))?
        .label("Trajectory")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(stroke)));

    chart
        .configure_series_labels()
        .label_font((FONT, settings.px(9.0)).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let (_, height) = settings.pixel_size();
    root.draw_text(
        "X: east (m)   Y: north (m)   Altitude: above sea level (m)",
        &TextStyle::from((FONT, settings.px(9.0)).into_font()),
        (settings.px(8.0) as i32, height as i32 - settings.px(16.0) as i32),
    )?;

    root.present()?;
    Ok(())
}
