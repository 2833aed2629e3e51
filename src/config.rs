use std::path::PathBuf;
use std::time::Duration;

use crate::plot::PlotSettings;
use crate::solver::SolverConfig;
use crate::store::ResultStore;

/// Everything a [`Simulator`](crate::simulation::Simulator) needs besides
/// the solver itself.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Root that returned image paths are relative to.
    pub static_root: PathBuf,
    pub plot_subdir: String,
    pub plot: PlotSettings,
    pub solver: SolverConfig,
    pub busy_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/simulations.sqlite3"),
            static_root: PathBuf::from("static"),
            plot_subdir: "generated_plots".into(),
            plot: PlotSettings::default(),
            solver: SolverConfig::default(),
            busy_timeout_ms: 5000,
        }
    }
}

impl AppConfig {
    /// Directory images are written to.
    pub fn plot_dir(&self) -> PathBuf {
        self.static_root.join(&self.plot_subdir)
    }

    /// Path handed back to callers for an image file name.
    pub fn relative_image_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.plot_subdir, file_name)
    }

    pub fn store(&self) -> ResultStore {
        ResultStore::new(&self.db_path).with_busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}
