use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cansat_sim::io as export;
use cansat_sim::plot::FileNaming;
use cansat_sim::{AppConfig, RawRequest, SimulationOutcome, SimulationRecord, SimulationRequest, Simulator};

#[derive(Parser, Debug)]
#[command(name = "cansat-sim")]
#[command(about = "CanSat launch simulation with trajectory plots and a results store")]
#[command(version)]
struct Cli {
    /// SQLite results store
    #[arg(long, env = "CANSAT_DB_PATH", default_value = "data/simulations.sqlite3", global = true)]
    db_path: PathBuf,

    /// Static asset root; images go to <root>/generated_plots
    #[arg(long, env = "CANSAT_STATIC_ROOT", default_value = "static", global = true)]
    static_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation, plot it and store the result
    Simulate(SimulateArgs),
    /// Print stored results, newest first
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: ListFormat,
    },
    /// Drop every stored result
    Clear,
}

/// Launch parameters are taken as text and parsed by the library, so a bad
/// number is reported the same way a web form would report it.
#[derive(Args, Debug)]
struct SimulateArgs {
    // ── Launch parameters (form defaults when omitted) ─────────
    #[arg(long)]
    inclination: Option<String>, // deg
    #[arg(long)]
    heading: Option<String>, // deg
    #[arg(long)]
    rail_length: Option<String>, // m
    #[arg(long)]
    cansat_mass: Option<String>, // kg
    #[arg(long)]
    drag_coefficient: Option<String>,
    #[arg(long)]
    burn_time: Option<String>, // s
    #[arg(long)]
    average_thrust: Option<String>, // N
    #[arg(long)]
    elevation: Option<String>, // m ASL

    // ── Output options ─────────────────────────────────────────
    /// Also write the 3D trajectory figure
    #[arg(long, env = "CANSAT_SAVE_3D", value_parser = BoolishValueParser::new())]
    save_3d: bool,

    /// Millisecond image names so fast repeated runs do not overwrite
    #[arg(long, env = "CANSAT_UNIQUE_NAMES", value_parser = BoolishValueParser::new())]
    unique_names: bool,

    /// Export the solved trajectory as CSV
    #[arg(long)]
    trajectory_csv: Option<PathBuf>,
}

impl SimulateArgs {
    fn raw_request(&self) -> RawRequest {
        let d = RawRequest::from(&SimulationRequest::form_defaults());
        let pick = |v: &Option<String>, default: String| v.clone().unwrap_or(default);
        RawRequest {
            inclination: pick(&self.inclination, d.inclination),
            heading: pick(&self.heading, d.heading),
            rail_length: pick(&self.rail_length, d.rail_length),
            cansat_mass: pick(&self.cansat_mass, d.cansat_mass),
            drag_coefficient: pick(&self.drag_coefficient, d.drag_coefficient),
            burn_time: pick(&self.burn_time, d.burn_time),
            average_thrust: pick(&self.average_thrust, d.average_thrust),
            elevation: pick(&self.elevation, d.elevation),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = AppConfig {
        db_path: cli.db_path,
        static_root: cli.static_root,
        ..AppConfig::default()
    };

    match cli.command {
        Command::Simulate(args) => {
            config.plot.save_3d = args.save_3d;
            if args.unique_names {
                config.plot.naming = FileNaming::Millis;
            }
            run_simulate(config, &args)
        }
        Command::List { format } => run_list(&config, format),
        Command::Clear => {
            config
                .store()
                .clear_all()
                .with_context(|| format!("clearing {}", config.db_path.display()))?;
            println!("simulation results removed from {}", config.db_path.display());
            Ok(())
        }
    }
}

fn run_simulate(config: AppConfig, args: &SimulateArgs) -> Result<()> {
    let raw = args.raw_request();
    let simulator = Simulator::new(config);

    let run = simulator.run_raw(&raw);
    let (apogee, image_path) = match run.outcome {
        SimulationOutcome::Success { apogee, image_path } => (apogee, image_path),
        SimulationOutcome::Failure { kind, message } => bail!("{kind:?}: {message}"),
    };

    let cfg = simulator.config();
    println!();
    println!("====================================================================");
    println!("  CANSAT SIMULATION COMPLETE");
    println!("====================================================================");
    match apogee {
        Some(a) => println!("  Apogee:        {a:>8.2} m ASL"),
        None => println!("  Apogee:        {:>8} (vehicle never left the pad)", "-"),
    }
    println!("  Plot:          {}", cfg.static_root.join(&image_path).display());
    println!("  Store:         {}", cfg.db_path.display());
    println!();

    if let (Some(path), Some(rows)) = (&args.trajectory_csv, &run.solution) {
        export::csv::write_trajectory_file(path, rows).with_context(|| format!("writing {}", path.display()))?;
        println!("  Trajectory:    {}", path.display());
        println!();
    }
    Ok(())
}

fn run_list(config: &AppConfig, format: ListFormat) -> Result<()> {
    let records = config.store().list_all();
    if records.is_empty() {
        println!("no simulation results");
        return Ok(());
    }

    match format {
        ListFormat::Table => print_table(&records),
        ListFormat::Json => {
            export::json::write_records(&mut io::stdout().lock(), &records).context("writing JSON")?
        }
        ListFormat::Csv => {
            export::csv::write_records(&mut io::stdout().lock(), &records).context("writing CSV")?
        }
    }
    Ok(())
}

fn print_table(records: &[SimulationRecord]) {
    println!(
        "  {:>4}  {:>19}  {:>6}  {:>6}  {:>5}  {:>6}  {:>5}  {:>5}  {:>6}  {:>6}  {:>8}  {}",
        "id", "timestamp", "incl", "head", "rail", "mass", "cd", "burn", "thrust", "elev", "apogee", "image"
    );
    println!("  {}", "─".repeat(110));
    for r in records {
        println!(
            "  {:>4}  {:>19}  {:>6.1}  {:>6.1}  {:>5.2}  {:>6.3}  {:>5.2}  {:>5.2}  {:>6.1}  {:>6.1}  {:>8}  {}",
            r.id,
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.inclination,
            r.heading,
            r.rail_length,
            r.cansat_mass,
            r.drag_coefficient,
            r.burn_time,
            r.average_thrust,
            r.elevation,
            r.apogee.map_or_else(|| "-".to_string(), |a| format!("{a:.2}")),
            r.graph_image_path.as_deref().unwrap_or("-"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_switches_accept_flags() {
        let cli = Cli::try_parse_from(["cansat-sim", "simulate", "--save-3d", "--unique-names"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert!(args.save_3d);
        assert!(args.unique_names);
    }

    #[test]
    fn output_switches_accept_numeric_env_values() {
        std::env::set_var("CANSAT_SAVE_3D", "1");
        std::env::set_var("CANSAT_UNIQUE_NAMES", "yes");
        let parsed = Cli::try_parse_from(["cansat-sim", "simulate", "--heading", "45"]);
        std::env::remove_var("CANSAT_SAVE_3D");
        std::env::remove_var("CANSAT_UNIQUE_NAMES");

        let Command::Simulate(args) = parsed.unwrap().command else {
            panic!("expected simulate");
        };
        assert!(args.save_3d);
        assert!(args.unique_names);
        assert_eq!(args.heading.as_deref(), Some("45"));
    }
}
