use pwsim::{DerivedRelations, Envelope, GuidingField, Scenario, ScenarioConfig, VelocityField, ViewConfig};
use pwsim::{run_packet_view, run_trajectory_view};
use pwsim::{write_packet, write_trajectories};
use pwsim::{bench_field, bench_integrators, bench_integrators_curve};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, either a path or a name under scenarios/
    #[arg(short, default_value = "packet.yaml")]
    file_name: String,

    /// Write data files and gnuplot scripts to this directory instead of opening a window
    #[arg(long)]
    headless: Option<PathBuf>,

    /// Print propagator-derived relations at this time and exit
    #[arg(long)]
    relations: Option<f64>,

    /// Run the benchmarks and exit
    #[arg(long)]
    bench: bool,

    #[arg(short, long)]
    verbosity: Option<String>,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    log::debug!("{:?}", scenario_cfg);
    Ok(scenario_cfg)
}

fn print_relations(scenario: &Scenario, t: f64) -> Result<()> {
    let derived = DerivedRelations::at(&scenario.parameters, t)?;
    let envelope = Envelope::new(scenario.parameters);

    println!("t = {t}");
    println!("{:<20} {:>22} {:>22}", "", "propagator", "closed form");
    println!("{:<20} {:>22.15e} {:>22.15e}", "centroid", derived.centroid, envelope.centroid(t));
    println!("{:<20} {:>22.15e} {:>22.15e}", "width", derived.width, envelope.width(t));
    println!("{:<20} {:>22.15e} {:>22.15e}", "phase(0)", derived.phase_at_origin, envelope.phase(0.0, t));
    println!(
        "{:<20} {:>22.15e} {:>22.15e}",
        "velocity(0)",
        derived.velocity_at_origin,
        GuidingField::new(scenario.parameters).velocity(t, 0.0)
    );
    println!("{:<20} {:>22.15e}", "stretch rate", derived.stretch_rate);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(LevelFilter::from_str(
            args.verbosity.as_deref().unwrap_or("info"),
        )?)
        .init();

    if args.bench {
        bench_field()?;
        bench_integrators()?;
        bench_integrators_curve()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    if let Some(t) = args.relations {
        return print_relations(&scenario, t);
    }

    match (scenario.engine.view, args.headless) {
        (ViewConfig::Packet, None) => run_packet_view(scenario),
        (ViewConfig::Trajectories, None) => run_trajectory_view(scenario)?,
        (ViewConfig::Packet, Some(dir)) => {
            write_packet(&dir, &scenario.packet_frames())
                .with_context(|| format!("failed to write packet data to {}", dir.display()))?;
        }
        (ViewConfig::Trajectories, Some(dir)) => {
            let set = scenario.integrate()?;
            if let Some(deviation) = set.max_abs_deviation(&scenario.reference_set()) {
                log::info!("max deviation from the analytic reference: {:.3e}", deviation);
            }
            write_trajectories(&dir, &set, &scenario.reference)
                .with_context(|| format!("failed to write trajectories to {}", dir.display()))?;
        }
    }

    Ok(())
}
