use bhquad::{Scenario, ScenarioConfig, SnapshotPlotter};
use bhquad::{bench_construction, bench_epoch_curve, bench_forces};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "two_body_merge.yaml")]
    file_name: String,

    /// Override the number of epochs from the scenario
    #[arg(short, long)]
    epochs: Option<u32>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,

    /// Open the live viewer (needs the `vis` feature)
    #[arg(long)]
    vis: bool,

    /// Dump every body after the run
    #[arg(long)]
    dump: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let scenario_cfg = ScenarioConfig::from_yaml_file(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_construction()?;
        bench_forces()?;
        bench_epoch_curve()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    if let Some(epochs) = args.epochs {
        scenario.num_epochs = epochs;
    }

    if args.vis {
        #[cfg(feature = "vis")]
        {
            bhquad::run_2d(scenario);
            return Ok(());
        }
        #[cfg(not(feature = "vis"))]
        anyhow::bail!("built without the `vis` feature");
    }

    let mut plotter = SnapshotPlotter::new();
    scenario.run(&mut plotter)?;
    info!("{} plot frames recorded", plotter.frames.len());

    if args.dump {
        scenario.universe.print_bodies_to_console();
    }

    Ok(())
}
