use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use schemars::schema_for;
use tracing::{debug, info};
use transmission_planner::PlannerEvent;
use transmission_planner_apps::{utils::init_tracing, Error, SceneConfig};

/// Plan the motion of a body through a scene and export the result as CSV.
#[derive(Parser, Debug)]
#[command(name = env!("CARGO_BIN_NAME"))]
struct RunArgs {
    /// Path to the scene file.
    #[arg(short, long)]
    config_path: Option<PathBuf>,
    /// Seed of the random generator. Takes priority over the scene file.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints the default scene as TOML.
    #[arg(long)]
    show_default_config: bool,
    /// Prints the JSON schema of the scene file.
    #[arg(long)]
    show_schema: bool,
}

const PROGRESS_INTERVAL: usize = 1000;

fn run(config: &SceneConfig) -> Result<()> {
    let mut planner = config.create_planner()?;
    loop {
        match planner.tick()? {
            PlannerEvent::NodeAdded(id) => {
                debug!(id, tries = planner.num_tries(), "node added");
            }
            PlannerEvent::Rejected(rejection) => {
                if planner.num_tries() % PROGRESS_INTERVAL == 0 {
                    info!(
                        tries = planner.num_tries(),
                        nodes = planner.tree().len(),
                        ?rejection,
                        "growing"
                    );
                }
            }
            PlannerEvent::PathExtracted { len } => {
                info!(len, "traveling");
            }
            PlannerEvent::Moved(point) => {
                debug!(translation = ?point.pose.translation.vector, "moved");
            }
            PlannerEvent::Finished => break,
            event => debug!(?event),
        }
    }

    let mut sink = config.create_sink();
    planner.export(&mut sink)?;
    info!(
        path = %sink.path_file().display(),
        tree = %sink.tree_file().display(),
        "exported"
    );
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = RunArgs::parse();
    debug!(?args);

    if args.show_default_config {
        print!("{}", toml::to_string(&SceneConfig::default())?);
        return Ok(());
    }
    if args.show_schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&schema_for!(SceneConfig))?
        );
        return Ok(());
    }

    let config_path = args.config_path.ok_or(Error::NoConfigPath)?;
    let mut config = SceneConfig::try_new(config_path)?;
    if let Some(seed) = args.seed {
        config.planner.seed = Some(seed);
    }
    run(&config)
}
