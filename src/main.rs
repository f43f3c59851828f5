use softsim::configuration::config::{resolve_config_path, ColliderConfig, PlotConfig, ScenarioConfig};
use softsim::{export_frames, load_simulation, record, render_all, run_live, run_replay, save_simulation};
use softsim::{FrameExport, PositionTable, PositionWriter, Replay, Scenario};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "softsim", about = "2D soft-body simulator and trajectory viewer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario headlessly and record the positions table
    Simulate {
        #[arg(short, long, default_value = "constraints_animation.yaml")]
        file_name: PathBuf,
        /// Overrides `output.positions` of the scenario
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overrides `engine.steps` of the scenario
        #[arg(long)]
        steps: Option<usize>,
        /// Save the final state as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Start from a saved state instead of the scenario bodies
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Run a scenario in a window
    Live {
        #[arg(short, long, default_value = "colliders.yaml")]
        file_name: PathBuf,
    },
    /// Replay a positions table in a window, or export it as PNG frames
    Animate {
        #[arg(short, long, default_value = "visuals/positions.csv")]
        input: PathBuf,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = softsim::simulation::states::DEFAULT_RADIUS)]
        radius: f64,
        /// Scenario whose colliders are drawn
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Write PNG frames here instead of opening a window
        #[arg(long)]
        frames_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        every: usize,
    },
    /// Render per-group time-series charts of a positions table
    Plot {
        #[arg(short, long, default_value = "visuals/positions.csv")]
        input: PathBuf,
        /// Plot settings (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Group particles by the bodies of this scenario
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
        #[arg(long)]
        dt: Option<f64>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_scenario_config(file_name: &Path) -> Result<ScenarioConfig> {
    let path = resolve_config_path(file_name, "scenarios");
    ScenarioConfig::load(&path).with_context(|| format!("loading scenario {}", path.display()))
}

fn load_scenario(file_name: &Path) -> Result<(ScenarioConfig, Scenario)> {
    let cfg = load_scenario_config(file_name)?;
    let scenario = Scenario::build_scenario(&cfg).context("building scenario")?;
    Ok((cfg, scenario))
}

fn simulate(
    file_name: &Path,
    output: Option<PathBuf>,
    steps: Option<usize>,
    snapshot: Option<PathBuf>,
    resume: Option<PathBuf>,
) -> Result<()> {
    let (cfg, mut scenario) = load_scenario(file_name)?;
    if let Some(steps) = steps {
        scenario.parameters.steps = steps;
    }
    if let Some(path) = resume {
        scenario.simulation =
            load_simulation(&path).with_context(|| format!("resuming from {}", path.display()))?;
        info!(t = scenario.simulation.t, "resumed simulation");
    }

    let out_path = output.unwrap_or(cfg.output.positions);
    let mut writer =
        PositionWriter::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?;

    info!(
        steps = scenario.parameters.steps,
        dt = scenario.parameters.dt,
        t_end = scenario.parameters.t_end(),
        "simulating"
    );
    let rows = record(&mut scenario.simulation, &scenario.parameters, &mut writer)?;
    info!(path = %out_path.display(), rows, "wrote positions table");

    if let Some(path) = snapshot {
        save_simulation(&scenario.simulation, &path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
    }
    Ok(())
}

fn colliders_of(scenario: Option<&Path>) -> Result<Vec<ColliderConfig>> {
    match scenario {
        Some(name) => Ok(load_scenario_config(name)?.colliders),
        None => Ok(Vec::new()),
    }
}

fn load_table(input: &Path) -> Result<PositionTable> {
    PositionTable::load(input).with_context(|| format!("reading positions table {}", input.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Simulate {
            file_name,
            output,
            steps,
            snapshot,
            resume,
        } => {
            init_tracing();
            simulate(&file_name, output, steps, snapshot, resume)?;
        }
        Command::Live { file_name } => {
            let (_, scenario) = load_scenario(&file_name)?;
            run_live(scenario);
        }
        Command::Animate {
            input,
            dt,
            radius,
            scenario,
            frames_dir,
            every,
        } => {
            let colliders = colliders_of(scenario.as_deref())?;
            match frames_dir {
                Some(dir) => {
                    init_tracing();
                    let table = load_table(&input)?;
                    let opts = FrameExport {
                        dir,
                        every,
                        dt,
                        radius,
                        size: (1280, 720),
                    };
                    export_frames(&table, &colliders, &opts)?;
                }
                None => {
                    let table = load_table(&input)?;
                    run_replay(Replay::new(table, dt, radius, &colliders)?);
                }
            }
        }
        Command::Plot {
            input,
            config,
            scenario,
            start,
            end,
            dt,
            output_dir,
        } => {
            init_tracing();
            let mut cfg = match config {
                Some(name) => {
                    let path = resolve_config_path(&name, "plots");
                    PlotConfig::load(&path).with_context(|| format!("loading plot config {}", path.display()))?
                }
                None => PlotConfig::default(),
            };
            if let Some(start) = start {
                cfg.window.start = start;
            }
            if let Some(end) = end {
                cfg.window.end = end;
            }
            if let Some(dt) = dt {
                cfg.dt = dt;
            }
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            cfg.validate()?;

            let specs = match scenario {
                Some(name) => Some(load_scenario(&name)?.1.group_specs()),
                None => None,
            };

            let table = load_table(&input)?;
            let written = render_all(&table, &cfg, specs)?;
            info!(charts = written.len(), dir = %cfg.output_dir.display(), "done");
        }
    }

    Ok(())
}
