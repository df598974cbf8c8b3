use anyhow::Context;
use clap::{Parser, Subcommand};
use liftsim_assets::ModelSource;
use liftsim_input::{Action, PressureControls};
use liftsim_kernel::{Environment, FlightEvent, FlightSim, FlightSummary, SimConfig};
use liftsim_render::{DebugTextRenderer, FrameState, RenderView, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liftsim-cli", about = "Headless tools for the lift simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default flight parameters
    Info,
    /// Fly the plane without a window and print frames as text
    Simulate {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Pressure on the upper surface (overrides the config)
        #[arg(long)]
        above: Option<f32>,
        /// Pressure on the lower surface (overrides the config)
        #[arg(long)]
        below: Option<f32>,
        /// Print a frame every N steps
        #[arg(long, default_value = "60")]
        every: u64,
        /// YAML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load a model and print its mesh statistics
    Inspect {
        /// A .gltf/.glb path, an http(s) URL, or "builtin"
        model: String,
        /// Download cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Print the default config as YAML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SimConfig> {
    match path {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SimConfig::default()),
    }
}

fn simulate(
    config: &SimConfig,
    frames: u64,
    above: Option<f32>,
    below: Option<f32>,
    every: u64,
) -> Vec<String> {
    let mut sim = FlightSim::new(config.flight);
    let mut env = Environment::new(config.scene);
    let mut controls = PressureControls::from_config(&config.controls);
    if let Some(v) = above {
        controls.apply(&Action::SetPressureAbove(v));
    }
    if let Some(v) = below {
        controls.apply(&Action::SetPressureBelow(v));
    }

    let renderer = DebugTextRenderer::new();
    let view = RenderView::default();
    let every = every.max(1);
    let mut out = Vec::new();

    for frame in 1..=frames {
        env.step();
        sim.step(controls.pressures());
        for event in sim.drain_events() {
            log_event(&event);
        }
        if frame % every == 0 || frame == frames {
            let state = FrameState {
                sim: &sim,
                env: &env,
                pressures: controls.pressures(),
                model_loaded: true,
            };
            out.push(renderer.render(&state, &view));
        }
    }
    tracing::info!("final: {}", FlightSummary::capture(&sim));
    out
}

fn log_event(event: &FlightEvent) {
    let text = match event {
        FlightEvent::Grounded { tick, .. } => format!("tick {tick}: grounded"),
        FlightEvent::Resumed { tick } => format!("tick {tick}: took off"),
        FlightEvent::ResetStarted { tick, .. } => format!("tick {tick}: out of bounds, resetting"),
        FlightEvent::ResetFinished { tick } => format!("tick {tick}: reset done"),
    };
    if event.is_routine() {
        tracing::debug!("{text}");
    } else {
        tracing::info!("{text}");
    }
}

/// `RUST_LOG` wins when it parses; otherwise `-v` picks debug over info.
fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), cli.verbose))
        .init();

    match cli.command {
        Commands::Info => {
            let config = SimConfig::default();
            let flight = &config.flight;
            println!("liftsim-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "origin: ({}, {}, {})",
                flight.origin.x, flight.origin.y, flight.origin.z
            );
            println!(
                "velocity: start={} max={} accel={}/frame",
                flight.initial_velocity, flight.max_velocity, flight.acceleration
            );
            println!(
                "bounds: min=({}, {}, {}) max=({}, {}, {})",
                flight.bounds.min.x,
                flight.bounds.min.y,
                flight.bounds.min.z,
                flight.bounds.max.x,
                flight.bounds.max.y,
                flight.bounds.max.z
            );
            println!(
                "pressure: {}..={} (default {}/{})",
                config.controls.pressure_min,
                config.controls.pressure_max,
                config.controls.initial_above,
                config.controls.initial_below
            );
            println!("model: {}", config.model.source);
        }
        Commands::Simulate {
            frames,
            above,
            below,
            every,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            for text in simulate(&config, frames, above, below, every) {
                println!("{text}");
            }
        }
        Commands::Inspect { model, cache_dir } => {
            let cache_dir = cache_dir.unwrap_or_else(|| SimConfig::default().model.cache_dir);
            let source = ModelSource::parse(&model);
            let mesh = source
                .load(Some(&cache_dir))
                .with_context(|| format!("loading model {source}"))?;
            println!("Model: {}", mesh.name);
            println!("Vertices: {}", mesh.vertex_count());
            println!("Triangles: {}", mesh.triangle_count());
            if let Some(b) = mesh.bounds() {
                let size = b.size();
                println!(
                    "Bounds: min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2})",
                    b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
                );
                println!("Size: {:.2} x {:.2} x {:.2}", size.x, size.y, size.z);
            }
        }
        Commands::Config { out } => {
            let config = SimConfig::default();
            match out {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", config.to_yaml()?),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_prints_every_nth_frame_and_the_last() {
        let frames = simulate(&SimConfig::default(), 130, None, None, 60);
        assert_eq!(frames.len(), 3);
        assert!(frames[0].starts_with("=== Frame 60 ==="));
        assert!(frames[2].starts_with("=== Frame 130 ==="));
    }

    #[test]
    fn pressure_overrides_reach_the_plane() {
        let frames = simulate(&SimConfig::default(), 1, Some(200.0), Some(900.0), 1);
        assert!(frames[0].contains("above=200 below=900"));
        assert!(frames[0].contains("Airflow: below"));
    }

    #[test]
    fn rust_log_overrides_the_verbose_flag() {
        assert_eq!(env_filter(None, false).to_string(), "info");
        assert_eq!(env_filter(None, true).to_string(), "debug");
        assert_eq!(
            env_filter(Some("liftsim_kernel=trace"), false).to_string(),
            "liftsim_kernel=trace"
        );
    }

    #[test]
    fn missing_config_is_an_error() {
        let path = PathBuf::from("/nonexistent/liftsim.yaml");
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(None).is_ok());
    }
}
