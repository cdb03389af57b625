//! Rail constraint demo
//!
//! Meshes the end sections of a rectangular rail in memory, couples the far
//! end to the near end through the reference point, and prints the
//! registered equations as JSON.
//!
//! Usage: `rail-demo [config.ron]`

use std::process::ExitCode;

use glam::DVec3;
use rail_core::{RailConfig, RailConstraintSetup, RailResult};
use rail_kernel::{InMemoryKernel, MeshKernel, Node, NodeLabel};

const RAIL_LENGTH: f64 = 20.0;
const PROFILE_SPACING: f64 = 0.5;
const PROFILE_COLUMNS: u32 = 3;
const PROFILE_ROWS: u32 = 4;
/// Height of the reference point (neutral line for bending)
const REFERENCE_HEIGHT: f64 = 0.75;

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rail_core=debug,rail_kernel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match load_config(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(kernel) => match serde_json::to_string_pretty(&kernel.equations()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Failed to serialize equations: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!("Rail constraint setup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<String>) -> Result<RailConfig, String> {
    let Some(path) = path else {
        return Ok(RailConfig::default());
    };
    let content = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
    RailConfig::from_ron_str(&content).map_err(|e| e.to_string())
}

fn run(config: RailConfig) -> RailResult<InMemoryKernel> {
    let kernel =
        InMemoryKernel::with_part_instance(&config.rail_part_name, &config.rail_instance_name);

    let near_end = profile_nodes(1, 0.0);
    let far_end = profile_nodes(1001, RAIL_LENGTH);
    kernel.create_node_set(&config.rail_part_name, "END_NEAR", &near_end)?;
    kernel.create_node_set(&config.rail_part_name, "END_FAR", &far_end)?;

    let mut setup = RailConstraintSetup::new(&kernel, config, RAIL_LENGTH)?;
    setup.add_reference_point(REFERENCE_HEIGHT)?;
    if let Some(reference_point) = setup.reference_point() {
        tracing::info!(
            "Coupling rail {} of length {} on the {} kernel, reference point at {:?}",
            setup.config().rail_instance_name,
            setup.rail_length(),
            kernel.name(),
            reference_point.coordinates
        );
    }

    let summary = setup.couple_sections("END_FAR", "END_NEAR")?;
    tracing::info!(
        "{} equations, {} unpaired nodes",
        summary.equations.len(),
        summary.pairing.unpaired.len()
    );

    Ok(kernel)
}

/// Nodes of a rectangular profile grid at height `z`
fn profile_nodes(first_label: NodeLabel, z: f64) -> Vec<Node> {
    (0..PROFILE_ROWS)
        .flat_map(|row| (0..PROFILE_COLUMNS).map(move |col| (row, col)))
        .enumerate()
        .map(|(i, (row, col))| {
            let position = DVec3::new(
                col as f64 * PROFILE_SPACING,
                row as f64 * PROFILE_SPACING,
                z,
            );
            Node::new(first_label + i as NodeLabel, position)
        })
        .collect()
}
