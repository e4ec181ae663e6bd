use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use hardware_interface::Slot;
use robot_hw::{load_config_file, RobotBackend};
use serde::Serialize;
use tracing::{info, warn};
use transmission_interface::{Invertibility, LoadOutcome, TransmissionState, INTERFACE_PREFIX};

#[derive(Parser, Debug)]
#[command(
    name = "hw",
    version,
    about = "Robot hardware backend inspector",
    disable_help_subcommand = true
)]
struct Cli {
    /// Backend configuration (YAML)
    #[arg(long, short, global = true, default_value = "configs/backend.yaml")]
    config: PathBuf,

    /// Pretty-print JSON output
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the configuration and description and report every transmission
    Validate {
        /// Exit with an error when any transmission failed to load
        #[arg(long, action = ArgAction::SetTrue)]
        deny_failures: bool,
    },
    /// List registered interfaces and active transmissions
    List,
    /// Run one read/write cycle and print the resulting storage
    Cycle {
        /// Actuator state as NAME=POSITION[,VELOCITY[,EFFORT]]
        #[arg(long = "actuator", value_name = "STATE")]
        actuators: Vec<String>,
        /// Joint command as JOINT:INTERFACE=VALUE
        #[arg(long = "command", value_name = "COMMAND")]
        commands: Vec<String>,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let config = load_config_file(&cli.config)
        .with_context(|| format!("loading backend config {}", cli.config.display()))?;
    let backend = RobotBackend::from_config(&config)
        .with_context(|| format!("initialising backend '{}'", config.name))?;

    match cli.command {
        Commands::Validate { deny_failures } => {
            let report = ValidationReport::new(&backend);
            emit(&report, cli.pretty)?;
            if deny_failures && report.failed > 0 {
                bail!("{} of {} transmissions failed to load", report.failed, report.outcomes.len());
            }
        }
        Commands::List => emit(&Listing::new(&backend), cli.pretty)?,
        Commands::Cycle {
            actuators,
            commands,
        } => {
            for arg in &actuators {
                let (name, values) = parse_actuator_state(arg)?;
                let storage = backend
                    .actuator(name)
                    .ok_or_else(|| anyhow!("unknown actuator '{name}'"))?;
                for (slot, value) in [&storage.position, &storage.velocity, &storage.effort]
                    .into_iter()
                    .zip(values)
                {
                    slot.set(value);
                }
            }
            backend.read();
            for arg in &commands {
                let (joint, interface, value) = parse_joint_command(arg)?;
                backend
                    .joint(joint)
                    .ok_or_else(|| anyhow!("unknown joint '{joint}'"))?
                    .command(interface)
                    .ok_or_else(|| anyhow!("joint '{joint}' has no '{interface}' command"))?
                    .set(value);
            }
            backend.write();
            info!(
                backend = backend.name(),
                transmissions = backend.transmissions().len(),
                "cycle complete"
            );
            emit(&Snapshot::new(&backend), cli.pretty)?;
        }
    }
    Ok(())
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into())
}

/// `NAME=POSITION[,VELOCITY[,EFFORT]]`
fn parse_actuator_state(arg: &str) -> Result<(&str, Vec<f64>)> {
    let (name, values) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=POSITION[,VELOCITY[,EFFORT]], got '{arg}'"))?;
    let values = values
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("bad value '{v}' for actuator '{name}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.len() > 3 {
        bail!("actuator '{name}' takes at most position, velocity and effort");
    }
    Ok((name.trim(), values))
}

/// `JOINT:INTERFACE=VALUE`
fn parse_joint_command(arg: &str) -> Result<(&str, &str, f64)> {
    let (target, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected JOINT:INTERFACE=VALUE, got '{arg}'"))?;
    let (joint, interface) = target
        .split_once(':')
        .ok_or_else(|| anyhow!("expected JOINT:INTERFACE=VALUE, got '{arg}'"))?;
    let interface = interface.trim();
    let interface = interface.strip_prefix(INTERFACE_PREFIX).unwrap_or(interface);
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("bad command value in '{arg}'"))?;
    Ok((joint.trim(), interface, value))
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    ts: String,
    backend: &'a str,
    active: usize,
    failed: usize,
    outcomes: &'a [LoadOutcome],
}

impl<'a> ValidationReport<'a> {
    fn new(backend: &'a RobotBackend) -> Self {
        let outcomes = backend.load_outcomes();
        let failed = outcomes
            .iter()
            .filter(|o| o.state != TransmissionState::Active)
            .count();
        if failed > 0 {
            warn!(backend = backend.name(), failed, "some transmissions were skipped");
        }
        Self {
            ts: timestamp(),
            backend: backend.name(),
            active: outcomes.len() - failed,
            failed,
            outcomes,
        }
    }
}

#[derive(Serialize)]
struct TransmissionEntry<'a> {
    name: &'a str,
    kind: &'static str,
    invertibility: Invertibility,
    actuators: &'a [String],
    joints: &'a [String],
    commands: Vec<&'a str>,
}

#[derive(Serialize)]
struct Listing<'a> {
    backend: &'a str,
    interfaces: Vec<&'static str>,
    actuators: Vec<&'a str>,
    joints: Vec<&'a str>,
    transmissions: Vec<TransmissionEntry<'a>>,
}

impl<'a> Listing<'a> {
    fn new(backend: &'a RobotBackend) -> Self {
        Self {
            backend: backend.name(),
            interfaces: backend.interfaces().kind_names().collect(),
            actuators: backend.actuators().iter().map(|a| a.name()).collect(),
            joints: backend.joints().iter().map(|j| j.name()).collect(),
            transmissions: backend
                .transmissions()
                .iter()
                .map(|t| TransmissionEntry {
                    name: t.name(),
                    kind: t.transmission().kind(),
                    invertibility: t.transmission().invertibility(),
                    actuators: t.actuator_names(),
                    joints: t.joint_names(),
                    commands: t.command_channels().iter().map(|c| c.label.as_str()).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ResourceSnapshot<'a> {
    name: &'a str,
    position: f64,
    velocity: f64,
    effort: f64,
    commands: BTreeMap<&'static str, f64>,
}

impl<'a> ResourceSnapshot<'a> {
    fn new<S: hardware_interface::Space>(storage: &'a robot_hw::ResourceStorage<S>) -> Self {
        Self {
            name: storage.name(),
            position: storage.position.get(),
            velocity: storage.velocity.get(),
            effort: storage.effort.get(),
            commands: storage
                .command_interfaces()
                .filter_map(|i| storage.command(i).map(|s: &Slot| (i, s.get())))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    ts: String,
    backend: &'a str,
    actuators: Vec<ResourceSnapshot<'a>>,
    joints: Vec<ResourceSnapshot<'a>>,
}

impl<'a> Snapshot<'a> {
    fn new(backend: &'a RobotBackend) -> Self {
        Self {
            ts: timestamp(),
            backend: backend.name(),
            actuators: backend.actuators().iter().map(ResourceSnapshot::new).collect(),
            joints: backend.joints().iter().map(ResourceSnapshot::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuator_state_accepts_partial_values() {
        let (name, values) = parse_actuator_state("m1=1.0, 2.0").unwrap();
        assert_eq!(name, "m1");
        assert_eq!(values, [1.0, 2.0]);
        assert!(parse_actuator_state("m1=1,2,3,4").is_err());
        assert!(parse_actuator_state("m1").is_err());
        assert!(parse_actuator_state("m1=x").is_err());
    }

    #[test]
    fn joint_command_strips_interface_prefix() {
        let (joint, interface, value) =
            parse_joint_command("j1:hardware_interface/PositionJointInterface=0.25").unwrap();
        assert_eq!(joint, "j1");
        assert_eq!(interface, "PositionJointInterface");
        assert_eq!(value, 0.25);
        assert!(parse_joint_command("j1=0.25").is_err());
    }

    #[test]
    fn cli_parses_repeated_flags() {
        let cli = Cli::try_parse_from([
            "hw",
            "cycle",
            "--actuator",
            "m1=1",
            "--actuator",
            "m2=2",
            "--command",
            "j1:PositionJointInterface=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Cycle { actuators, commands } => {
                assert_eq!(actuators.len(), 2);
                assert_eq!(commands.len(), 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("configs/backend.yaml"));
    }
}
