//! Startup helpers for the binary: argument parsing and assembling a simulation from a config.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::building::Building;
use crate::config::{self, SimConfig, Timing};
use crate::event_log::{EventSink, JsonLinesSink, TerminalSink};
use crate::manager::ElevatorManager;
use crate::print;

/// What the command line asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Config file to load instead of the built-in defaults
    pub config_path: Option<PathBuf>,
    /// Emit events as JSON lines instead of coloured text
    pub json: bool,
    /// Use [Timing::fast] regardless of the config
    pub fast: bool,
    /// Only print the argument list
    pub help: bool,
}

/// ### Reads arguments from `cargo run`
///
/// Available options:
///
/// `config::<path>` &rarr; Loads the simulation config from a JSON file
/// `json::(true/false)` &rarr; Prints events as JSON lines
/// `fast::(true/false)` &rarr; Uses short timings (10 ms poll, 50 ms steps)
/// `print_wv::(true/false)` &rarr; Prints the world view table
/// `print_err::(true/false)` &rarr; Prints error messages
/// `print_warn::(true/false)` &rarr; Prints warning messages
/// `print_ok::(true/false)` &rarr; Prints OK messages
/// `print_info::(true/false)` &rarr; Prints informational messages
/// `print_else::(true/false)` &rarr; Prints other messages
/// `debug` &rarr; Disables all prints except error messages
/// `help` &rarr; Lists the options without starting the simulation
///
/// If no arguments are provided, all prints are enabled and the defaults in [crate::config] are
/// used.
pub fn parse_args() -> CliArgs {
    parse_args_from(env::args().skip(1))
}

/// [parse_args] on an explicit argument list (program name excluded).
pub fn parse_args_from<I, S>(args: I) -> CliArgs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cli = CliArgs::default();

    for arg in args {
        let arg = arg.as_ref();
        match arg.split_once("::") {
            Some((key, value)) => {
                let key = key.to_lowercase();
                let is_true = value.to_lowercase() == "true";

                match key.as_str() {
                    "config" => cli.config_path = Some(PathBuf::from(value)),
                    "json" => cli.json = is_true,
                    "fast" => cli.fast = is_true,
                    "print_wv" => config::set_print(&config::PRINT_WV_ON, is_true),
                    "print_err" => config::set_print(&config::PRINT_ERR_ON, is_true),
                    "print_warn" => config::set_print(&config::PRINT_WARN_ON, is_true),
                    "print_ok" => config::set_print(&config::PRINT_OK_ON, is_true),
                    "print_info" => config::set_print(&config::PRINT_INFO_ON, is_true),
                    "print_else" => config::set_print(&config::PRINT_ELSE_ON, is_true),
                    "debug" => debug_mode(),
                    _ => print::warn(format!("Unknown argument: {arg}")),
                }
            }
            None => match arg.to_lowercase().as_str() {
                "debug" => debug_mode(),
                "help" => cli.help = true,
                _ => print::warn(format!("Unknown argument: {arg}")),
            },
        }
    }
    cli
}

/// Only error messages are printed.
fn debug_mode() {
    config::set_print(&config::PRINT_WV_ON, false);
    config::set_print(&config::PRINT_WARN_ON, false);
    config::set_print(&config::PRINT_OK_ON, false);
    config::set_print(&config::PRINT_INFO_ON, false);
    config::set_print(&config::PRINT_ELSE_ON, false);
}

/// Prints the option list shown by `help`.
pub fn print_help() {
    println!("Available arguments:");
    println!("  config::<path>");
    println!("  json::true/false");
    println!("  fast::true/false");
    println!("  print_wv::true/false");
    println!("  print_err::true/false");
    println!("  print_warn::true/false");
    println!("  print_ok::true/false");
    println!("  print_info::true/false");
    println!("  print_else::true/false");
    println!("  debug (only error messages are shown)");
}

/// Resolves the config for a run: the file named by `cli`, or the defaults.
pub fn load_config(cli: &CliArgs) -> anyhow::Result<SimConfig> {
    let mut config = match &cli.config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if cli.fast {
        config.timing = Timing::fast();
    }
    Ok(config)
}

/// The event sink asked for on the command line.
pub fn terminal_sink(cli: &CliArgs) -> Arc<dyn EventSink> {
    if cli.json {
        Arc::new(JsonLinesSink)
    } else {
        Arc::new(TerminalSink)
    }
}

/// Builds the building and the dispatcher, and registers the configured fleet.
///
/// Elevators are registered but not started.
pub async fn build_system(
    config: &SimConfig,
    sink: Arc<dyn EventSink>,
) -> anyhow::Result<(Arc<Building>, Arc<ElevatorManager>)> {
    config.validate()?;
    let building = Building::from_config(config).context("failed to build the building")?;
    let manager = ElevatorManager::new(building.clone(), config.timing, sink);
    manager
        .register_elevators(
            config.fleet.count,
            config.fleet.weight_capacity,
            config.fleet.passenger_capacity,
        )
        .await
        .context("failed to register elevators")?;
    Ok((building, manager))
}
