//! beamsim CLI
//!
//! Entry point for the `beamsim` command-line tool.

use beamsim::pipeline::{self, PipelineResult, ResolvedConfig};
use beamsim::{ConfigPaths, DeviceGraph, TranslateOptions, TranslationTable};
use beamsim_model::Params;
use clap::{ArgGroup, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "beamsim")]
#[command(about = "Simulated beamline device graph", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a device file into the grouped configuration (JSON)
    Resolve {
        /// Device file (TOML)
        #[arg(long)]
        device_file: PathBuf,

        /// Overlay file with [loaders] and [devices] sections
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Extra translation entry, e.g. EpicsMotor=beamsim.devices.motor.FakeMotor
        #[arg(long = "translate", value_name = "FROM=TO")]
        translations: Vec<String>,

        /// Target for identifiers with no translation
        #[arg(long)]
        default_target: Option<String>,

        /// Drop unresolved entries with a warning instead of failing
        #[arg(long)]
        lenient: bool,

        /// Write the result here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Build the device graph and list its endpoints
    #[command(group(ArgGroup::new("source").required(true).args(["startup_dir", "device_file"])))]
    Build {
        /// Directory holding devices.toml and sim_conf.toml
        #[arg(long, conflicts_with_all = ["device_file", "config_file"])]
        startup_dir: Option<PathBuf>,

        /// Device file (TOML); requires --config-file
        #[arg(long, requires = "config_file")]
        device_file: Option<PathBuf>,

        /// Simulation config file (TOML); requires --device-file
        #[arg(long, requires = "device_file")]
        config_file: Option<PathBuf>,

        /// Prefix of the beamline root
        #[arg(long, default_value = beamsim::graph::DEFAULT_ROOT_PREFIX)]
        prefix: String,

        /// Endstation selected on the beamline root
        #[arg(long)]
        endstation: Option<String>,

        /// Drop unresolved entries with a warning instead of failing
        #[arg(long)]
        lenient: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            device_file,
            overlay,
            translations,
            default_target,
            lenient,
            out,
        } => run_resolve(device_file, overlay, &translations, default_target, lenient, out.as_deref()),
        Commands::Build {
            startup_dir,
            device_file,
            config_file,
            prefix,
            endstation,
            lenient,
            json,
        } => {
            let paths = match (startup_dir, device_file, config_file) {
                (Some(dir), _, _) => ConfigPaths::from_startup_dir(&dir),
                (None, Some(device_file), Some(config_file)) => ConfigPaths::new(device_file, Some(config_file)),
                _ => {
                    eprintln!("Error: either --startup-dir or both --device-file and --config-file must be provided");
                    process::exit(2);
                }
            };
            run_build(&paths, prefix, endstation, lenient, json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn translate_options(lenient: bool, default_target: Option<String>) -> TranslateOptions {
    let options = if lenient {
        TranslateOptions::lenient()
    } else {
        TranslateOptions::default()
    };
    match default_target {
        Some(target) => options.with_default_target(target),
        None => options,
    }
}

fn parse_translations(entries: &[String]) -> TranslationTable {
    let mut table = TranslationTable::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => table.insert(from, to),
            _ => {
                eprintln!("Error: invalid translation '{}': expected FROM=TO", entry);
                process::exit(2);
            }
        }
    }
    table
}

fn print_warnings(resolved: &ResolvedConfig) {
    for diagnostic in &resolved.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
}

fn run_resolve(
    device_file: PathBuf,
    overlay: Option<PathBuf>,
    translations: &[String],
    default_target: Option<String>,
    lenient: bool,
    out: Option<&Path>,
) -> PipelineResult<()> {
    let paths = ConfigPaths::new(device_file, overlay);
    let updates = parse_translations(translations);
    let options = translate_options(lenient, default_target);

    let resolved = pipeline::load_device_config(&paths, &updates, &options)?;
    print_warnings(&resolved);

    let json = resolved.to_json_pretty()?;
    match out {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Wrote {} devices to {}", resolved.device_count(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_build(
    paths: &ConfigPaths,
    prefix: String,
    endstation: Option<String>,
    lenient: bool,
    json: bool,
) -> PipelineResult<()> {
    let mut root_params = Params::new();
    if let Some(endstation) = endstation {
        root_params.insert("endstation", endstation);
    }
    let builder = pipeline::default_builder()?.prefix(prefix).root_params(root_params);
    let options = translate_options(lenient, None);

    let built = pipeline::build_graph(paths, &TranslationTable::new(), &options, builder)?;
    print_warnings(&built.resolved);

    if json {
        println!("{}", serde_json::to_string_pretty(&built.graph.summary())?);
    } else {
        print_endpoints(&built.graph);
    }
    Ok(())
}

fn print_endpoints(graph: &DeviceGraph) {
    println!("{} devices, {} endpoints", graph.len(), graph.registry().len());
    for (name, handle) in graph.registry().iter() {
        if let Some(node) = graph.node(handle.node) {
            println!("  {:<40} {:<24} {}", name, node.path.to_string(), node.class_id);
        }
    }
}
