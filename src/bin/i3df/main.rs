//! i3df CLI - Tool for inspecting sector geometry files.

use std::env;
use std::path::Path;
use std::process;

use i3df::prelude::*;
use i3df::decode::{scan_sectors, SectorRecord};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "I3DF_LOG";

fn version() -> String {
    format!(
        "i3df {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("I3DF_BUILD_DATE").unwrap_or("unknown"),
        option_env!("I3DF_BUILD_TIME").unwrap_or("unknown"),
    )
}

/// Install the fmt subscriber. `I3DF_LOG` overrides the flag-derived level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut config = DecoderConfig::default();
    let mut config_path: Option<String> = None;
    let mut legacy = false;
    let mut little_endian = false;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            "--legacy" => legacy = true,
            "--little-endian" => little_endian = true,
            "--sequential" => config.parallel = false,
            "--config" => match iter.next() {
                Some(path) => config_path = Some(path.clone()),
                None => {
                    eprintln!("Error: --config requires a file argument");
                    process::exit(1);
                }
            },
            "-V" | "--version" => {
                println!("{}", version());
                return;
            }
            _ => filtered_args.push(arg),
        }
    }

    init_logging(level);

    if let Some(path) = config_path {
        config = match DecoderConfig::from_json_file(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                process::exit(1);
            }
        };
    }
    if legacy {
        config = DecoderConfig { parallel: config.parallel, byte_order: config.byte_order, ..DecoderConfig::legacy() };
    }
    if little_endian {
        config.byte_order = ByteOrder::Little;
    }
    tracing::debug!(?config, "decoder configuration");

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let command = filtered_args[0];
    let file = filtered_args.get(1).copied();
    match command {
        "info" | "i" | "tree" | "t" | "stats" | "s" => {
            let Some(file) = file else {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: i3df {} <file>", command);
                process::exit(1);
            };
            match command {
                "info" | "i" => cmd_info(file, &config),
                "tree" | "t" => cmd_tree(file, &config),
                _ => cmd_stats(file, &config),
            }
        }

        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(command).exists() {
                cmd_info(command, &config);
            } else {
                eprintln!("Unknown command: {}", command);
                eprintln!();
                print_help();
                process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("{}", version());
    println!();
    println!("USAGE:");
    println!("    i3df [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show sector headers");
    println!("    t, tree   <file>              Show sector hierarchy with bounds and primitive totals");
    println!("    s, stats  <file>              Show scene statistics with timing info");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!("    --legacy             Read the wide (legacy) table layout");
    println!("    --little-endian      Read multi-byte values little-endian");
    println!("    --sequential         Unpack sectors on the calling thread");
    println!("    --config <json>      Load decoder settings from a JSON file");
    println!("    -V, --version        Show version and build date");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}             Log filter, overrides -v/-q (e.g. i3df=debug)", LOG_ENV);
}

fn read_file(path: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn open_scene(path: &str, config: &DecoderConfig) -> DecodedScene {
    tracing::info!("Opening {}", path);
    match i3df::open(path, config) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Failed to decode {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn cmd_info(path: &str, config: &DecoderConfig) {
    let data = read_file(path);
    let records: Vec<SectorRecord<'_>> = match scan_sectors(&data, config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to scan {}: {}", path, e);
            process::exit(1);
        }
    };

    println!("File: {} ({} bytes)", path, data.len());
    println!("Layout: {}, byte order: {:?}", config.layout.name(), config.byte_order);
    println!("Sectors: {}", records.len());
    println!();
    for (i, record) in records.iter().enumerate() {
        let h = &record.header;
        let parent = if i == 0 { "-".to_string() } else { h.parent_id.to_string() };
        println!(
            "  [{}] id {} parent {} @ {}..{}  v{}/{}  {} blocks, {} primitives",
            i,
            h.id,
            parent,
            record.offset,
            record.end(),
            h.format_version,
            h.optimizer_version,
            record.blocks.len(),
            record.rendered_counts().total(),
        );
        for block in &record.blocks {
            tracing::debug!("      {} x{} ({} bytes)", block.ty, block.count, block.byte_count());
        }
    }
}

fn cmd_tree(path: &str, config: &DecoderConfig) {
    let scene = open_scene(path, config);
    println!("File: {}", path);
    println!();
    for sector in scene.tree.iter() {
        let indent = "  ".repeat(sector.depth);
        let b = &sector.bbox;
        println!(
            "{}{} [id {}] ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})  {} primitives",
            indent,
            sector.path,
            sector.id,
            b.min.x,
            b.min.y,
            b.min.z,
            b.max.x,
            b.max.y,
            b.max.z,
            sector.geometry_count(),
        );
    }
}

fn cmd_stats(path: &str, config: &DecoderConfig) {
    let start = std::time::Instant::now();
    let scene = open_scene(path, config);
    let elapsed = start.elapsed();

    println!("File: {}", path);
    println!("Decoded in {:.2?}", elapsed);
    println!();
    println!("{}", scene.stats);
}
