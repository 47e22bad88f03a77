//! CLI tool for dvtable - lays out a table config headlessly and outputs a
//! JSON snapshot
//!
//! Usage:
//!   dvtable_cli <config.json>              # Output JSON to stdout
//!   dvtable_cli <config.json> -o out.json  # Output JSON to file
//!
//! Set `RUST_LOG=debug` to trace layout passes on stderr.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use dvtable::{HeadlessSurface, Surface, Table, TableConfig, TableContext};

/// Frames to settle: the first pass, the overflow pass, and expand checks.
const MAX_FRAMES: usize = 4;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: dvtable_cli <config.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    let text = match fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let config = match TableConfig::from_json(&text) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            std::process::exit(1);
        }
    };

    let surface = Rc::new(HeadlessSurface::new());
    let container = surface.root();
    let context = TableContext::new();
    let shared: Rc<dyn Surface> = Rc::clone(&surface) as Rc<dyn Surface>;
    let table = match Table::new(shared, container, config, &context) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error building table: {}", e);
            std::process::exit(1);
        }
    };
    for _ in 0..MAX_FRAMES {
        if surface.run_frames() == 0 {
            break;
        }
    }

    let json = match serde_json::to_string_pretty(&table.snapshot()) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };
    table.destroy();

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
