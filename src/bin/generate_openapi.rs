//! Writes the telemetry API's OpenAPI document.
//!
//! Usage:
//!   cargo run --bin generate_openapi                      # print to stdout
//!   cargo run --bin generate_openapi -- --output api.json # write a file
//!   cargo run --bin generate_openapi -- --check api.json  # fail if stale

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use insulin_fridge_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

enum Mode {
    Stdout,
    Write(PathBuf),
    Check(PathBuf),
}

fn parse_mode(args: &[String]) -> Mode {
    let value_of = |flag: &str| {
        args.windows(2)
            .find(|w| w[0] == flag)
            .map(|w| PathBuf::from(&w[1]))
    };
    if let Some(path) = value_of("--check") {
        Mode::Check(path)
    } else if let Some(path) = value_of("--output") {
        Mode::Write(path)
    } else {
        Mode::Stdout
    }
}

fn main() -> ExitCode {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialise OpenAPI document: {e}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = env::args().collect();
    match parse_mode(&args) {
        Mode::Stdout => {
            if let Err(e) = io::stdout().write_all(json.as_bytes()) {
                eprintln!("Error writing to stdout: {e}");
                return ExitCode::FAILURE;
            }
        }
        Mode::Write(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing to {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
            eprintln!("OpenAPI document written to {}", path.display());
        }
        Mode::Check(path) => match fs::read_to_string(&path) {
            Ok(existing) if existing == json => eprintln!("{} is up to date", path.display()),
            Ok(_) => {
                eprintln!("{} is stale; regenerate with --output", path.display());
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}
