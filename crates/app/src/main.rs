//! `facade`: headless host and dataset tooling for the facade engine.
//!
//!   facade host <plots.json> [config.bin]
//!   facade validate <plots.json> [--write-sorted]

use std::process::ExitCode;

mod host_mode;
mod validate_mode;

const USAGE: &str = "usage:
  facade host <plots.json> [config.bin]
  facade validate <plots.json> [--write-sorted]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((mode, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match mode.as_str() {
        "host" => host_mode::run(rest),
        "validate" => validate_mode::run(rest),
        other => {
            eprintln!("unknown mode {other:?}\n{USAGE}");
            ExitCode::from(2)
        }
    }
}
