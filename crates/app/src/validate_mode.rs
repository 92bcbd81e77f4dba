//! `validate` mode: report gaps in a plot geometry dataset and optionally
//! rewrite it in canonical order.

use std::path::Path;
use std::process::ExitCode;

use engine::plot_locator::{
    read_dataset, sort_dataset, validate_dataset, write_dataset, DatasetIssue, PlotDataError,
};

pub fn run(args: &[String]) -> ExitCode {
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("usage: facade validate <plots.json> [--write-sorted]");
        return ExitCode::from(2);
    };
    let write_sorted = args.iter().any(|a| a == "--write-sorted");

    match validate_file(Path::new(path), write_sorted) {
        Ok(issues) => {
            for issue in &issues {
                println!("{issue}");
            }
            if issues.is_empty() {
                println!("{path}: dataset complete");
                ExitCode::SUCCESS
            } else {
                println!("{path}: {} issues", issues.len());
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Validate the dataset at `path`. With `write_sorted`, the file is
/// rewritten sorted by district, division and plot id.
fn validate_file(path: &Path, write_sorted: bool) -> Result<Vec<DatasetIssue>, PlotDataError> {
    let mut records = read_dataset(path)?;
    let issues = validate_dataset(&records);
    if write_sorted {
        sort_dataset(&mut records);
        write_dataset(path, &records)?;
    }
    Ok(issues)
}
