use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dc6_core::{DecodeOptions, report_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        let input = path.join("input.dc6");
        if !path.is_dir() || !input.exists() {
            continue;
        }
        regenerate_one(&input, &path.join("expected_report.json"))?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let mut report = report_file(input, &DecodeOptions::default(), true)
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    // Golden tests overwrite the path, so keep it machine independent.
    report.input.path = "input.dc6".to_string();
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
