use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lifepack_core::arc::{extract_path, ExtractReport};

use crate::commands::load_tool_config;

/// Extract a `.bin` container, or every container under a folder.
///
/// `out` and `dry_run` override the values from `config`. In folder mode,
/// files that are not valid containers are reported and skipped; the command
/// still succeeds.
pub fn unpack_command(
    path: &str,
    out: Option<&str>,
    dry_run: bool,
    manifest: Option<&str>,
    json: bool,
    config: Option<&str>,
) -> Result<ExtractReport> {
    let mut options = load_tool_config(config)?.extract;
    if let Some(out) = out {
        options.out_dir = out.into();
    }
    options.dry_run |= dry_run;
    log::debug!("extract options: {:?}", options);

    let input = Path::new(path);
    let report = extract_path(input, &options)
        .with_context(|| format!("Failed to extract {}", input.display()))?;

    if let Some(manifest) = manifest {
        let body = serde_json::to_string_pretty(&report)
            .context("Failed to serialize extraction report")?;
        fs::write(manifest, body)
            .with_context(|| format!("Failed to write manifest {manifest}"))?;
    }

    if json {
        let serialized = serde_json::to_string_pretty(&report)?;
        println!("{}", serialized);
        return Ok(report);
    }

    let verb = if options.dry_run { "Would extract" } else { "Extracted" };
    println!(
        "{} {} entries from {} container(s) into {}",
        verb,
        report.entry_count(),
        report.files.len(),
        options.out_dir.display()
    );
    for file in &report.files {
        println!(
            "- {} ({} entries, {} bytes)",
            file.source.display(),
            file.entries.len(),
            file.total_bytes()
        );
        for skipped in &file.skipped_entries {
            println!("  skipped entry {}: {}", skipped.path, skipped.reason);
        }
    }
    if !report.skipped.is_empty() {
        println!("Skipped ({}):", report.skipped.len());
        for skipped in &report.skipped {
            println!("- {}: {}", skipped.source.display(), skipped.reason);
        }
    }

    Ok(report)
}
