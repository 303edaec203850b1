use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lifepack_core::scr::{default_output_path, dump_file, DumpReport};

use crate::commands::load_tool_config;

/// Dump an SCR table to tab-delimited text.
///
/// Non-empty `string_offsets` and a given `layout` replace the values from
/// `config`. The output defaults to `<stem>_table.txt` in the current
/// directory.
pub fn dump_command(
    input: &str,
    output: Option<&str>,
    string_offsets: Vec<u32>,
    layout: Option<String>,
    config: Option<&str>,
) -> Result<DumpReport> {
    let mut options = load_tool_config(config)?.dump;
    if !string_offsets.is_empty() {
        options.string_offsets = string_offsets;
    }
    if layout.is_some() {
        options.layout = layout;
    }
    log::debug!("dump options: {:?}", options);

    let input_path = Path::new(input);
    let output_path = output.map(PathBuf::from).unwrap_or_else(|| default_output_path(input_path));

    let report = dump_file(input_path, &output_path, &options)
        .with_context(|| format!("Failed to dump {}", input_path.display()))?;

    println!("Dumped {} rows:", report.rows);
    println!("  Input:  {}", report.input.display());
    println!("  Output: {}", report.output.display());

    Ok(report)
}
