//! Tab-delimited dumps of SCR tables.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::layout::RowLayout;
use crate::scr::ScrFile;

/// Suffix appended to the input stem to name the default output file.
pub const OUTPUT_SUFFIX: &str = "_table.txt";

/// What to put in each row after the offset and index columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Offsets within the row of `u32` message pointers to decode.
    pub string_offsets: Vec<u32>,
    /// Struct-style layout used to unpack the row; raw hex bytes when absent.
    pub layout: Option<String>,
}

/// Summary of a completed dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
}

impl ScrFile {
    /// Render every row as one tab-delimited line:
    /// `0xOFFSET  0xINDEX  strings...  fields...`.
    pub fn to_lines(&self, options: &DumpOptions) -> Result<Vec<String>> {
        let layout = options.layout.as_deref().map(RowLayout::parse).transpose()?;

        let mut lines = Vec::with_capacity(self.row_count());
        for row in self.rows() {
            let record = self.record(&row, &options.string_offsets)?;

            let mut fields = Vec::with_capacity(2 + record.strings.len() + row.bytes.len());
            fields.push(format!("0x{:08X}", record.offset));
            fields.push(format!("0x{:04X}", record.index));
            fields.extend(record.strings.iter().map(|s| escape_field(s)));

            match &layout {
                Some(layout) => {
                    fields.extend(layout.unpack(row.bytes)?.iter().map(|v| v.to_string()))
                }
                None => fields.extend(row.bytes.iter().map(|b| format!("{b:02X}"))),
            }

            lines.push(fields.join("\t"));
        }
        Ok(lines)
    }
}

/// Keep a decoded string on a single line inside a single field.
pub fn escape_field(s: &str) -> String {
    s.replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// `<stem>_table.txt` for `input`, relative to the current directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    PathBuf::from(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Write `lines` (each newline-terminated) to `output` atomically: the data
/// goes to a temporary file next to `output` which is renamed into place only
/// once fully written.
pub fn write_lines(output: &Path, lines: &[String]) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    for line in lines {
        tmp.write_all(line.as_bytes())?;
        tmp.write_all(b"\n")?;
    }
    tmp.flush()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}

/// Load `input`, render it, and write the table to `output`.
///
/// Nothing is written unless every row decodes.
pub fn dump_file(input: &Path, output: &Path, options: &DumpOptions) -> Result<DumpReport> {
    let scr = ScrFile::load(input)?;
    let lines = scr.to_lines(options)?;
    write_lines(output, &lines)?;
    log::info!("{}: {} rows -> {}", input.display(), lines.len(), output.display());

    Ok(DumpReport { input: input.to_path_buf(), output: output.to_path_buf(), rows: lines.len() })
}
