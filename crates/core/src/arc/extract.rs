//! Extraction of container entries to disk.
//!
//! A single file is extracted strictly: any problem is returned to the
//! caller. A directory is walked depth-first and every `.bin` file in it is
//! tried; files that are not valid containers are logged and recorded in
//! [`ExtractReport::skipped`] so one bad file does not stop the batch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::arc::ArcFile;
use crate::error::{Error, ErrorKind, Result};

/// Extension (without the dot) of files considered in directory mode.
pub const CONTAINER_EXTENSION: &str = "bin";

/// Options controlling where and whether entries are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Root directory that receives one sub-directory per container.
    pub out_dir: PathBuf,
    /// Report what would be written without touching the filesystem.
    pub dry_run: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { out_dir: PathBuf::from("bin"), dry_run: false }
    }
}

impl ExtractOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), ..Self::default() }
    }
}

/// One entry written (or, in dry-run mode, planned) to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    pub path: String,
    pub output: PathBuf,
    pub offset: u32,
    pub length: u32,
    pub sha256: String,
}

/// An entry that was not written, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Result of extracting one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
    pub entries: Vec<ExtractedEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_entries: Vec<SkippedEntry>,
}

impl FileReport {
    /// Sum of the lengths of all extracted entries.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.length)).sum()
    }
}

/// A `.bin` file that could not be parsed as a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub source: PathBuf,
    pub reason: String,
}

/// Aggregate result of an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

impl ExtractReport {
    /// Number of entries extracted across all containers.
    pub fn entry_count(&self) -> usize {
        self.files.iter().map(|f| f.entries.len()).sum()
    }

    /// Number of warnings raised (skipped files plus skipped entries).
    pub fn warning_count(&self) -> usize {
        self.skipped.len() + self.files.iter().map(|f| f.skipped_entries.len()).sum::<usize>()
    }
}

/// Extract every in-bounds entry of the container at `source` into `dest_dir`.
///
/// Entries are written in table order. Entries whose range runs past the end
/// of the file, or whose name would escape `dest_dir`, are skipped with a
/// warning. Existing output files are overwritten.
pub fn extract_file(
    source: &Path,
    dest_dir: &Path,
    options: &ExtractOptions,
) -> Result<FileReport> {
    let arc = ArcFile::open(source)?;
    let mut report = FileReport {
        source: source.to_path_buf(),
        dest_dir: dest_dir.to_path_buf(),
        entries: Vec::with_capacity(arc.len()),
        skipped_entries: Vec::new(),
    };

    for entry in arc.entries() {
        if !entry.in_bounds(arc.file_len()) {
            let reason = format!(
                "range 0x{:X}+0x{:X} exceeds file size 0x{:X}",
                entry.file_offset,
                entry.file_length,
                arc.file_len()
            );
            log::warn!("{}: skipping entry {}: {}", source.display(), entry.path, reason);
            report.skipped_entries.push(SkippedEntry { path: entry.path.clone(), reason });
            continue;
        }

        let relative = match entry.relative_path() {
            Ok(rel) => rel,
            Err(err) => {
                log::warn!("{}: skipping entry: {}", source.display(), err);
                report
                    .skipped_entries
                    .push(SkippedEntry { path: entry.path.clone(), reason: err.to_string() });
                continue;
            }
        };

        let data = arc.entry_data(entry)?;
        let output = dest_dir.join(relative);

        if !options.dry_run {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, data)?;
        }
        log::info!("{}", output.display());

        report.entries.push(ExtractedEntry {
            path: entry.path.clone(),
            output,
            offset: entry.file_offset,
            length: entry.file_length,
            sha256: format!("{:x}", Sha256::digest(data)),
        });
    }

    Ok(report)
}

/// Extract a single container file, or every container under a directory.
///
/// For a file, entries land in `out_dir/<file stem>/` and any error is
/// returned. For a directory, each `.bin` file `dir/a/b.bin` lands in
/// `out_dir/a/b/`; format errors are logged and recorded as skipped while
/// I/O errors still abort the run.
pub fn extract_path(input: &Path, options: &ExtractOptions) -> Result<ExtractReport> {
    let mut report = ExtractReport::default();

    if input.is_file() {
        let stem = input.file_stem().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("out"));
        let dest = options.out_dir.join(stem);
        report.files.push(extract_file(input, &dest, options)?);
        return Ok(report);
    }

    if !input.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not an existing file or folder", input.display()),
        )));
    }

    for source in collect_containers(input, &options.out_dir) {
        let relative = source.strip_prefix(input).unwrap_or(source.as_path()).with_extension("");
        let dest = options.out_dir.join(relative);

        match extract_file(&source, &dest, options) {
            Ok(file_report) => report.files.push(file_report),
            Err(err) if err.kind() != ErrorKind::Io => {
                log::warn!("skipping {}: {}", source.display(), err);
                report.skipped.push(SkippedFile { source, reason: err.to_string() });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

/// Depth-first, name-ordered list of `.bin` files under `root`, excluding
/// anything inside `out_dir` so repeated runs do not re-extract their output.
fn collect_containers(root: &Path, out_dir: &Path) -> Vec<PathBuf> {
    let out_canon = out_dir.canonicalize().ok();

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match (&out_canon, e.path().canonicalize()) {
            (Some(out), Ok(path)) => &path != out,
            _ => true,
        })
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("walk error: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}
