//! `.bin` sub-archive container (`R \rC` signature).
//!
//! Layout (all little endian):
//!
//! ```text
//! 0x00  [u8; 4]  magic "R \rC"
//! 0x04  u32      data length (file size - 0x14)
//! 0x08  u32      unknown
//! 0x0C  u32      unknown
//! 0x10  u32      entry table offset; the table runs to end of file
//! ```
//!
//! Each 0x14-byte table entry is `u8, u8 path_len, u16, u32, u32 file_len,
//! u32 path_offset, u32 file_offset`. Paths are ASCII, `/`-separated and not
//! NUL-terminated.

pub mod extract;

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::reader::ByteReader;

pub use extract::{
    extract_file, extract_path, ExtractOptions, ExtractReport, ExtractedEntry, FileReport,
    SkippedEntry, SkippedFile,
};

/// Container signature.
pub const ARC_MAGIC: [u8; 4] = *b"R \rC";

/// Size of the fixed header, including the magic.
pub const ARC_HEADER_SIZE: usize = 0x14;

/// Size of one entry table record.
pub const ARC_ENTRY_SIZE: usize = 0x14;

/// Returns true if `data` starts with the container signature.
pub fn is_arc(data: &[u8]) -> bool {
    data.len() >= ARC_MAGIC.len() && data[..ARC_MAGIC.len()] == ARC_MAGIC
}

/// Fixed header at the start of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArcHeader {
    pub data_length: u32,
    pub unknown1: u32,
    pub unknown2: u32,
    pub entries_offset: u32,
}

impl ArcHeader {
    /// Parse and validate the header against the full file contents.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !is_arc(data) {
            return Err(Error::InvalidMagic {
                expected: ARC_MAGIC.to_vec(),
                found: data[..data.len().min(ARC_MAGIC.len())].to_vec(),
            });
        }
        if data.len() < ARC_HEADER_SIZE {
            return Err(Error::TooSmall { needed: ARC_HEADER_SIZE, actual: data.len() });
        }

        let reader = ByteReader::new(data);
        let header = Self {
            data_length: reader.u32_at(0x04)?,
            unknown1: reader.u32_at(0x08)?,
            unknown2: reader.u32_at(0x0C)?,
            entries_offset: reader.u32_at(0x10)?,
        };

        let declared = ARC_HEADER_SIZE as u64 + u64::from(header.data_length);
        if declared != data.len() as u64 {
            return Err(Error::SizeMismatch { declared, actual: data.len() as u64 });
        }

        Ok(header)
    }
}

/// One named byte range inside a container.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArcEntry {
    /// `/`-separated name as stored in the container.
    pub path: String,
    pub file_offset: u32,
    pub file_length: u32,
    pub path_offset: u32,
    pub unknown1: u8,
    pub unknown2: u16,
    pub unknown3: u32,
}

impl ArcEntry {
    /// Whether the payload range lies entirely within a file of `file_len` bytes.
    pub fn in_bounds(&self, file_len: usize) -> bool {
        let end = u64::from(self.file_offset) + u64::from(self.file_length);
        end <= file_len as u64
    }

    /// Convert the stored name into a relative path that cannot escape the
    /// destination directory.
    pub fn relative_path(&self) -> Result<PathBuf> {
        let raw = self.path.as_str();
        if raw.starts_with('/') || raw.contains('\\') || raw.contains(':') {
            return Err(Error::InvalidEntryPath(raw.to_string()));
        }

        let mut out = PathBuf::new();
        for part in raw.split('/') {
            match Path::new(part).components().next() {
                None | Some(Component::CurDir) => continue,
                Some(Component::Normal(_)) => out.push(part),
                Some(_) => return Err(Error::InvalidEntryPath(raw.to_string())),
            }
        }

        if out.as_os_str().is_empty() {
            return Err(Error::InvalidEntryPath(raw.to_string()));
        }
        Ok(out)
    }
}

/// A parsed container that owns its bytes.
#[derive(Debug, Clone)]
pub struct ArcFile {
    data: Vec<u8>,
    header: ArcHeader,
    entries: Vec<ArcEntry>,
}

impl ArcFile {
    /// Read and parse a container from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::parse(data)
    }

    /// Parse a container held in memory.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let header = ArcHeader::parse(&data)?;
        let entries = parse_entries(&data, &header)?;
        log::debug!(
            "container: {} bytes, {} entries, table at 0x{:X}",
            data.len(),
            entries.len(),
            header.entries_offset
        );
        Ok(Self { data, header, entries })
    }

    pub fn header(&self) -> &ArcHeader {
        &self.header
    }

    /// Entries in table order.
    pub fn entries(&self) -> &[ArcEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of the container file in bytes.
    pub fn file_len(&self) -> usize {
        self.data.len()
    }

    /// Borrow the payload of `entry`.
    pub fn entry_data(&self, entry: &ArcEntry) -> Result<&[u8]> {
        ByteReader::new(&self.data).bytes_at(entry.file_offset as usize, entry.file_length as usize)
    }

    /// Find an entry by its stored name.
    pub fn find(&self, path: &str) -> Option<&ArcEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

fn parse_entries(data: &[u8], header: &ArcHeader) -> Result<Vec<ArcEntry>> {
    let reader = ByteReader::new(data);
    let table_start = header.entries_offset as usize;
    let table = reader.tail(table_start)?;

    let remainder = table.len() % ARC_ENTRY_SIZE;
    if remainder != 0 {
        return Err(Error::UnexpectedEof {
            offset: table_start + table.len() - remainder,
            needed: ARC_ENTRY_SIZE,
            available: remainder,
        });
    }

    let mut entries = Vec::with_capacity(table.len() / ARC_ENTRY_SIZE);
    for base in (table_start..data.len()).step_by(ARC_ENTRY_SIZE) {
        let unknown1 = reader.u8_at(base)?;
        let path_length = reader.u8_at(base + 1)?;
        let unknown2 = reader.u16_at(base + 2)?;
        let unknown3 = reader.u32_at(base + 4)?;
        let file_length = reader.u32_at(base + 8)?;
        let path_offset = reader.u32_at(base + 12)?;
        let file_offset = reader.u32_at(base + 16)?;

        let raw_path = reader.bytes_at(path_offset as usize, path_length as usize)?;
        if !raw_path.is_ascii() {
            return Err(Error::InvalidEntryPath(String::from_utf8_lossy(raw_path).into_owned()));
        }
        let path = String::from_utf8_lossy(raw_path).into_owned();

        entries.push(ArcEntry {
            path,
            file_offset,
            file_length,
            path_offset,
            unknown1,
            unknown2,
            unknown3,
        });
    }

    Ok(entries)
}
