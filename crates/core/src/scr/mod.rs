//! SCR table files.
//!
//! An SCR file is a flat table of fixed-length rows plus a pool of encoded
//! messages that rows point into. The data starts with the magic
//! `13 80 03 1D`, either at offset 0 or behind a 0x10-byte outer prefix; all
//! offsets below are relative to the magic.
//!
//! ```text
//! 0x14      u32  offset of the table info block
//! info+0x0  u32  row count
//! info+0x4  u32  row length in bytes
//! info+0x8  u32  offset of the first row
//! ```

pub mod dump;
pub mod text;

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::reader::ByteReader;

pub use dump::{default_output_path, dump_file, write_lines, DumpOptions, DumpReport};

/// Signature at the start of SCR data.
pub const SCR_MAGIC: [u8; 4] = [0x13, 0x80, 0x03, 0x1D];

/// Size of the optional outer prefix in front of the SCR data.
pub const SCR_PREFIX_SIZE: usize = 0x10;

const TABLE_INFO_POINTER: usize = 0x14;

/// Table geometry read from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScrHeader {
    pub table_info_offset: u32,
    pub row_count: u32,
    pub row_length: u32,
    pub table_offset: u32,
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrRow<'a> {
    pub index: usize,
    /// Offset of the row within the SCR data.
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// One decoded row: its position, the string pointers that were followed and
/// the messages they resolved to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScrRecord {
    pub index: usize,
    pub offset: usize,
    pub pointers: Vec<u32>,
    pub strings: Vec<String>,
    pub bytes: Vec<u8>,
}

/// A loaded SCR file. Row bounds are validated when the file is parsed, so
/// row access afterwards cannot fail.
#[derive(Debug, Clone)]
pub struct ScrFile {
    data: Vec<u8>,
    header: ScrHeader,
}

impl ScrFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(fs::read(path.as_ref())?)
    }

    /// Parse raw file contents, stripping the outer prefix if present.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let data = if raw.starts_with(&SCR_MAGIC) {
            raw
        } else if ByteReader::new(&raw).matches_at(SCR_PREFIX_SIZE, &SCR_MAGIC) {
            raw[SCR_PREFIX_SIZE..].to_vec()
        } else {
            return Err(Error::InvalidMagic {
                expected: SCR_MAGIC.to_vec(),
                found: raw[..raw.len().min(SCR_MAGIC.len())].to_vec(),
            });
        };

        let header = parse_header(&data)?;
        log::debug!(
            "scr: {} rows of {} bytes at 0x{:X}",
            header.row_count,
            header.row_length,
            header.table_offset
        );
        Ok(Self { data, header })
    }

    pub fn header(&self) -> &ScrHeader {
        &self.header
    }

    pub fn row_count(&self) -> usize {
        self.header.row_count as usize
    }

    pub fn row_length(&self) -> usize {
        self.header.row_length as usize
    }

    /// SCR data, starting at the magic.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row(&self, index: usize) -> Option<ScrRow<'_>> {
        if index >= self.row_count() {
            return None;
        }
        let offset = self.header.table_offset as usize + index * self.row_length();
        Some(ScrRow { index, offset, bytes: &self.data[offset..offset + self.row_length()] })
    }

    pub fn rows(&self) -> impl Iterator<Item = ScrRow<'_>> + '_ {
        (0..self.row_count()).filter_map(move |index| self.row(index))
    }

    /// Read the `u32` message pointer stored `rel_offset` bytes into `row`.
    pub fn pointer(&self, row: &ScrRow<'_>, rel_offset: u32) -> Result<u32> {
        let rel = rel_offset as usize;
        if rel + 4 > row.bytes.len() {
            return Err(Error::layout(format!(
                "string offset {} does not fit in a {}-byte row",
                rel_offset,
                row.bytes.len()
            )));
        }
        ByteReader::new(row.bytes).u32_at(rel)
    }

    /// Decode the message starting at `offset`.
    pub fn string_at(&self, offset: u32) -> Result<String> {
        text::decode_message(&self.data, offset as usize)
    }

    /// Decode `row`, following one message pointer per entry in `string_offsets`.
    pub fn record(&self, row: &ScrRow<'_>, string_offsets: &[u32]) -> Result<ScrRecord> {
        let mut pointers = Vec::with_capacity(string_offsets.len());
        let mut strings = Vec::with_capacity(string_offsets.len());
        for &rel in string_offsets {
            let pointer = self.pointer(row, rel)?;
            strings.push(self.string_at(pointer)?);
            pointers.push(pointer);
        }
        Ok(ScrRecord {
            index: row.index,
            offset: row.offset,
            pointers,
            strings,
            bytes: row.bytes.to_vec(),
        })
    }

    /// Decode every row in table order.
    pub fn records(&self, string_offsets: &[u32]) -> Result<Vec<ScrRecord>> {
        self.rows().map(|row| self.record(&row, string_offsets)).collect()
    }
}

fn parse_header(data: &[u8]) -> Result<ScrHeader> {
    let reader = ByteReader::new(data);
    let table_info_offset = reader.u32_at(TABLE_INFO_POINTER)?;
    let info = table_info_offset as usize;
    let header = ScrHeader {
        table_info_offset,
        row_count: reader.u32_at(info)?,
        row_length: reader.u32_at(info + 4)?,
        table_offset: reader.u32_at(info + 8)?,
    };

    if header.row_length == 0 && header.row_count > 0 {
        return Err(Error::layout(format!(
            "{} rows declared with a row length of 0",
            header.row_count
        )));
    }

    let table_len = u64::from(header.row_count) * u64::from(header.row_length);
    let table_end = u64::from(header.table_offset) + table_len;
    if table_end > data.len() as u64 {
        return Err(Error::UnexpectedEof {
            offset: header.table_offset as usize,
            needed: usize::try_from(table_len).unwrap_or(usize::MAX),
            available: data.len().saturating_sub(header.table_offset as usize),
        });
    }

    Ok(header)
}
