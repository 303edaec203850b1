//! Synthetic `.bin` and `.scr` fixtures shared by the core tests.
#![allow(dead_code)]

use lifepack_core::scr::SCR_MAGIC;

pub const ARC_TABLE_RECORD: usize = 0x14;

/// Build a container holding `entries` in table order. Each payload is
/// followed by its name; the entry table sits at the end of the file.
pub fn build_arc(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut data = vec![0u8; 0x14];
    let mut records = Vec::new();

    for (name, payload) in entries {
        let file_offset = data.len() as u32;
        data.extend_from_slice(payload);
        let path_offset = data.len() as u32;
        data.extend_from_slice(name.as_bytes());
        records.push((name.len() as u8, payload.len() as u32, path_offset, file_offset));
    }

    let entries_offset = data.len() as u32;
    for (path_len, file_len, path_offset, file_offset) in records {
        data.push(0);
        data.push(path_len);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&file_len.to_le_bytes());
        data.extend_from_slice(&path_offset.to_le_bytes());
        data.extend_from_slice(&file_offset.to_le_bytes());
    }

    data[0..4].copy_from_slice(b"R \rC");
    let data_length = (data.len() - 0x14) as u32;
    data[0x04..0x08].copy_from_slice(&data_length.to_le_bytes());
    data[0x10..0x14].copy_from_slice(&entries_offset.to_le_bytes());
    data
}

/// Offset of the entry table written by [`build_arc`].
pub fn arc_table_offset(data: &[u8]) -> usize {
    u32::from_le_bytes([data[0x10], data[0x11], data[0x12], data[0x13]]) as usize
}

/// Overwrite the `file_length` field of entry `index`.
pub fn patch_entry_length(data: &mut [u8], index: usize, length: u32) {
    let at = arc_table_offset(data) + index * ARC_TABLE_RECORD + 8;
    data[at..at + 4].copy_from_slice(&length.to_le_bytes());
}

pub const SCR_TABLE_OFFSET: usize = 0x24;

/// Builds an SCR file: header, `row_count` rows of `row_length` bytes, then
/// a message pool. Message offsets are known before rows are added, so rows
/// can embed pointers returned by [`ScrBuilder::message`].
pub struct ScrBuilder {
    row_length: usize,
    row_count: usize,
    rows: Vec<u8>,
    pool: Vec<u8>,
}

impl ScrBuilder {
    pub fn new(row_length: usize, row_count: usize) -> Self {
        Self { row_length, row_count, rows: Vec::new(), pool: Vec::new() }
    }

    /// Append raw message bytes to the pool and return their offset.
    pub fn message(&mut self, bytes: &[u8]) -> u32 {
        let offset = SCR_TABLE_OFFSET + self.row_length * self.row_count + self.pool.len();
        self.pool.extend_from_slice(bytes);
        offset as u32
    }

    /// Append a plain UTF-16 message with its terminator.
    pub fn text(&mut self, s: &str) -> u32 {
        self.message(&message(&[&utf16(s)]))
    }

    pub fn row(&mut self, bytes: &[u8]) -> &mut Self {
        assert_eq!(bytes.len(), self.row_length, "row length");
        self.rows.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        assert_eq!(self.rows.len(), self.row_length * self.row_count, "row count");
        let mut data = vec![0u8; SCR_TABLE_OFFSET];
        data[0..4].copy_from_slice(&SCR_MAGIC);
        data[0x14..0x18].copy_from_slice(&0x18u32.to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&(self.row_count as u32).to_le_bytes());
        data[0x1C..0x20].copy_from_slice(&(self.row_length as u32).to_le_bytes());
        data[0x20..0x24].copy_from_slice(&(SCR_TABLE_OFFSET as u32).to_le_bytes());
        data.extend_from_slice(&self.rows);
        data.extend_from_slice(&self.pool);
        data
    }
}

pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

pub fn ctrl(word: u32) -> Vec<u8> {
    word.to_le_bytes().to_vec()
}

pub fn u16le(v: u16) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

pub fn u32le(v: u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// Concatenate `parts` and append the `0000` terminator.
pub fn message(parts: &[&[u8]]) -> Vec<u8> {
    let mut out: Vec<u8> = parts.concat();
    out.extend_from_slice(&[0, 0]);
    out
}
