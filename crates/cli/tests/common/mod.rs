//! Minimal container and SCR writers for the CLI tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Container with `entries` laid out as payload, name, payload, name, table.
pub fn build_arc(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut data = vec![0u8; 0x14];
    let mut table = Vec::new();
    for (name, payload) in entries {
        let file_offset = data.len() as u32;
        data.extend_from_slice(payload);
        let path_offset = data.len() as u32;
        data.extend_from_slice(name.as_bytes());

        table.extend_from_slice(&[0, name.len() as u8, 0, 0, 0, 0, 0, 0]);
        table.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        table.extend_from_slice(&path_offset.to_le_bytes());
        table.extend_from_slice(&file_offset.to_le_bytes());
    }
    let entries_offset = data.len() as u32;
    data.extend_from_slice(&table);

    data[0..4].copy_from_slice(b"R \rC");
    let data_length = (data.len() - 0x14) as u32;
    data[0x04..0x08].copy_from_slice(&data_length.to_le_bytes());
    data[0x10..0x14].copy_from_slice(&entries_offset.to_le_bytes());
    data
}

/// SCR file with one 8-byte row per name: a pointer to the name followed by
/// the row index as a `u32`.
pub fn build_scr(names: &[&str]) -> Vec<u8> {
    let table_offset = 0x24usize;
    let mut pool = Vec::new();
    let mut rows = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let pointer = (table_offset + names.len() * 8 + pool.len()) as u32;
        rows.extend_from_slice(&pointer.to_le_bytes());
        rows.extend_from_slice(&(i as u32).to_le_bytes());
        pool.extend(name.encode_utf16().flat_map(|u| u.to_le_bytes()));
        pool.extend_from_slice(&[0, 0]);
    }

    let mut data = vec![0u8; table_offset];
    data[0..4].copy_from_slice(&[0x13, 0x80, 0x03, 0x1D]);
    data[0x14..0x18].copy_from_slice(&0x18u32.to_le_bytes());
    data[0x18..0x1C].copy_from_slice(&(names.len() as u32).to_le_bytes());
    data[0x1C..0x20].copy_from_slice(&8u32.to_le_bytes());
    data[0x20..0x24].copy_from_slice(&(table_offset as u32).to_le_bytes());
    data.extend_from_slice(&rows);
    data.extend_from_slice(&pool);
    data
}

pub fn write(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, data).expect("write fixture");
}

/// Catalog with one `items` table over `items.scr`: a name and an id column.
pub const ITEMS_CATALOG: &str = r#"{
    "items": {
        "paths": "items.scr",
        "row_length": 8,
        "columns": [
            {"name": "name", "type": "str", "offset": 0},
            {"name": "id", "type": "u32", "offset": 4, "format": "03d"}
        ]
    }
}"#;
