//! Table definitions and typed row decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{Endian, FieldKind, RowLayout, Value};
use crate::scr::dump::escape_field;
use crate::scr::{ScrFile, ScrRow};
use crate::table::format::FormatSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    /// `u32` pointer to a message, decoded to text.
    Str,
    /// `u32` pointer kept as a number.
    Ptr,
    Bit8,
    Bit16,
    Bit32,
    Bit64,
    Enum8,
    Enum16,
}

impl ColumnType {
    pub fn field_kind(self) -> FieldKind {
        match self {
            ColumnType::S8 => FieldKind::I8,
            ColumnType::U8 | ColumnType::Bit8 | ColumnType::Enum8 => FieldKind::U8,
            ColumnType::S16 => FieldKind::I16,
            ColumnType::U16 | ColumnType::Bit16 | ColumnType::Enum16 => FieldKind::U16,
            ColumnType::S32 => FieldKind::I32,
            ColumnType::U32 | ColumnType::Str | ColumnType::Ptr | ColumnType::Bit32 => {
                FieldKind::U32
            }
            ColumnType::S64 => FieldKind::I64,
            ColumnType::U64 | ColumnType::Bit64 => FieldKind::U64,
            ColumnType::F32 => FieldKind::F32,
        }
    }

    pub fn is_bitfield(self) -> bool {
        matches!(self, ColumnType::Bit8 | ColumnType::Bit16 | ColumnType::Bit32 | ColumnType::Bit64)
    }

    pub fn is_enum(self) -> bool {
        matches!(self, ColumnType::Enum8 | ColumnType::Enum16)
    }
}

/// A sub-field of a `bit*` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    pub name: String,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    /// Byte offset within the row.
    pub offset: u32,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<BitField>,
    /// Labels for `enum*` columns, keyed by the decimal value.
    #[serde(default, rename = "enum", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Where a table's SCR file(s) live: one path, or one per language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TablePaths {
    Single(String),
    ByLanguage(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub paths: TablePaths,
    pub row_length: u32,
    /// `"<"` (default) or `">"`.
    #[serde(default, alias = "endianess", skip_serializing_if = "Option::is_none")]
    pub endianness: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Resolve the file path for `language`.
    pub fn path_for(&self, language: Option<&str>) -> Result<&str> {
        match (&self.paths, language) {
            (TablePaths::Single(path), _) => Ok(path),
            (TablePaths::ByLanguage(paths), Some(lang)) => paths
                .get(lang)
                .map(String::as_str)
                .ok_or_else(|| Error::layout(format!("no path for language {lang:?}"))),
            (TablePaths::ByLanguage(_), None) => {
                Err(Error::layout("table has per-language paths; a language is required"))
            }
        }
    }

    /// Languages this table has files for, sorted by code.
    pub fn languages(&self) -> Vec<&str> {
        match &self.paths {
            TablePaths::Single(_) => Vec::new(),
            TablePaths::ByLanguage(paths) => paths.keys().map(String::as_str).collect(),
        }
    }

    /// Validate the column list and build a decoder. Bytes not covered by any
    /// column become hex `gap` columns named `c<offset>`.
    pub fn compile(&self) -> Result<RowSchema> {
        let endian = Endian::from_marker(self.endianness.as_deref().unwrap_or("<"))?;
        let row_length = self.row_length as usize;
        let mut fields = Vec::new();
        let mut columns = Vec::new();
        let mut cursor = 0usize;

        for def in &self.columns {
            let offset = def.offset as usize;
            if offset < cursor {
                return Err(Error::layout(format!(
                    "column {:?} at offset {} overlaps the previous column",
                    def.name, def.offset
                )));
            }
            if offset > cursor {
                fields.push(FieldKind::Bytes(offset - cursor));
                columns.push(CompiledColumn::Gap { name: format!("c{cursor}") });
            }

            let kind = def.kind.field_kind();
            cursor = offset + kind.size();
            if cursor > row_length {
                return Err(Error::layout(format!(
                    "column {:?} ends at {} past row length {}",
                    def.name, cursor, row_length
                )));
            }

            let mut bits = Vec::with_capacity(def.columns.len());
            if def.kind.is_bitfield() {
                let width = kind.size() as u32 * 8;
                for bit in &def.columns {
                    let end = bit.offset.checked_add(bit.length);
                    if bit.length == 0 || end.map_or(true, |end| end > width) {
                        return Err(Error::layout(format!(
                            "bit field {:?} does not fit in {}-bit column {:?}",
                            bit.name, width, def.name
                        )));
                    }
                    bits.push(FormatSpec::parse(&bit.format)?);
                }
            }
            if def.kind.is_enum() && def.labels.is_empty() {
                return Err(Error::layout(format!("enum column {:?} has no labels", def.name)));
            }

            fields.push(kind);
            columns.push(CompiledColumn::Field {
                def: def.clone(),
                format: FormatSpec::parse(&def.format)?,
                bits,
            });
        }

        if cursor < row_length {
            fields.push(FieldKind::Bytes(row_length - cursor));
            columns.push(CompiledColumn::Gap { name: format!("c{cursor}") });
        }

        Ok(RowSchema { layout: RowLayout::new(endian, fields)?, columns })
    }
}

#[derive(Debug, Clone)]
enum CompiledColumn {
    Gap { name: String },
    Field { def: ColumnDef, format: FormatSpec, bits: Vec<FormatSpec> },
}

/// Decoded cell contents.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub name: String,
    pub value: CellValue,
    format: FormatSpec,
    /// Raw bit-field containers are kept for lookup but not rendered.
    hidden: bool,
}

/// One row decoded against a [`RowSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub index: usize,
    pub offset: usize,
    pub cells: Vec<Cell>,
}

impl TypedRow {
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.cells.iter().find(|c| c.name == name).map(|c| &c.value)
    }

    /// Tab-delimited rendering of the visible cells.
    pub fn to_text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| escape_field(&c.format.render(&c.value)))
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// Compiled form of a [`TableDef`].
#[derive(Debug, Clone)]
pub struct RowSchema {
    layout: RowLayout,
    columns: Vec<CompiledColumn>,
}

impl RowSchema {
    pub fn row_length(&self) -> usize {
        self.layout.size()
    }

    /// Names of the rendered columns, in output order.
    pub fn headers(&self) -> Vec<String> {
        let mut out = Vec::new();
        for column in &self.columns {
            match column {
                CompiledColumn::Gap { name } => out.push(name.clone()),
                CompiledColumn::Field { def, .. } if def.kind.is_bitfield() => {
                    out.extend(def.columns.iter().map(|b| b.name.clone()))
                }
                CompiledColumn::Field { def, .. } => out.push(def.name.clone()),
            }
        }
        out
    }

    pub fn decode(&self, scr: &ScrFile, row: &ScrRow<'_>) -> Result<TypedRow> {
        let values = self.layout.unpack(row.bytes)?;
        let mut cells = Vec::with_capacity(values.len());

        for (column, value) in self.columns.iter().zip(values) {
            match column {
                CompiledColumn::Gap { name } => cells.push(Cell {
                    name: name.clone(),
                    value: to_cell(value),
                    format: FormatSpec::default(),
                    hidden: false,
                }),
                CompiledColumn::Field { def, format, bits } => {
                    let raw = value.as_u64();
                    let cell_value = match (def.kind, raw) {
                        (ColumnType::Str, Some(pointer)) => {
                            CellValue::Text(scr.string_at(pointer as u32)?)
                        }
                        (kind, Some(v)) if kind.is_enum() => {
                            let label = def.labels.get(&v.to_string()).ok_or_else(|| {
                                Error::layout(format!(
                                    "value {v} has no label in enum column {:?}",
                                    def.name
                                ))
                            })?;
                            CellValue::Text(label.clone())
                        }
                        _ => to_cell(value),
                    };

                    cells.push(Cell {
                        name: def.name.clone(),
                        value: cell_value,
                        format: *format,
                        hidden: def.kind.is_bitfield(),
                    });

                    if def.kind.is_bitfield() {
                        let raw = raw.unwrap_or(0);
                        for (bit, bit_format) in def.columns.iter().zip(bits) {
                            let mask =
                                if bit.length >= 64 { u64::MAX } else { (1u64 << bit.length) - 1 };
                            cells.push(Cell {
                                name: bit.name.clone(),
                                value: CellValue::UInt((raw >> bit.offset) & mask),
                                format: *bit_format,
                                hidden: false,
                            });
                        }
                    }
                }
            }
        }

        Ok(TypedRow { index: row.index, offset: row.offset, cells })
    }

    /// Decode every row of `scr`.
    pub fn decode_all(&self, scr: &ScrFile) -> Result<Vec<TypedRow>> {
        if scr.row_length() != self.row_length() {
            return Err(Error::layout(format!(
                "table defines {}-byte rows but file has {}-byte rows",
                self.row_length(),
                scr.row_length()
            )));
        }
        scr.rows().map(|row| self.decode(scr, &row)).collect()
    }
}

fn to_cell(value: Value) -> CellValue {
    match value {
        Value::Int(v) => CellValue::Int(v),
        Value::UInt(v) => CellValue::UInt(v),
        Value::Float(v) => CellValue::Float(v),
        Value::Bool(b) => CellValue::UInt(u64::from(b)),
        Value::Bytes(bytes) => CellValue::Bytes(bytes),
    }
}
