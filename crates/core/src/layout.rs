//! Row layouts described by struct-style format strings.
//!
//! A layout string is an optional byte-order prefix followed by field codes,
//! each with an optional repeat count:
//!
//! | code | field | code | field |
//! |------|-------|------|-------|
//! | `b`/`B` | i8 / u8 | `q`/`Q` | i64 / u64 |
//! | `h`/`H` | i16 / u16 | `f`/`d` | f32 / f64 |
//! | `i`/`I` (`l`/`L`) | i32 / u32 | `?` | bool |
//! | `Ns` | N raw bytes | `Nx` | N pad bytes (skipped) |
//!
//! Prefixes: `<` and `=`/`@` are little endian, `>` and `!` big endian. No
//! alignment padding is ever inserted.

use std::fmt;
use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Parse the `"<"` / `">"` markers used in table definitions.
    pub fn from_marker(marker: &str) -> Result<Self> {
        match marker {
            "<" | "=" | "@" | "" => Ok(Endian::Little),
            ">" | "!" => Ok(Endian::Big),
            other => Err(Error::layout(format!("unknown byte order marker {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    Bytes(usize),
    Pad(usize),
}

impl FieldKind {
    pub fn size(self) -> usize {
        match self {
            FieldKind::I8 | FieldKind::U8 | FieldKind::Bool => 1,
            FieldKind::I16 | FieldKind::U16 => 2,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => 4,
            FieldKind::I64 | FieldKind::U64 | FieldKind::F64 => 8,
            FieldKind::Bytes(n) | FieldKind::Pad(n) => n,
        }
    }

    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'b' => FieldKind::I8,
            'B' => FieldKind::U8,
            'h' => FieldKind::I16,
            'H' => FieldKind::U16,
            'i' | 'l' => FieldKind::I32,
            'I' | 'L' => FieldKind::U32,
            'q' => FieldKind::I64,
            'Q' => FieldKind::U64,
            'f' => FieldKind::F32,
            'd' => FieldKind::F64,
            '?' => FieldKind::Bool,
            _ => return None,
        })
    }
}

/// A single unpacked field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl Value {
    /// Integer view of the value, if it has one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => Some(*v as u64),
            Value::Bool(b) => Some(u64::from(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// `count` consecutive fields of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRun {
    pub kind: FieldKind,
    pub count: usize,
}

/// Parsed layout: byte order plus an ordered list of field runs.
///
/// Repeat counts are kept as runs, so a layout's cost does not depend on
/// the counts written in its format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    endian: Endian,
    runs: Vec<FieldRun>,
    size: usize,
}

impl RowLayout {
    /// Build a layout with one run per field.
    pub fn new(endian: Endian, fields: Vec<FieldKind>) -> Result<Self> {
        let runs = fields.into_iter().map(|kind| FieldRun { kind, count: 1 }).collect();
        Self::from_runs(endian, runs)
    }

    fn from_runs(endian: Endian, runs: Vec<FieldRun>) -> Result<Self> {
        let size = runs
            .iter()
            .try_fold(0usize, |total, run| {
                run.kind.size().checked_mul(run.count).and_then(|n| total.checked_add(n))
            })
            .ok_or_else(|| Error::layout("layout size overflows"))?;
        Ok(Self { endian, runs, size })
    }

    pub fn parse(format: &str) -> Result<Self> {
        let mut chars = format.chars().peekable();
        let endian = match chars.peek().copied() {
            Some(c) if "<>=@!".contains(c) => {
                chars.next();
                Endian::from_marker(&c.to_string())?
            }
            _ => Endian::Little,
        };

        let mut runs = Vec::new();
        let mut count: Option<usize> = None;
        for c in chars {
            if c.is_whitespace() {
                if count.is_some() {
                    return Err(Error::layout(format!(
                        "repeat count without a field in {format:?}"
                    )));
                }
                continue;
            }
            if let Some(digit) = c.to_digit(10) {
                let next = count
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit as usize))
                    .ok_or_else(|| Error::layout(format!("repeat count too large in {format:?}")))?;
                count = Some(next);
                continue;
            }

            let n = count.take().unwrap_or(1);
            let run = match c {
                's' => FieldRun { kind: FieldKind::Bytes(n), count: 1 },
                'x' => FieldRun { kind: FieldKind::Pad(n), count: 1 },
                _ => {
                    let kind = FieldKind::from_code(c).ok_or_else(|| {
                        Error::layout(format!("unknown field code {c:?} in {format:?}"))
                    })?;
                    FieldRun { kind, count: n }
                }
            };
            if run.count > 0 {
                runs.push(run);
            }
        }
        if count.is_some() {
            return Err(Error::layout(format!("trailing repeat count in {format:?}")));
        }

        Self::from_runs(endian, runs)
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn runs(&self) -> &[FieldRun] {
        &self.runs
    }

    /// Every field in order, with repeat counts expanded.
    pub fn fields(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.runs.iter().flat_map(|run| std::iter::repeat(run.kind).take(run.count))
    }

    /// Total number of bytes covered by the layout.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unpack `bytes`, which must be exactly [`size`](Self::size) long.
    /// Pad fields produce no value.
    pub fn unpack(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        if bytes.len() != self.size {
            return Err(Error::layout(format!(
                "layout covers {} bytes but row has {}",
                self.size,
                bytes.len()
            )));
        }
        match self.endian {
            Endian::Little => self.unpack_with::<LittleEndian>(bytes),
            Endian::Big => self.unpack_with::<BigEndian>(bytes),
        }
    }

    fn unpack_with<B: ByteOrder>(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let mut cur = Cursor::new(bytes);
        let mut values = Vec::new();
        for field in self.fields() {
            let value = match field {
                FieldKind::I8 => Value::Int(i64::from(cur.read_i8()?)),
                FieldKind::U8 => Value::UInt(u64::from(cur.read_u8()?)),
                FieldKind::I16 => Value::Int(i64::from(cur.read_i16::<B>()?)),
                FieldKind::U16 => Value::UInt(u64::from(cur.read_u16::<B>()?)),
                FieldKind::I32 => Value::Int(i64::from(cur.read_i32::<B>()?)),
                FieldKind::U32 => Value::UInt(u64::from(cur.read_u32::<B>()?)),
                FieldKind::I64 => Value::Int(cur.read_i64::<B>()?),
                FieldKind::U64 => Value::UInt(cur.read_u64::<B>()?),
                FieldKind::F32 => Value::Float(f64::from(cur.read_f32::<B>()?)),
                FieldKind::F64 => Value::Float(cur.read_f64::<B>()?),
                FieldKind::Bool => Value::Bool(cur.read_u8()? != 0),
                FieldKind::Bytes(n) => {
                    let start = cur.position() as usize;
                    cur.set_position((start + n) as u64);
                    Value::Bytes(bytes[start..start + n].to_vec())
                }
                FieldKind::Pad(n) => {
                    cur.set_position(cur.position() + n as u64);
                    continue;
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}
