//! Message decoding.
//!
//! Messages are UTF-16LE text terminated by a `0000` unit, interleaved with
//! 4-byte control words (`FFFFFFxx`) that carry layout and markup. Markup
//! that has a textual meaning is rendered inline; purely visual markup is
//! dropped.

use crate::error::{Error, Result};
use crate::reader::ByteReader;

/// Two alternative texts, rendered as `first / second`.
pub const CTRL_BRANCH: u32 = 0xFFFF_FFE9;
pub const CTRL_LINE_BREAK: u32 = 0xFFFF_FFF0;
/// Wait for a button press before continuing.
pub const CTRL_PAUSE: u32 = 0xFFFF_FFF1;
/// Ruby text over the preceding characters.
pub const CTRL_FURIGANA: u32 = 0xFFFF_FFF4;
pub const CTRL_CHOICE: u32 = 0xFFFF_FFF5;
pub const CTRL_VARIABLE: u32 = 0xFFFF_FFF6;
pub const CTRL_COLOR: u32 = 0xFFFF_FFF7;
pub const CTRL_BUTTON: u32 = 0xFFFF_FFF9;

const FILLER_UNIT: u16 = 0xFFFF;

/// Button glyph names by id. Ids 5/6 and 9 are the large variants.
pub const BUTTON_NAMES: [&str; 11] =
    ["A", "B", "X", "D-Pad", "Circle Pad", "L", "R", "L", "R", "Y", "Y"];

/// Rendering of line breaks and pauses; kept as an escape so every row stays
/// on one output line.
const NEWLINE_ESCAPE: &str = "\\n";

pub fn button_name(id: u32) -> &'static str {
    BUTTON_NAMES.get(id as usize).copied().unwrap_or("?")
}

/// Decode the message starting at `offset` in `data`.
pub fn decode_message(data: &[u8], offset: usize) -> Result<String> {
    let reader = ByteReader::new(data);
    let mut out = MessageBuilder::default();
    let mut pos = offset;

    loop {
        match reader.u32_at(pos).ok() {
            Some(CTRL_BRANCH) => {
                let first_len = reader.u16_at(pos + 22)? as usize;
                pos = advance(&reader, pos, 24)?;
                out.push_utf16(reader.bytes_at(pos, first_len.saturating_sub(2))?);
                out.push_str(" / ");
                pos = advance(&reader, pos, first_len)?;

                if reader.matches_at(pos, &FILLER_UNIT.to_le_bytes()) {
                    pos += 2;
                }
                let second_len = reader.u16_at(pos + 2)? as usize;
                out.push_utf16(reader.bytes_at(pos + 4, second_len.saturating_sub(2))?);
                pos = advance(&reader, pos, 4 + second_len)?;
            }
            Some(CTRL_LINE_BREAK) | Some(CTRL_PAUSE) => {
                out.push_str(NEWLINE_ESCAPE);
                pos = advance(&reader, pos, 8)?;
            }
            Some(CTRL_FURIGANA) => {
                let ruby_len = reader.u16_at(pos + 10)? as usize;
                pos = advance(&reader, pos, 12 + ruby_len)?;
            }
            Some(CTRL_CHOICE) => {
                let count = reader.u32_at(pos + 12)? as usize;
                let table_len = count
                    .checked_mul(4)
                    .and_then(|n| n.checked_add(16))
                    .ok_or_else(|| eof(&reader, pos, usize::MAX))?;
                pos = advance(&reader, pos, table_len)?;

                out.push_str(if out.has_output() { " (" } else { "(" });
                for index in 0..count {
                    let span_len = reader.u16_at(pos + 4)? as usize;
                    let span = reader.bytes_at(pos + 8, span_len)?;
                    out.push_utf16(until_terminator(span));
                    if index + 1 != count {
                        out.push_str(" / ");
                    }
                    pos = advance(&reader, pos, 8 + span_len)?;
                }
                out.push_str(")");
            }
            Some(CTRL_VARIABLE) => {
                let first = reader.u32_at(pos + 4)?;
                let second = reader.u32_at(pos + 8)?;
                out.push_str(&format!("({first}, {second})"));
                pos = advance(&reader, pos, 12)?;
            }
            Some(CTRL_COLOR) => {
                pos = advance(&reader, pos, 12)?;
            }
            Some(CTRL_BUTTON) => {
                let id = reader.u32_at(pos + 8)?;
                out.push_str(button_name(id));
                pos = advance(&reader, pos, 12)?;
            }
            _ => match reader.u16_at(pos)? {
                0 => break,
                FILLER_UNIT => pos += 2,
                unit => {
                    out.push_unit(unit);
                    pos += 2;
                }
            },
        }
    }

    Ok(out.finish())
}

/// Move `pos` forward by `len`, failing if that lands past the end of data.
fn advance(reader: &ByteReader<'_>, pos: usize, len: usize) -> Result<usize> {
    match pos.checked_add(len) {
        Some(next) if next <= reader.len() => Ok(next),
        _ => Err(eof(reader, pos, len)),
    }
}

fn eof(reader: &ByteReader<'_>, pos: usize, needed: usize) -> Error {
    Error::UnexpectedEof { offset: pos, needed, available: reader.len().saturating_sub(pos) }
}

/// Cut a UTF-16LE span at its first `0000` unit.
fn until_terminator(span: &[u8]) -> &[u8] {
    let end = span.chunks_exact(2).position(|unit| unit == [0, 0]).map(|i| i * 2);
    &span[..end.unwrap_or(span.len())]
}

/// Accumulates UTF-16 code units and literal text in order, decoding units
/// lazily so surrogate pairs split across pushes still combine.
#[derive(Debug, Default)]
struct MessageBuilder {
    text: String,
    units: Vec<u16>,
    pushed: bool,
}

impl MessageBuilder {
    fn has_output(&self) -> bool {
        self.pushed
    }

    fn push_unit(&mut self, unit: u16) {
        self.units.push(unit);
        self.pushed = true;
    }

    fn push_utf16(&mut self, bytes: &[u8]) {
        self.flush();
        let units: Vec<u16> =
            bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
        self.text.push_str(&String::from_utf16_lossy(&units));
        self.pushed = true;
    }

    fn push_str(&mut self, s: &str) {
        self.flush();
        self.text.push_str(s);
        self.pushed = true;
    }

    fn flush(&mut self) {
        if !self.units.is_empty() {
            self.text.push_str(&String::from_utf16_lossy(&self.units));
            self.units.clear();
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.text
    }
}
