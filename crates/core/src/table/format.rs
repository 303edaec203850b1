//! Per-column text formatting (`""`, `d`, `x`, `08X`, `.2f`, ...).

use crate::error::{Error, Result};
use crate::table::schema::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Style {
    #[default]
    Default,
    Decimal,
    LowerHex,
    UpperHex,
    Binary,
    Octal,
    Fixed,
    Str,
}

/// A parsed `[0][width][.precision][type]` format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSpec {
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    style: Style,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let bad = || Error::layout(format!("unsupported format spec {spec:?}"));
        let mut out = FormatSpec::default();
        let mut rest = spec;

        if rest.len() > 1 && rest.starts_with('0') {
            out.zero_pad = true;
            rest = &rest[1..];
        }

        let width_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if width_len > 0 {
            out.width = rest[..width_len].parse().map_err(|_| bad())?;
        }
        rest = &rest[width_len..];

        if let Some(after_dot) = rest.strip_prefix('.') {
            let prec_len =
                after_dot.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_dot.len());
            if prec_len == 0 {
                return Err(bad());
            }
            out.precision = Some(after_dot[..prec_len].parse().map_err(|_| bad())?);
            rest = &after_dot[prec_len..];
        }

        out.style = match rest {
            "" if out.precision.is_some() => Style::Fixed,
            "" => Style::Default,
            "d" => Style::Decimal,
            "x" => Style::LowerHex,
            "X" => Style::UpperHex,
            "b" => Style::Binary,
            "o" => Style::Octal,
            "f" => Style::Fixed,
            "s" => Style::Str,
            _ => return Err(bad()),
        };
        Ok(out)
    }

    pub fn render(&self, value: &CellValue) -> String {
        let (body, numeric) = match value {
            CellValue::Int(v) => (self.render_int(*v < 0, v.unsigned_abs()), true),
            CellValue::UInt(v) => (self.render_int(false, *v), true),
            CellValue::Float(v) => {
                let text = match (self.style, self.precision) {
                    (Style::Fixed, p) => format!("{:.*}", p.unwrap_or(6), v),
                    _ => format!("{v:?}"),
                };
                (text, true)
            }
            CellValue::Text(s) => (s.clone(), false),
            CellValue::Bytes(bytes) => {
                (bytes.iter().map(|b| format!("{b:02x}")).collect::<String>(), false)
            }
        };
        self.pad(body, numeric)
    }

    fn render_int(&self, negative: bool, magnitude: u64) -> String {
        let digits = match self.style {
            Style::LowerHex => format!("{magnitude:x}"),
            Style::UpperHex => format!("{magnitude:X}"),
            Style::Binary => format!("{magnitude:b}"),
            Style::Octal => format!("{magnitude:o}"),
            _ => magnitude.to_string(),
        };
        if negative {
            format!("-{digits}")
        } else {
            digits
        }
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let fill = self.width - len;
        if numeric && self.zero_pad {
            match body.strip_prefix('-') {
                Some(unsigned) => format!("-{}{}", "0".repeat(fill), unsigned),
                None => format!("{}{}", "0".repeat(fill), body),
            }
        } else if numeric {
            format!("{}{}", " ".repeat(fill), body)
        } else {
            format!("{}{}", body, " ".repeat(fill))
        }
    }
}
