//! Tool configuration and JSON/YAML file helpers.
//!
//! Both tools accept an optional defaults file (`--config`). The format is
//! chosen by extension: `.yaml`/`.yml` are YAML, anything else is JSON.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arc::ExtractOptions;
use crate::error::Result;
use crate::scr::DumpOptions;

/// Defaults for both tools. Missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub extract: ExtractOptions,
    pub dump: DumpOptions,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        read_structured(path)
    }
}

/// True if `path` has a YAML extension.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
        Some("yaml" | "yml")
    )
}

/// Deserialize a JSON or YAML file, picking the format by extension.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = fs::read_to_string(path)?;
    if is_yaml_path(path) {
        Ok(serde_yaml::from_str(&body)?)
    } else {
        Ok(serde_json::from_str(&body)?)
    }
}

/// Serialize to a JSON (pretty, 4-space indent) or YAML file by extension.
pub fn write_structured<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = if is_yaml_path(path) {
        serde_yaml::to_string(value)?
    } else {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        buf.push(b'\n');
        String::from_utf8_lossy(&buf).into_owned()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    Ok(())
}
