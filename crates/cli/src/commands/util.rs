use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lifepack_core::config::ToolConfig;
use lifepack_core::table::TableCatalog;

/// Load the `--config` defaults file, or built-in defaults when none is given.
pub fn load_tool_config(path: Option<&str>) -> Result<ToolConfig> {
    match path {
        Some(p) => ToolConfig::load(Path::new(p))
            .with_context(|| format!("Failed to load config file {p}")),
        None => Ok(ToolConfig::default()),
    }
}

/// Directory that relative paths inside a catalog are resolved against.
pub fn catalog_base_dir(catalog: &Path) -> PathBuf {
    match catalog.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the table catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<TableCatalog> {
    TableCatalog::load(path)
        .with_context(|| format!("Failed to load table catalog {}", path.display()))
}
