//! Typed table catalog.
//!
//! A catalog maps table names to [`TableDef`]s describing which SCR file(s)
//! hold the table and how each row's bytes break down into named, typed
//! columns. Catalogs live in a JSON or YAML file; relative SCR paths in it
//! are resolved against the catalog's directory.

pub mod format;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{read_structured, write_structured};
use crate::error::{Error, Result};
use crate::scr::ScrFile;

pub use format::FormatSpec;
pub use schema::{
    BitField, Cell, CellValue, ColumnDef, ColumnType, RowSchema, TableDef, TablePaths, TypedRow,
};

/// Language codes in the order the game numbers its per-language SCR files.
pub const LANGUAGES: [&str; 9] = ["jp", "ae", "af", "de", "en", "es", "fr", "it", "uk"];

/// Named table definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableCatalog {
    tables: BTreeMap<String, TableDef>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a `.json`, `.yaml`, or `.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        read_structured(path)
    }

    /// Load a catalog, or start an empty one if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_structured(path, self)
    }

    pub fn get(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Add a table; a name that is already present is an error.
    pub fn insert(&mut self, name: impl Into<String>, def: TableDef) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::layout(format!("table {name:?} already exists")));
        }
        self.tables.insert(name, def);
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&TableDef> {
        self.get(name).ok_or_else(|| Error::layout(format!("unknown table {name:?}")))
    }

    /// Decode table `name` for `language`. Relative paths are joined to `base_dir`.
    pub fn load_table(
        &self,
        name: &str,
        language: Option<&str>,
        base_dir: &Path,
    ) -> Result<Vec<TypedRow>> {
        let def = self.table(name)?;
        let schema = def.compile()?;
        let path = resolve(base_dir, def.path_for(language)?);
        let scr = ScrFile::load(&path)?;
        schema.decode_all(&scr)
    }

    /// Decode table `name` for every language it has a file for.
    pub fn load_all_languages(
        &self,
        name: &str,
        base_dir: &Path,
    ) -> Result<BTreeMap<String, Vec<TypedRow>>> {
        let def = self.table(name)?;
        let schema = def.compile()?;
        let mut out = BTreeMap::new();
        for lang in def.languages() {
            let path = resolve(base_dir, def.path_for(Some(lang))?);
            let scr = ScrFile::load(&path)?;
            out.insert(lang.to_string(), schema.decode_all(&scr)?);
        }
        Ok(out)
    }

    /// Register a table whose per-language files are numbered consecutively
    /// (`00000120.scr`, `00000121.scr`, ...) in [`LANGUAGES`] order, starting
    /// with `first_file` for `first_language`. The row length is read from
    /// `first_file`; columns start out empty.
    pub fn append_language_series(
        &mut self,
        name: &str,
        first_file: &Path,
        first_language: &str,
    ) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::layout(format!("table {name:?} already exists")));
        }
        let first_index = LANGUAGES
            .iter()
            .position(|l| *l == first_language)
            .ok_or_else(|| Error::layout(format!("unknown language {first_language:?}")))?;

        let stem = first_file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let number: u64 = stem.parse().map_err(|_| {
            Error::layout(format!("file name {stem:?} is not a numbered SCR file"))
        })?;
        let ext = first_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let dir = first_file.parent().unwrap_or_else(|| Path::new(""));

        let scr = ScrFile::load(first_file)?;

        let mut paths = BTreeMap::new();
        for (i, lang) in LANGUAGES.iter().enumerate().skip(first_index) {
            let file_name = format!("{:08}{}", number + (i - first_index) as u64, ext);
            let path = dir.join(file_name).to_string_lossy().replace('\\', "/");
            paths.insert(lang.to_string(), path);
        }

        self.insert(
            name,
            TableDef {
                paths: TablePaths::ByLanguage(paths),
                row_length: scr.header().row_length,
                endianness: None,
                columns: Vec::new(),
            },
        )
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
