use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use lifepack_core::scr::write_lines;
use lifepack_core::table::TableCatalog;
use serde::Serialize;

use crate::commands::{catalog_base_dir, load_catalog};

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub row_length: u32,
    pub columns: usize,
    pub languages: Vec<String>,
}

/// Dump catalog table `name` (for `language`, when it has per-language files)
/// as typed tab-delimited text. Returns the number of rows written.
pub fn table_command(
    catalog: &str,
    name: &str,
    language: Option<&str>,
    output: Option<&str>,
    header: bool,
) -> Result<usize> {
    let catalog_path = Path::new(catalog);
    let tables = load_catalog(catalog_path)?;
    let def = tables.get(name).ok_or_else(|| anyhow!("Unknown table: {name}"))?;
    let schema = def.compile().with_context(|| format!("Invalid definition for table {name}"))?;

    let rows = tables
        .load_table(name, language, &catalog_base_dir(catalog_path))
        .with_context(|| format!("Failed to load table {name}"))?;

    let mut lines = Vec::with_capacity(rows.len() + 1);
    if header {
        lines.push(schema.headers().join("\t"));
    }
    lines.extend(rows.iter().map(|row| row.to_text()));

    let output_path = match output {
        Some(path) => PathBuf::from(path),
        None => match language {
            Some(lang) => PathBuf::from(format!("{name}_{lang}_table.txt")),
            None => PathBuf::from(format!("{name}_table.txt")),
        },
    };
    write_lines(&output_path, &lines)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Table {name}: {} rows -> {}", rows.len(), output_path.display());
    Ok(rows.len())
}

/// Register a per-language table series in the catalog, creating the catalog
/// file if needed.
pub fn add_table_command(catalog: &str, name: &str, file: &str, language: &str) -> Result<()> {
    let catalog_path = Path::new(catalog);
    let mut tables = TableCatalog::load_or_default(catalog_path)
        .with_context(|| format!("Failed to load table catalog {catalog}"))?;

    tables
        .append_language_series(name, Path::new(file), language)
        .with_context(|| format!("Failed to add table {name}"))?;
    tables.save(catalog_path).with_context(|| format!("Failed to save table catalog {catalog}"))?;

    let def = tables.get(name).ok_or_else(|| anyhow!("Table {name} missing after insert"))?;
    println!("Added table:");
    println!("  Name: {name}");
    println!("  Row length: {}", def.row_length);
    println!("  Languages: {}", def.languages().join(", "));
    println!("  Catalog: {catalog}");

    Ok(())
}

/// List the tables defined in a catalog.
pub fn list_tables_command(catalog: &str, json: bool) -> Result<Vec<TableSummary>> {
    let tables = load_catalog(Path::new(catalog))?;
    let summaries: Vec<TableSummary> = tables
        .names()
        .filter_map(|name| tables.get(name).map(|def| (name, def)))
        .map(|(name, def)| TableSummary {
            name: name.to_string(),
            row_length: def.row_length,
            columns: def.columns.len(),
            languages: def.languages().into_iter().map(String::from).collect(),
        })
        .collect();

    if json {
        let serialized = serde_json::to_string_pretty(&summaries)
            .context("Failed to serialize tables to JSON")?;
        println!("{}", serialized);
        return Ok(summaries);
    }

    println!("Tables ({}):", summaries.len());
    if summaries.is_empty() {
        println!("  (none)");
    }
    for table in &summaries {
        let langs =
            if table.languages.is_empty() { "-".to_string() } else { table.languages.join(",") };
        println!(
            "  - {} [row: {} bytes, columns: {}, languages: {}]",
            table.name, table.row_length, table.columns, langs
        );
    }

    Ok(summaries)
}
