use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use lifepack::commands::{add_table_command, dump_command, list_tables_command, table_command};
use lifepack::{init_logging, parse_offset};

/// Dump Fantasy Life `.scr` tables to tab-delimited text.
///
/// Each output line holds the row offset, the row index, the decoded
/// messages for every `--str` offset, and then the row's bytes (raw hex, or
/// unpacked with `--layout`).
#[derive(Parser, Debug)]
#[command(
    name = "scr-dump",
    version,
    about = "Dump Fantasy Life .scr tables",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the `.scr` file to dump.
    input: Option<String>,

    /// Output file. Defaults to `<stem>_table.txt` in the current directory.
    #[arg(short, long)]
    out: Option<String>,

    /// Row offset (decimal or 0x-prefixed) of a message pointer to decode.
    /// Repeat the flag or separate offsets with commas.
    #[arg(
        long = "str",
        value_name = "OFFSET",
        action = ArgAction::Append,
        value_delimiter = ',',
        value_parser = parse_offset
    )]
    string_offsets: Vec<u32>,

    /// Struct-style row layout, e.g. `<2I4s`. Rows are dumped as hex when omitted.
    #[arg(long)]
    layout: Option<String>,

    /// JSON or YAML file with default options.
    #[arg(long)]
    config: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump a catalog table with typed columns.
    Table {
        /// Table catalog (JSON or YAML).
        #[arg(long, env = "LIFEPACK_TABLES")]
        catalog: String,

        /// Table name in the catalog.
        name: String,

        /// Language code, for tables with per-language files.
        language: Option<String>,

        /// Output file. Defaults to `<name>[_<language>]_table.txt`.
        #[arg(short, long)]
        out: Option<String>,

        /// Write a header line with column names first.
        #[arg(long, default_value_t = false)]
        header: bool,
    },

    /// Register a numbered per-language series of SCR files as a new table.
    AddTable {
        /// Table catalog (JSON or YAML); created if missing.
        #[arg(long, env = "LIFEPACK_TABLES")]
        catalog: String,

        /// New table name.
        name: String,

        /// Path of the first SCR file in the series.
        file: String,

        /// Language code of the first file (jp, ae, af, de, en, es, fr, it, uk).
        language: String,
    },

    /// List the tables defined in a catalog.
    ListTables {
        /// Table catalog (JSON or YAML).
        #[arg(long, env = "LIFEPACK_TABLES")]
        catalog: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Command::Table { catalog, name, language, out, header }) => {
            table_command(&catalog, &name, language.as_deref(), out.as_deref(), header)?;
        }
        Some(Command::AddTable { catalog, name, file, language }) => {
            add_table_command(&catalog, &name, &file, &language)?
        }
        Some(Command::ListTables { catalog, json }) => {
            list_tables_command(&catalog, json)?;
        }
        None => {
            let input = cli.input.ok_or_else(|| anyhow!("An input .scr file is required"))?;
            dump_command(
                &input,
                cli.out.as_deref(),
                cli.string_offsets,
                cli.layout,
                cli.config.as_deref(),
            )?;
        }
    }

    Ok(())
}
