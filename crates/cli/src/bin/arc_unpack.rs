use anyhow::Result;
use clap::Parser;
use lifepack::commands::unpack_command;
use lifepack::init_logging;

/// Extract the files stored in Fantasy Life `.bin` sub-archives.
///
/// Run the archive splitter on `_file_archive.bin` first; point this tool at
/// one of the resulting `.bin` files or at the folder holding them.
#[derive(Parser, Debug)]
#[command(
    name = "arc-unpack",
    version,
    about = "Extract Fantasy Life .bin sub-archives",
    long_about = None
)]
struct Cli {
    /// Path to a `.bin` file, or a folder searched recursively for them.
    #[arg(default_value = "archive/bin")]
    path: String,

    /// Output folder. Defaults to `bin` (or the config file's value).
    #[arg(short, long)]
    out: Option<String>,

    /// List what would be extracted without writing anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Also write the extraction report as JSON to this file.
    #[arg(long)]
    manifest: Option<String>,

    /// Print the extraction report as JSON instead of a summary.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// JSON or YAML file with default options.
    #[arg(long)]
    config: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    unpack_command(
        &cli.path,
        cli.out.as_deref(),
        cli.dry_run,
        cli.manifest.as_deref(),
        cli.json,
        cli.config.as_deref(),
    )?;

    Ok(())
}
