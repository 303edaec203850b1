//! Command implementations behind the `arc-unpack` and `scr-dump` binaries.
//!
//! The binaries only parse arguments and dispatch here, so every command can
//! be exercised directly from tests.

pub mod commands;

/// Initialize `env_logger` on stderr. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Parse a row offset given in decimal or with a `0x` prefix.
pub fn parse_offset(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid offset {s:?}: {e}"))
}
