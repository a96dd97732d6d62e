//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notedex_core` linkage and schema bootstrap without touching any
//!   user database.
//! - Optionally exercise file logging when `NOTEDEX_LOG_DIR` is set.

use notedex_core::db::migrations::current_version;
use notedex_core::db::open_db_in_memory;
use notedex_core::{default_log_level, init_logging};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "NOTEDEX_LOG_DIR";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("notedex_core logging disabled: {err}");
        }
    }

    println!("notedex_core version={}", notedex_core::core_version());

    let schema = open_db_in_memory()
        .map_err(|err| err.to_string())
        .and_then(|conn| current_version(&conn).map_err(|err| err.to_string()));
    match schema {
        Ok(version) => {
            println!("notedex_core schema_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("notedex_core bootstrap failed: {err}");
            ExitCode::FAILURE
        }
    }
}
