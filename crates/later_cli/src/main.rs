//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `later_core` linkage and that migrations apply to a database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `later_cli [DB_PATH]`; an in-memory database is used without a path.

use later_core::db::migrations::{current_user_version, latest_version};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("later_core ping={}", later_core::ping());
    println!("later_core version={}", later_core::core_version());

    let db_path = std::env::args().nth(1);
    let opened = match db_path.as_deref() {
        Some(path) => later_core::open_db(path),
        None => later_core::open_db_in_memory(),
    };
    let schema_version = opened.and_then(|conn| current_user_version(&conn));

    match schema_version {
        Ok(version) => {
            println!(
                "later_core schema={version}/{} db={}",
                latest_version(),
                db_path.as_deref().unwrap_or(":memory:")
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("later_core db_error={err}");
            ExitCode::FAILURE
        }
    }
}
