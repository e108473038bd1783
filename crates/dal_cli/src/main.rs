//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dal_core` linkage and schema bootstrap end to end.
//! - Print a deterministic summary of the rows visible through the repositories.
//!
//! Usage: `dal_cli [connection-string]` (defaults to `:memory:`).
//! Logs go to `$DAL_LOG_DIR`, or `<temp dir>/dal_cli_logs` when unset.

use dal_core::{OrderRepository, RepoError, Store, UserRepository};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "DAL_LOG_DIR";

fn main() -> ExitCode {
    let connection_string = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ":memory:".to_string());

    let log_dir = std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("dal_cli_logs"));
    if let Err(err) = dal_core::init_logging(dal_core::default_log_level(), &log_dir) {
        eprintln!("dal_cli warning: logging disabled: {err}");
    }

    let outcome = run(&connection_string);
    dal_core::flush_logging();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dal_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(connection_string: &str) -> Result<(), RepoError> {
    let store = Store::from_connection_string(connection_string)?;
    println!("dal_core version={}", dal_core::core_version());

    store.with_session(|session| {
        let users = session.users().get_all()?;
        let orders = session.orders();
        println!("users={}", users.len());

        for user in &users {
            let Some(user_id) = user.id else { continue };
            let owned = orders.get_by_user_id(user_id, false)?;
            println!(
                "user id={user_id} name=\"{}\" orders={}",
                user.full_name(),
                owned.len()
            );
        }
        Ok(())
    })
}
