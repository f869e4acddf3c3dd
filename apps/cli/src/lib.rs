//! Interactive front ends: `storage-manager` for Linux and WSL guests,
//! `wsl-compactor` for the Windows host.

pub mod config;
pub mod interrupt;
pub mod linux;
pub mod logging;
pub mod session;
pub mod ui;
pub mod windows;

use anyhow::Result;
use session::is_interrupt;
use ui::Console;

/// Map the outcome of a menu session to a process exit code.
///
/// An interrupt (end of input or Ctrl-C) is a clean exit; any other error escaping the
/// menus is printed and exits 1.
pub fn exit_code(result: Result<i32>, console: &mut Console) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) if is_interrupt(&err) => {
            let _ = console.warning("\n\nOperation cancelled by user");
            0
        }
        Err(err) => {
            tracing::error!(error = ?err, "unhandled error");
            let _ = console.error(&format!("An error occurred: {:#}", err));
            1
        }
    }
}
