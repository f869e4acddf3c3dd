//! Ctrl-C ends a session the same way closed input does.

use crate::exit_code;
use crate::ui::Console;
use signal_hook::consts::SIGINT;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(50);

/// The error a Ctrl-C stands for; `is_interrupt` recognises it.
pub fn interrupted() -> anyhow::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "interrupted by Ctrl-C").into()
}

/// Install the SIGINT handler. On Ctrl-C the process prints the
/// cancellation line and exits 0.
pub fn cancel_on_interrupt() -> io::Result<()> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&flag))?;
    watch(flag, || {
        tracing::debug!("caught SIGINT");
        let code = exit_code(Err(interrupted()), &mut Console::stdout());
        std::process::exit(code);
    });
    Ok(())
}

fn watch<F>(flag: Arc<AtomicBool>, on_interrupt: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::spawn(move || {
        while !flag.load(Ordering::Relaxed) {
            std::thread::sleep(POLL);
        }
        on_interrupt();
    })
}
