use anyhow::Result;
use clap::Parser;
use reclaim_cli::config::{CompactorSettings, WslCompactorArgs};
use reclaim_cli::session::Session;
use reclaim_cli::ui::{configure_color, Console};
use reclaim_cli::windows::{Startup, WslManager};
use reclaim_cli::interrupt::cancel_on_interrupt;
use reclaim_cli::{exit_code, logging};
use reclaim_exec::SystemRunner;
use reclaim_host_windows::{is_elevated, local_app_data};
use reclaim_safety::LinePrompter;

fn run(runner: &SystemRunner, settings: CompactorSettings) -> Result<i32> {
    let mut prompter = LinePrompter::stdio();
    let session = Session::new(runner, &mut prompter, Console::stdout());
    let mut manager = WslManager::new(session, settings, is_elevated(), local_app_data());
    match manager.startup(cfg!(windows))? {
        Startup::Continue => {
            manager.run()?;
            Ok(0)
        }
        Startup::Exit(code) => Ok(code),
    }
}

fn main() {
    let args = WslCompactorArgs::parse();
    logging::init(&args.common.log_level);
    configure_color(args.common.no_color);
    tracing::debug!(?args, "starting wsl-compactor");

    if let Err(err) = cancel_on_interrupt() {
        tracing::warn!(error = %err, "could not install Ctrl-C handler");
    }

    let runner = SystemRunner::new();
    let code = exit_code(run(&runner, CompactorSettings::from(&args)), &mut Console::stdout());
    std::process::exit(code);
}
