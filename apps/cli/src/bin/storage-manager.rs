use anyhow::Result;
use clap::Parser;
use reclaim_cli::config::StorageManagerArgs;
use reclaim_cli::linux::StorageManager;
use reclaim_cli::session::Session;
use reclaim_cli::ui::{configure_color, Console};
use reclaim_cli::interrupt::cancel_on_interrupt;
use reclaim_cli::{exit_code, logging};
use reclaim_exec::SystemRunner;
use reclaim_host_linux::{is_root, Privileges};
use reclaim_safety::LinePrompter;

fn run(runner: &SystemRunner) -> Result<i32> {
    let mut prompter = LinePrompter::stdio();
    let session = Session::new(runner, &mut prompter, Console::stdout());
    let mut manager = StorageManager::new(session, Privileges::detect(runner));
    if !manager.startup(is_root())? {
        return Ok(1);
    }
    manager.run()?;
    Ok(0)
}

fn main() {
    let args = StorageManagerArgs::parse();
    logging::init(&args.common.log_level);
    configure_color(args.common.no_color);

    if let Err(err) = cancel_on_interrupt() {
        tracing::warn!(error = %err, "could not install Ctrl-C handler");
    }

    let runner = SystemRunner::new();
    let code = exit_code(run(&runner), &mut Console::stdout());
    std::process::exit(code);
}
