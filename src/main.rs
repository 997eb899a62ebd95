use std::io;

use anyhow::Context;
use log::debug;
use nix::sys::signal::{SigHandler, Signal, signal};

use pipesh::config::ConfigLoader;
use pipesh::prompt::ShellPrompt;
use pipesh::rc_reader::StartupScript;
use pipesh::repl::Repl;
use pipesh::shell::{LineOutcome, Shell};

fn main() -> anyhow::Result<()> {
    // SAFETY: no handler is installed; children reset SIGINT before exec.
    unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.context("failed to ignore SIGINT")?;
    env_logger::init();

    let config = ConfigLoader::from_env();
    debug!("config: {config:?}");
    let mut shell = Shell::new();

    if let Some(path) = &config.startup_file {
        match StartupScript::new(path).run(&mut shell) {
            Ok(LineOutcome::Exit(code)) => std::process::exit(code),
            Ok(LineOutcome::Continue) => {}
            Err(e) => eprintln!("pipesh: {e}"),
        }
    }

    let mut repl = Repl::new(shell, ShellPrompt::new(config.default_prompt));
    let code = repl
        .run(io::stdin().lock(), io::stdout())
        .context("failed to read input")?;
    std::process::exit(code)
}
