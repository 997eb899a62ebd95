use std::io::{self, BufRead, Write};

use log::debug;

use crate::executor::Executor;
use crate::prompt::ShellPrompt;
use crate::shell::{LineOutcome, Shell};

pub struct Repl<E: Executor> {
    shell: Shell<E>,
    prompt: ShellPrompt,
}

impl<E: Executor> Repl<E> {
    pub fn new(shell: Shell<E>, prompt: ShellPrompt) -> Self {
        Repl { shell, prompt }
    }

    pub fn shell(&self) -> &Shell<E> {
        &self.shell
    }

    /// Runs until end of input or `exit`, returning the shell's exit status.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> io::Result<i32> {
        let mut line = Vec::new();
        loop {
            self.prompt.show(&mut output)?;
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                // EOF (e.g. Ctrl-D)
                writeln!(output)?;
                debug!("end of input");
                return Ok(0);
            }
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }
            match self.shell.run_line(&line) {
                Ok(LineOutcome::Continue) => {}
                Ok(LineOutcome::Exit(code)) => return Ok(code),
                Err(e) => eprintln!("pipesh: {e}"),
            }
        }
    }
}
