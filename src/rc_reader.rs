use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use nix::unistd::{AccessFlags, access};

use crate::error::ShellError;
use crate::executor::Executor;
use crate::shell::{LineOutcome, Shell};

/// The file of commands run once before the first prompt.
pub struct StartupScript {
    path: PathBuf,
}

impl StartupScript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StartupScript { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the file line by line if it exists and is executable.
    /// Per-line failures are reported and skipped; `exit` ends the script.
    pub fn run<E: Executor>(&self, shell: &mut Shell<E>) -> Result<LineOutcome, ShellError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no startup file at {}", self.path.display());
                return Ok(LineOutcome::Continue);
            }
            Err(source) => {
                return Err(ShellError::Startup {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if let Err(errno) = access(&self.path, AccessFlags::X_OK) {
            warn!("{} is not executable ({errno}), skipping", self.path.display());
            return Ok(LineOutcome::Continue);
        }
        debug!("running startup file {}", self.path.display());

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| ShellError::Startup {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(LineOutcome::Continue);
            }
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }
            match shell.run_line(&line) {
                Ok(LineOutcome::Continue) => {}
                Ok(exit @ LineOutcome::Exit(_)) => return Ok(exit),
                Err(e) => eprintln!("pipesh: {}: {e}", self.path.display()),
            }
        }
    }
}
