use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

use crate::executor::builtin::manager::{BuiltinCommand, BuiltinError, BuiltinOutcome};
use crate::lexer::Token;

fn expect_args(name: &'static str, args: &[Token], expected: usize) -> Result<(), BuiltinError> {
    if args.len() != expected {
        return Err(BuiltinError::Arity { name, expected });
    }
    Ok(())
}

/// Names that `std::env` accepts: non-empty, no '=' and no NUL.
fn var_name<'a>(name: &'static str, token: &'a Token) -> Result<&'a OsStr, BuiltinError> {
    let text = token.text();
    if token.is_operator() || text.is_empty() || text.contains(&b'=') || text.contains(&0) {
        return Err(BuiltinError::InvalidName {
            name,
            var: token.to_string(),
        });
    }
    Ok(OsStr::from_bytes(text))
}

pub struct SetenvCommand;

impl BuiltinCommand for SetenvCommand {
    fn name(&self) -> &'static str {
        "setenv"
    }
    fn run(&self, args: &[Token]) -> Result<BuiltinOutcome, BuiltinError> {
        expect_args(self.name(), args, 2)?;
        let key = var_name(self.name(), &args[0])?;
        let value = args[1].text();
        if value.contains(&0) {
            return Err(BuiltinError::InvalidValue { name: self.name() });
        }
        // SAFETY: builtins run on the shell's only thread, before any fork.
        unsafe { env::set_var(key, OsStr::from_bytes(value)) };
        Ok(BuiltinOutcome::Code(0))
    }
}

pub struct UnsetenvCommand;

impl BuiltinCommand for UnsetenvCommand {
    fn name(&self) -> &'static str {
        "unsetenv"
    }
    fn run(&self, args: &[Token]) -> Result<BuiltinOutcome, BuiltinError> {
        expect_args(self.name(), args, 1)?;
        let key = var_name(self.name(), &args[0])?;
        // SAFETY: see SetenvCommand.
        unsafe { env::remove_var(key) };
        Ok(BuiltinOutcome::Code(0))
    }
}

pub struct CdCommand;

impl CdCommand {
    /// A leading '~' is replaced by $HOME.
    fn target(arg: &[u8]) -> Result<OsString, BuiltinError> {
        match arg.strip_prefix(b"~") {
            Some(rest) => {
                let home = env::var_os("HOME").ok_or(BuiltinError::HomeUnset)?;
                let mut path = home.into_vec();
                path.extend_from_slice(rest);
                Ok(OsString::from_vec(path))
            }
            None => Ok(OsStr::from_bytes(arg).to_os_string()),
        }
    }
}

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn run(&self, args: &[Token]) -> Result<BuiltinOutcome, BuiltinError> {
        expect_args(self.name(), args, 1)?;
        let target = Self::target(args[0].text())?;
        env::set_current_dir(&target).map_err(|source| BuiltinError::Io {
            name: self.name(),
            source,
        })?;
        Ok(BuiltinOutcome::Code(0))
    }
}

pub struct PwdCommand;

impl BuiltinCommand for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }
    fn run(&self, _args: &[Token]) -> Result<BuiltinOutcome, BuiltinError> {
        let io_err = |source: io::Error| BuiltinError::Io {
            name: "pwd",
            source,
        };
        let dir = env::current_dir().map_err(io_err)?;
        let mut out = io::stdout().lock();
        out.write_all(dir.as_os_str().as_bytes()).map_err(io_err)?;
        out.write_all(b"\n").map_err(io_err)?;
        out.flush().map_err(io_err)?;
        Ok(BuiltinOutcome::Code(0))
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn run(&self, args: &[Token]) -> Result<BuiltinOutcome, BuiltinError> {
        let code = args
            .first()
            .and_then(|t| std::str::from_utf8(t.text()).ok())
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(0);
        Ok(BuiltinOutcome::Exit(code))
    }
}
