use std::collections::HashMap;
use std::io;

use log::debug;
use thiserror::Error;

use crate::executor::builtin::commands::{
    CdCommand, ExitCommand, PwdCommand, SetenvCommand, UnsetenvCommand,
};
use crate::lexer::{Token, TokenList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    Code(i32),
    Exit(i32),
}

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{name} takes {expected} argument(s)")]
    Arity { name: &'static str, expected: usize },
    #[error("{name}: invalid variable name '{var}'")]
    InvalidName { name: &'static str, var: String },
    #[error("{name}: value contains a NUL byte")]
    InvalidValue { name: &'static str },
    #[error("cd: HOME is not set")]
    HomeUnset,
    #[error("{name}: {source}")]
    Io {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    /// `args` are the tokens after the command name, operators included.
    fn run(&self, args: &[Token]) -> Result<BuiltinOutcome, BuiltinError>;
}

pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(SetenvCommand {}));
        mgr.register(Box::new(UnsetenvCommand {}));
        mgr.register(Box::new(CdCommand {}));
        mgr.register(Box::new(PwdCommand {}));
        mgr.register(Box::new(ExitCommand {}));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn is_builtin(&self, name: &[u8]) -> bool {
        self.lookup(name).is_some()
    }

    /// Runs the builtin named by the first token. `None` means "not a builtin".
    pub fn dispatch(&self, tokens: &TokenList) -> Option<Result<BuiltinOutcome, BuiltinError>> {
        let first = tokens.first()?;
        if first.is_operator() {
            return None;
        }
        let cmd = self.lookup(first.text())?;
        debug!("running builtin {}", cmd.name());
        Some(cmd.run(&tokens.as_slice()[1..]))
    }

    fn lookup(&self, name: &[u8]) -> Option<&dyn BuiltinCommand> {
        let name = std::str::from_utf8(name).ok()?;
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }
}
