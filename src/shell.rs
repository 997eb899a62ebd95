use log::debug;

use crate::error::ShellError;
use crate::executor::builtin::{BuiltinManager, BuiltinOutcome};
use crate::executor::{Executor, PipelineExecutor};
use crate::lexer::Lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit(i32),
}

/// Lexes a line and hands it to a builtin or the executor.
pub struct Shell<E: Executor = PipelineExecutor> {
    builtins: BuiltinManager,
    executor: E,
}

impl Default for Shell<PipelineExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell<PipelineExecutor> {
    pub fn new() -> Self {
        Self::with_executor(PipelineExecutor::new())
    }
}

impl<E: Executor> Shell<E> {
    pub fn with_executor(executor: E) -> Self {
        Shell {
            builtins: BuiltinManager::new(),
            executor,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn builtins_mut(&mut self) -> &mut BuiltinManager {
        &mut self.builtins
    }

    /// `line` must carry its trailing newline.
    pub fn run_line(&mut self, line: &[u8]) -> Result<LineOutcome, ShellError> {
        let tokens = Lexer::tokenize(line)?;
        if tokens.is_empty() {
            return Ok(LineOutcome::Continue);
        }
        if let Some(result) = self.builtins.dispatch(&tokens) {
            return Ok(match result? {
                BuiltinOutcome::Code(code) => {
                    debug!("builtin finished with {code}");
                    LineOutcome::Continue
                }
                BuiltinOutcome::Exit(code) => LineOutcome::Exit(code),
            });
        }
        let statuses = self.executor.execute(tokens)?;
        debug!("pipeline statuses: {statuses:?}");
        Ok(LineOutcome::Continue)
    }
}
