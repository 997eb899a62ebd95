use crate::executor::{ExecStatus, Executor};
use crate::lexer::TokenList;

/// Test double that records each token list as a space-joined line.
pub struct RecordingExecutor {
    pub lines: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, tokens: TokenList) -> ExecStatus {
        let segments = tokens.pipe_count() + 1;
        let line = tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.lines.push(line);
        Ok(vec![0; segments])
    }
}
