use nix::errno::Errno;
use thiserror::Error;

use crate::lexer::{TokenKind, TokenList};

/// One exit status per pipeline segment, in segment order.
pub type ExecStatus = Result<Vec<i32>, ExecError>;

pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
pub const EXIT_REDIRECT_FAILED: i32 = 1;
pub const EXIT_INTERNAL: i32 = 255;

/// Failures seen by the parent. Per-child failures surface as exit statuses.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("pipe failed: {0}")]
    Pipe(#[source] Errno),
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),
    #[error("wait failed: {0}")]
    Wait(#[source] Errno),
    #[error("segment {segment} of the pipeline has no command")]
    EmptyCommand { segment: usize },
    #[error("'{operator}' in segment {segment} has no target")]
    MissingRedirectTarget { segment: usize, operator: TokenKind },
}

impl ExecError {
    /// Pipe, process and wait failures abort the whole pipeline attempt.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            ExecError::Pipe(_) | ExecError::Fork(_) | ExecError::Wait(_)
        )
    }
}

pub trait Executor {
    fn execute(&mut self, tokens: TokenList) -> ExecStatus;
}
