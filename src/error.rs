use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::executor::ExecError;
use crate::executor::builtin::BuiltinError;
use crate::lexer::LexError;

/// Everything a single line or the startup file can fail with.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error("cannot read {}: {source}", path.display())]
    Startup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_is_transparent() {
        let err: ShellError = LexError::MissingTerminator.into();
        assert_eq!(err.to_string(), LexError::MissingTerminator.to_string());
    }

    #[test]
    fn test_startup_error_names_path() {
        let err = ShellError::Startup {
            path: PathBuf::from("/home/u/.pipeshrc"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("cannot read /home/u/.pipeshrc: "));
    }
}
