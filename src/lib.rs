pub mod config;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod prompt;
pub mod rc_reader;
pub mod repl;
pub mod shell;
