pub mod commands;
pub mod manager;

pub use manager::{BuiltinCommand, BuiltinError, BuiltinManager, BuiltinOutcome};
