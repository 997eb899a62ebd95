mod command;
mod executor;
mod path_resolver;
mod pipeline;
pub mod builtin;

#[cfg(test)]
pub(crate) mod tests;

pub use command::{Pipeline, Redirect, RedirectKind, Segment};
pub use executor::{
    EXIT_CANNOT_EXECUTE, EXIT_INTERNAL, EXIT_NOT_FOUND, EXIT_REDIRECT_FAILED, ExecError,
    ExecStatus, Executor,
};
pub use path_resolver::{PathResolver, search_dirs};
pub use pipeline::PipelineExecutor;
