use std::io;

use urify_core::PslError;

/// Error type for the urify binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Psl(#[from] PslError),
    #[error("Failed to open '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read input: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to write output: {0}")]
    Write(#[source] io::Error),
}

impl CliError {
    /// Downstream closed the pipe (e.g. `urify fqdn | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Write(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
