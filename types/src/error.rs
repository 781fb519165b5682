use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by every crate of the workspace.
///
/// None of these are retried internally. An engine failure in the middle of a
/// projection setup leaves the engine-side state of the earlier calls in place,
/// so the owning `Wavefunction` should be dropped and rebuilt.
#[derive(Error, Debug)]
pub enum PawError {
    /// A potential dataset (or another positional text input) is missing a
    /// section marker or holds a token that does not parse.
    #[error("malformed potential data in '{context}': {message}")]
    Format { context: String, message: String },

    /// The same element appeared twice with different dataset contents.
    #[error("element '{0}' appears more than once with differing potential data")]
    DuplicateElement(String),

    /// The projection engine reported a failure (null result, unreadable input).
    #[error("projection engine failure: {0}")]
    Engine(String),

    /// A session or projector table was used after it had been released.
    #[error("{0} used after release")]
    UseAfterRelease(&'static str),

    /// A self site lies within the match tolerance of several basis sites.
    #[error("self site {self_index} matches several basis sites {basis_indices:?}")]
    GeometryAmbiguity {
        self_index: usize,
        basis_indices: Vec<usize>,
    },

    /// A structure contains an element that no core region provides.
    #[error("no pseudopotential for element '{0}'")]
    MissingElement(String),

    /// A projection was requested before `setup_projection` with that basis.
    #[error("projection not set up: {0}")]
    NotSetUp(String),

    #[error("I/O error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid key or value in the control file.
    #[error("invalid control parameter: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PawError>;

impl PawError {
    pub fn format(context: &str, message: impl Into<String>) -> PawError {
        PawError::Format {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> PawError {
        PawError::Io {
            path: path.into(),
            source,
        }
    }
}
