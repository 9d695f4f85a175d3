use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SerializationError: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YamlError: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("K8s error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Kube config error: {0}")]
    ConfigError(#[from] kube::config::InferConfigError),

    #[error("Http request error: {0}")]
    HttpError(#[from] http::Error),

    #[error("Stdio error {0}")]
    Stdio(#[from] std::io::Error),

    #[error("debugmode {0} not found")]
    NotFound(String),

    #[error("debugmode {0} already exists")]
    AlreadyExists(String),

    #[error("conflict while writing debugmode {0}: {1}")]
    Conflict(String, String),

    #[error("{verb} query failed: {code} {reason} | {message}")]
    Api {
        verb: String,
        code: u16,
        reason: String,
        message: String,
    },

    #[error("failed to add finalizer {finalizer} to debugmode {object}: {source}")]
    AddFinalizer {
        finalizer: String,
        object: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to remove finalizer {finalizer} from debugmode {object}: {source}")]
    RemoveFinalizer {
        finalizer: String,
        object: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to add or update condition {condition} to debugmode {object}: {source}")]
    Condition {
        condition: String,
        object: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to set phase {phase} on debugmode {object} after {attempts} attempts: {source}")]
    RetriesExhausted {
        phase: String,
        object: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("Error: {0}")]
    Other(String),
}
impl Error {
    pub fn metric_label(&self) -> String {
        format!("{self:?}").to_lowercase()
    }

    /// Look through the wrapping variants for the transport failure underneath.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::AddFinalizer { source, .. }
            | Error::RemoveFinalizer { source, .. }
            | Error::Condition { source, .. }
            | Error::RetriesExhausted { source, .. } => source.root(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound(_))
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), Error::Conflict(_, _))
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self.root(), Error::AlreadyExists(_))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

mod codec;
pub mod client;
pub mod clientset;
pub mod conditions;
pub mod context;
pub mod debugmode;
pub mod finalizer;
pub mod retry;
pub mod transition;
pub mod transport;
#[cfg(test)]
mod testing;

pub use client::{ClientOptions, DebugModeClient, DeleteOptions, ListOptions, WriteOptions};
pub use clientset::{DebugModeClientSet, DebugModeV1};
pub use codec::{Codec, PatchType};
pub use debugmode::{
    CONDITION_LOG_LEVELS_SET, ConditionStatus, DebugMode, DebugModeCondition, DebugModeSpec,
    DebugModeStatus, StatusPhase,
};
pub use retry::{Backoff, RetryPolicy};
pub use transport::Transport;
