use scry_classpath::SourceError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a class artifact was rejected by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    ClassFile(#[from] scry_classfile::Error),
    #[error("class name is empty")]
    EmptyName,
    #[error("class `{0}` names itself as its superclass")]
    SelfSuperclass(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// No artifact exists for `name`. The classpath is inconsistent: this is
    /// never folded into a negative answer.
    #[error("class `{name}` not found")]
    NotFound { name: String },

    #[error("failed to read class `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed class `{name}`: {source}")]
    Malformed {
        name: String,
        #[source]
        source: DecodeError,
    },

    /// `name` was reached again while still being explored.
    #[error("cyclic type hierarchy through `{name}`")]
    Cycle { name: String },

    #[error("type hierarchy below `{name}` is deeper than {max_depth} levels")]
    TooDeep { name: String, max_depth: usize },
}

impl Error {
    /// True for every failure caused by bad input rather than by the source:
    /// undecodable bytes and impossible (cyclic or unbounded) hierarchies.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::Malformed { .. } | Error::Cycle { .. } | Error::TooDeep { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound { name } => Error::NotFound { name },
            SourceError::Io { name, source } => Error::Io { name, source },
        }
    }
}
