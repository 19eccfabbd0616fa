use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal build errors surfaced to the caller. There is no internal
/// recovery: any of these aborts the build with no partial model graph.
#[derive(Debug, Error)]
pub enum Error {
    /// An order names an undeclared component or relationship, a metadata
    /// definition is missing a required field, or an order shorthand is
    /// malformed.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A deferred model or factory reference could not be resolved.
    #[error("unresolved reference '{target}'")]
    Resolution { target: String },

    /// A scalar-id build expects exactly one resulting model.
    #[error("single build expected exactly one model, found {found}")]
    Cardinality { found: usize },

    /// The data-source call failed; propagated verbatim.
    #[error("execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A fetched row lacks a column the compiled query projected.
    #[error("row is missing column '{column}'")]
    MissingColumn { column: String },

    /// A model rejected a carrier or processor method name.
    #[error("model error: {message}")]
    Model { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn resolution(target: impl Into<String>) -> Self {
        Error::Resolution {
            target: target.into(),
        }
    }

    pub fn execution(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Execution(source.into())
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Error::Model {
            message: message.into(),
        }
    }
}
