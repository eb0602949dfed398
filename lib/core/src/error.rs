use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("primary key error: {0}")]
    PrimaryKey(String),

    #[error("field '{field}' type mismatch: table has {expected}, document has {actual}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("'{0}' is not a vector field of the table")]
    NotVectorField(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table creation failed: {0}")]
    CreateTable(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("backend call timed out")]
    Timeout,
}

impl Error {
    /// True for errors caused by the caller's input; the transport layer
    /// reports these as client errors and everything else as server errors.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Error::Backend(_) | Error::Timeout | Error::CreateTable(_)
        )
    }
}
