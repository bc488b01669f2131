use thiserror::Error;

pub type WldResult<T> = Result<T, WldError>;

// WldError is the lowest level error type for the document model. Audit
// findings are not errors; they travel as report rows (see `report`).
#[derive(Debug, Error)]
pub enum WldError {
    /// A room block failed structural parsing
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The same vnum appeared twice in one file
    #[error("duplicate vnum {0}")]
    DuplicateVnum(u32),

    /// Baseline manifest failed to parse
    #[error("manifest error at line {line}: {message}")]
    Manifest { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WldError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        WldError::Parse {
            line,
            message: message.into(),
        }
    }
}
