use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Store,
    Internal,
    InvalidArgument,
    MalformedRecord,
    IndexWrite,
    InvalidRangeId,
    NoSearchCondition,
    IndexCacheDesync,
    OutOfStock,
    NotFound,
}

impl ErrorKind {
    /// True for failures caused by the request itself, reported to the
    /// caller as a client error; everything else is a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidArgument
                | ErrorKind::InvalidRangeId
                | ErrorKind::NoSearchCondition
                | ErrorKind::OutOfStock
                | ErrorKind::NotFound
        )
    }
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_split_matches_taxonomy() {
        assert!(ErrorKind::OutOfStock.is_client_error());
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(ErrorKind::InvalidRangeId.is_client_error());
        assert!(ErrorKind::NoSearchCondition.is_client_error());
        assert!(ErrorKind::InvalidArgument.is_client_error());

        assert!(!ErrorKind::MalformedRecord.is_client_error());
        assert!(!ErrorKind::IndexWrite.is_client_error());
        assert!(!ErrorKind::IndexCacheDesync.is_client_error());
        assert!(!ErrorKind::Store.is_client_error());
    }

    #[test]
    fn display_includes_kind_and_context() {
        let err = Error::new(ErrorKind::OutOfStock, "item 7".to_string());
        assert_eq!(err.to_string(), "OutOfStock: item 7");
    }
}
