//! Error types for the xlucene library.
//!
//! Every fallible operation returns [`Result`], whose error type is the
//! [`XluceneError`] enum. Errors carry a classification used at the query
//! access boundary: [`XluceneError::status_code`] maps an error to an
//! HTTP-like status and [`XluceneError::is_safe`] tells whether the message
//! may be shown to an untrusted caller.
//!
//! # Examples
//!
//! ```
//! use xlucene::error::{Result, XluceneError};
//!
//! fn restricted() -> Result<()> {
//!     Err(XluceneError::access_violation("Field secret in query is restricted"))
//! }
//!
//! let err = restricted().unwrap_err();
//! assert_eq!(err.status_code(), 403);
//! assert!(err.is_safe());
//! ```

use thiserror::Error;

/// The main error type for xlucene operations.
#[derive(Error, Debug)]
pub enum XluceneError {
    /// The query text does not follow the grammar, or a value could not be
    /// coerced to the declared field type.
    #[error("Failure to parse xlucene query \"{query}\", caused by {message}")]
    Parse {
        query: String,
        message: String,
        position: Option<usize>,
    },

    /// A named function was called with invalid or missing parameters.
    #[error("Invalid {name} function, {message}")]
    Function { name: String, message: String },

    /// A `$variable` referenced by the query could not be resolved.
    #[error("Variable error: {0}")]
    Variable(String),

    /// The query could not be parsed at the access-control boundary.
    ///
    /// The wrapped error keeps the full detail; the display message never
    /// echoes the query.
    #[error("{message}")]
    InvalidQuery {
        message: String,
        #[source]
        source: Box<XluceneError>,
    },

    /// The query touches something the access policy forbids.
    #[error("{0}")]
    AccessViolation(String),

    /// A type configuration could not be built.
    #[error("Type config error: {0}")]
    TypeConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with XluceneError.
pub type Result<T> = std::result::Result<T, XluceneError>;

impl XluceneError {
    /// Create a new parse error for `query`.
    pub fn parse<Q: Into<String>, M: Into<String>>(query: Q, message: M) -> Self {
        XluceneError::Parse {
            query: query.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Create a new parse error pointing at a character offset.
    pub fn parse_at<Q: Into<String>, M: Into<String>>(
        query: Q,
        message: M,
        position: usize,
    ) -> Self {
        XluceneError::Parse {
            query: query.into(),
            message: format!("{} at position {}", message.into(), position),
            position: Some(position),
        }
    }

    /// Create a new function validation error.
    pub fn function<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        XluceneError::Function {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new variable error.
    pub fn variable<S: Into<String>>(msg: S) -> Self {
        XluceneError::Variable(msg.into())
    }

    /// Wrap a parse failure so it can be returned to an untrusted caller.
    pub fn invalid_query(source: XluceneError) -> Self {
        XluceneError::InvalidQuery {
            message: "Query could not be parsed".to_string(),
            source: Box::new(source),
        }
    }

    /// Create a new access violation.
    pub fn access_violation<S: Into<String>>(msg: S) -> Self {
        XluceneError::AccessViolation(msg.into())
    }

    /// Create a new type config error.
    pub fn type_config<S: Into<String>>(msg: S) -> Self {
        XluceneError::TypeConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        XluceneError::Other(msg.into())
    }

    /// HTTP-like status classification of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            XluceneError::Parse { .. }
            | XluceneError::Function { .. }
            | XluceneError::Variable(_)
            | XluceneError::InvalidQuery { .. } => 422,
            XluceneError::AccessViolation(_) => 403,
            XluceneError::TypeConfig(_) | XluceneError::Json(_) | XluceneError::Other(_) => 500,
        }
    }

    /// Whether the message can be returned to an untrusted caller as-is.
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            XluceneError::InvalidQuery { .. } | XluceneError::AccessViolation(_)
        )
    }

    /// Whether this error was raised while parsing query text.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            XluceneError::Parse { .. } | XluceneError::Function { .. } | XluceneError::Variable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = XluceneError::parse("foo:(", "Expected \")\"");
        assert_eq!(
            error.to_string(),
            "Failure to parse xlucene query \"foo:(\", caused by Expected \")\""
        );

        let error = XluceneError::function("geoDistance", "point is required");
        assert_eq!(
            error.to_string(),
            "Invalid geoDistance function, point is required"
        );

        let error = XluceneError::access_violation("Empty queries are restricted");
        assert_eq!(error.to_string(), "Empty queries are restricted");
    }

    #[test]
    fn test_parse_at_records_position() {
        let error = XluceneError::parse_at("a:[1 TO", "Expected \"]\"", 7);
        match error {
            XluceneError::Parse {
                position, message, ..
            } => {
                assert_eq!(position, Some(7));
                assert_eq!(message, "Expected \"]\" at position 7");
            }
            _ => panic!("Expected parse error variant"),
        }
    }

    #[test]
    fn test_classification() {
        let parse = XluceneError::parse("q", "bad");
        assert_eq!(parse.status_code(), 422);
        assert!(!parse.is_safe());

        let wrapped = XluceneError::invalid_query(parse);
        assert_eq!(wrapped.status_code(), 422);
        assert!(wrapped.is_safe());
        assert_eq!(wrapped.to_string(), "Query could not be parsed");

        let violation = XluceneError::access_violation("Field bar in query is restricted");
        assert_eq!(violation.status_code(), 403);
        assert!(violation.is_safe());

        assert_eq!(XluceneError::other("boom").status_code(), 500);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = XluceneError::from(json_error);

        match error {
            XluceneError::Json(_) => {} // Expected
            _ => panic!("Expected JSON error variant"),
        }
    }
}
