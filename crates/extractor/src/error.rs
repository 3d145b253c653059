use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while compiling a selector.
///
/// Every variant is decided before a document is touched, so a given selector
/// string always fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The selector was empty or whitespace only
    #[error("Empty selector")]
    EmptySelector,

    /// The selector is not a usable node-set expression
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl QueryError {
    /// Create an invalid selector error
    pub fn invalid(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during parameter extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The input is not well-formed XML
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The user selector could not be compiled
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExtractError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
