use miette::Diagnostic;

/// Errors that can occur while analyzing a pull request.
///
/// Every failure originates at the I/O boundary (configuration, the GitHub
/// API). Classification itself is infallible. The binary crate renders these
/// through `miette` at the top level.
///
/// # Examples
///
/// ```
/// use threadgate_core::ThreadgateError;
///
/// let err = ThreadgateError::Config("missing token".into());
/// assert!(err.to_string().contains("missing token"));
/// ```
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ThreadgateError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The GitHub API could not be reached, answered with a non-success
    /// status, or returned a body that could not be decoded.
    #[error("transport error: {0}")]
    #[diagnostic(help("check network access and that the token can read pull requests"))]
    Transport(String),

    /// The GraphQL response carried an `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The repository or pull request does not exist or is not visible.
    #[error("not found: {0}")]
    NotFound(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
