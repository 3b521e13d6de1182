//! Error types and handling for vitrine-core operations.
//!
//! The router distinguishes three kinds of failure, and only one of them is
//! ever surfaced to a visitor:
//!
//! - **Not found**: the server answers 404 for a page. This is *not* an error
//!   at the navigation level; the cache substitutes the reserved `@404` page.
//!   [`Error::NotFound`] only escapes when the `@404` page itself is missing.
//! - **Malformed page**: a page file breaks the authoring contract (no `h1`).
//!   This is a content defect and propagates as [`Error::MalformedPage`].
//! - **Network failure**: the request itself failed. There are no retries;
//!   [`Error::Network`] propagates out of `resolve` and `navigate`.
//!
//! ```rust
//! use vitrine_core::Error;
//!
//! let err = Error::MalformedPage {
//!     page: "accueil".to_string(),
//!     reason: "missing <h1>".to_string(),
//! };
//! assert_eq!(err.category(), "malformed_page");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for vitrine-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed at the transport level or returned an unexpected
    /// status other than 404.
    ///
    /// ## Recoverability
    ///
    /// Connection and timeout errors are typically recoverable; the router
    /// itself never retries.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A page file does not honor the page authoring contract.
    ///
    /// Every page must contain a leading `h1`. A missing heading is a content
    /// defect rather than a visitor error, so it is never papered over.
    #[error("Malformed page '{page}': {reason}")]
    MalformedPage {
        /// Identifier of the offending page.
        page: String,
        /// What was missing or invalid.
        reason: String,
    },

    /// The shell document does not honor the shell markup contract.
    ///
    /// ## Common Causes
    ///
    /// - No `<meta name="description">` element
    /// - No `main > header h1` heading
    /// - No `main > .corps` body slot
    #[error("Shell error: {0}")]
    Shell(String),

    /// Requested resource was not found and no fallback applies.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or cannot be joined with a page path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable by trying again later.
    ///
    /// Only transient network conditions qualify, including 5xx answers.
    /// Content defects and configuration problems stay broken until someone
    /// fixes them.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|status| status.is_server_error())
            },
            _ => false,
        }
    }

    /// Get the error category as a static string identifier.
    ///
    /// Useful as a structured logging field.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::MalformedPage { .. } => "malformed_page",
            Self::Shell(_) => "shell",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
