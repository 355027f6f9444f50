//! Traits and type definitions for chat model completions.
//!
//! The interface for every completion backend is the [`CompletionService`] trait.
//! A service takes the full list of messages that make up a request (the persona
//! instruction followed by the conversation history) together with the sampling
//! parameters, and produces the text of a single model-generated reply.
//!
//! ## Error Handling
//!
//! Each API has its own bespoke error system. Providers keep their own error types
//! and wrap them in [`Error`], where [`ErrorKind`] gives the general category of
//! the fault. Callers which only need to report the failure can rely on the
//! `Display` implementation and the `source` chain.

mod apireq;
mod openai;

pub(crate) mod providers;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;

use self::providers::ProviderIdentifier;
use crate::chat::Message;

/// This is a list specifying general categories of errors that
/// can be returned by a [`CompletionService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Failed to connect to the underlying API service.
    /// This could be due to network issues like DNS
    /// resolution, connectivity issues, or routing problems.
    Connection,
    /// A request timed out.
    TimedOut,
    /// An API key was not accepted or service-specific
    /// permissions are needed.
    Authentication,
    /// A rate limit was reached or a quota was exceeded.
    ExcessUsage,
    /// The servers are overloaded. This is non-fatal
    /// and indicates that a retry may be needed later.
    ApiOverloaded,
    /// The requested resource was not found. This likely means that
    /// the configured model does not exist.
    NotFound,
    /// The request was malformed or is otherwise improper. This
    /// often corresponds to errors with HTTP status codes in
    /// the 400s.
    BadRequest,
    /// The server encountered an error. This often corresponds to
    /// errors with HTTP status codes in the 500s.
    InternalError,
    /// An API response was unable to be deserialized, malformed,
    /// or otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the API service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::Authentication => "authentication failed or not provided",
            ErrorKind::ExcessUsage => "rate limit exceeded or quota crossed",
            ErrorKind::ApiOverloaded => "API server(s) are currently overloaded",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the server encountered an internal error",
            ErrorKind::UnexpectedResponse => "API response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

/// Sampling parameters which accompany every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CompletionParameters {
    /// Controls the randomness of the reply.
    pub temperature: f64,
    /// Upper bound on the number of tokens in the reply.
    pub max_tokens: u32,
}

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.8;
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 1024;

impl Default for CompletionParameters {
    fn default() -> Self {
        CompletionParameters {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompletionRequest<'r> {
    /// The ID of the model.
    pub model: &'r str,
    /// The messages, in the order they are presented to the model.
    pub messages: &'r [Message],
    pub parameters: &'r CompletionParameters,
}

/// A trait implemented by all completion backends.
#[async_trait]
pub(crate) trait CompletionService: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderIdentifier;

    /// Takes a series of messages that are part of a chat conversation
    /// and produces the text of a new message generated by the model
    /// in response.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error>;
}
