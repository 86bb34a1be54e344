//! CSS parsing errors and the handlers that receive them.

use super::Locator;

/// CSS parse error with optional location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message describing what went wrong.
    pub message: String,
    /// Where the problem was found, when known.
    pub locator: Option<Locator>,
}

impl ParseError {
    /// Create a new parse error at the given location.
    pub fn new(message: impl Into<String>, locator: Locator) -> Self {
        Self {
            message: message.into(),
            locator: Some(locator),
        }
    }

    /// Create a parse error without a location.
    pub fn unlocated(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locator: None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.locator {
            Some(loc) => write!(f, "CSS parse error at {}:{}: {}", loc.line, loc.column, self.message),
            None => write!(f, "CSS parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Receives the problems found while parsing.
///
/// `error` decides whether the parse goes on: returning `Err` aborts the
/// current parse call with that error, returning `Ok` lets the parser skip
/// the offending fragment and continue.
pub trait ErrorHandler {
    /// A recoverable oddity that never aborts parsing.
    fn warning(&mut self, warning: ParseError);

    /// A malformed construct.
    fn error(&mut self, error: ParseError) -> Result<(), ParseError>;
}

/// Logs every problem through `tracing` and keeps going.
///
/// This is the handler used when no other is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn warning(&mut self, warning: ParseError) {
        tracing::debug!("{}", warning);
    }

    fn error(&mut self, error: ParseError) -> Result<(), ParseError> {
        tracing::warn!("{}", error);
        Ok(())
    }
}

/// Turns the first reported error into a failed parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl ErrorHandler for FailFast {
    fn warning(&mut self, warning: ParseError) {
        tracing::debug!("{}", warning);
    }

    fn error(&mut self, error: ParseError) -> Result<(), ParseError> {
        Err(error)
    }
}

/// Records every problem and keeps going.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorHandler {
    /// Errors in the order they were reported.
    pub errors: Vec<ParseError>,
    /// Warnings in the order they were reported.
    pub warnings: Vec<ParseError>,
}

impl CollectingErrorHandler {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing at all was reported.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn warning(&mut self, warning: ParseError) {
        self.warnings.push(warning);
    }

    fn error(&mut self, error: ParseError) -> Result<(), ParseError> {
        self.errors.push(error);
        Ok(())
    }
}
