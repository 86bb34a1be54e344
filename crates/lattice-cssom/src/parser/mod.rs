//! CSS parsing module.

mod css_parser;
mod error;
mod input;

pub use css_parser::{CssParser, parse_css};
pub use error::{CollectingErrorHandler, ErrorHandler, FailFast, LoggingErrorHandler, ParseError};
pub use input::{InputSource, Locator};
