//! Loading imported stylesheets.

use std::fs;

use url::Url;

use crate::parser::InputSource;

/// Errors raised while loading an imported stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Reading the target failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetcher cannot load URLs of this scheme.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Loads the CSS text behind a resolved URL.
///
/// Closures of the form `Fn(&Url) -> Result<InputSource, FetchError>` are
/// fetchers too, which keeps tests and in-memory setups short.
pub trait Fetcher {
    /// Load the stylesheet at `url`.
    fn fetch(&self, url: &Url) -> Result<InputSource, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&Url) -> Result<InputSource, FetchError>,
{
    fn fetch(&self, url: &Url) -> Result<InputSource, FetchError> {
        self(url)
    }
}

/// Fetcher for `file:` URLs, reading from the local filesystem.
///
/// Files are decoded by [`InputSource::from_bytes`], so a byte order mark or
/// a leading `@charset` rule picks the encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &Url) -> Result<InputSource, FetchError> {
        if url.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::Other(format!("Not a local path: {}", url)))?;
        let bytes = fs::read(&path)?;
        Ok(InputSource::from_bytes(&bytes, None).with_uri(url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn file_fetcher_reads_local_files() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "p {{ color: red }}").unwrap();

        let url = Url::from_file_path(file.path()).unwrap();
        let source = FileFetcher.fetch(&url).unwrap();
        assert_eq!(source.text().trim(), "p { color: red }");
        assert_eq!(source.uri(), Some(url.as_str()));
    }

    #[test]
    fn file_fetcher_honors_charset_rule() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"@charset \"iso-8859-1\";\np::before { content: \"caf\xE9\" }")
            .unwrap();

        let url = Url::from_file_path(file.path()).unwrap();
        let source = FileFetcher.fetch(&url).unwrap();
        assert!(source.text().ends_with("content: \"caf\u{e9}\" }"), "{}", source.text());
        assert_eq!(source.encoding(), Some("windows-1252"));
    }

    #[test]
    fn file_fetcher_rejects_other_schemes() {
        let url = Url::parse("http://example.com/a.css").unwrap();
        assert!(matches!(
            FileFetcher.fetch(&url),
            Err(FetchError::UnsupportedScheme(scheme)) if scheme == "http"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.css")).unwrap();
        assert!(matches!(FileFetcher.fetch(&url), Err(FetchError::Io(_))));
    }

    #[test]
    fn closures_are_fetchers() {
        let fetcher = |url: &Url| -> Result<InputSource, FetchError> {
            Ok(InputSource::new(format!("/* {} */", url.path())))
        };
        let url = Url::parse("http://example.com/x.css").unwrap();
        assert_eq!(fetcher.fetch(&url).unwrap().text(), "/* /x.css */");
    }
}
