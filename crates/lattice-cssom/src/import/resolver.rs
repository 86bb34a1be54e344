//! The `@import` inlining walk.

use url::Url;

use super::Fetcher;
use crate::media::MediaList;
use crate::parser::{CssParser, LoggingErrorHandler};
use crate::rules::{CssRule, MediaRule, StyleSheet};
use crate::{Error, Result};

/// Replaces `@import` rules with the rules of the sheets they point to.
///
/// Each resolved import becomes a `@media` rule carrying the import's media
/// list (`all` when it had none), so the imported rules keep their scope.
/// Imports that fail to load are logged and left in place.
pub struct ImportResolver<'a> {
    fetcher: &'a dyn Fetcher,
    max_depth: Option<usize>,
}

impl<'a> ImportResolver<'a> {
    /// Create a resolver loading through `fetcher`, with no depth limit.
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fetcher,
            max_depth: None,
        }
    }

    /// Leave imports nested deeper than `depth` sheets unresolved.
    ///
    /// Without a limit, an import cycle recurses until the stack runs out.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Inline every `@import` of `sheet`, in order.
    ///
    /// With `recursive`, imported sheets have their own imports inlined
    /// first.
    ///
    /// # Errors
    ///
    /// - [`Error::NoModificationAllowed`] if the sheet is read-only
    /// - [`Error::Syntax`] if an import's href cannot be resolved against
    ///   the sheet's base URI
    pub fn resolve_imports(&self, sheet: &mut StyleSheet, recursive: bool) -> Result<()> {
        self.resolve_at(sheet, recursive, 0)
    }

    fn resolve_at(&self, sheet: &mut StyleSheet, recursive: bool, depth: usize) -> Result<()> {
        if sheet.is_read_only() {
            return Err(Error::NoModificationAllowed);
        }

        let mut index = 0;
        while index < sheet.css_rules().len() {
            let Some(rule) = sheet.css_rules().item(index) else {
                break;
            };
            let Some(import) = rule.as_import() else {
                index += 1;
                continue;
            };
            let owner_rule = rule.id();
            let href = import.href.clone();
            let media = import.media.clone();

            let url = resolve_url(sheet.base_uri(), &href)?;

            if self.max_depth.is_some_and(|max| depth >= max) {
                tracing::warn!("Import depth limit reached, leaving @import of {} in place", url);
                index += 1;
                continue;
            }

            let source = match self.fetcher.fetch(&url) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Failed to load imported stylesheet {}: {}", url, e);
                    index += 1;
                    continue;
                }
            };

            let mut imported = CssParser::new().parse_style_sheet(
                &source,
                Some(owner_rule),
                Some(url.as_str()),
                &mut LoggingErrorHandler,
            )?;
            imported.set_href(Some(url.to_string()));
            imported.set_parent_style_sheet(Some(sheet.id()));

            if recursive {
                self.resolve_at(&mut imported, true, depth + 1)?;
            }

            let media = if media.is_empty() {
                MediaList::from_media(["all"])
            } else {
                media
            };
            let rules = std::mem::take(imported.css_rules_mut());
            let mut replacement = CssRule::Media(MediaRule::new(media, rules));
            replacement.attach(Some(sheet.id()), None);
            sheet.css_rules_mut().replace(index, replacement)?;

            tracing::debug!("Inlined @import of {}", url);
            index += 1;
        }

        Ok(())
    }
}

fn resolve_url(base: Option<&str>, href: &str) -> Result<Url> {
    let resolved = match base {
        Some(base) => Url::parse(base).and_then(|base| base.join(href)),
        None => Url::parse(href),
    };
    resolved.map_err(|e| Error::syntax(format!("Cannot resolve import '{}': {}", href, e)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::import::FetchError;
    use crate::parser::InputSource;
    use crate::rules::RuleType;

    fn sheet(css: &str, base: &str) -> StyleSheet {
        let mut sheet = StyleSheet::from_css(css);
        sheet.set_base_uri(Some(base.to_string()));
        sheet
    }

    fn memory_fetcher(
        files: &[(&str, &str)],
    ) -> impl Fn(&Url) -> std::result::Result<InputSource, FetchError> {
        let files: HashMap<String, String> = files
            .iter()
            .map(|(url, css)| (url.to_string(), css.to_string()))
            .collect();
        move |url: &Url| {
            files
                .get(url.as_str())
                .map(|css| InputSource::new(css.as_str()))
                .ok_or_else(|| FetchError::Other(format!("not found: {}", url)))
        }
    }

    #[test]
    fn import_becomes_media_rule() {
        let fetcher = memory_fetcher(&[("http://x/css/a.css", ".y { color: blue }")]);
        let mut sheet = sheet("@import url(a.css); .x { color: red }", "http://x/css/main.css");

        ImportResolver::new(&fetcher).resolve_imports(&mut sheet, false).unwrap();

        let rules = sheet.css_rules();
        assert_eq!(rules.len(), 2);
        let media = rules.item(0).unwrap().as_media().unwrap();
        assert_eq!(media.media, MediaList::from_media(["all"]));
        assert_eq!(media.css_rules().item(0).unwrap().to_string(), ".y { color: blue }");
        assert_eq!(rules.item(1).unwrap().to_string(), ".x { color: red }");

        let nested = media.css_rules().item(0).unwrap();
        assert_eq!(nested.parent_style_sheet(), Some(sheet.id()));
        assert_eq!(nested.parent_rule(), Some(rules.item(0).unwrap().id()));
    }

    #[test]
    fn import_media_is_kept() {
        let fetcher = memory_fetcher(&[("http://x/print.css", "p { }")]);
        let mut sheet = sheet("@import 'print.css' print, tv;", "http://x/");

        ImportResolver::new(&fetcher).resolve_imports(&mut sheet, false).unwrap();

        let media = sheet.css_rules().item(0).unwrap().as_media().unwrap();
        assert_eq!(media.media.media_text(), "print, tv");
    }

    #[test]
    fn failed_fetch_leaves_import() {
        let fetcher = memory_fetcher(&[]);
        let mut sheet = sheet("@import url(gone.css); p { }", "http://x/");

        ImportResolver::new(&fetcher).resolve_imports(&mut sheet, true).unwrap();

        assert_eq!(sheet.css_rules().item(0).unwrap().rule_type(), RuleType::Import);
        assert_eq!(sheet.css_rules().len(), 2);
    }

    #[test]
    fn recursive_resolution() {
        let fetcher = memory_fetcher(&[
            ("http://x/a.css", "@import url(sub/b.css); .a { }"),
            ("http://x/sub/b.css", ".b { }"),
        ]);

        let mut shallow = sheet("@import url(a.css);", "http://x/");
        ImportResolver::new(&fetcher).resolve_imports(&mut shallow, false).unwrap();
        let inner = shallow.css_rules().item(0).unwrap().as_media().unwrap();
        assert_eq!(inner.css_rules().item(0).unwrap().rule_type(), RuleType::Import);

        let mut deep = sheet("@import url(a.css);", "http://x/");
        ImportResolver::new(&fetcher).resolve_imports(&mut deep, true).unwrap();
        let inner = deep.css_rules().item(0).unwrap().as_media().unwrap();
        let innermost = inner.css_rules().item(0).unwrap().as_media().unwrap();
        assert_eq!(innermost.css_rules().item(0).unwrap().to_string(), ".b { }");
        assert_eq!(
            innermost.css_rules().item(0).unwrap().parent_style_sheet(),
            Some(deep.id())
        );
    }

    #[test]
    fn depth_limit_stops_cycles() {
        let fetcher = memory_fetcher(&[("http://x/loop.css", "@import url(loop.css); p { }")]);
        let mut sheet = sheet("@import url(loop.css);", "http://x/");

        ImportResolver::new(&fetcher)
            .with_max_depth(2)
            .resolve_imports(&mut sheet, true)
            .unwrap();

        let first = sheet.css_rules().item(0).unwrap().as_media().unwrap();
        let second = first.css_rules().item(0).unwrap().as_media().unwrap();
        assert_eq!(second.css_rules().item(0).unwrap().rule_type(), RuleType::Import);
    }

    #[test]
    fn read_only_sheet_is_rejected() {
        let fetcher = memory_fetcher(&[]);
        let mut sheet = sheet("@import url(a.css);", "http://x/");
        sheet.set_read_only(true);
        assert!(matches!(
            ImportResolver::new(&fetcher).resolve_imports(&mut sheet, false),
            Err(Error::NoModificationAllowed)
        ));
    }

    #[test]
    fn relative_href_without_base_is_syntax_error() {
        let fetcher = memory_fetcher(&[]);
        let mut sheet = StyleSheet::from_css("@import url(a.css);");
        assert!(matches!(
            ImportResolver::new(&fetcher).resolve_imports(&mut sheet, false),
            Err(Error::Syntax { .. })
        ));
    }
}
