//! CSS syntax parser using the `cssparser` crate.
//!
//! This module contains the grammar that turns CSS text into the object model:
//! rule lists, at-rules, selectors built from [`Condition`]s, declaration
//! blocks and media lists. Tokenizing is delegated to `cssparser`.
//!
//! # Error Recovery
//!
//! Every problem is reported to the caller's [`ErrorHandler`]. If the handler
//! accepts the report, the parser skips the offending fragment and continues:
//! a bad declaration is skipped up to the next `;`, a bad rule up to the end
//! of its block. If the handler rejects it, the whole parse call fails with
//! that error. Best-effort and fail-fast parsing share this one code path.

use cssparser::{
    BasicParseError, BasicParseErrorKind, Delimiter, ParseError as CssParseError,
    ParseErrorKind, Parser, ParserInput, SourcePosition, Token,
};

use super::{ErrorHandler, InputSource, Locator, LoggingErrorHandler, ParseError};
use crate::media::MediaList;
use crate::rules::{
    CharsetRule, CssRule, FontFaceRule, ImportRule, MediaRule, PageRule, Property, RuleId,
    RuleList, RuleType, StyleDeclaration, StyleRule, StyleSheet, StyleSheetId, UnknownRule,
};
use crate::selector::{Combinator, Condition, Selector, SelectorList, SimpleSelector};

/// Entry point for parsing CSS into the object model.
///
/// The parser carries no state between calls; it only remembers which
/// stylesheet parsed rules should point back to.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssParser {
    parent_style_sheet: Option<StyleSheetId>,
}

impl CssParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make rules returned by [`CssParser::parse_rule`] point back to `sheet`.
    pub fn with_parent_style_sheet(mut self, sheet: StyleSheetId) -> Self {
        self.parent_style_sheet = Some(sheet);
        self
    }

    /// Parse a whole stylesheet.
    ///
    /// `owner_rule` is the `@import` the sheet is loaded for, if any.
    /// `base_uri` defaults to the source's URI, which also becomes the
    /// sheet's `href`.
    pub fn parse_style_sheet(
        &self,
        source: &InputSource,
        owner_rule: Option<RuleId>,
        base_uri: Option<&str>,
        handler: &mut dyn ErrorHandler,
    ) -> Result<StyleSheet, ParseError> {
        let mut input = ParserInput::new(source.text());
        let mut parser = Parser::new(&mut input);
        let rules = parse_rule_list(&mut parser, Nesting::TopLevel, handler)?;

        let mut sheet = StyleSheet::new();
        sheet.set_owner_rule(owner_rule);
        sheet.set_href(source.uri().map(str::to_string));
        sheet.set_base_uri(base_uri.or(source.uri()).map(str::to_string));
        sheet.set_css_rules(rules);
        Ok(sheet)
    }

    /// Parse exactly one rule.
    ///
    /// Returns `Ok(None)` if the handler accepted an error and no rule could
    /// be built. Content after the first rule is an error.
    pub fn parse_rule(
        &self,
        source: &InputSource,
        handler: &mut dyn ErrorHandler,
    ) -> Result<Option<CssRule>, ParseError> {
        let mut input = ParserInput::new(source.text());
        let mut parser = Parser::new(&mut input);

        parser.skip_whitespace();
        if parser.is_exhausted() {
            handler.error(ParseError::new(
                "Expected a rule",
                Locator::from_css(parser.current_source_location()),
            ))?;
            return Ok(None);
        }

        let mut rule = parse_one_rule(&mut parser, handler)?;

        parser.skip_whitespace();
        if !parser.is_exhausted() {
            handler.error(ParseError::new(
                "Unexpected content after the rule",
                Locator::from_css(parser.current_source_location()),
            ))?;
        }

        if let Some(rule) = rule.as_mut() {
            rule.attach(self.parent_style_sheet, None);
        }
        Ok(rule)
    }

    /// Parse a comma-separated media query list.
    pub fn parse_media(
        &self,
        source: &InputSource,
        handler: &mut dyn ErrorHandler,
    ) -> Result<MediaList, ParseError> {
        let mut input = ParserInput::new(source.text());
        let mut parser = Parser::new(&mut input);
        parse_media_list(&mut parser, handler)
    }

    /// Parse a comma-separated selector list.
    ///
    /// An invalid selector invalidates the whole list, as in a style rule; a
    /// handler that accepts the error gets an empty list back.
    pub fn parse_selectors(
        &self,
        source: &InputSource,
        handler: &mut dyn ErrorHandler,
    ) -> Result<SelectorList, ParseError> {
        let mut input = ParserInput::new(source.text());
        let mut parser = Parser::new(&mut input);
        let result = parser.parse_entirely(|p| parse_selector_list(p).map_err(|e| custom(p, e)));
        match result {
            Ok(list) => Ok(list),
            Err(e) => {
                handler.error(into_parse_error(e))?;
                Ok(SelectorList::default())
            }
        }
    }

    /// Parse the contents of a declaration block, without braces.
    pub fn parse_style_declaration(
        &self,
        source: &InputSource,
        handler: &mut dyn ErrorHandler,
    ) -> Result<StyleDeclaration, ParseError> {
        let mut input = ParserInput::new(source.text());
        let mut parser = Parser::new(&mut input);
        parse_declarations(&mut parser, handler)
    }
}

/// Parse a CSS stylesheet string, logging and skipping anything malformed.
///
/// # Example
///
/// ```ignore
/// let sheet = parse_css("p { color: red; } h1 { color: blue; }");
/// assert_eq!(sheet.css_rules().len(), 2);
/// ```
pub fn parse_css(css: &str) -> StyleSheet {
    CssParser::new()
        .parse_style_sheet(&InputSource::new(css), None, None, &mut LoggingErrorHandler)
        .unwrap_or_else(|e| {
            tracing::warn!("CSS parse error: {}", e);
            StyleSheet::new()
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    TopLevel,
    Group,
}

fn custom<'i>(parser: &Parser<'i, '_>, err: ParseError) -> CssParseError<'i, ParseError> {
    parser.new_custom_error(err)
}

fn into_parse_error(err: CssParseError<'_, ParseError>) -> ParseError {
    match err.kind {
        ParseErrorKind::Custom(e) => e,
        ParseErrorKind::Basic(kind) => ParseError::new(describe(&kind), Locator::from_css(err.location)),
    }
}

fn basic_error(err: BasicParseError<'_>) -> ParseError {
    ParseError::new(describe(&err.kind), Locator::from_css(err.location))
}

fn describe(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => format!("Unexpected token {:?}", token),
        BasicParseErrorKind::EndOfInput => "Unexpected end of input".to_string(),
        other => format!("{:?}", other),
    }
}

fn location(parser: &Parser<'_, '_>) -> Locator {
    Locator::from_css(parser.current_source_location())
}

/// Parse rules until the input (or the enclosing block) is exhausted.
fn parse_rule_list(
    input: &mut Parser<'_, '_>,
    nesting: Nesting,
    handler: &mut dyn ErrorHandler,
) -> Result<RuleList, ParseError> {
    let mut rules = RuleList::new();
    let mut seen_rule = false;
    let mut seen_body = false;

    loop {
        input.skip_whitespace();
        if input.is_exhausted() {
            break;
        }

        // `<!--` and `-->` are ignored at the top level of a stylesheet.
        let state = input.state();
        let is_cdo_cdc = matches!(input.next(), Ok(Token::CDO) | Ok(Token::CDC));
        if is_cdo_cdc && nesting == Nesting::TopLevel {
            continue;
        }
        input.reset(&state);

        let loc = location(input);
        let Some(rule) = parse_one_rule(input, handler)? else {
            seen_rule = true;
            continue;
        };

        match rule.rule_type() {
            RuleType::Charset if seen_rule || nesting == Nesting::Group => {
                handler.error(ParseError::new("@charset rule must be the first rule", loc))?;
            }
            RuleType::Import if seen_body || nesting == Nesting::Group => {
                handler.error(ParseError::new(
                    "@import rules must precede all other rules",
                    loc,
                ))?;
            }
            rule_type => {
                if !rule_type.is_preamble() {
                    seen_body = true;
                }
                rules.push(rule);
            }
        }
        seen_rule = true;
    }

    Ok(rules)
}

/// Parse one at-rule or style rule starting at the current position.
fn parse_one_rule(
    input: &mut Parser<'_, '_>,
    handler: &mut dyn ErrorHandler,
) -> Result<Option<CssRule>, ParseError> {
    let rule_start = input.position();
    let loc = location(input);
    let state = input.state();

    let at_name = match input.next() {
        Ok(Token::AtKeyword(name)) => Some(name.to_string()),
        _ => None,
    };

    match at_name {
        Some(name) => parse_at_rule(input, &name, rule_start, loc, handler),
        None => {
            input.reset(&state);
            parse_style_rule(input, loc, handler)
        }
    }
}

/// Parse a style rule: selectors { declarations }
fn parse_style_rule(
    input: &mut Parser<'_, '_>,
    loc: Locator,
    handler: &mut dyn ErrorHandler,
) -> Result<Option<CssRule>, ParseError> {
    let selectors = input.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
        parse_selector_list(p).map_err(|e| custom(p, e))
    });
    let selectors = match selectors {
        Ok(selectors) => Some(selectors),
        Err(e) => {
            handler.error(into_parse_error(e))?;
            None
        }
    };

    if !matches!(input.next(), Ok(Token::CurlyBracketBlock)) {
        if selectors.is_some() {
            handler.error(ParseError::new("Expected '{' after selector", loc))?;
        }
        return Ok(None);
    }

    let Some(selectors) = selectors else {
        skip_block(input);
        return Ok(None);
    };

    let style = input
        .parse_nested_block(|p| parse_declarations(p, handler).map_err(|e| custom(p, e)))
        .map_err(into_parse_error)?;

    Ok(Some(CssRule::Style(StyleRule::new(selectors, style))))
}

enum AtRulePrelude {
    Charset(String),
    Import { href: String, media: MediaList },
    Media(MediaList),
    FontFace,
    Page(Option<String>),
    Unknown,
}

fn parse_at_rule(
    input: &mut Parser<'_, '_>,
    name: &str,
    rule_start: SourcePosition,
    loc: Locator,
    handler: &mut dyn ErrorHandler,
) -> Result<Option<CssRule>, ParseError> {
    let lower = name.to_ascii_lowercase();
    let prelude = input.parse_until_before(Delimiter::Semicolon | Delimiter::CurlyBracketBlock, |p| {
        parse_at_rule_prelude(p, &lower, handler).map_err(|e| custom(p, e))
    });

    let prelude = match prelude {
        Ok(prelude) => prelude,
        Err(e) => {
            if matches!(input.next(), Ok(Token::CurlyBracketBlock)) {
                skip_block(input);
            }
            handler.error(into_parse_error(e))?;
            return Ok(None);
        }
    };

    // A statement at-rule may also be closed by the end of input.
    let has_block = matches!(input.next(), Ok(Token::CurlyBracketBlock));

    let rule = match prelude {
        AtRulePrelude::Charset(encoding) => {
            if has_block {
                skip_block(input);
                handler.error(ParseError::new("@charset rule must not have a block", loc))?;
                return Ok(None);
            }
            CssRule::Charset(CharsetRule::new(encoding))
        }
        AtRulePrelude::Import { href, media } => {
            if has_block {
                skip_block(input);
                handler.error(ParseError::new("@import rule must not have a block", loc))?;
                return Ok(None);
            }
            CssRule::Import(ImportRule::new(href, media))
        }
        AtRulePrelude::Media(media) => {
            if !has_block {
                handler.error(ParseError::new("Expected '{' after @media", loc))?;
                return Ok(None);
            }
            let rules = input
                .parse_nested_block(|p| {
                    parse_rule_list(p, Nesting::Group, handler).map_err(|e| custom(p, e))
                })
                .map_err(into_parse_error)?;
            CssRule::Media(MediaRule::new(media, rules))
        }
        AtRulePrelude::FontFace => {
            if !has_block {
                handler.error(ParseError::new("Expected '{' after @font-face", loc))?;
                return Ok(None);
            }
            let style = input
                .parse_nested_block(|p| parse_declarations(p, handler).map_err(|e| custom(p, e)))
                .map_err(into_parse_error)?;
            CssRule::FontFace(FontFaceRule::new(style))
        }
        AtRulePrelude::Page(selector) => {
            if !has_block {
                handler.error(ParseError::new("Expected '{' after @page", loc))?;
                return Ok(None);
            }
            let style = input
                .parse_nested_block(|p| parse_declarations(p, handler).map_err(|e| custom(p, e)))
                .map_err(into_parse_error)?;
            CssRule::Page(PageRule::new(selector, style))
        }
        AtRulePrelude::Unknown => {
            if has_block {
                skip_block(input);
            }
            handler.warning(ParseError::new(format!("Unknown at-rule @{}", name), loc));
            CssRule::Unknown(UnknownRule::new(input.slice_from(rule_start).trim()))
        }
    };

    Ok(Some(rule))
}

fn parse_at_rule_prelude(
    p: &mut Parser<'_, '_>,
    name: &str,
    handler: &mut dyn ErrorHandler,
) -> Result<AtRulePrelude, ParseError> {
    match name {
        "charset" => {
            let encoding = p.expect_string().map_err(basic_error)?.to_string();
            p.expect_exhausted().map_err(basic_error)?;
            Ok(AtRulePrelude::Charset(encoding))
        }
        "import" => {
            let href = p.expect_url_or_string().map_err(basic_error)?.to_string();
            let media = parse_media_list(p, handler)?;
            Ok(AtRulePrelude::Import { href, media })
        }
        "media" => Ok(AtRulePrelude::Media(parse_media_list(p, handler)?)),
        "font-face" => {
            p.expect_exhausted().map_err(basic_error)?;
            Ok(AtRulePrelude::FontFace)
        }
        "page" => {
            let start = p.position();
            while p.next().is_ok() {}
            let selector = p.slice_from(start).trim();
            Ok(AtRulePrelude::Page(
                (!selector.is_empty()).then(|| selector.to_string()),
            ))
        }
        _ => {
            while p.next().is_ok() {}
            Ok(AtRulePrelude::Unknown)
        }
    }
}

/// Parse media queries up to the end of the (possibly delimited) input.
fn parse_media_list(
    p: &mut Parser<'_, '_>,
    handler: &mut dyn ErrorHandler,
) -> Result<MediaList, ParseError> {
    let mut media = MediaList::new();

    loop {
        p.skip_whitespace();
        if p.is_exhausted() {
            break;
        }

        let loc = location(p);
        let start = p.position();
        let _ = p.parse_until_before(Delimiter::Comma, |p| {
            while p.next().is_ok() {}
            Ok::<_, CssParseError<'_, ()>>(())
        });
        let query = p.slice_from(start).split_whitespace().collect::<Vec<_>>().join(" ");
        if query.is_empty() {
            handler.error(ParseError::new("Empty media query", loc))?;
        } else {
            media.append_medium(query);
        }

        if p.next().is_err() {
            break;
        }
    }

    Ok(media)
}

/// Parse declarations until the block is exhausted.
fn parse_declarations(
    p: &mut Parser<'_, '_>,
    handler: &mut dyn ErrorHandler,
) -> Result<StyleDeclaration, ParseError> {
    let mut style = StyleDeclaration::new();

    loop {
        p.skip_whitespace();
        if p.is_exhausted() {
            break;
        }

        let result = p.parse_until_after(Delimiter::Semicolon, |p| {
            parse_declaration(p).map_err(|e| custom(p, e))
        });
        match result {
            Ok(Some(property)) => style.push(property),
            Ok(None) => {}
            Err(e) => handler.error(into_parse_error(e))?,
        }
    }

    Ok(style)
}

/// Parse `name: value [!important]` up to the end of the delimited input.
fn parse_declaration(p: &mut Parser<'_, '_>) -> Result<Option<Property>, ParseError> {
    let loc = location(p);
    let name = match p.next() {
        Ok(Token::Ident(name)) => name.to_string(),
        Ok(token) => {
            return Err(ParseError::new(
                format!("Expected a property name, found {:?}", token),
                loc,
            ));
        }
        Err(_) => return Ok(None),
    };

    if p.expect_colon().is_err() {
        return Err(ParseError::new(format!("Expected ':' after '{}'", name), loc));
    }

    p.skip_whitespace();
    let start = p.position();
    while p.next().is_ok() {}
    let (value, important) = split_important(p.slice_from(start).trim());
    if value.is_empty() {
        return Err(ParseError::new(format!("Missing value for '{}'", name), loc));
    }

    // Custom properties are case-sensitive.
    let name = if name.starts_with("--") {
        name
    } else {
        name.to_ascii_lowercase()
    };
    Ok(Some(Property::new(name, value, important)))
}

fn split_important(raw: &str) -> (&str, bool) {
    if let Some(bang) = raw.rfind('!')
        && raw[bang + 1..].trim().eq_ignore_ascii_case("important")
    {
        return (raw[..bang].trim_end(), true);
    }
    (raw, false)
}

/// Parse selectors separated by commas.
fn parse_selector_list(p: &mut Parser<'_, '_>) -> Result<SelectorList, ParseError> {
    let mut selectors = vec![];

    loop {
        let selector = p
            .parse_until_before(Delimiter::Comma, |p| parse_selector(p).map_err(|e| custom(p, e)))
            .map_err(into_parse_error)?;
        selectors.push(selector);

        if !matches!(p.next(), Ok(Token::Comma)) {
            break;
        }
    }

    Ok(SelectorList::new(selectors))
}

/// Parse one complex selector. Whitespace is significant here.
fn parse_selector(p: &mut Parser<'_, '_>) -> Result<Selector, ParseError> {
    let mut parts = vec![];
    let mut combinators = vec![];
    let mut current = SimpleSelector::default();
    let mut pending: Option<Combinator> = None;

    p.skip_whitespace();
    let start = location(p);

    loop {
        let loc = location(p);
        let token = match p.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        let combinator = match &token {
            Token::WhiteSpace(_) => Some(Combinator::Descendant),
            Token::Delim('>') => Some(Combinator::Child),
            Token::Delim('+') => Some(Combinator::AdjacentSibling),
            Token::Delim('~') => Some(Combinator::GeneralSibling),
            _ => None,
        };

        if let Some(combinator) = combinator {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                pending = Some(combinator);
            } else if parts.is_empty() {
                if combinator != Combinator::Descendant {
                    return Err(ParseError::new("Selector starts with a combinator", loc));
                }
            } else if combinator != Combinator::Descendant {
                if matches!(pending, Some(c) if c != Combinator::Descendant) {
                    return Err(ParseError::new("Two combinators in a row", loc));
                }
                pending = Some(combinator);
            }
            continue;
        }

        // A new compound after a combinator.
        if current.is_empty() && !parts.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        if current.pseudo_element.is_some() {
            return Err(ParseError::new("A pseudo-element must end its compound selector", loc));
        }

        match token {
            Token::Ident(name) => {
                if !current.is_empty() {
                    return Err(ParseError::new(
                        format!("Unexpected element name '{}'", name),
                        loc,
                    ));
                }
                current.element = Some(name.to_string());
            }
            Token::Delim('*') => {
                if !current.is_empty() {
                    return Err(ParseError::new("Unexpected '*'", loc));
                }
                current.element = Some("*".to_string());
            }
            Token::Delim('.') => match p.next_including_whitespace() {
                Ok(Token::Ident(class)) => {
                    let condition = Condition::class(Some(class.to_string())).with_locator(loc);
                    current.add_condition(condition);
                }
                _ => return Err(ParseError::new("Expected class name after '.'", loc)),
            },
            Token::IDHash(id) => {
                current.add_condition(Condition::id(Some(id.to_string())).with_locator(loc));
            }
            Token::Hash(id) => {
                return Err(ParseError::new(format!("Invalid id selector '#{}'", id), loc));
            }
            Token::SquareBracketBlock => {
                let condition = p
                    .parse_nested_block(|p| parse_attribute(p, loc).map_err(|e| custom(p, e)))
                    .map_err(into_parse_error)?;
                current.add_condition(condition);
            }
            Token::Colon => parse_pseudo(p, &mut current, loc)?,
            other => {
                return Err(ParseError::new(
                    format!("Unexpected token {:?} in selector", other),
                    loc,
                ));
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    } else if matches!(pending, Some(c) if c != Combinator::Descendant) {
        return Err(ParseError::new("Selector ends with a combinator", start));
    }

    if parts.is_empty() {
        return Err(ParseError::new("Empty selector", start));
    }

    Ok(Selector { parts, combinators })
}

/// Parse what follows a ':' in a selector.
fn parse_pseudo(
    p: &mut Parser<'_, '_>,
    current: &mut SimpleSelector,
    loc: Locator,
) -> Result<(), ParseError> {
    let token = p
        .next_including_whitespace()
        .map_err(basic_error)?
        .clone();

    match token {
        Token::Colon => match p.next_including_whitespace() {
            Ok(Token::Ident(name)) => {
                current.pseudo_element = Some(name.to_string());
                Ok(())
            }
            _ => Err(ParseError::new("Expected pseudo-element name after '::'", loc)),
        },
        Token::Ident(name) => {
            // CSS2 pseudo-elements may be written with a single colon.
            let lower = name.to_ascii_lowercase();
            if matches!(lower.as_str(), "before" | "after" | "first-line" | "first-letter") {
                current.pseudo_element = Some(lower);
            } else {
                current.add_condition(Condition::pseudo_class(Some(name.to_string())).with_locator(loc));
            }
            Ok(())
        }
        Token::Function(name) if name.eq_ignore_ascii_case("lang") => {
            let lang = p
                .parse_nested_block(|p| {
                    p.skip_whitespace();
                    if p.is_exhausted() {
                        return Ok(None);
                    }
                    let lang = match p.next() {
                        Ok(Token::Ident(v)) | Ok(Token::QuotedString(v)) => Some(v.to_string()),
                        _ => None,
                    };
                    match lang {
                        Some(lang) => Ok(Some(lang)),
                        None => Err(custom(p, ParseError::new("Expected a language in :lang()", loc))),
                    }
                })
                .map_err(into_parse_error)?;
            current.add_condition(Condition::lang(lang).with_locator(loc));
            Ok(())
        }
        Token::Function(name) => {
            let arguments = p
                .parse_nested_block(|p| {
                    let start = p.position();
                    while p.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<_, CssParseError<'_, ParseError>>(p.slice_from(start).trim().to_string())
                })
                .map_err(into_parse_error)?;
            let value = format!("{}({})", name, arguments);
            current.add_condition(Condition::pseudo_class(Some(value)).with_locator(loc));
            Ok(())
        }
        _ => Err(ParseError::new("Expected pseudo-class name after ':'", loc)),
    }
}

/// Parse the inside of `[...]`.
fn parse_attribute(p: &mut Parser<'_, '_>, loc: Locator) -> Result<Condition, ParseError> {
    let name = match p.next() {
        Ok(Token::Ident(name)) => name.to_string(),
        _ => return Err(ParseError::new("Expected attribute name", loc)),
    };

    let operator = match p.next() {
        Ok(token) => token.clone(),
        Err(_) => return Ok(Condition::exists(name).with_locator(loc)),
    };

    let value = match p.next() {
        Ok(Token::Ident(v)) | Ok(Token::QuotedString(v)) => Some(v.to_string()),
        _ => return Err(ParseError::new("Expected attribute value", loc)),
    };

    // Case-sensitivity flags are accepted and ignored.
    let state = p.state();
    if !matches!(p.next(), Ok(Token::Ident(flag)) if flag.eq_ignore_ascii_case("i") || flag.eq_ignore_ascii_case("s"))
    {
        p.reset(&state);
    }
    p.expect_exhausted().map_err(basic_error)?;

    let condition = match operator {
        Token::Delim('=') => Condition::equals(name, value),
        Token::IncludeMatch => Condition::one_of(name, value),
        Token::DashMatch => Condition::begin_hyphen(name, value),
        Token::PrefixMatch => Condition::prefix(name, value),
        Token::SuffixMatch => Condition::suffix(name, value),
        Token::SubstringMatch => Condition::substring(name, value),
        other => {
            return Err(ParseError::new(
                format!("Unknown attribute operator {:?}", other),
                loc,
            ));
        }
    };
    Ok(condition.with_locator(loc))
}

/// Skip the contents of a block whose opening token was just consumed.
fn skip_block(parser: &mut Parser<'_, '_>) {
    let _ = parser.parse_nested_block(|p| {
        while !p.is_exhausted() {
            let _ = p.next();
        }
        Ok::<_, CssParseError<'_, ()>>(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CollectingErrorHandler, FailFast};
    use crate::selector::ConditionType;

    fn parse(css: &str) -> StyleSheet {
        parse_css(css)
    }

    fn selector(text: &str) -> String {
        CssParser::new()
            .parse_selectors(&InputSource::new(text), &mut FailFast)
            .unwrap()
            .to_string()
    }

    #[test]
    fn parse_simple_rule() {
        let sheet = parse("p { color: red; }");
        assert_eq!(sheet.css_rules().len(), 1);
        let rule = sheet.css_rules().item(0).unwrap().as_style().unwrap();
        assert_eq!(rule.selector_text(), "p");
        assert_eq!(rule.style.property_value("color"), Some("red"));
    }

    #[test]
    fn parse_multiple_rules() {
        let sheet = parse(
            r#"
            h1 { color: red; }
            h2 { color: blue; }
        "#,
        );
        assert_eq!(sheet.css_rules().len(), 2);
    }

    #[test]
    fn parse_class_and_attribute_conditions() {
        let list = CssParser::new()
            .parse_selectors(&InputSource::new("a.external[href$=\".pdf\"]"), &mut FailFast)
            .unwrap();
        let part = list.selectors[0].subject().unwrap();
        assert_eq!(part.element.as_deref(), Some("a"));
        let condition = part.condition.as_ref().unwrap();
        assert_eq!(condition.condition_type(), ConditionType::And);
        assert_eq!(condition.to_string(), ".external[href$=\".pdf\"]");

        let list = CssParser::new()
            .parse_selectors(&InputSource::new("\n  .x"), &mut FailFast)
            .unwrap();
        let condition = list.selectors[0].subject().unwrap().condition.as_ref().unwrap();
        assert_eq!(condition.locator().map(|l| l.line), Some(2));
    }

    #[test]
    fn selector_canonical_text() {
        assert_eq!(selector("ul>li"), "ul > li");
        assert_eq!(selector("div   p"), "div p");
        assert_eq!(selector("h1 + p ~ span"), "h1 + p ~ span");
        assert_eq!(selector("*"), "*");
        assert_eq!(selector(".note"), ".note");
        assert_eq!(selector("#main.wide"), "#main.wide");
        assert_eq!(selector("[title]"), "[title]");
        assert_eq!(selector("[lang|=en]"), "[lang|=\"en\"]");
        assert_eq!(selector("[rel~='next']"), "[rel~=\"next\"]");
        assert_eq!(selector("a:hover"), "a:hover");
        assert_eq!(selector("p:lang(fr)"), "p:lang(fr)");
        assert_eq!(selector("li:nth-child(2n+1)"), "li:nth-child(2n+1)");
        assert_eq!(selector("p::first-line"), "p::first-line");
        assert_eq!(selector("p:before"), "p::before");
        assert_eq!(selector("h1, h2"), "h1, h2");
    }

    #[test]
    fn escaped_selectors_round_trip() {
        for text in [r#"[title='a"b']"#, r".a\:b", r"#\31 st", r"my\:el.x[data\.y=z]"] {
            let parsed = CssParser::new()
                .parse_selectors(&InputSource::new(text), &mut FailFast)
                .unwrap();
            let rendered = parsed.to_string();
            let reparsed = CssParser::new()
                .parse_selectors(&InputSource::new(rendered.as_str()), &mut FailFast)
                .unwrap();
            assert_eq!(reparsed, parsed, "{} rendered as {}", text, rendered);
        }

        assert_eq!(selector(r#"[title='a"b']"#), r#"[title="a\"b"]"#);
        let list = CssParser::new()
            .parse_selectors(&InputSource::new(r".a\:b"), &mut FailFast)
            .unwrap();
        let condition = list.selectors[0].subject().unwrap().condition.as_ref().unwrap();
        assert_eq!(condition.condition_type(), ConditionType::Class);
        assert_eq!(condition.value(), Some("a:b"));
    }

    #[test]
    fn invalid_selectors_fail_fast() {
        for text in ["", "> p", "p >", "p..a", "#1", "p::after.x", "[=x]", "a b["] {
            let result = CssParser::new().parse_selectors(&InputSource::new(text), &mut FailFast);
            assert!(result.is_err(), "expected '{}' to be rejected", text);
        }
    }

    #[test]
    fn important_and_custom_properties() {
        let sheet = parse("p { COLOR: red !important; --Accent: #fff; margin: 0 auto }");
        let style = &sheet.css_rules().item(0).unwrap().as_style().unwrap().style;
        assert_eq!(style.property_value("color"), Some("red"));
        assert_eq!(style.property_priority("color"), Some("important"));
        assert_eq!(style.property_value("--Accent"), Some("#fff"));
        assert_eq!(style.property_value("margin"), Some("0 auto"));
        assert_eq!(style.to_string(), "color: red !important; --Accent: #fff; margin: 0 auto");
    }

    #[test]
    fn function_values_are_kept_whole() {
        let sheet = parse("p { background: url(a.png) no-repeat; color: rgb(1, 2, 3) }");
        let style = &sheet.css_rules().item(0).unwrap().as_style().unwrap().style;
        assert_eq!(style.property_value("background"), Some("url(a.png) no-repeat"));
        assert_eq!(style.property_value("color"), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn bad_declaration_is_skipped() {
        let mut handler = CollectingErrorHandler::new();
        let sheet = CssParser::new()
            .parse_style_sheet(
                &InputSource::new("p { color red; margin: 0; : x; }"),
                None,
                None,
                &mut handler,
            )
            .unwrap();
        let style = &sheet.css_rules().item(0).unwrap().as_style().unwrap().style;
        assert_eq!(style.len(), 1);
        assert_eq!(style.property_value("margin"), Some("0"));
        assert_eq!(handler.errors.len(), 2);
    }

    #[test]
    fn bad_rule_is_skipped() {
        let mut handler = CollectingErrorHandler::new();
        let sheet = CssParser::new()
            .parse_style_sheet(
                &InputSource::new("p..x { color: red } h1 { color: blue }"),
                None,
                None,
                &mut handler,
            )
            .unwrap();
        assert_eq!(sheet.css_rules().len(), 1);
        assert_eq!(sheet.css_rules().item(0).unwrap().to_string(), "h1 { color: blue }");
        assert_eq!(handler.errors.len(), 1);
        assert!(handler.errors[0].locator.is_some());
    }

    #[test]
    fn fail_fast_aborts_on_nested_error() {
        let result = CssParser::new().parse_style_sheet(
            &InputSource::new("@media print { p { color } }"),
            None,
            None,
            &mut FailFast,
        );
        assert!(result.is_err());
    }

    #[test]
    fn at_rules() {
        let sheet = parse(
            r#"@charset "UTF-8";
            @import url("base.css") screen, print;
            @import 'extra.css';
            @font-face { font-family: Foo; src: url(foo.woff) }
            @page :first { margin: 1in }
            @media screen and (max-width: 600px) { p { color: red } }
            @keyframes spin { from { opacity: 0 } }
            "#,
        );
        let rules = sheet.css_rules();
        let types: Vec<_> = rules.iter().map(CssRule::rule_type).collect();
        assert_eq!(
            types,
            [
                RuleType::Charset,
                RuleType::Import,
                RuleType::Import,
                RuleType::FontFace,
                RuleType::Page,
                RuleType::Media,
                RuleType::Unknown,
            ]
        );
        assert_eq!(rules.item(0).unwrap().to_string(), "@charset \"UTF-8\";");
        assert_eq!(rules.item(1).unwrap().to_string(), "@import url(base.css) screen, print;");
        assert_eq!(rules.item(2).unwrap().to_string(), "@import url(extra.css);");
        assert_eq!(
            rules.item(3).unwrap().to_string(),
            "@font-face { font-family: Foo; src: url(foo.woff) }"
        );
        assert_eq!(rules.item(4).unwrap().to_string(), "@page :first { margin: 1in }");
        let media = rules.item(5).unwrap().as_media().unwrap();
        assert_eq!(media.media.item(0), Some("screen and (max-width: 600px)"));
        assert_eq!(media.css_rules().len(), 1);
        assert_eq!(
            rules.item(6).unwrap().to_string(),
            "@keyframes spin { from { opacity: 0 } }"
        );
    }

    #[test]
    fn unknown_at_rule_is_a_warning() {
        let mut handler = CollectingErrorHandler::new();
        let sheet = CssParser::new()
            .parse_style_sheet(
                &InputSource::new("@namespace svg url(http://www.w3.org/2000/svg);"),
                None,
                None,
                &mut handler,
            )
            .unwrap();
        assert_eq!(sheet.css_rules().len(), 1);
        assert!(handler.errors.is_empty());
        assert_eq!(handler.warnings.len(), 1);
        assert_eq!(
            sheet.css_rules().item(0).unwrap().to_string(),
            "@namespace svg url(http://www.w3.org/2000/svg);"
        );
    }

    #[test]
    fn misplaced_charset_and_import_are_dropped() {
        let mut handler = CollectingErrorHandler::new();
        let sheet = CssParser::new()
            .parse_style_sheet(
                &InputSource::new("p { } @charset \"UTF-8\"; @import url(a.css);"),
                None,
                None,
                &mut handler,
            )
            .unwrap();
        assert_eq!(sheet.css_rules().len(), 1);
        assert_eq!(handler.errors.len(), 2);
    }

    #[test]
    fn nested_rules_point_at_sheet_and_group() {
        let sheet = parse("@media print { p { color: red } }");
        let media_rule = sheet.css_rules().item(0).unwrap();
        let nested = media_rule.as_media().unwrap().css_rules().item(0).unwrap();
        assert_eq!(media_rule.parent_style_sheet(), Some(sheet.id()));
        assert_eq!(nested.parent_style_sheet(), Some(sheet.id()));
        assert_eq!(nested.parent_rule(), Some(media_rule.id()));
    }

    #[test]
    fn parse_rule_rejects_trailing_content() {
        let parser = CssParser::new();
        assert!(parser.parse_rule(&InputSource::new("p { } q { }"), &mut FailFast).is_err());
        assert!(parser.parse_rule(&InputSource::new("   "), &mut FailFast).is_err());
        let rule = parser
            .parse_rule(&InputSource::new(" @import url(a.css) print "), &mut FailFast)
            .unwrap()
            .unwrap();
        assert_eq!(rule.to_string(), "@import url(a.css) print;");
    }

    #[test]
    fn parse_media_list() {
        let media = CssParser::new()
            .parse_media(&InputSource::new(" screen ,  print and (color)"), &mut FailFast)
            .unwrap();
        assert_eq!(media, MediaList::from_media(["screen", "print and (color)"]));

        assert!(
            CssParser::new()
                .parse_media(&InputSource::new("screen,,print"), &mut FailFast)
                .is_err()
        );
    }

    #[test]
    fn parse_style_declaration() {
        let style = CssParser::new()
            .parse_style_declaration(&InputSource::new("color: red; font-weight: bold"), &mut FailFast)
            .unwrap();
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn cdo_cdc_ignored_at_top_level() {
        let sheet = parse("<!-- p { color: red } -->");
        assert_eq!(sheet.css_rules().len(), 1);
    }

    #[test]
    fn href_and_base_uri_come_from_source() {
        let source = InputSource::new("p { }").with_uri("http://example.com/css/site.css");
        let sheet = CssParser::new()
            .parse_style_sheet(&source, None, None, &mut FailFast)
            .unwrap();
        assert_eq!(sheet.href(), Some("http://example.com/css/site.css"));
        assert_eq!(sheet.base_uri(), Some("http://example.com/css/site.css"));
    }
}
