use std::ops::Range;

use regex::Regex;

/// The only tags a comment may contain
pub const ALLOWED_TAGS: [&str; 4] = ["a", "code", "i", "strong"];

lazy_static::lazy_static! {
    // Attributes of an opening tag are matched but ignored, only the name counts
    static ref TAG_RE: Regex =
        Regex::new(r"</?([a-z]+)(?:\s+[^>]*)?>").expect("tag regex is valid");
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MarkupError {
    #[error("tag <{0}> not allowed, use only a, code, i, strong")]
    DisallowedTag(String),

    #[error("tag </{0}> does not close any open tag")]
    UnexpectedClose(String),

    #[error("tag <{0}> unclosed")]
    Unclosed(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagKind {
    Open,
    Close,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkupToken<'a> {
    pub kind: TagKind,
    pub name: &'a str,

    /// Byte range of the whole tag in the scanned text
    pub span: Range<usize>,
}

/// Lists every tag-shaped span of `text`, left to right
pub fn tokenize(text: &str) -> impl Iterator<Item = MarkupToken<'_>> {
    TAG_RE.captures_iter(text).filter_map(|c| {
        let whole = c.get(0)?;
        let name = c.get(1)?.as_str();
        let kind = match whole.as_str().starts_with("</") {
            true => TagKind::Close,
            false => TagKind::Open,
        };
        Some(MarkupToken {
            kind,
            name,
            span: whole.range(),
        })
    })
}

/// Checks that `text` only uses allowed tags and that they are properly nested.
///
/// This is a balance check over `<tag ...>` / `</tag>` spans, not an HTML
/// parser: self-closing tags and upper-case names are not recognized as tags.
pub fn validate_markup(text: &str) -> Result<(), MarkupError> {
    let mut stack: Vec<&str> = Vec::new();
    for tok in tokenize(text) {
        if !ALLOWED_TAGS.contains(&tok.name) {
            return Err(MarkupError::DisallowedTag(tok.name.to_string()));
        }
        match tok.kind {
            TagKind::Open => stack.push(tok.name),
            TagKind::Close => match stack.last() {
                Some(top) if *top == tok.name => {
                    stack.pop();
                }
                _ => return Err(MarkupError::UnexpectedClose(tok.name.to_string())),
            },
        }
    }
    match stack.last() {
        Some(unclosed) => Err(MarkupError::Unclosed(unclosed.to_string())),
        None => Ok(()),
    }
}
