/// Result of inserting a tag pair: the new text and where the caret goes.
///
/// Positions are counted in chars. The caller sets the caret once the new
/// text has been committed to the input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagInsertion {
    pub text: String,
    pub cursor: usize,
}

/// Wraps the selection `selection_start..selection_end` of `text` in
/// `<open_tag>` and `</close_tag>`.
///
/// With an empty selection an empty pair is inserted and the caret lands
/// between the tags, otherwise it lands after the closing tag. The result is
/// not validated. Out-of-range positions are clamped to the end of the text.
pub fn insert_tag(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    open_tag: &str,
    close_tag: &str,
) -> TagInsertion {
    let start = selection_start.min(selection_end);
    let end = selection_start.max(selection_end);
    let (before, rest) = text.split_at(byte_offset(text, start));
    let (selected, after) = rest.split_at(byte_offset(rest, end - start));
    let start = before.chars().count();

    let opening = format!("<{open_tag}>");
    let closing = format!("</{close_tag}>");
    let cursor = match selected.is_empty() {
        true => start + opening.chars().count(),
        false => {
            start + opening.chars().count() + selected.chars().count() + closing.chars().count()
        }
    };
    TagInsertion {
        text: format!("{before}{opening}{selected}{closing}{after}"),
        cursor,
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Formatting buttons shown above the comment text
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToolbarAction {
    Italic,
    Bold,
    Code,
    Link,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 4] = [
        ToolbarAction::Italic,
        ToolbarAction::Bold,
        ToolbarAction::Code,
        ToolbarAction::Link,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolbarAction::Italic => "Italic",
            ToolbarAction::Bold => "Bold",
            ToolbarAction::Code => "Code",
            ToolbarAction::Link => "Link",
        }
    }

    /// Opening tag contents and closing tag name
    pub fn tags(&self) -> (&'static str, &'static str) {
        match self {
            ToolbarAction::Italic => ("i", "i"),
            ToolbarAction::Bold => ("strong", "strong"),
            ToolbarAction::Code => ("code", "code"),
            ToolbarAction::Link => (r#"a href="" title="""#, "a"),
        }
    }

    pub fn apply(&self, text: &str, selection_start: usize, selection_end: usize) -> TagInsertion {
        let (open, close) = self.tags();
        insert_tag(text, selection_start, selection_end, open, close)
    }
}
