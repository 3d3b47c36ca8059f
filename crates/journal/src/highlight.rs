use crate::annotations::AnnotationSet;

pub const HIGHLIGHT_OPEN: &str = "<span class=\"highlight\">";
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// Wraps the first literal occurrence of `text` in a highlight span.
///
/// This is plain substring replacement over markup: it is not limited to
/// text nodes and can land inside a tag if the text appears there.
pub fn highlight_first(html: &str, text: &str) -> String {
    let wrapped = format!("{HIGHLIGHT_OPEN}{text}{HIGHLIGHT_CLOSE}");
    html.replacen(text, &wrapped, 1)
}

/// Applies every note's highlight, in note order, to overview markup.
pub fn apply_annotations(notes: Option<&AnnotationSet>, html: &str) -> String {
    let Some(notes) = notes else {
        return html.to_string();
    };
    notes
        .iter()
        .fold(html.to_string(), |acc, (highlight, _)| highlight_first(&acc, highlight))
}
