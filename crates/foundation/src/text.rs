/// ASCII word character (`[A-Za-z0-9_]`).
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Turns an attribute key such as `operating_income` into a display label
/// (`Operating Income`).
///
/// Underscores become spaces; every run that starts with a word character
/// and continues until whitespace gets an upper-case first letter and a
/// lower-cased tail.
pub fn title_case(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut chars = spaced.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_word_char(c) {
            out.push(c);
            continue;
        }
        out.extend(c.to_uppercase());
        while let Some(&next) = chars.peek() {
            if next.is_whitespace() {
                break;
            }
            out.extend(next.to_lowercase());
            chars.next();
        }
    }
    out
}

/// Overview text is stored with bare newlines; the bubble renders it as markup.
pub fn overview_to_html(text: &str) -> String {
    text.replace('\n', "<br />")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_attribute_keys() {
        assert_eq!(title_case("name"), "Name");
        assert_eq!(title_case("operating_income"), "Operating Income");
        assert_eq!(title_case("num_employees"), "Num Employees");
        assert_eq!(title_case("NET_INCOME"), "Net Income");
    }

    #[test]
    fn title_case_leaves_leading_punctuation() {
        assert_eq!(title_case("-x-ray"), "-X-ray");
    }

    #[test]
    fn overview_newlines_become_breaks() {
        assert_eq!(overview_to_html("a\nb\n"), "a<br />b<br />");
    }
}
