//! Utility functions and helpers.

pub mod http;
pub mod report;
pub mod url;

use scraper::ElementRef;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Elements whose content is never rendered as text.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of rendered text.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Visible text of an element, as a browser would render it on one line.
///
/// Inline markup (`<b>`, `<sup>`, `<span>`, ...) is joined without a gap;
/// block elements and `<br>` separate their text with a space. Text inside
/// `script`, `style`, `noscript` and `template` is skipped.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    normalize_whitespace(&out)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if HIDDEN.contains(&name) {
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block {
                out.push(' ');
            }
            push_text(el, out);
            if block {
                out.push(' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Very \n\t Flat "), "Very Flat");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_element_text_separates_nodes() {
        let html = Html::parse_document(
            "<table><tr><td>2019<br>5,432 <b>Finishers</b></td></tr></table>",
        );
        let sel = Selector::parse("td").unwrap();
        let td = html.select(&sel).next().unwrap();
        assert_eq!(element_text(td), "2019 5,432 Finishers");
    }

    #[test]
    fn test_element_text_skips_scripts() {
        let html = Html::parse_document(
            "<body><p>Course</p><script>var gain = 99;</script><style>p{}</style><p>map</p></body>",
        );
        let sel = Selector::parse("body").unwrap();
        let body = html.select(&sel).next().unwrap();
        assert_eq!(element_text(body), "Course map");
    }

    #[test]
    fn test_element_text_joins_inline_markup() {
        let html = Html::parse_document(
            "<table><tr><td><h3>Rock<sup>®</sup> <i>n</i> Roll</h3><p><b>5,</b>432 Finishers</p></td></tr></table>",
        );
        let sel = Selector::parse("td").unwrap();
        let td = html.select(&sel).next().unwrap();
        assert_eq!(element_text(td), "Rock® n Roll 5,432 Finishers");
    }
}
