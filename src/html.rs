/// Static HTML documents backed by `scraper`
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::extract::{Document, Element};

/// A parsed HTML page. Used for fixtures and for extracting from saved pages.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> HtmlDocument {
        HtmlDocument {
            html: Html::parse_document(source),
        }
    }
}

impl Document for HtmlDocument {
    fn query(&self, selector: &str) -> Option<Box<dyn Element + '_>> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(err) => {
                log::warn!("invalid selector {:?}: {:?}", selector, err);
                return None;
            }
        };

        let first = self.html.select(&selector).next()?;
        let element: Box<dyn Element + '_> = Box::new(HtmlElement(first));
        Some(element)
    }
}

struct HtmlElement<'a>(ElementRef<'a>);

impl Element for HtmlElement<'_> {
    fn text_content(&self) -> Option<String> {
        Some(self.0.text().collect())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    // A static document has no live form state: textareas hold their value
    // as content, everything else in the `value` attribute.
    fn value(&self) -> Option<String> {
        if self.0.value().name() == "textarea" {
            self.text_content()
        } else {
            self.attribute("value")
        }
    }

    fn first_child_text(&self) -> Option<String> {
        let child = self.0.first_child()?;
        match child.value() {
            Node::Text(text) => Some(text.to_string()),
            Node::Comment(comment) => Some(comment.to_string()),
            Node::Element(_) => ElementRef::wrap(child).map(|el| el.text().collect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_first_match() {
        let doc = HtmlDocument::parse(r#"<p class="a">one</p><p class="a">two</p>"#);
        let element = doc.query("p.a").unwrap();

        assert_eq!(element.text_content(), Some("one".to_string()));
    }

    #[test]
    fn test_first_child_text_node() {
        let doc = HtmlDocument::parse(r#"<div id="row">#42<span>Bug</span></div>"#);
        let element = doc.query("#row").unwrap();

        assert_eq!(element.first_child_text(), Some("#42".to_string()));
        assert_eq!(element.text_content(), Some("#42Bug".to_string()));
    }

    #[test]
    fn test_first_child_comment() {
        let doc = HtmlDocument::parse(r#"<div id="row"><!-- 42 -->#42</div>"#);
        let element = doc.query("#row").unwrap();

        assert_eq!(element.first_child_text(), Some(" 42 ".to_string()));
    }

    #[test]
    fn test_first_child_missing() {
        let doc = HtmlDocument::parse(r#"<div id="row"></div>"#);
        let element = doc.query("#row").unwrap();

        assert_eq!(element.first_child_text(), None);
    }

    #[test]
    fn test_form_values() {
        let doc = HtmlDocument::parse(
            r#"<textarea id="t">Task name</textarea><input id="i" value="Project">"#,
        );

        assert_eq!(doc.query("#t").unwrap().value(), Some("Task name".to_string()));
        assert_eq!(doc.query("#i").unwrap().value(), Some("Project".to_string()));
    }

    #[test]
    fn test_invalid_selector() {
        let doc = HtmlDocument::parse("<p>text</p>");
        assert!(doc.query("p[").is_none());
    }
}
