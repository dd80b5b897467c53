/// Live browser document backed by `web_sys`
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};

use crate::extract::{Document, Element};

pub struct WebDocument(web_sys::Document);

impl WebDocument {
    pub fn new(document: web_sys::Document) -> WebDocument {
        WebDocument(document)
    }

    /// The document of the current window, if there is one
    pub fn current() -> Option<WebDocument> {
        web_sys::window()?.document().map(WebDocument)
    }
}

impl Document for WebDocument {
    fn query(&self, selector: &str) -> Option<Box<dyn Element + '_>> {
        match self.0.query_selector(selector) {
            Ok(Some(found)) => {
                let element: Box<dyn Element + '_> = Box::new(WebElement(found));
                Some(element)
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("invalid selector {:?}: {:?}", selector, err);
                None
            }
        }
    }
}

struct WebElement(web_sys::Element);

impl Element for WebElement {
    fn text_content(&self) -> Option<String> {
        self.0.text_content()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn value(&self) -> Option<String> {
        if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            Some(textarea.value())
        } else if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else {
            self.0.get_attribute("value")
        }
    }

    fn first_child_text(&self) -> Option<String> {
        self.0.first_child()?.text_content()
    }
}
