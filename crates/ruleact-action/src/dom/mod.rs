//! Element locator abstraction.
//!
//! The engine only needs "selector -> ordered element handles" plus a few
//! element capabilities (class list, listeners, value extraction).

pub mod memory;
pub mod selector;

use std::sync::Arc;

pub use memory::{ElementSpec, MemoryDocument, MemoryElement};
pub use selector::{SelectorError, SelectorList};

/// Callback registered for a DOM event.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// The element categories value extraction distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Input { input_type: String },
    Select,
    TextArea,
    Other,
}

pub trait Element: Send + Sync {
    fn kind(&self) -> ElementKind;
    /// Current form value, for inputs, selects and text areas.
    fn value(&self) -> Option<String>;
    fn text_content(&self) -> Option<String>;
    fn add_classes(&self, classes: &[String]);
    fn remove_classes(&self, classes: &[String]);
    fn add_event_listener(&self, event: &str, listener: Listener);
}

pub type ElementHandle = Arc<dyn Element>;

pub trait Document: Send + Sync {
    /// Every element matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementHandle>;

    /// The first element matching `selector`.
    fn query(&self, selector: &str) -> Option<ElementHandle> {
        self.query_all(selector).into_iter().next()
    }
}

/// Read the value an element exposes for capture.
///
/// Password inputs never expose a value. Other inputs, selects and text areas
/// expose their form value; anything else its text content.
pub fn element_value(element: &dyn Element) -> Option<String> {
    match element.kind() {
        ElementKind::Input { input_type } if input_type.eq_ignore_ascii_case("password") => None,
        ElementKind::Input { .. } | ElementKind::Select | ElementKind::TextArea => element.value(),
        ElementKind::Other => element.text_content(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_input_has_no_value() {
        let input = MemoryElement::new("input")
            .with_attribute("type", "password")
            .with_value("hunter2");
        assert_eq!(element_value(&input), None);

        let input = MemoryElement::new("input")
            .with_attribute("type", "PASSWORD")
            .with_value("hunter2");
        assert_eq!(element_value(&input), None);
    }

    #[test]
    fn test_form_fields_expose_value() {
        let input = MemoryElement::new("input").with_value("enterprise");
        assert_eq!(element_value(&input).as_deref(), Some("enterprise"));

        let number = MemoryElement::new("input")
            .with_attribute("type", "number")
            .with_value("42");
        assert_eq!(element_value(&number).as_deref(), Some("42"));

        let select = MemoryElement::new("select")
            .with_value("pro")
            .with_text("Pro plan");
        assert_eq!(element_value(&select).as_deref(), Some("pro"));

        let textarea = MemoryElement::new("textarea").with_value("hello");
        assert_eq!(element_value(&textarea).as_deref(), Some("hello"));
    }

    #[test]
    fn test_other_elements_expose_text() {
        let span = MemoryElement::new("span").with_text("Premium");
        assert_eq!(element_value(&span).as_deref(), Some("Premium"));

        let empty = MemoryElement::new("div");
        assert_eq!(element_value(&empty), None);
    }
}
