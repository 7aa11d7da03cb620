//! In-memory document.
//!
//! A flat, ordered list of elements with mutable class lists, form values and
//! event listeners. Used by tests and by the command line dispatcher.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::selector::{SelectorList, SelectorTarget};
use super::{Document, Element, ElementHandle, ElementKind, Listener};

#[derive(Default)]
struct ElementState {
    classes: Vec<String>,
    value: Option<String>,
    text: Option<String>,
    listeners: Vec<(String, Listener)>,
}

pub struct MemoryElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    state: Mutex<ElementState>,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            state: Mutex::new(ElementState::default()),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.state.lock().classes.push(class.into());
        self
    }

    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.state.lock().text = Some(text.into());
        self
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.state.lock().value = Some(value.into());
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.lock().classes.clone()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Fire `event` on this element. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &str) -> usize {
        let listeners: Vec<Listener> = self
            .state
            .lock()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }
}

impl SelectorTarget for MemoryElement {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            return Some(self.classes().join(" "));
        }
        self.attributes.get(name).cloned()
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.lock().classes.iter().any(|c| c == class)
    }
}

impl Element for MemoryElement {
    fn kind(&self) -> ElementKind {
        match self.tag.as_str() {
            "input" => ElementKind::Input {
                input_type: self
                    .attributes
                    .get("type")
                    .cloned()
                    .unwrap_or_else(|| "text".to_string()),
            },
            "select" => ElementKind::Select,
            "textarea" => ElementKind::TextArea,
            _ => ElementKind::Other,
        }
    }

    fn value(&self) -> Option<String> {
        match self.kind() {
            ElementKind::Other => None,
            _ => Some(self.state.lock().value.clone().unwrap_or_default()),
        }
    }

    fn text_content(&self) -> Option<String> {
        self.state.lock().text.clone()
    }

    fn add_classes(&self, classes: &[String]) {
        let mut state = self.state.lock();
        for class in classes {
            if !state.classes.contains(class) {
                state.classes.push(class.clone());
            }
        }
    }

    fn remove_classes(&self, classes: &[String]) {
        self.state.lock().classes.retain(|c| !classes.contains(c));
    }

    fn add_event_listener(&self, event: &str, listener: Listener) {
        self.state.lock().listeners.push((event.to_string(), listener));
    }
}

/// Serializable description of an element, for loading documents from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub value: Option<String>,
    pub text: Option<String>,
}

impl From<ElementSpec> for MemoryElement {
    fn from(spec: ElementSpec) -> Self {
        let mut element = MemoryElement::new(spec.tag);
        element.attributes = spec.attributes;
        if let Some(id) = spec.id {
            element = element.with_id(id);
        }
        {
            let mut state = element.state.lock();
            state.classes = spec.classes;
            state.value = spec.value;
            state.text = spec.text;
        }
        element
    }
}

#[derive(Default)]
pub struct MemoryDocument {
    elements: RwLock<Vec<Arc<MemoryElement>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<ElementSpec>) -> Self {
        let document = Self::new();
        for spec in specs {
            document.append(MemoryElement::from(spec));
        }
        document
    }

    /// Parse a JSON array of [`ElementSpec`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let specs: Vec<ElementSpec> = serde_json::from_str(json)?;
        Ok(Self::from_specs(specs))
    }

    pub fn with_element(self, element: MemoryElement) -> Self {
        self.append(element);
        self
    }

    /// Append an element and return a handle to it.
    pub fn append(&self, element: MemoryElement) -> Arc<MemoryElement> {
        let element = Arc::new(element);
        self.elements.write().push(Arc::clone(&element));
        element
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    /// Concrete handles of the elements matching `selector`.
    pub fn select(&self, selector: &str) -> Vec<Arc<MemoryElement>> {
        let list = match SelectorList::parse(selector) {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!(selector, error = %e, "Selector matches nothing");
                return Vec::new();
            }
        };
        self.elements
            .read()
            .iter()
            .filter(|e| list.matches(&***e))
            .cloned()
            .collect()
    }

    /// Fire `event` on every element matching `selector`. Returns the total
    /// number of listeners invoked.
    pub fn dispatch_event(&self, selector: &str, event: &str) -> usize {
        self.select(selector).iter().map(|e| e.dispatch(event)).sum()
    }
}

impl Document for MemoryDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementHandle> {
        self.select(selector)
            .into_iter()
            .map(|e| e as ElementHandle)
            .collect()
    }
}
