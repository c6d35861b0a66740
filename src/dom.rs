//! Defines the [`Dom`] trait, the narrow slice of a document the modal
//! controller reads and writes, plus [`ModalIds`] (the element identifiers the
//! controller addresses) and [`Document`], an in-memory [`Dom`] used for
//! headless rendering and tests.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The identifiers of the elements making up the category modal.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalIds {
    /// The element whose text is set to the clicked category label.
    pub title: String,

    /// The container receiving the rendered post list.
    pub content: String,

    /// The modal panel itself.
    pub panel: String,

    /// The dimmed background behind the panel. Clicking it closes the modal.
    pub scrim: String,

    /// The class marking clickable category labels.
    pub label_class: String,

    /// The class that makes the panel and scrim visible.
    pub open_class: String,
}

impl Default for ModalIds {
    fn default() -> Self {
        ModalIds {
            title: "category-modal-title".to_owned(),
            content: "category-modal-content".to_owned(),
            panel: "category-modal".to_owned(),
            scrim: "category-modal-bg".to_owned(),
            label_class: "category".to_owned(),
            open_class: "open".to_owned(),
        }
    }
}

impl ModalIds {
    /// The ids of every element the controller writes to.
    pub fn elements(&self) -> [&str; 4] {
        [
            self.title.as_str(),
            self.content.as_str(),
            self.panel.as_str(),
            self.scrim.as_str(),
        ]
    }
}

/// The document operations the modal controller needs. Writes against a
/// missing element fail with [`Error::MissingElement`].
pub trait Dom {
    /// Reports whether an element with `id` exists.
    fn contains(&self, id: &str) -> bool;

    /// Replaces the text content of the element.
    fn set_text(&mut self, id: &str, text: &str) -> Result<()>;

    /// Replaces the inner markup of the element.
    fn set_html(&mut self, id: &str, html: &str) -> Result<()>;

    /// Adds `class` to the element when `present` is true and removes it
    /// otherwise. This sets the class and never toggles it.
    fn set_class(&mut self, id: &str, class: &str, present: bool) -> Result<()>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Element {
    text: String,
    html: String,
    classes: BTreeSet<String>,
}

/// An in-memory [`Dom`]: a set of elements keyed by id, each with text
/// content, inner markup, and a class list. Setting an element's text clears
/// its markup and vice versa, as a browser would.
#[derive(Clone, Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Creates a document containing empty elements for each of the modal's
    /// ids.
    pub fn with_modal(ids: &ModalIds) -> Document {
        let mut document = Document::new();
        for id in ids.elements().iter() {
            document.insert(id);
        }
        document
    }

    /// Adds an empty element, replacing any element with the same id.
    pub fn insert(&mut self, id: &str) {
        self.elements.insert(id.to_owned(), Element::default());
    }

    /// Removes an element, returning whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.elements.remove(id).is_some()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.html.as_str())
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .map_or(false, |e| e.classes.contains(class))
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| Error::MissingElement(id.to_owned()))
    }
}

impl Dom for Document {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        element.text = text.to_owned();
        element.html.clear();
        Ok(())
    }

    fn set_html(&mut self, id: &str, html: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        element.html = html.to_owned();
        element.text.clear();
        Ok(())
    }

    fn set_class(&mut self, id: &str, class: &str, present: bool) -> Result<()> {
        let element = self.element_mut(id)?;
        if present {
            element.classes.insert(class.to_owned());
        } else {
            element.classes.remove(class);
        }
        Ok(())
    }
}

/// The result of a fallible document operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a document operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when an element the modal depends on is absent. Holds the
    /// element's id.
    MissingElement(String),

    /// Returned by a host document for any other failure. Holds the host's
    /// description of the problem.
    Host(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingElement(id) => write!(f, "Missing modal element `#{}`", id),
            Error::Host(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {}
