//! The category modal controller. [`ModalController`] owns the injected
//! [`CategoryTable`] and an explicit [`ModalState`], and turns
//! [`ModalEvent`]s into writes against a [`Dom`].
//!
//! Visibility is always *set* from the state the controller is moving to, so
//! repeated or out-of-order events (two rapid clicks on a label, a stray
//! scrim click while closed) can't leave the panel and scrim out of sync.

use crate::category::CategoryTable;
use crate::dom::{Dom, Error, ModalIds, Result};
use crate::render::render_category;
use tracing::{debug, error};

/// Whether the modal is showing, and if so for which label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open {
        /// The raw text of the label that opened the modal.
        title: String,
    },
}

impl Default for ModalState {
    fn default() -> Self {
        ModalState::Closed
    }
}

/// The user interactions the controller responds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalEvent {
    /// A category label was clicked. Holds the label's text.
    CategoryClick(String),

    /// The scrim behind the panel was clicked.
    ScrimClick,

    /// The panel itself was clicked. Ignored.
    PanelClick,

    /// A key was pressed. Ignored, including `Escape`; only the scrim
    /// dismisses the modal.
    KeyDown(String),
}

/// Populates and shows the category modal.
pub struct ModalController<D> {
    table: CategoryTable,
    ids: ModalIds,
    dom: D,
    state: ModalState,

    /// Set once a failed document write has been reported, so a broken page
    /// logs a single diagnostic rather than one per click.
    reported: bool,
}

impl<D: Dom> ModalController<D> {
    /// Creates a controller over `dom`, failing with
    /// [`Error::MissingElement`] if any of the modal's elements is absent.
    /// The modal starts out closed, and the document is made to match.
    pub fn attach(table: CategoryTable, ids: ModalIds, dom: D) -> Result<ModalController<D>> {
        let mut controller = ModalController {
            table,
            ids,
            dom,
            state: ModalState::Closed,
            reported: false,
        };
        controller.check_elements()?;
        controller.apply_closed()?;
        debug!(
            categories = controller.table.len(),
            "attached category modal"
        );
        Ok(controller)
    }

    /// Dispatches a single event.
    pub fn handle(&mut self, event: ModalEvent) {
        match event {
            ModalEvent::CategoryClick(label) => self.open(&label),
            ModalEvent::ScrimClick => self.close(),
            ModalEvent::PanelClick | ModalEvent::KeyDown(_) => {}
        }
    }

    /// Shows the posts for `label`. The title is set to the label's raw text
    /// and the content to the rendered list, or to the empty state if the
    /// label isn't in the table. Opening while already open repopulates the
    /// modal in place.
    ///
    /// If the modal's elements have gone missing, nothing is shown: whatever
    /// remains is cleared and hidden and the modal is `Closed`.
    pub fn open(&mut self, label: &str) {
        if self.table.get(label).is_none() {
            debug!(label, "no posts for category");
        }
        let html = render_category(&self.table, label);
        let applied = self
            .check_elements()
            .and_then(|()| self.apply_open(label, &html));
        match applied {
            Ok(()) => {
                self.state = ModalState::Open {
                    title: label.to_owned(),
                }
            }
            Err(err) => self.fail(err),
        }
    }

    /// Clears and hides the modal. Closing an already-closed modal clears and
    /// hides it again.
    pub fn close(&mut self) {
        match self.apply_closed() {
            Ok(()) => self.state = ModalState::Closed,
            Err(err) => self.fail(err),
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn ids(&self) -> &ModalIds {
        &self.ids
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    fn check_elements(&self) -> Result<()> {
        match self.ids.elements().iter().find(|id| !self.dom.contains(id)) {
            Some(id) => Err(Error::MissingElement(id.to_string())),
            None => Ok(()),
        }
    }

    fn apply_open(&mut self, title: &str, html: &str) -> Result<()> {
        self.dom.set_text(&self.ids.title, title)?;
        self.dom.set_html(&self.ids.content, html)?;
        self.set_visible(true)
    }

    fn apply_closed(&mut self) -> Result<()> {
        self.dom.set_text(&self.ids.title, "")?;
        self.dom.set_html(&self.ids.content, "")?;
        self.set_visible(false)
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.dom
            .set_class(&self.ids.scrim, &self.ids.open_class, visible)?;
        self.dom
            .set_class(&self.ids.panel, &self.ids.open_class, visible)
    }

    /// Clears and hides every modal element that is still present, then
    /// reports `err`. The modal ends up `Closed` either way.
    fn fail(&mut self, err: Error) {
        let ids = &self.ids;
        let _ = self.dom.set_text(&ids.title, "");
        let _ = self.dom.set_html(&ids.content, "");
        let _ = self.dom.set_class(&ids.scrim, &ids.open_class, false);
        let _ = self.dom.set_class(&ids.panel, &ids.open_class, false);
        self.state = ModalState::Closed;
        self.report(err);
    }

    fn report(&mut self, err: Error) {
        if !self.reported {
            self.reported = true;
            error!(error = %err, "category modal is misconfigured for this page");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::category::PostSummary;
    use crate::dom::Document;
    use crate::render::EMPTY_STATE;

    fn post(url: &str, date: &str, title: &str) -> PostSummary {
        PostSummary {
            url: url.to_owned(),
            date: date.to_owned(),
            title: title.to_owned(),
        }
    }

    fn table() -> CategoryTable {
        let mut table = CategoryTable::new();
        table.push("jekyll", post("/posts/a/", "04 Feb 2022", "Post A"));
        table.push("azure devops", post("/posts/a/", "04 Feb 2022", "Post A"));
        table.push("azure devops", post("/posts/b/", "28 Jan 2022", "Post B"));
        table
    }

    fn controller() -> Result<ModalController<Document>> {
        let ids = ModalIds::default();
        let document = Document::with_modal(&ids);
        ModalController::attach(table(), ids, document)
    }

    fn visible(controller: &ModalController<Document>) -> (bool, bool) {
        let ids = controller.ids();
        (
            controller.dom().has_class(&ids.scrim, &ids.open_class),
            controller.dom().has_class(&ids.panel, &ids.open_class),
        )
    }

    fn content(controller: &ModalController<Document>) -> String {
        controller
            .dom()
            .html(&controller.ids().content)
            .unwrap_or_default()
            .to_owned()
    }

    fn title(controller: &ModalController<Document>) -> String {
        controller
            .dom()
            .text(&controller.ids().title)
            .unwrap_or_default()
            .to_owned()
    }

    #[test]
    fn test_starts_closed() -> Result<()> {
        let controller = controller()?;
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));
        Ok(())
    }

    #[test]
    fn test_open_renders_posts() -> Result<()> {
        let mut controller = controller()?;
        controller.open("jekyll");

        assert_eq!(
            &ModalState::Open {
                title: "jekyll".to_owned()
            },
            controller.state()
        );
        assert_eq!((true, true), visible(&controller));
        assert_eq!("jekyll", title(&controller));

        let html = content(&controller);
        assert_eq!(1, html.matches("<a class=\"modal-article\"").count());
        assert!(html.contains("href=\"/posts/a/\""));
        assert!(html.contains("<h4>Post A</h4>"));
        assert!(html.contains("<small class=\"modal-article-date\">04 Feb 2022</small>"));
        Ok(())
    }

    #[test]
    fn test_open_renders_every_post_in_order() -> Result<()> {
        let mut controller = controller()?;
        controller.open("azure devops");
        let html = content(&controller);
        assert_eq!(2, html.matches("<a class=\"modal-article\"").count());
        assert!(html.find("/posts/a/").unwrap() < html.find("/posts/b/").unwrap());
        Ok(())
    }

    #[test]
    fn test_underscore_label_reaches_spaced_key() -> Result<()> {
        let mut controller = controller()?;
        controller.open("azure_devops");
        assert_eq!("azure_devops", title(&controller));
        assert!(content(&controller).contains("Post B"));
        Ok(())
    }

    #[test]
    fn test_unknown_category_renders_empty_state() -> Result<()> {
        let mut controller = controller()?;
        controller.open("unknown-category");
        assert!(controller.is_open());
        assert_eq!(EMPTY_STATE, content(&controller));
        assert_eq!("unknown-category", title(&controller));
        Ok(())
    }

    #[test]
    fn test_open_is_idempotent() -> Result<()> {
        let mut controller = controller()?;
        controller.open("jekyll");
        controller.open("jekyll");
        assert!(controller.is_open());
        assert_eq!((true, true), visible(&controller));
        Ok(())
    }

    #[test]
    fn test_open_while_open_repopulates() -> Result<()> {
        let mut controller = controller()?;
        controller.open("jekyll");
        controller.open("azure devops");
        assert_eq!("azure devops", title(&controller));
        assert!(content(&controller).contains("Post B"));
        assert_eq!((true, true), visible(&controller));
        Ok(())
    }

    #[test]
    fn test_close_is_idempotent() -> Result<()> {
        let mut controller = controller()?;
        controller.close();
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));

        controller.open("jekyll");
        controller.close();
        controller.close();
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));
        assert_eq!("", title(&controller));
        assert_eq!("", content(&controller));
        Ok(())
    }

    #[test]
    fn test_reopen_renders_identically() -> Result<()> {
        let mut controller = controller()?;
        controller.open("jekyll");
        let first = (title(&controller), content(&controller));
        controller.close();
        controller.open("jekyll");
        assert_eq!(first, (title(&controller), content(&controller)));
        Ok(())
    }

    #[test]
    fn test_only_scrim_dismisses() -> Result<()> {
        let mut controller = controller()?;
        controller.handle(ModalEvent::CategoryClick("jekyll".to_owned()));
        controller.handle(ModalEvent::PanelClick);
        controller.handle(ModalEvent::KeyDown("Escape".to_owned()));
        assert!(controller.is_open());
        controller.handle(ModalEvent::ScrimClick);
        assert!(!controller.is_open());
        Ok(())
    }

    #[test]
    fn test_attach_fails_on_missing_element() {
        let ids = ModalIds::default();
        let mut document = Document::with_modal(&ids);
        document.remove(&ids.content);
        match ModalController::attach(table(), ids.clone(), document) {
            Err(Error::MissingElement(id)) => assert_eq!(ids.content, id),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("attach should fail without a content element"),
        }
    }

    #[test]
    fn test_missing_element_after_attach_does_not_panic() -> Result<()> {
        let mut controller = controller()?;
        let scrim = controller.ids().scrim.clone();
        controller.dom_mut().remove(&scrim);
        controller.open("jekyll");
        controller.open("jekyll");
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));
        assert_eq!("", title(&controller));
        assert_eq!("", content(&controller));
        Ok(())
    }

    #[test]
    fn test_missing_panel_leaves_nothing_visible() -> Result<()> {
        let mut controller = controller()?;
        let panel = controller.ids().panel.clone();
        controller.dom_mut().remove(&panel);

        controller.open("jekyll");
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));
        assert_eq!("", title(&controller));
        assert_eq!("", content(&controller));
        Ok(())
    }

    #[test]
    fn test_element_lost_while_open_hides_the_rest() -> Result<()> {
        let mut controller = controller()?;
        controller.open("jekyll");
        let panel = controller.ids().panel.clone();
        controller.dom_mut().remove(&panel);

        controller.open("azure devops");
        assert_eq!(&ModalState::Closed, controller.state());
        assert_eq!((false, false), visible(&controller));
        assert_eq!("", title(&controller));
        Ok(())
    }
}
