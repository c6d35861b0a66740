//! The browser binding for the category modal: a [`Dom`] over
//! [`web_sys::Document`] and the listener wiring that feeds clicks into a
//! [`ModalController`]. The category table is read from the data island the
//! build step embeds in the page (see [`crate::feed::data_island`]).

use crate::category::CategoryTable;
use crate::dom::{self, Dom, ModalIds};
use crate::feed::DATA_ISLAND_ID;
use crate::modal::{ModalController, ModalEvent};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement};

/// A [`Dom`] backed by the page's document.
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> WebDom {
        WebDom { document }
    }

    fn element(&self, id: &str) -> dom::Result<Element> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| dom::Error::MissingElement(id.to_owned()))
    }
}

impl Dom for WebDom {
    fn contains(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_text(&mut self, id: &str, text: &str) -> dom::Result<()> {
        let element = self.element(id)?;
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.set_inner_text(text),
            None => element.set_text_content(Some(text)),
        }
        Ok(())
    }

    fn set_html(&mut self, id: &str, html: &str) -> dom::Result<()> {
        self.element(id)?.set_inner_html(html);
        Ok(())
    }

    fn set_class(&mut self, id: &str, class: &str, present: bool) -> dom::Result<()> {
        let classes = self.element(id)?.class_list();
        match present {
            true => classes.add_1(class),
            false => classes.remove_1(class),
        }
        .map_err(|err| dom::Error::Host(format!("{:?}", err)))
    }
}

/// Entry point run when the module is instantiated. Attaches the modal with
/// the default element ids once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document to attach the category modal to"))?;

    if document.ready_state() != "loading" {
        return attach(&document, ModalIds::default(), DATA_ISLAND_ID);
    }

    let ready = document.clone();
    let on_ready = Closure::once(move || {
        if let Err(err) = attach(&ready, ModalIds::default(), DATA_ISLAND_ID) {
            web_sys::console::error_1(&err);
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();
    Ok(())
}

/// Reads the category table from the data island `data_id`, attaches a
/// controller to the modal described by `ids`, and listens for clicks on
/// category labels and on the scrim. Fails if the data island or any modal
/// element is missing, or if the data doesn't parse.
pub fn attach(document: &Document, ids: ModalIds, data_id: &str) -> Result<(), JsValue> {
    let data = document
        .get_element_by_id(data_id)
        .and_then(|island| island.text_content())
        .ok_or_else(|| to_js(format!("missing category data `#{}`", data_id)))?;
    let table: CategoryTable = serde_json::from_str(&data).map_err(to_js)?;

    let scrim = document
        .get_element_by_id(&ids.scrim)
        .ok_or_else(|| to_js(dom::Error::MissingElement(ids.scrim.clone())))?;
    let labels = document.query_selector_all(&format!(".{}", ids.label_class))?;

    let controller = ModalController::attach(table, ids, WebDom::new(document.clone()))
        .map_err(to_js)?;
    let controller = Rc::new(RefCell::new(controller));

    let on_label = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let label = event
                .current_target()
                .and_then(|target| target.dyn_into::<HtmlElement>().ok())
                .map(|element| element.inner_text())
                .unwrap_or_default();
            controller
                .borrow_mut()
                .handle(ModalEvent::CategoryClick(label));
        }) as Box<dyn FnMut(Event)>)
    };
    for i in 0..labels.length() {
        if let Some(label) = labels.item(i) {
            label.add_event_listener_with_callback("click", on_label.as_ref().unchecked_ref())?;
        }
    }
    on_label.forget();

    // Clicks inside the panel bubble up to the scrim when the panel is nested
    // in it; only a click on the scrim itself dismisses.
    let on_scrim = Closure::wrap(Box::new(move |event: Event| {
        let on_scrim = match (event.target(), event.current_target()) {
            (Some(target), Some(current)) => JsValue::from(target) == JsValue::from(current),
            _ => false,
        };
        controller.borrow_mut().handle(match on_scrim {
            true => ModalEvent::ScrimClick,
            false => ModalEvent::PanelClick,
        });
    }) as Box<dyn FnMut(Event)>);
    scrim.add_event_listener_with_callback("click", on_scrim.as_ref().unchecked_ref())?;
    on_scrim.forget();

    Ok(())
}

fn to_js<E: Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
