//! The library code for `catmodal`, the category modal of a static blog. The
//! crate covers both ends of the feature:
//!
//! 1. At build time, post sources are parsed ([`crate::post`]) and turned into
//!    a [`category::CategoryTable`] that is written out as JSON or as an HTML
//!    data island ([`crate::feed`]).
//! 2. At view time, a [`modal::ModalController`] owns that table and turns
//!    clicks on category labels into a populated, visible modal, rendering
//!    its markup with [`crate::render`]. The controller talks to the page
//!    through the [`dom::Dom`] trait; [`dom::Document`] implements it in
//!    memory, and the `wasm` feature adds a browser implementation.
//!
//! Separately, [`crate::ads`] implements the `{% ads %}` template tag.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod ads;
pub mod category;
pub mod config;
pub mod dom;
pub mod feed;
pub mod modal;
pub mod post;
pub mod render;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod web;
