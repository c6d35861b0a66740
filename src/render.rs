//! Generates the markup placed in the modal's content container: one link per
//! [`PostSummary`], or an explicit empty state when a category has no posts
//! (or doesn't exist).

use crate::category::{CategoryTable, PostSummary};
use pulldown_cmark::escape::{escape_href, escape_html};

/// The markup rendered when a category has no posts to list.
pub const EMPTY_STATE: &str = r#"<p class="modal-empty">No posts in this category.</p>"#;

/// Renders one entry per post, in order. Each entry is a link to the post
/// holding its title in a heading and its date in a secondary line:
///
/// ```html
/// <a class="modal-article" href="/posts/a/">
///   <h4>Post A</h4>
///   <small class="modal-article-date">04 Feb 2022</small>
/// </a>
/// ```
///
/// An empty slice renders [`EMPTY_STATE`].
pub fn render_posts(posts: &[PostSummary]) -> String {
    if posts.is_empty() {
        return EMPTY_STATE.to_owned();
    }

    let mut html = String::new();
    for post in posts {
        // Writing into a `String` can't fail, so the `io::Result`s from the
        // escape functions are discarded.
        html.push_str(r#"<a class="modal-article" href=""#);
        let _ = escape_href(&mut html, &post.url);
        html.push_str("\">\n  <h4>");
        let _ = escape_html(&mut html, &post.title);
        html.push_str("</h4>\n  <small class=\"modal-article-date\">");
        let _ = escape_html(&mut html, &post.date);
        html.push_str("</small>\n</a>\n");
    }
    html
}

/// Looks `label` up in `table` and renders the result. Unknown labels render
/// [`EMPTY_STATE`].
pub fn render_category(table: &CategoryTable, label: &str) -> String {
    match table.get(label) {
        Some(posts) => render_posts(posts),
        None => EMPTY_STATE.to_owned(),
    }
}
