//! Defines [`PostSummary`] and [`CategoryTable`], the data the category modal
//! renders from, along with [`normalize`], the one rule used to match a
//! category label's text against the table's keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The minimal description of a post as it appears in a category listing.
/// All fields are display-ready strings; `date` in particular is already
/// formatted and is never parsed back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// The site-relative URL of the post, e.g. `/posts/a/`.
    pub url: String,

    /// The display-formatted publication date, e.g. `04 Feb 2022`.
    pub date: String,

    /// The post title.
    pub title: String,
}

/// Normalizes a category name. Underscores count as whitespace, runs of
/// whitespace collapse to a single space, and leading and trailing whitespace
/// is dropped. Case is preserved, so `Azure DevOps` and `azure devops` remain
/// distinct categories.
///
/// Both the table keys (on insertion) and clicked label text (on lookup) go
/// through this function, so `azure devops`, `azure_devops`, and
/// ` azure   devops ` all address the same entry.
pub fn normalize(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps normalized category names to the posts in that category, in build
/// order. Once built the table is only read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<PostSummary>>",
    into = "BTreeMap<String, Vec<PostSummary>>"
)]
pub struct CategoryTable {
    categories: BTreeMap<String, Vec<PostSummary>>,
}

impl CategoryTable {
    pub fn new() -> CategoryTable {
        CategoryTable::default()
    }

    /// Appends `post` to `category`. The name is normalized first, and a post
    /// whose URL is already listed under the category is skipped.
    pub fn push(&mut self, category: &str, post: PostSummary) {
        let posts = self.categories.entry(normalize(category)).or_default();
        if !posts.iter().any(|p| p.url == post.url) {
            posts.push(post);
        }
    }

    /// Appends each of `posts` to `category` in order. See [`CategoryTable::push`].
    pub fn extend<I>(&mut self, category: &str, posts: I)
    where
        I: IntoIterator<Item = PostSummary>,
    {
        for post in posts {
            self.push(category, post);
        }
    }

    /// Looks up the posts for a category label. The label text is normalized
    /// with [`normalize`] before the lookup.
    pub fn get(&self, label: &str) -> Option<&[PostSummary]> {
        self.categories.get(&normalize(label)).map(Vec::as_slice)
    }

    /// Iterates the categories in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PostSummary])> {
        self.categories
            .iter()
            .map(|(name, posts)| (name.as_str(), posts.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl From<BTreeMap<String, Vec<PostSummary>>> for CategoryTable {
    /// Builds a table from raw entries, normalizing every key. Entries whose
    /// keys collide after normalization are merged in map order.
    fn from(raw: BTreeMap<String, Vec<PostSummary>>) -> CategoryTable {
        let mut table = CategoryTable::new();
        for (name, posts) in raw {
            table.extend(&name, posts);
        }
        table
    }
}

impl From<CategoryTable> for BTreeMap<String, Vec<PostSummary>> {
    fn from(table: CategoryTable) -> BTreeMap<String, Vec<PostSummary>> {
        table.categories
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn summary(url: &str, title: &str) -> PostSummary {
        PostSummary {
            url: url.to_owned(),
            date: "04 Feb 2022".to_owned(),
            title: title.to_owned(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!("azure devops", normalize("azure devops"));
        assert_eq!("azure devops", normalize("azure_devops"));
        assert_eq!("azure devops", normalize("  azure \t  devops\n"));
        assert_eq!("azure devops", normalize("azure__ devops"));
        assert_eq!(".NET 8", normalize(".NET 8"));
        assert_eq!("C#", normalize("C#"));
        assert_eq!("", normalize(" _ "));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut table = CategoryTable::new();
        table.push("Jekyll", summary("/posts/a/", "A"));
        assert!(table.get("Jekyll").is_some());
        assert!(table.get("jekyll").is_none());
    }

    #[test]
    fn test_space_and_underscore_keys_are_equivalent() {
        let mut table = CategoryTable::new();
        table.push("azure_devops", summary("/posts/a/", "A"));
        table.push("integration testing", summary("/posts/b/", "B"));

        assert_eq!(Some(&[summary("/posts/a/", "A")][..]), table.get("azure devops"));
        assert_eq!(Some(&[summary("/posts/a/", "A")][..]), table.get("azure_devops"));
        assert_eq!(
            Some(&[summary("/posts/b/", "B")][..]),
            table.get("integration_testing")
        );
    }

    #[test]
    fn test_push_preserves_order_and_skips_duplicates() {
        let mut table = CategoryTable::new();
        table.push("jekyll", summary("/posts/b/", "B"));
        table.push("jekyll", summary("/posts/a/", "A"));
        table.push("jekyll", summary("/posts/b/", "B again"));

        let titles: Vec<&str> = table
            .get("jekyll")
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(vec!["B", "A"], titles);
    }

    #[test]
    fn test_deserialize_normalizes_and_merges_keys() -> serde_json::Result<()> {
        let table: CategoryTable = serde_json::from_str(
            r#"{
                "azure devops": [{"url": "/posts/a/", "date": "04 Feb 2022", "title": "A"}],
                "azure_devops": [
                    {"url": "/posts/a/", "date": "04 Feb 2022", "title": "A"},
                    {"url": "/posts/b/", "date": "28 Jan 2022", "title": "B"}
                ]
            }"#,
        )?;

        assert_eq!(1, table.len());
        let urls: Vec<&str> = table
            .get("azure devops")
            .unwrap()
            .iter()
            .map(|p| p.url.as_str())
            .collect();
        assert_eq!(vec!["/posts/a/", "/posts/b/"], urls);
        Ok(())
    }

    #[test]
    fn test_serialize_as_plain_object() -> serde_json::Result<()> {
        let mut table = CategoryTable::new();
        table.push("jekyll", summary("/posts/a/", "Post A"));
        let value = serde_json::to_value(&table)?;
        assert_eq!(
            serde_json::json!({
                "jekyll": [{"url": "/posts/a/", "date": "04 Feb 2022", "title": "Post A"}]
            }),
            value
        );
        Ok(())
    }
}
