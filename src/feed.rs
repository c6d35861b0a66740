//! The build-time data feed: turns parsed [`Post`]s into a [`CategoryTable`]
//! and writes it out, both as a JSON document and as an HTML data island that
//! a page can embed for the modal controller to read at load time.

use crate::category::{CategoryTable, PostSummary};
use crate::config::Config;
use crate::post::{Error as ParseError, Parser as PostParser, Post};
use chrono::format::{Item, StrftimeItems};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

impl CategoryTable {
    /// Builds a table from posts, which are expected in build order (most
    /// recent first). `date_format` is a [`chrono`] format string applied to
    /// each post's date to produce its display date; an unrecognized
    /// specifier fails with [`Error::DateFormat`].
    pub fn from_posts(posts: &[Post], date_format: &str) -> Result<CategoryTable> {
        check_date_format(date_format)?;
        let mut table = CategoryTable::new();
        for post in posts {
            let summary = PostSummary {
                url: post.url.clone(),
                date: post.date.format(date_format).to_string(),
                title: post.title.clone(),
            };
            for category in &post.categories {
                table.push(category, summary.clone());
            }
        }
        Ok(table)
    }
}

/// Checks that `date_format` is a valid [`chrono`] format string. Formatting a
/// date with an invalid one panics, so it's rejected up front.
pub fn check_date_format(date_format: &str) -> Result<()> {
    match StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        true => Err(Error::DateFormat(date_format.to_owned())),
        false => Ok(()),
    }
}

/// Writes the table as pretty-printed JSON.
pub fn write_json<W: Write>(table: &CategoryTable, w: W) -> Result<()> {
    serde_json::to_writer_pretty(w, table)?;
    Ok(())
}

/// Renders the table as a `<script type="application/json">` element with
/// the given id. Any `</` in the data is written as `<\/`, which is the same
/// JSON but can't terminate the element early.
pub fn data_island(table: &CategoryTable, element_id: &str) -> Result<String> {
    let json = serde_json::to_string(table)?.replace("</", "<\\/");
    Ok(format!(
        r#"<script type="application/json" id="{}">{}</script>"#,
        element_id, json
    ))
}

/// The default id of the data island element.
pub const DATA_ISLAND_ID: &str = "category-data";

/// Parses the project's posts, builds the category table, and writes the
/// JSON document to `config.output` (and the data island to `config.island`
/// when one is configured). Returns the table.
pub fn build_feed(config: &Config) -> Result<CategoryTable> {
    let parser = PostParser::new(&config.posts_url);
    let posts = parser.parse_posts(&config.posts_directory)?;
    let table = CategoryTable::from_posts(&posts, &config.date_format)?;
    info!(
        posts = posts.len(),
        categories = table.len(),
        "built category table"
    );

    write_json(&table, create(&config.output)?)?;
    info!(path = %config.output.display(), "wrote category data");

    if let Some(island) = &config.island {
        create(island)?.write_all(data_island(&table, DATA_ISLAND_ID)?.as_bytes())?;
        info!(path = %island.display(), "wrote category data island");
    }
    Ok(table)
}

fn create(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|err| Error::Create {
            path: dir.to_owned(),
            err,
        })?;
    }
    File::create(path).map_err(|err| Error::Create {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building the category data. Variants include post
/// parsing, serialization, and I/O issues.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing post sources.
    Parse(ParseError),

    /// Returned when the display date format isn't a valid format string.
    DateFormat(String),

    /// Returned when the table can't be serialized.
    Json(serde_json::Error),

    /// Returned when an output file or its directory can't be created.
    Create { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::DateFormat(format) => {
                write!(f, "Invalid date format `{}`", format)
            }
            Error::Json(err) => err.fmt(f),
            Error::Create { path, err } => {
                write!(f, "Creating '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::DateFormat(_) => None,
            Error::Json(err) => Some(err),
            Error::Create { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
