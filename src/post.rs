//! Defines the [`Post`], [`Parser`], and [`Error`] types: the logic for
//! reading post sources (Markdown files with YAML frontmatter, laid out the
//! way Jekyll lays out `_posts`) into the metadata the category table is built
//! from. Post bodies are never rendered; only the frontmatter matters here.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;
use walkdir::{DirEntry, WalkDir};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];
const BUNDLE_INDEX: &str = "index";

/// The build-time metadata of a single post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The post's identifier: its file stem less any `YYYY-MM-DD-` prefix,
    /// or the directory name for a bundle (`{id}/index.md`).
    pub id: String,

    pub title: String,

    pub date: NaiveDate,

    /// The site-relative URL of the post page, e.g. `/posts/{id}/`.
    pub url: String,

    /// The category names exactly as written in the frontmatter.
    pub categories: Vec<String>,
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. A post's URL is
    /// `{posts_url}/{post_id}/`, and only its path is kept.
    posts_url: &'a Url,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(posts_url: &'a Url) -> Parser<'a> {
        Parser { posts_url }
    }

    /// Searches `source_directory` recursively for post files (extension
    /// `.md` or `.markdown`) and returns the published posts, most recent
    /// first. Posts sharing a date are ordered by id. Hidden files and
    /// directories are skipped. Each post file is structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with `title` and optionally `date`, `categories`,
    ///    and `published`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example, `_posts/2022-02-04-static-blog.md`:
    ///
    /// ```md
    /// ---
    /// title: Fast Static Jekyll Blog Deployment
    /// categories: [jekyll, azure devops]
    /// ---
    /// Body text.
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let walker = WalkDir::new(source_directory)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for result in walker {
            let entry = result?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            // strip_prefix() should never fail since the walk is rooted at
            // `source_directory`
            let relative_path = entry
                .path()
                .strip_prefix(source_directory)
                .unwrap_or_else(|_| entry.path());
            match self.parse_post(source_directory, relative_path)? {
                Some(post) => posts.push(post),
                None => debug!(path = %relative_path.display(), "skipping unpublished post"),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }

    /// Parses a single post file, annotating any error with the file's
    /// relative path. Unpublished posts yield `None`.
    pub fn parse_post(
        &self,
        source_directory: &Path,
        relative_path: &Path,
    ) -> Result<Option<Post>> {
        use std::io::Read;

        let annotate = |e: Error| {
            Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )
        };

        let mut contents = String::new();
        File::open(source_directory.join(relative_path))
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|e| annotate(e.into()))?;
        self.parse_str(relative_path, &contents).map_err(annotate)
    }

    /// Parses a post from its `relative_path` (which supplies the id and
    /// possibly the date) and its source text.
    pub fn parse_str(&self, relative_path: &Path, input: &str) -> Result<Option<Post>> {
        let (yaml_start, yaml_stop) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
        if !frontmatter.published {
            return Ok(None);
        }

        let (file_date, id) = split_file_name(relative_path)?;
        let date = match &frontmatter.date {
            Some(date) => parse_date(date)?,
            None => file_date.ok_or(Error::MissingDate)?,
        };

        Ok(Some(Post {
            url: self.post_url(&id)?,
            id,
            title: frontmatter.title,
            date,
            categories: frontmatter
                .categories
                .map_or_else(Vec::new, Categories::into_vec),
        }))
    }
}

impl Parser<'_> {
    /// Returns the path of `{posts_url}/{id}/`. The id is pushed as a single
    /// percent-encoded segment, so `#`, `?`, and `/` in it stay part of the
    /// path.
    fn post_url(&self, id: &str) -> Result<String> {
        let mut url = self.posts_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(self.posts_url.to_string()))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url.path().to_owned())
    }
}

/// Finds the bounds of the YAML between the opening and closing `---`
/// fences.
fn frontmatter_indices(input: &str) -> Result<(usize, usize)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    match input[FENCE.len()..].find(FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok((FENCE.len(), FENCE.len() + offset)),
    }
}

/// Parses a frontmatter date. Only the leading `YYYY-MM-DD` is considered;
/// Jekyll dates often carry a time and offset after it.
fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let day = input.get(..10).unwrap_or(input);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|err| Error::InvalidDate(input.to_owned(), err))
}

/// Splits a post's path into the date from a `YYYY-MM-DD-` file name prefix
/// (if any) and the post id.
fn split_file_name(relative_path: &Path) -> Result<(Option<NaiveDate>, String)> {
    let invalid = || Error::InvalidFileName(relative_path.to_owned());
    let stem = relative_path
        .file_stem()
        .ok_or_else(invalid)?
        .to_str()
        .ok_or_else(invalid)?;

    // a bundle takes its name from its directory
    let stem = if stem == BUNDLE_INDEX {
        relative_path
            .parent()
            .and_then(Path::file_name)
            .ok_or_else(invalid)?
            .to_str()
            .ok_or_else(invalid)?
    } else {
        stem
    };

    match (stem.get(..10), stem.get(10..11), stem.get(11..)) {
        (Some(prefix), Some("-"), Some(rest)) if !rest.is_empty() => {
            match NaiveDate::parse_from_str(prefix, DATE_FORMAT) {
                Ok(date) => Ok((Some(date), rest.to_owned())),
                Err(_) => Ok((None, stem.to_owned())),
            }
        }
        _ => Ok((None, stem.to_owned())),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the post.
    title: String,

    /// The date of the post, if the file name doesn't carry one.
    #[serde(default)]
    date: Option<String>,

    /// The categories the post belongs to. An empty `categories:` key is
    /// the same as none.
    #[serde(default)]
    categories: Option<Categories>,

    /// Unpublished posts are left out of the table.
    #[serde(default = "published_default")]
    published: bool,
}

fn published_default() -> bool {
    true
}

/// `categories` may be a list or, for a post in a single category, a bare
/// string. A bare string is one category even if it contains spaces.
#[derive(Deserialize)]
#[serde(untagged)]
enum Categories {
    Many(Vec<String>),
    One(String),
}

impl Categories {
    fn into_vec(self) -> Vec<String> {
        match self {
            Categories::Many(categories) => categories,
            Categories::One(category) => vec![category],
        }
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the frontmatter `date` isn't a `YYYY-MM-DD` date.
    InvalidDate(String, chrono::ParseError),

    /// Returned when neither the frontmatter nor the file name gives a date.
    MissingDate,

    /// Returned when the posts URL can't hold path segments (e.g.
    /// `mailto:`).
    CannotBeABase(String),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(date, err) => {
                write!(f, "Invalid date `{}`: {}", date, err)
            }
            Error::MissingDate => write!(
                f,
                "Post has no `date` and its file name has no `YYYY-MM-DD-` prefix"
            ),
            Error::CannotBeABase(url) => {
                write!(f, "Posts URL `{}` can't have a path", url)
            }
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_, err) => Some(err),
            Error::MissingDate => None,
            Error::CannotBeABase(_) => None,
            Error::InvalidFileName(_) => None,
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
