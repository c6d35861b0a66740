//! Loads the [`Config`] from a `catmodal.yaml` project file.

use crate::dom::ModalIds;
use crate::feed::check_date_format;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "catmodal.yaml";

#[derive(Deserialize)]
struct DateFormat(String);
impl Default for DateFormat {
    fn default() -> Self {
        DateFormat("%d %b %Y".to_owned())
    }
}

#[derive(Deserialize)]
struct Project {
    pub site_root: Url,

    #[serde(default = "default_posts_directory")]
    pub posts_directory: PathBuf,

    #[serde(default = "default_posts_path")]
    pub posts_path: String,

    #[serde(default)]
    pub date_format: DateFormat,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub island: Option<PathBuf>,

    #[serde(default)]
    pub modal: ModalIds,
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("_posts")
}

fn default_posts_path() -> String {
    "posts".to_owned()
}

fn default_output() -> PathBuf {
    PathBuf::from("_site/assets/data/categories.json")
}

/// The resolved project configuration. Paths are absolute or relative to the
/// working directory; paths in the project file are relative to the file.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory holding post sources.
    pub posts_directory: PathBuf,

    /// The base URL of post pages, with a trailing slash.
    pub posts_url: Url,

    /// The [`chrono`] format string for display dates.
    pub date_format: String,

    /// Where the JSON category table is written.
    pub output: PathBuf,

    /// Where the HTML data island is written, if anywhere.
    pub island: Option<PathBuf>,

    /// The element identifiers of the category modal.
    pub modal: ModalIds,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
                .with_context(|| format!("Loading configuration `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open_file(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Config::from_project(project, project_root)
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        // a trailing slash makes `join` treat the last segment as a directory
        let posts_path = format!("{}/", project.posts_path.trim_matches('/'));
        check_date_format(&project.date_format.0)?;
        Ok(Config {
            posts_directory: project_root.join(project.posts_directory),
            posts_url: project
                .site_root
                .join(&posts_path)
                .with_context(|| format!("Joining posts path `{}`", posts_path))?,
            date_format: project.date_format.0,
            output: project_root.join(project.output),
            island: project.island.map(|island| project_root.join(island)),
            modal: project.modal,
        })
    }
}

/// Opens a file, naming its role in the error message if it can't be
/// opened.
fn open_file(path: &Path, kind: &str) -> Result<File> {
    File::open(path).map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() -> Result<()> {
        let project: Project = serde_yaml::from_str("site_root: https://example.org/\n")?;
        let config = Config::from_project(project, Path::new("/blog"))?;

        assert_eq!(PathBuf::from("/blog/_posts"), config.posts_directory);
        assert_eq!("https://example.org/posts/", config.posts_url.as_str());
        assert_eq!("%d %b %Y", config.date_format);
        assert_eq!(
            PathBuf::from("/blog/_site/assets/data/categories.json"),
            config.output
        );
        assert_eq!(None, config.island);
        assert_eq!(ModalIds::default(), config.modal);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let project: Project = serde_yaml::from_str(
            "site_root: https://example.org/blog/\n\
             posts_path: /articles/\n\
             date_format: \"%Y-%m-%d\"\n\
             island: _includes/categories.html\n\
             modal:\n  panel: cats\n",
        )?;
        let config = Config::from_project(project, Path::new("/blog"))?;

        assert_eq!("https://example.org/blog/articles/", config.posts_url.as_str());
        assert_eq!("%Y-%m-%d", config.date_format);
        assert_eq!(
            Some(PathBuf::from("/blog/_includes/categories.html")),
            config.island
        );
        assert_eq!("cats", config.modal.panel);
        assert_eq!(ModalIds::default().scrim, config.modal.scrim);
        Ok(())
    }

    #[test]
    fn test_invalid_date_format() -> Result<()> {
        let project: Project = serde_yaml::from_str(
            "site_root: https://example.org/\ndate_format: \"%Q\"\n",
        )?;
        let err = Config::from_project(project, Path::new("/blog")).unwrap_err();
        assert!(err.to_string().contains("%Q"));
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "site_root: https://example.org/\n",
        )?;
        let nested = dir.path().join("_posts").join("2022");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("_posts"), config.posts_directory);
        Ok(())
    }
}
