//! `xserve.toml` loading.
//!
//! The file is looked up in the working directory and its ancestors unless a
//! path is given explicitly. Without a file every setting takes its default,
//! relative to the working directory.
//!
//! ```toml
//! [site]
//! output_dir = "${XSERVE_SITES:-data/sites}"   # relative to the file
//! sort_index = false
//! index_title = "Your Site"
//! index_heading = "Your Pages"
//!
//! [build]
//! workers = 8
//! ```
//!
//! `output_dir`, `index_title` and `index_heading` accept `${VAR}` and `${VAR:-default}`
//! references. Command-line overrides ([`CliSettings`]) win over the file.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name looked up during discovery.
pub const CONFIG_FILENAME: &str = "xserve.toml";

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "data/sites";

/// Index page title used when none is configured.
pub const DEFAULT_INDEX_TITLE: &str = "Your Site";

/// Index heading used when none is configured.
pub const DEFAULT_INDEX_HEADING: &str = "Your Pages";

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub output_dir: Option<PathBuf>,
    pub sort_index: Option<bool>,
    pub workers: Option<usize>,
}

/// On-disk shape of `xserve.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    site: SiteSection,
    build: BuildSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SiteSection {
    output_dir: Option<String>,
    sort_index: Option<bool>,
    index_title: Option<String>,
    index_heading: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BuildSection {
    workers: Option<usize>,
}

/// Where and how sites are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    /// Each user's site lives in `<output_dir>/<user_id>`.
    pub output_dir: PathBuf,
    /// List index entries by file name rather than input order.
    pub sort_index: bool,
    /// `<title>` of the index page.
    pub index_title: String,
    /// `<h1>` of the index page.
    pub index_heading: String,
}

/// Render scheduling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Size of a dedicated render pool; `None` shares rayon's global pool.
    pub workers: Option<usize>,
}

/// Resolved configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub site: SiteConfig,
    pub build: BuildConfig,
    /// File the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A `${VAR}` reference could not be expanded.
    #[error("cannot expand {field}: {message}")]
    EnvVar { field: String, message: String },
}

impl Config {
    /// Defaults with paths relative to `base`.
    pub fn with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig {
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
                sort_index: false,
                index_title: DEFAULT_INDEX_TITLE.to_owned(),
                index_heading: DEFAULT_INDEX_HEADING.to_owned(),
            },
            build: BuildConfig::default(),
            source: None,
        }
    }

    /// Load the explicit file, else a discovered `xserve.toml`, else defaults;
    /// then apply `cli` overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, the file cannot be
    /// read or parsed, a variable reference is unset, or a value is invalid.
    pub fn load(path: Option<&Path>, cli: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(),
        };

        let mut config = match file {
            Some(file) => Self::from_file(&file)?,
            None => Self::with_base(&std::env::current_dir().unwrap_or_default()),
        };
        if let Some(cli) = cli {
            config.apply(cli);
        }
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, base)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML text, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or variable expansion fails.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::with_base(base);

        let output_dir = match file.site.output_dir {
            Some(dir) => base.join(expand::expand_env(&dir, "site.output_dir")?),
            None => defaults.site.output_dir,
        };
        let index_title = match file.site.index_title {
            Some(title) => expand::expand_env(&title, "site.index_title")?,
            None => defaults.site.index_title,
        };
        let index_heading = match file.site.index_heading {
            Some(heading) => expand::expand_env(&heading, "site.index_heading")?,
            None => defaults.site.index_heading,
        };

        Ok(Self {
            site: SiteConfig {
                output_dir,
                sort_index: file.site.sort_index.unwrap_or(defaults.site.sort_index),
                index_title,
                index_heading,
            },
            build: BuildConfig {
                workers: file.build.workers,
            },
            source: None,
        })
    }

    fn apply(&mut self, cli: &CliSettings) {
        if let Some(dir) = &cli.output_dir {
            self.site.output_dir.clone_from(dir);
        }
        if let Some(sort) = cli.sort_index {
            self.site.sort_index = sort;
        }
        if cli.workers.is_some() {
            self.build.workers = cli.workers;
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.to_owned()));

        if self.site.output_dir.as_os_str().is_empty() {
            return invalid("site.output_dir cannot be empty");
        }
        if self.site.index_title.trim().is_empty() {
            return invalid("site.index_title cannot be empty");
        }
        if self.site.index_heading.trim().is_empty() {
            return invalid("site.index_heading cannot be empty");
        }
        if self.build.workers == Some(0) {
            return invalid("build.workers must be at least 1");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Nearest `xserve.toml` in the working directory or an ancestor.
fn discover() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
