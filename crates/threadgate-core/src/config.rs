use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ThreadgateError;

/// Marker text the automated reviewer embeds in every comment it posts.
pub const DEFAULT_MARKER: &str = "This is an auto-generated comment by OSS CodeRabbit";

/// Top-level configuration loaded from `.threadgate.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use threadgate_core::ThreadgateConfig;
///
/// let config = ThreadgateConfig::default();
/// assert_eq!(config.github.page_size, 100);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadgateConfig {
    /// How to recognize the automated reviewer.
    #[serde(default)]
    pub reviewer: ReviewerConfig,
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

impl ThreadgateConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Io`] if the file cannot be read, or
    /// [`ThreadgateError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use threadgate_core::ThreadgateConfig;
    /// use std::path::Path;
    ///
    /// let config = ThreadgateConfig::from_file(Path::new(".threadgate.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ThreadgateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Toml`] if parsing fails, or
    /// [`ThreadgateError::Config`] if the marker is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use threadgate_core::ThreadgateConfig;
    ///
    /// let toml = r#"
    /// [reviewer]
    /// marker = "generated by review-bot"
    /// "#;
    /// let config = ThreadgateConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.reviewer.marker, "generated by review-bot");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ThreadgateError> {
        let config: Self = toml::from_str(content)?;
        if config.reviewer.marker.trim().is_empty() {
            return Err(ThreadgateError::Config(
                "reviewer.marker must not be empty".into(),
            ));
        }
        Ok(config)
    }
}

/// Identification of the automated reviewer.
///
/// # Examples
///
/// ```
/// use threadgate_core::{ReviewerConfig, DEFAULT_MARKER};
///
/// let config = ReviewerConfig::default();
/// assert_eq!(config.marker, DEFAULT_MARKER);
/// assert_eq!(config.name, "CodeRabbit");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Text that must appear in a thread's first comment for the thread to
    /// count as started by the reviewer.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Display name used in report output.
    #[serde(default = "default_reviewer_name")]
    pub name: String,
}

fn default_marker() -> String {
    DEFAULT_MARKER.into()
}

fn default_reviewer_name() -> String {
    "CodeRabbit".into()
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            name: default_reviewer_name(),
        }
    }
}

/// GitHub API configuration.
///
/// # Examples
///
/// ```
/// use threadgate_core::GitHubConfig;
///
/// let config = GitHubConfig::default();
/// assert_eq!(config.api_url, "https://api.github.com");
/// assert_eq!(config.effective_page_size(), 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Base URL of the REST/GraphQL API (GitHub Enterprise uses `https://host/api`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Review threads requested per GraphQL page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

fn default_page_size() -> u32 {
    100
}

impl GitHubConfig {
    /// Page size clamped to the range GitHub accepts for connections (1–100).
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }

    /// Full URL of the GraphQL endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use threadgate_core::GitHubConfig;
    ///
    /// let config = GitHubConfig {
    ///     api_url: "https://ghe.example.com/api/".into(),
    ///     page_size: 50,
    /// };
    /// assert_eq!(config.graphql_url(), "https://ghe.example.com/api/graphql");
    /// ```
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_url.trim_end_matches('/'))
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
        }
    }
}
