//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failure loading `_config.yml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub location: String,
    pub url: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    /// Seconds before a served page is rendered again
    pub revalidate_secs: u64,

    pub content_store: ContentStoreConfig,
    pub forms: FormsConfig,
    pub render: RenderConfig,

    // Static marketing copy
    pub menu: Vec<MenuItem>,
    pub services: Vec<ServiceEntry>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Showcase".to_string(),
            tagline: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            email: String::new(),
            location: String::new(),
            url: "http://example.com".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            revalidate_secs: 60,

            content_store: ContentStoreConfig::default(),
            forms: FormsConfig::default(),
            render: RenderConfig::default(),

            menu: MenuItem::defaults(),
            services: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.content_store.project_id = project_id;
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.content_store.dataset = dataset;
        }
        if let Some(api_version) = lookup("SANITY_API_VERSION") {
            self.content_store.api_version = api_version;
        }
        if let Some(token) = lookup("SANITY_TOKEN") {
            self.content_store.token = Some(token);
        }
        if let Some(key) = lookup("FORM_RELAY_ACCESS_KEY") {
            self.forms.access_key = key;
        }
    }

    /// Revalidation interval for rendered pages
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// Connection settings for the headless content store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Overrides the endpoint derived from `project_id`
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: false,
            endpoint: None,
            token: None,
        }
    }
}

impl ContentStoreConfig {
    /// Base URL of the query API, without the version segment
    pub fn endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.trim_end_matches('/').to_string();
        }
        let host = if self.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        format!("https://{}.{}", self.project_id, host)
    }

    /// Full URL of the query endpoint for the configured dataset
    pub fn query_url(&self) -> String {
        let version = self.api_version.trim_start_matches('v');
        format!(
            "{}/v{}/data/query/{}",
            self.endpoint(),
            version,
            self.dataset
        )
    }
}

/// Outbound form relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub endpoint: String,
    pub access_key: String,
    /// Seconds a successful resume request stays on screen before the form resets
    pub resume_reset_secs: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: String::new(),
            resume_reset_secs: 60,
        }
    }
}

/// Rich-text rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub highlight_theme: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight_theme: "base16-ocean.dark".to_string(),
            image_width: 800,
            image_height: 500,
            image_quality: 80,
        }
    }
}

/// Navigation entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    fn defaults() -> Vec<Self> {
        [
            ("Home", "/"),
            ("About", "/about/"),
            ("Services", "/services/"),
            ("Projects", "/projects/"),
            ("Blog", "/blog/"),
            ("Contact", "/contact/"),
        ]
        .into_iter()
        .map(|(name, path)| Self {
            name: name.to_string(),
            path: path.to_string(),
        })
        .collect()
    }
}

/// A service offering shown on the services page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}
