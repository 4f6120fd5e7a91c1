//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{MenuItem, ServiceEntry, SiteConfig};
use crate::forms::{FormFields, FormSession};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rich-text bodies arrive as pre-rendered, escaped HTML and are
        // marked `| safe`; everything else is escaped by Tera.
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("about.html", include_str!("site/about.html")),
            ("services.html", include_str!("site/services.html")),
            ("projects.html", include_str!("site/projects.html")),
            ("project.html", include_str!("site/project.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("team_member.html", include_str!("site/team_member.html")),
            ("contact.html", include_str!("site/contact.html")),
            ("resume.html", include_str!("site/resume.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            ("partials/nav.html", include_str!("site/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
            (
                "partials/form_status.html",
                include_str!("site/partials/form_status.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub location: String,
    pub url: String,
    pub menu: Vec<MenuItem>,
    pub year: i32,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        use chrono::Datelike;

        Self {
            title: config.title.clone(),
            tagline: config.tagline.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            email: config.email.clone(),
            location: config.location.clone(),
            url: config.url.clone(),
            menu: config.menu.clone(),
            year: chrono::Utc::now().year(),
        }
    }
}

/// Page-level metadata
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub path: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageData {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub path: String,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub date_xml: Option<String>,
    pub reading_time: String,
    pub categories: Vec<String>,
    pub cover: Option<ImageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub card: PostCard,
    pub author: Option<String>,
    pub body_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCard {
    pub title: String,
    pub path: String,
    pub summary: String,
    pub cover: Option<ImageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    pub title: String,
    pub cover: Option<ImageData>,
    pub link: Option<String>,
    pub embed_url: Option<String>,
    pub body_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberData {
    pub name: String,
    pub path: String,
    pub summary: Option<String>,
    pub image: Option<ImageData>,
    pub body_html: String,
    pub resume_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntroData {
    pub title: String,
    pub summary: Option<String>,
    pub body_html: String,
    pub expertise_areas: Vec<String>,
    pub core_values: Vec<String>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicesData {
    pub services: Vec<ServiceEntry>,
}

/// Form state shown next to the inputs
#[derive(Debug, Clone, Serialize)]
pub struct FormData {
    pub status: String,
    pub error: Option<String>,
    pub fields: HashMap<String, String>,
    /// Seconds until the page reloads with a fresh form
    pub reset_after: Option<u64>,
}

impl FormData {
    /// Snapshot of a form session for display
    pub fn from_session<F: FormFields + Serialize>(session: &FormSession<F>) -> Self {
        let fields = match serde_json::to_value(&session.fields) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
            _ => HashMap::new(),
        };
        Self {
            status: session.status().as_str().to_string(),
            error: session.error().map(str::to_string),
            fields,
            reset_after: session.pending_reset().map(|d| d.as_secs().max(1)),
        }
    }
}
