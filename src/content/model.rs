//! Entity models projected from the content store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::blocks::{plain_text, Block};
use crate::helpers::{reading_time, DEFAULT_READING_TIME};

/// Deserialize `null` the same way as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps arrive as RFC 3339 or as a bare `YYYY-MM-DD` date
///
/// Anything else is treated as missing rather than failing the document.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(str::trim).and_then(parse_date))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        Err(_) => {
            tracing::warn!("Ignoring unparseable date {:?}", raw);
            None
        }
    }
}

/// Dereferenced label lists may contain `null` for dangling references
fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

/// Return the first candidate that holds non-blank text
///
/// Candidates are listed in priority order, e.g. `[excerpt, summary]`.
pub fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

/// URL slug as stored (`{ "current": "..." }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: String,
}

/// Reference to an uploaded asset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// An image field or embedded image block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl ImageRef {
    /// The asset reference, if one is set
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .map(|a| a.reference.as_str())
            .filter(|r| !r.is_empty())
    }

    pub fn alt(&self) -> Option<&str> {
        first_present(&[self.alt.as_deref()])
    }

    pub fn caption(&self) -> Option<&str> {
        first_present(&[self.caption.as_deref()])
    }
}

/// Post author
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// The singleton introduction page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: Slug,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_summary: Vec<Block>,
    #[serde(default, deserialize_with = "labels")]
    pub expertise_areas: Vec<String>,
    #[serde(default, deserialize_with = "labels")]
    pub core_values: Vec<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt", default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: Slug,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub desktop_image: Option<ImageRef>,
    #[serde(default)]
    pub mobile_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "labels")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Block>,
    #[serde(default)]
    pub author: Option<Author>,
}

impl Post {
    pub fn slug(&self) -> &str {
        &self.slug.current
    }

    /// Teaser text: the excerpt, else the summary
    pub fn excerpt(&self) -> Option<&str> {
        first_present(&[self.excerpt.as_deref(), self.summary.as_deref()])
    }

    /// Cover image: the desktop rendition, else the mobile one
    pub fn cover(&self) -> Option<&ImageRef> {
        [self.desktop_image.as_ref(), self.mobile_image.as_ref()]
            .into_iter()
            .flatten()
            .find(|img| img.asset_ref().is_some())
    }

    /// Date shown to readers: publication, else creation
    pub fn display_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    /// Estimated reading time of the body
    pub fn reading_time(&self) -> String {
        if self.body.is_empty() {
            return DEFAULT_READING_TIME.to_string();
        }
        reading_time(&plain_text(&self.body))
    }
}

/// A portfolio project
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt", default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: Slug,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Block>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub presentation_embed_url: Option<String>,
    #[serde(default)]
    pub project_link: Option<String>,
}

impl Project {
    pub fn slug(&self) -> &str {
        &self.slug.current
    }

    /// Call-to-action link to the live project
    pub fn link(&self) -> Option<&str> {
        first_present(&[self.project_link.as_deref()]).map(str::trim)
    }

    /// Presentation URL in its embeddable form
    ///
    /// Published slide decks (`.../pub?...`) are switched to their
    /// `.../embed?...` rendition; other URLs pass through untouched.
    pub fn embed_url(&self) -> Option<String> {
        let url = first_present(&[self.presentation_embed_url.as_deref()])?.trim();
        Some(url.replacen("/pub?", "/embed?", 1))
    }
}

/// A team member profile
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt", default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: Slug,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_summary: Vec<Block>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub rank: Option<f64>,
}

impl TeamMember {
    pub fn slug(&self) -> &str {
        &self.slug.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present() {
        assert_eq!(first_present(&[None, Some("b")]), Some("b"));
        assert_eq!(first_present(&[Some("  "), Some("b")]), Some("b"));
        assert_eq!(first_present(&[Some("a"), Some("b")]), Some("a"));
        assert_eq!(first_present(&[None, Some("")]), None);
    }

    #[test]
    fn test_post_normalization() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2024-03-01T10:00:00Z",
            "title": "Cloud Migration",
            "slug": {"current": "cloud-migration"},
            "summary": "Short summary",
            "excerpt": null,
            "categories": ["Cloud", null, "DevOps"],
            "publishedAt": null,
            "body": null,
            "mobileImage": {"asset": {"_ref": "image-abc-800x600-jpg"}}
        }))
        .unwrap();

        assert_eq!(post.slug(), "cloud-migration");
        assert_eq!(post.excerpt(), Some("Short summary"));
        assert_eq!(post.categories, vec!["Cloud", "DevOps"]);
        assert!(post.body.is_empty());
        assert_eq!(
            post.display_date().map(|d| d.to_rfc3339()),
            Some("2024-03-01T10:00:00+00:00".to_string())
        );
        assert_eq!(
            post.cover().and_then(|c| c.asset_ref()),
            Some("image-abc-800x600-jpg")
        );
        assert_eq!(post.reading_time(), "5 min read");
    }

    #[test]
    fn test_reading_time_of_wordless_body() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p3",
            "body": [{"_type": "image", "asset": {"_ref": "image-abc-800x600-jpg"}}]
        }))
        .unwrap();
        assert_eq!(post.reading_time(), "1 min read");
    }

    #[test]
    fn test_project_links() {
        let project: Project = serde_json::from_value(json!({
            "_id": "x",
            "title": "Vision",
            "slug": {"current": "vision"},
            "projectLink": "https://github.com/example/vision",
            "presentationEmbedUrl": ""
        }))
        .unwrap();
        assert_eq!(project.link(), Some("https://github.com/example/vision"));
        assert_eq!(project.embed_url(), None);
        assert!(project.main_image.is_none());
    }

    #[test]
    fn test_project_embed_url() {
        let project: Project = serde_json::from_value(json!({
            "_id": "x",
            "slug": {"current": "vision"},
            "presentationEmbedUrl": "https://docs.google.com/presentation/d/e/abc/pub?start=false&loop=false"
        }))
        .unwrap();
        assert_eq!(
            project.embed_url().as_deref(),
            Some("https://docs.google.com/presentation/d/e/abc/embed?start=false&loop=false")
        );
        assert_eq!(project.link(), None);

        let other: Project = serde_json::from_value(json!({
            "_id": "y",
            "presentationEmbedUrl": "https://slides.example.com/deck/42"
        }))
        .unwrap();
        assert_eq!(
            other.embed_url().as_deref(),
            Some("https://slides.example.com/deck/42")
        );
    }

    #[test]
    fn test_lenient_dates() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p2",
            "_createdAt": "not a date",
            "publishedAt": "2024-01-15"
        }))
        .unwrap();
        assert!(post.created_at.is_none());
        assert_eq!(
            post.display_date().map(|d| d.to_rfc3339()),
            Some("2024-01-15T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_fractional_rank() {
        let member: TeamMember = serde_json::from_value(json!({
            "_id": "t2",
            "name": "Ben",
            "rank": 1.5
        }))
        .unwrap();
        assert_eq!(member.rank, Some(1.5));
    }

    #[test]
    fn test_team_member_defaults() {
        let member: TeamMember = serde_json::from_value(json!({
            "_id": "t1",
            "name": "Asha",
            "slug": {"current": "asha"},
            "professionalSummary": null
        }))
        .unwrap();
        assert_eq!(member.slug(), "asha");
        assert!(member.professional_summary.is_empty());
        assert_eq!(member.rank, None);
    }
}
