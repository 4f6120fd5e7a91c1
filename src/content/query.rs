//! GROQ queries for each entity family

use serde::de::DeserializeOwned;
use std::fmt;

use super::model::{IntroductionPage, Post, Project, TeamMember};

const INTRODUCTION_FIELDS: &str = r#"title,
    slug,
    summary,
    professionalSummary,
    expertiseAreas,
    coreValues,
    image"#;

const POST_FIELDS: &str = r#"_id,
    _createdAt,
    title,
    slug,
    summary,
    excerpt,
    desktopImage,
    mobileImage,
    "categories": categories[]->title,
    publishedAt,
    body"#;

const POST_DETAIL_FIELDS: &str = r#",
    author->{
      name,
      image
    }"#;

const PROJECT_FIELDS: &str = r#"_id,
    _createdAt,
    title,
    slug,
    body,
    mainImage,
    presentationEmbedUrl,
    projectLink"#;

const TEAM_MEMBER_FIELDS: &str = r#"_id,
    _createdAt,
    name,
    slug,
    summary,
    "professionalSummary": professionalSummary[],
    image,
    rank"#;

/// Document families served by the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityFamily {
    IntroductionPage,
    Post,
    Project,
    TeamMember,
}

impl EntityFamily {
    /// The `_type` of documents in this family
    pub fn type_name(self) -> &'static str {
        match self {
            EntityFamily::IntroductionPage => "introductionPage",
            EntityFamily::Post => "post",
            EntityFamily::Project => "project",
            EntityFamily::TeamMember => "teamMember",
        }
    }

    /// Server-side ordering applied to list queries
    pub fn ordering(self) -> Option<&'static str> {
        match self {
            EntityFamily::IntroductionPage => None,
            EntityFamily::Post | EntityFamily::Project => Some("_createdAt desc"),
            EntityFamily::TeamMember => Some("rank asc"),
        }
    }

    /// Field projection; detail views may dereference more than list views
    pub fn projection(self, detail: bool) -> String {
        match self {
            EntityFamily::IntroductionPage => INTRODUCTION_FIELDS.to_string(),
            EntityFamily::Post if detail => format!("{}{}", POST_FIELDS, POST_DETAIL_FIELDS),
            EntityFamily::Post => POST_FIELDS.to_string(),
            EntityFamily::Project => PROJECT_FIELDS.to_string(),
            EntityFamily::TeamMember => TEAM_MEMBER_FIELDS.to_string(),
        }
    }

    /// Query returning every document of the family, in server order
    pub fn all_query(self) -> String {
        let mut query = format!(
            "*[_type == \"{}\"] {{\n    {}\n  }}",
            self.type_name(),
            self.projection(false)
        );
        if let Some(order) = self.ordering() {
            query.push_str(&format!(" | order({})", order));
        }
        query
    }

    /// Query returning the first document of the family (singletons)
    pub fn first_query(self) -> String {
        format!(
            "*[_type == \"{}\"][0] {{\n    {}\n  }}",
            self.type_name(),
            self.projection(true)
        )
    }

    /// Query returning the document whose slug equals `$slug`
    pub fn by_slug_query(self) -> String {
        format!(
            "*[_type == \"{}\" && slug.current == $slug][0] {{\n    {}\n  }}",
            self.type_name(),
            self.projection(true)
        )
    }
}

impl fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A model that can be fetched from the content store
pub trait Document: DeserializeOwned {
    const FAMILY: EntityFamily;

    /// Routing slug, empty when the document has none
    fn slug(&self) -> &str;
}

impl Document for IntroductionPage {
    const FAMILY: EntityFamily = EntityFamily::IntroductionPage;

    fn slug(&self) -> &str {
        &self.slug.current
    }
}

impl Document for Post {
    const FAMILY: EntityFamily = EntityFamily::Post;

    fn slug(&self) -> &str {
        Post::slug(self)
    }
}

impl Document for Project {
    const FAMILY: EntityFamily = EntityFamily::Project;

    fn slug(&self) -> &str {
        Project::slug(self)
    }
}

impl Document for TeamMember {
    const FAMILY: EntityFamily = EntityFamily::TeamMember;

    fn slug(&self) -> &str {
        TeamMember::slug(self)
    }
}
