//! Generator module - renders site routes with the built-in Tera templates

mod route;

pub use route::Route;

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{
    blocks, ContentGateway, ImageRef, IntroductionPage, Post, Project, TeamMember,
};
use crate::forms::{ContactForm, FormSession, ResumeRequest};
use crate::helpers::{date_xml, full_date, full_url_for, is_external, resume_link, truncate};
use crate::render::{renderer_for, DisplayMode, ImageUrlBuilder, PortableTextRenderer};
use crate::templates::{
    FormData, ImageData, IntroData, PageMeta, PostCard, PostDetail, ProjectCard, ProjectDetail,
    ServicesData, SiteData, TeamMemberData, TemplateRenderer,
};
use crate::Site;

/// How many cards the home page shows per section
const HOME_CARDS: usize = 3;

/// Outcome of rendering a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Page(String),
    NotFound(String),
}

impl Rendered {
    pub fn html(&self) -> &str {
        match self {
            Rendered::Page(html) | Rendered::NotFound(html) => html,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            Rendered::Page(html) | Rendered::NotFound(html) => html,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Rendered::Page(_))
    }
}

/// Site generator: content store in, HTML out
pub struct Generator {
    site: Site,
    gateway: ContentGateway,
    renderer: TemplateRenderer,
    rich_text: PortableTextRenderer,
    images: ImageUrlBuilder,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let gateway = ContentGateway::new(&site.config.content_store)?;
        Ok(Self {
            site: site.clone(),
            gateway,
            renderer: TemplateRenderer::new()?,
            rich_text: renderer_for(&site.config),
            images: ImageUrlBuilder::new(&site.config.content_store, &site.config.render),
        })
    }

    /// Render one route with a fresh form, if the page has one
    pub async fn render(&self, route: &Route) -> Result<Rendered> {
        match route {
            Route::Home => self.render_home().await,
            Route::About => self.render_about().await,
            Route::Services => self.render_services(),
            Route::Projects => self.render_projects().await,
            Route::Project(slug) => self.render_project(slug).await,
            Route::Blog => self.render_blog().await,
            Route::Post(slug) => self.render_post(slug).await,
            Route::Team(slug) => self.render_team_member(slug).await,
            Route::Contact => {
                let session = FormSession::new(ContactForm::default(), Default::default());
                self.render_form(route, &FormData::from_session(&session))
            }
            Route::Resume { member } => {
                let session = FormSession::new(
                    ResumeRequest::for_member(member.as_deref()),
                    Default::default(),
                );
                self.render_form(route, &FormData::from_session(&session))
            }
        }
    }

    /// Render a form page showing the given submission state
    pub fn render_form(&self, route: &Route, form: &FormData) -> Result<Rendered> {
        let (template, title, description) = match route {
            Route::Contact => (
                "contact.html",
                "Contact",
                "Get in touch to discuss your project.",
            ),
            Route::Resume { .. } => ("resume.html", "Request Resume", ""),
            _ => anyhow::bail!("route {} has no form", route),
        };

        let mut context = self.base_context(route, title, description);
        if let Route::Resume { member } = route {
            context.insert("reset_url", &resume_link(member.as_deref()));
        }
        context.insert("form", form);
        self.page(template, &context)
    }

    /// Render the page shown for unknown paths
    pub fn render_not_found(&self, path: &str, title: &str) -> Result<Rendered> {
        let context = self.page_context(path, title, "");
        let html = self.renderer.render("not_found.html", &context)?;
        Ok(Rendered::NotFound(html))
    }

    /// Export every route into the public directory
    ///
    /// Returns the number of pages written.
    pub async fn generate(&self) -> Result<usize> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)?;

        let mut routes = Route::fixed();
        routes.extend(
            self.gateway
                .posts()
                .await
                .iter()
                .map(|p| Route::Post(p.slug().to_string())),
        );
        routes.extend(
            self.gateway
                .projects()
                .await
                .iter()
                .map(|p| Route::Project(p.slug().to_string())),
        );
        routes.extend(
            self.gateway
                .team_members()
                .await
                .iter()
                .map(|m| Route::Team(m.slug().to_string())),
        );

        let mut written = 0;
        for route in &routes {
            if !route.is_safe() {
                tracing::warn!("Skipping {:?}: slug is not a single path segment", route);
                continue;
            }
            let rendered = self.render(route).await?;
            if !rendered.is_found() {
                tracing::warn!("Skipping {}: content not found", route);
                continue;
            }
            write_page(public_dir, &route.output_file(), rendered.html())?;
            written += 1;
        }

        let not_found = self.render_not_found("/404.html", "Page Not Found")?;
        write_page(public_dir, Path::new("404.html"), not_found.html())?;

        self.copy_static_assets()?;

        tracing::info!("Generated {} pages", written);
        Ok(written)
    }

    async fn render_home(&self) -> Result<Rendered> {
        let intro = self.gateway.introduction_page().await;
        let projects = self.gateway.projects().await;
        let posts = self.gateway.posts().await;
        let team = self.gateway.team_members().await;

        let description = intro
            .as_ref()
            .and_then(|i| i.summary.clone())
            .unwrap_or_else(|| self.site.config.description.clone());

        let mut context = self.base_context(&Route::Home, "", &description);
        context.insert("intro", &intro.as_ref().map(|i| self.intro_data(i)));
        context.insert(
            "projects",
            &projects
                .iter()
                .take(HOME_CARDS)
                .map(|p| self.project_card(p))
                .collect::<Vec<_>>(),
        );
        context.insert(
            "posts",
            &posts
                .iter()
                .take(HOME_CARDS)
                .map(|p| self.post_card(p))
                .collect::<Vec<_>>(),
        );
        context.insert("team", &self.team_data(&team));
        self.page("home.html", &context)
    }

    async fn render_about(&self) -> Result<Rendered> {
        let intro = self.gateway.introduction_page().await;
        let team = self.gateway.team_members().await;

        let title = intro
            .as_ref()
            .map(|i| i.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "About".to_string());

        let mut context = self.base_context(&Route::About, &title, "");
        context.insert("intro", &intro.as_ref().map(|i| self.intro_data(i)));
        context.insert("team", &self.team_data(&team));
        self.page("about.html", &context)
    }

    fn render_services(&self) -> Result<Rendered> {
        let mut context = self.base_context(
            &Route::Services,
            "Services",
            "What we build and how we can help.",
        );
        context.insert(
            "services",
            &ServicesData {
                services: self.site.config.services.clone(),
            },
        );
        self.page("services.html", &context)
    }

    async fn render_projects(&self) -> Result<Rendered> {
        let projects = self.gateway.projects().await;
        let mut context = self.base_context(&Route::Projects, "Projects", "");
        context.insert(
            "projects",
            &projects
                .iter()
                .map(|p| self.project_card(p))
                .collect::<Vec<_>>(),
        );
        self.page("projects.html", &context)
    }

    async fn render_project(&self, slug: &str) -> Result<Rendered> {
        let route = Route::Project(slug.to_string());
        let Some(project) = self.gateway.project(slug).await else {
            return self.render_not_found(&route.path(), "Project Not Found");
        };

        let detail = ProjectDetail {
            title: project.title.clone(),
            cover: self.image(project.main_image.as_ref(), &project.title),
            link: project
                .link()
                .filter(|l| is_external(l))
                .map(str::to_string),
            embed_url: project.embed_url().filter(|u| is_external(u)),
            body_html: self.rich_text.render_html(&project.body, DisplayMode::Default),
        };

        let summary = project_summary(&project);
        let mut context = self.base_context(&route, &project.title, &summary);
        context.insert("project", &detail);
        self.page("project.html", &context)
    }

    async fn render_blog(&self) -> Result<Rendered> {
        let posts = self.gateway.posts().await;
        let mut context = self.base_context(&Route::Blog, "Blog", "");
        context.insert(
            "posts",
            &posts.iter().map(|p| self.post_card(p)).collect::<Vec<_>>(),
        );
        self.page("blog.html", &context)
    }

    async fn render_post(&self, slug: &str) -> Result<Rendered> {
        let route = Route::Post(slug.to_string());
        let Some(post) = self.gateway.post(slug).await else {
            return self.render_not_found(&route.path(), "Post Not Found");
        };

        let detail = PostDetail {
            card: self.post_card(&post),
            author: post
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .filter(|n| !n.is_empty()),
            body_html: self.rich_text.render_html(&post.body, DisplayMode::Default),
        };

        let description = post.excerpt().unwrap_or_default().to_string();
        let mut context = self.base_context(&route, &post.title, &description);
        context.insert("post", &detail);
        self.page("post.html", &context)
    }

    async fn render_team_member(&self, slug: &str) -> Result<Rendered> {
        let route = Route::Team(slug.to_string());
        let Some(member) = self.gateway.team_member(slug).await else {
            return self.render_not_found(&route.path(), "Team Member Not Found");
        };

        let description = member.summary.clone().unwrap_or_default();
        let mut context = self.base_context(&route, &member.name, &description);
        context.insert("member", &self.member_data(&member, DisplayMode::Default));
        self.page("team_member.html", &context)
    }

    fn page(&self, template: &str, context: &Context) -> Result<Rendered> {
        Ok(Rendered::Page(self.renderer.render(template, context)?))
    }

    fn base_context(&self, route: &Route, title: &str, description: &str) -> Context {
        self.page_context(&route.path(), title, description)
    }

    fn page_context(&self, path: &str, title: &str, description: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.site.config));
        context.insert(
            "page",
            &PageMeta {
                title: title.to_string(),
                description: description.to_string(),
                path: path.to_string(),
                canonical: full_url_for(&self.site.config, path),
            },
        );
        context
    }

    fn image(&self, image: Option<&ImageRef>, fallback_alt: &str) -> Option<ImageData> {
        let image = image?;
        let src = self.images.url_for(image)?;
        Some(ImageData {
            src,
            alt: image.alt().unwrap_or(fallback_alt).to_string(),
        })
    }

    fn post_card(&self, post: &Post) -> PostCard {
        let date = post.display_date();
        PostCard {
            title: post.title.clone(),
            path: Route::Post(post.slug().to_string()).path(),
            excerpt: post.excerpt().map(str::to_string),
            date: date.as_ref().map(full_date),
            date_xml: date.as_ref().map(date_xml),
            reading_time: post.reading_time(),
            categories: post.categories.clone(),
            cover: self.image(post.cover(), &post.title),
        }
    }

    fn project_card(&self, project: &Project) -> ProjectCard {
        ProjectCard {
            title: project.title.clone(),
            path: Route::Project(project.slug().to_string()).path(),
            summary: project_summary(project),
            cover: self.image(project.main_image.as_ref(), &project.title),
        }
    }

    fn member_data(&self, member: &TeamMember, mode: DisplayMode) -> TeamMemberData {
        TeamMemberData {
            name: member.name.clone(),
            path: Route::Team(member.slug().to_string()).path(),
            summary: member.summary.clone(),
            image: self.image(member.image.as_ref(), &member.name),
            body_html: self.rich_text.render_html(&member.professional_summary, mode),
            resume_link: resume_link(Some(&member.name)),
        }
    }

    fn team_data(&self, team: &[TeamMember]) -> Vec<TeamMemberData> {
        team.iter()
            .map(|m| self.member_data(m, DisplayMode::Compact))
            .collect()
    }

    fn intro_data(&self, intro: &IntroductionPage) -> IntroData {
        IntroData {
            title: intro.title.clone(),
            summary: intro.summary.clone(),
            body_html: self
                .rich_text
                .render_html(&intro.professional_summary, DisplayMode::Default),
            expertise_areas: intro.expertise_areas.clone(),
            core_values: intro.core_values.clone(),
            image: self.image(intro.image.as_ref(), &intro.title),
        }
    }

    /// Copy the static directory to `<public>/static`
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }
        let dest_root = self.site.public_dir.join("static");

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?}", dest);
        }

        Ok(())
    }
}

/// Plain-text teaser of a project body
fn project_summary(project: &Project) -> String {
    truncate(&blocks::plain_text(&project.body), 200, None)
}

fn write_page(public_dir: &Path, relative: &Path, html: &str) -> Result<()> {
    let output_path = public_dir.join(relative);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(&output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}
