//! Site routes and their output locations

use std::fmt;
use std::path::PathBuf;

/// Every page the site can serve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Services,
    Projects,
    Project(String),
    Blog,
    Post(String),
    Team(String),
    Contact,
    Resume { member: Option<String> },
}

impl Route {
    /// Parse a request path such as `/blog/my-post/`
    ///
    /// The query string is only consulted for `/resume`.
    pub fn parse(path: &str, member: Option<&str>) -> Option<Self> {
        let path = match path.strip_suffix("index.html") {
            Some(dir) if dir.is_empty() || dir.ends_with('/') => dir,
            _ => path,
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["services"] => Route::Services,
            ["projects"] => Route::Projects,
            [_, slug] if !is_safe_slug(slug) => return None,
            ["projects", slug] => Route::Project(slug.to_string()),
            ["blog"] => Route::Blog,
            ["blog", slug] => Route::Post(slug.to_string()),
            ["team", slug] => Route::Team(slug.to_string()),
            ["contact"] => Route::Contact,
            ["resume"] => Route::Resume {
                member: member
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            },
            _ => return None,
        };
        Some(route)
    }

    /// Canonical request path, always with a trailing slash
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about/".to_string(),
            Route::Services => "/services/".to_string(),
            Route::Projects => "/projects/".to_string(),
            Route::Project(slug) => format!("/projects/{}/", slug),
            Route::Blog => "/blog/".to_string(),
            Route::Post(slug) => format!("/blog/{}/", slug),
            Route::Team(slug) => format!("/team/{}/", slug),
            Route::Contact => "/contact/".to_string(),
            Route::Resume { .. } => "/resume/".to_string(),
        }
    }

    /// File written for this route, relative to the public directory
    pub fn output_file(&self) -> PathBuf {
        PathBuf::from(self.path().trim_start_matches('/')).join("index.html")
    }

    /// Whether the route maps to a file inside the public directory
    pub fn is_safe(&self) -> bool {
        match self {
            Route::Project(slug) | Route::Post(slug) | Route::Team(slug) => is_safe_slug(slug),
            _ => true,
        }
    }

    /// Routes that are the same for every request
    pub fn fixed() -> Vec<Route> {
        vec![
            Route::Home,
            Route::About,
            Route::Services,
            Route::Projects,
            Route::Blog,
            Route::Contact,
            Route::Resume { member: None },
        ]
    }

    /// Whether the page embeds a submittable form
    pub fn has_form(&self) -> bool {
        matches!(self, Route::Contact | Route::Resume { .. })
    }
}

/// A slug usable as a single path segment
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
