//! URL helper functions

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Link to the resume request form, optionally naming a team member
pub fn resume_link(member: Option<&str>) -> String {
    match member.map(str::trim).filter(|m| !m.is_empty()) {
        Some(name) => format!(
            "/resume/?member={}",
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        ),
        None => "/resume/".to_string(),
    }
}

/// Whether a link leaves the site
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}
