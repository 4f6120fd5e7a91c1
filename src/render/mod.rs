//! Rich-text rendering: block tree to markup

mod highlight;
mod image;
pub mod markup;
mod portable_text;

pub use highlight::Highlighter;
pub use image::{ImageSize, ImageUrlBuilder};
pub use markup::{Element, Node};
pub use portable_text::{DisplayMode, PortableTextRenderer};

use crate::config::SiteConfig;

/// Build the renderer described by the site configuration
pub fn renderer_for(config: &SiteConfig) -> PortableTextRenderer {
    PortableTextRenderer::new(
        Highlighter::new(&config.render.highlight_theme),
        ImageUrlBuilder::new(&config.content_store, &config.render),
    )
}
