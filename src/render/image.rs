//! Asset URL resolution for images served from the CDN

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::{ContentStoreConfig, RenderConfig};
use crate::content::ImageRef;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

lazy_static! {
    /// `image-<id>-<width>x<height>-<format>`
    static ref ASSET_REF: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([A-Za-z0-9]+)$").unwrap();
}

/// Requested rendition of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Builds deterministic CDN URLs from asset references
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
    quality: u8,
    default_size: ImageSize,
}

impl ImageUrlBuilder {
    pub fn new(store: &ContentStoreConfig, render: &RenderConfig) -> Self {
        Self {
            project_id: store.project_id.clone(),
            dataset: store.dataset.clone(),
            quality: render.image_quality,
            default_size: ImageSize {
                width: render.image_width,
                height: render.image_height,
            },
        }
    }

    /// Size used for images embedded in rich text
    pub fn default_size(&self) -> ImageSize {
        self.default_size
    }

    /// URL for an image field at the default size
    pub fn url_for(&self, image: &ImageRef) -> Option<String> {
        self.url_sized(image, self.default_size)
    }

    /// URL for an image field at a specific size
    pub fn url_sized(&self, image: &ImageRef, size: ImageSize) -> Option<String> {
        self.url_for_ref(image.asset_ref()?, size)
    }

    /// URL for a raw asset reference; `None` when the reference is malformed
    pub fn url_for_ref(&self, reference: &str, size: ImageSize) -> Option<String> {
        let caps = ASSET_REF.captures(reference)?;
        let file = format!("{}-{}x{}.{}", &caps[1], &caps[2], &caps[3], &caps[4]);
        let base = format!("{}/{}/{}/{}", CDN_BASE, self.project_id, self.dataset, file);

        let url = Url::parse_with_params(
            &base,
            &[
                ("w", size.width.to_string()),
                ("h", size.height.to_string()),
                ("q", self.quality.to_string()),
                ("fit", "crop".to_string()),
            ],
        );
        match url {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!("Cannot build image URL for {}: {}", reference, e);
                None
            }
        }
    }
}
