//! Content module - entity models, rich-text blocks and the content gateway

pub mod blocks;
mod gateway;
mod model;
mod query;

pub use blocks::{Block, BlockStyle, CodeBlock, Inline, ListKind, Mark, MarkDef, Span, TextBlock};
pub use gateway::{ContentGateway, GatewayError};
pub use model::{
    first_present, AssetRef, Author, ImageRef, IntroductionPage, Post, Project, Slug, TeamMember,
};
pub use query::{Document, EntityFamily};
