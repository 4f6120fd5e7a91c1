//! Configuration module

mod site;

pub use site::ConfigError;
pub use site::ContentStoreConfig;
pub use site::FormsConfig;
pub use site::MenuItem;
pub use site::RenderConfig;
pub use site::ServiceEntry;
pub use site::SiteConfig;
