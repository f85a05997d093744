//! Configuration module

mod site;

pub use site::ManifestConfig;
pub use site::ManifestIcon;
pub use site::SiteConfig;
pub use site::StoreConfig;
