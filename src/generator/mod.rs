//! Artifact generators.

pub mod sitemap;

pub use sitemap::Sitemap;
