//! Article ingestion: front matter, scanning, ids, and the index.

pub mod front;
pub mod id;
pub mod index;
pub mod scan;

pub use front::FrontMatter;
pub use index::ArticleIndexItem;
pub use scan::ScannedArticle;
