//! Document source backends.

mod directory;
mod google;
pub mod wire;

pub use directory::DirectorySource;
pub use google::GoogleDocsSource;
