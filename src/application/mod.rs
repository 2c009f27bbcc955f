//! Application services layer.

pub mod assets;
pub mod documents;
pub mod error;
pub mod locks;
pub mod maintenance;
pub mod metrics;
pub mod render;
pub mod repos;
