//! docweave renders structured documents into self-contained HTML with
//! responsive, externally hosted image variants.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
