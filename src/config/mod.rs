//! Configuration for tidepool
//!
//! The crawl configuration is built once before a run, from CLI flags or an
//! optional TOML file, and shared read-only by every component.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::CrawlConfig;
pub use validation::validate;
