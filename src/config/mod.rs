//! Configuration module for LinkSpector
//!
//! Options come from an optional TOML file and are then overridden by
//! command-line flags. The resulting [`CrawlOptions`] snapshot is handed to
//! the coordinator once and never changes during a run.
//!
//! # Example
//!
//! ```no_run
//! use linkspector::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkspector.toml")).unwrap();
//! println!("Timeout: {}s", config.crawl.timeout_seconds);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlOptions, NonRecursiveScope, QuirksConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_crawl_options};
