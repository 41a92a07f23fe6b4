//! Address handling for LinkSpector
//!
//! This module provides address normalization, host extraction and
//! wildcard host patterns. The normalized string of a [`Url`] is the
//! identity of an address everywhere in the crawl.

mod domain;
mod normalize;
mod pattern;

pub use domain::{extract_host, same_host};
pub use normalize::{normalize_address, normalize_parsed};
pub use pattern::HostPattern;
