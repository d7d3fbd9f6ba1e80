//! CI server access: endpoints, metadata documents and tag resolution.
//!
//! - `transport` - [`CiTransport`] seam and the reqwest-backed [`HttpTransport`]
//! - `canned` - [`CannedTransport`], a table of canned responses
//! - `endpoints` - URL templates
//! - `documents` - XML parsers for project, build listing and build detail
//! - `tag_map` - [`TagMap`]
//! - `resolver` - [`TagResolver`]

mod canned;
mod documents;
mod endpoints;
mod resolver;
mod tag_map;
mod transport;

pub use canned::CannedTransport;
pub use documents::{
    BuildConfiguration, BuildRef, parse_build_listing, parse_build_tag, parse_project_listing,
};
pub use endpoints::CiEndpoints;
pub use resolver::TagResolver;
pub use tag_map::TagMap;
pub use transport::{CiTransport, HttpTransport};
