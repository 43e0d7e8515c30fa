//! PageSync - Power Pages site records as local files
//!
//! This library mirrors Power Pages content records (web pages, templates,
//! snippets) from Dataverse into a virtual file tree and keeps enough metadata
//! per file to write edits back to the field they came from. It also discovers
//! which regional cluster serves a tenant and whether the regional
//! intelligence endpoint may be called under the tenant's cross-geo policy.
//!
//! # Flow
//!
//! ```text
//! tenant id ──► geo::GeoResolver ──► policy::CrossGeoEvaluator ──► intelligence endpoint
//!
//! entity request ──► fetch::EntityFetcher ──► project::Projector ──► vfs::VirtualFs
//!                                                    │
//!                                                    └──► save::SaveTracker ──► host save provider
//! ```
//!
//! [`session::Session`] ties these together for one host connection.

pub mod config;
pub mod fetch;
pub mod geo;
pub mod host;
pub mod http;
pub mod policy;
pub mod project;
pub mod save;
pub mod schema;
pub mod session;
pub mod telemetry;
pub mod vfs;

pub use session::{EntityRequest, Session, SessionBuilder};
