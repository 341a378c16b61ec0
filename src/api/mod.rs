//! HTTP boundary
//!
//! Three routes around the scheduler, payload-compatible with the
//! service's polling clients:
//!
//! - `POST /requests` - submit a bulk scrape, returns `{"uuid": ..}`
//! - `GET /progress?uuid=` - poll progress, status `"200"`/`"901"`
//! - `GET /getfile?uuid=` - fetch the packaged artifact reference
//!
//! Pollers always get a well-formed status payload, never a raw fault.

pub mod routes;

pub use routes::{getfile, progress, submit};
