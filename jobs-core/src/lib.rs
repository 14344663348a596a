//! Jobs Core
//!
//! Protocol messages of the `jobs.v1` schema used to control a job queue.
//!
//! This crate contains:
//! - DTOs: the `jobs.v1` messages (`Pipelines`)
//! - Message base: binary and JSON codecs, construction from init data
//! - Schema registry: lazily built descriptors of `jobs.proto`
//! - Repeated fields: typed containers and validation of dynamic input
//!
//! # Example
//!
//! ```
//! use jobs_core::{JobsMessage, Pipelines, PipelinesInit};
//!
//! let mut request = Pipelines::from_init(PipelinesInit::default().with_pipelines(["emails"]));
//! request.set_pipelines(["emails", "reports"]);
//!
//! let bytes = request.serialize_to_bytes();
//! let decoded = Pipelines::parse_from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.pipelines(), ["emails", "reports"]);
//! ```

pub mod dto;
pub mod error;
pub mod message;
pub mod repeated;
pub mod schema;

pub use dto::pipelines::{Pipelines, PipelinesInit};
pub use error::{JobsError, Result};
pub use message::JobsMessage;
pub use repeated::{FieldType, IntoRepeatedField, RepeatedField};
