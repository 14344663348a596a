//! Data Transfer Objects of the `jobs.v1` package
//!
//! Each DTO is a protobuf message implementing [`crate::message::JobsMessage`].

pub mod pipelines;
