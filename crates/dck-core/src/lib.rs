//! # dck-core
//!
//! Core contracts for DCK data sources.
//!
//! This crate provides the foundational types shared by every concrete data
//! source: the entity-descriptor seam, the normalized record shape, the
//! asynchronous CRUD contract, and the error taxonomy.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and conversions from transport-level failures
//! - [`entity`] - Entity descriptors naming a remote collection and its keys
//! - [`record`] - Normalized result records and attribute payloads
//! - [`source`] - The generic asynchronous `DataSource` contract

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod entity;
pub mod error;
pub mod record;
pub mod source;

// Re-export commonly used types
pub use entity::{DbEntity, EntityDescriptor};
pub use error::{Error, Result};
pub use record::{AttributeMap, Record};
pub use source::{DataSource, DeleteOptions, DeleteOutcome, QueryOptions};
