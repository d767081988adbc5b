//! User-pool data source for the Cognito Identity Provider protocol.
//!
//! This crate implements the generic [`dck_core::DataSource`] contract on top
//! of a managed user-pool API: entity collections map to user pools, records
//! map to pool users, and every operation is a thin pass-through to the remote
//! service with parameter mapping and error normalization.

#![deny(missing_docs)]

mod client;
mod config;
mod datasource;
pub mod user;

pub use client::{CognitoIdpClient, CognitoIdpClientBuilder, UserPoolApi};
pub use config::{CognitoConfig, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use datasource::CognitoDataSource;
pub use user::PoolUser;

/// Convenient result alias that reuses the core error type.
pub type Result<T> = dck_core::Result<T>;
