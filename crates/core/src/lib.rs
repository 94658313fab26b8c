//! Taskie Core - Shared domain types and the permission model.
//!
//! This crate provides the types used across all Taskie components:
//! - `server` - HTTP API for tasks, locations, and company updates
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The access-control decision table lives here so that every
//! caller consults the same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, statuses
//! - [`permission`] - Identities, actions, and the decision function

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod permission;
pub mod types;

pub use permission::{AccessPolicy, Action, DeletePolicy, Identity, Permissions, Principal, can_perform};
pub use types::*;
