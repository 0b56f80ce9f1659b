//! # gq-core
//!
//! Core types and utilities for the grid gateway.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - The grid error taxonomy and its HTTP mapping
//! - Result type aliases
//! - Identifier and row type aliases
//! - Configuration types

pub mod config;
pub mod error;
pub mod traits;

pub use error::*;
pub use traits::*;
