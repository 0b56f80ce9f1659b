//! API request handlers

pub mod grids;
pub mod root;
