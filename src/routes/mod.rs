//! Route construction.

pub mod api;
