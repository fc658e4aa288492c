//! Data models for the City Temperature API.
//!
//! This module contains the request/response models exposed over HTTP and the
//! request-scoped weather values passed between services.

pub mod api;
pub mod weather;

pub use api::*;
pub use weather::*;
