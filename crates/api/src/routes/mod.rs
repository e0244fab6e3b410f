//! HTTP route handlers

pub mod alerts;
pub mod events;
pub mod readings;
