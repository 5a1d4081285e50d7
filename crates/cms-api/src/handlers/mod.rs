//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod health;
pub mod hooks;
pub mod plugins;
pub mod posts;
