//! # cms-api
//!
//! HTTP API layer for CMS Pro built on Axum.
//!
//! Provides the REST endpoints for plugins, hooks, the admin menu, the
//! dashboard and posts, plus bearer-token authentication, CORS, request
//! logging and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Stores, build_app, build_state, serve};
pub use error::ApiError;
pub use state::AppState;
