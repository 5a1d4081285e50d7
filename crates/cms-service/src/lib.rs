//! # cms-service
//!
//! Business logic service layer for CMS Pro. Services fire plugin hooks
//! around the operations the host owns (saving and rendering content,
//! building the admin menu and dashboard).
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod content;
pub mod dashboard;

pub use content::ContentService;
pub use dashboard::DashboardService;
