//! Plugins compiled into the server.

pub mod analytics;
pub mod social_share;

use std::sync::Arc;

use cms_database::store::ContentStore;

use crate::traits::PluginModule;

pub use analytics::AnalyticsModule;
pub use social_share::SocialShareModule;

/// Every built-in module.
pub fn builtin(content: Arc<dyn ContentStore>) -> Vec<Arc<dyn PluginModule>> {
    vec![
        Arc::new(SocialShareModule),
        Arc::new(AnalyticsModule::new(content)),
    ]
}
