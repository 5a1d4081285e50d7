//! Database migration command.

use cms_core::config::AppConfig;
use cms_core::error::AppError;
use cms_database::DatabasePool;
use cms_database::migration::run_migrations;

use crate::output;

/// Execute the migrate command
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if !config.database.is_configured() {
        return Err(AppError::configuration(
            "database.url is not set; nothing to migrate",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;

    output::print_success("Migrations applied");
    Ok(())
}
