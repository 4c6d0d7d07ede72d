use serde_json::json;

use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = connect(config).await?;

    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_success(
        &output_format,
        "Document schema is up to date",
        Some(json!({ "table": "documents" })),
    )
}
