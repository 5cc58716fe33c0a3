use chrono::Local;
use dotenvy::dotenv;
use expense_ledger::{
    config::{database, settings},
    core::{breakdown, report, trend},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load report settings
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Open the record store
    let database_url = database::get_database_url();
    if database_url == database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Produce both reports
    let (start, end) = settings.report.window(Local::now().date_naive());
    let category_breakdown = breakdown::generate_breakdown(&db, start, end)
        .await
        .inspect_err(|e| error!("Failed to compute category breakdown: {}", e))?;
    info!("\n{}", report::format_breakdown_summary(&category_breakdown));

    let monthly_trend = trend::generate_monthly_trend(&db)
        .await
        .inspect_err(|e| error!("Failed to compute monthly trend: {}", e))?;
    info!(
        "\n{}",
        report::format_trend_summary(&monthly_trend, settings.report.display_order)
    );

    Ok(())
}
