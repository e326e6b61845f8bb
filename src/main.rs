// Initialize configuration
// Set up logging
// Initialize cache
// Load a few filtered views against a simulated remote API
// Invalidate after a mutation and reload

use finance_query_cache::{
    cache::{self, QueryView},
    config::Config,
    models::{build_patch, DateField, FieldUpdate, FilterDescriptor, Page, Scope, Transaction},
};

use chrono::NaiveDate;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Stands in for the REST API; only the filter shape matters here
async fn fetch_expenses(filter: FilterDescriptor) -> Result<Page<Transaction>, String> {
    tokio::time::sleep(Duration::from_millis(50)).await;

    let due_date = match (filter.year, filter.month) {
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 10),
        _ => filter.from,
    }
    .or_else(|| NaiveDate::from_ymd_opt(2024, 1, 1))
    .ok_or_else(|| "no usable date".to_string())?;

    let description = filter
        .search_term
        .clone()
        .unwrap_or_else(|| "Rent".to_string());

    Ok(Page {
        data: vec![Transaction {
            id: "exp-1".to_string(),
            description,
            amount: 1200.0,
            due_date,
            confirmation_date: None,
            category_id: Some("housing".to_string()),
            account_id: Some("checking".to_string()),
        }],
        total: 1,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting finance-query-cache demo");
    tracing::info!("Configuration loaded: {:?}", config);

    let store = cache::init_cache::<Page<Transaction>>(&config);
    let view = QueryView::new(
        Scope::EXPENSES,
        store.clone(),
        FilterDescriptor::single(3, 2024).with_date_field(DateField::DueDate),
    );

    let page = view.load(fetch_expenses).await?;
    tracing::info!("Loaded {} expenses at {}", page.total, view.address().await);

    // Second load is served from cache
    view.load(fetch_expenses).await?;

    view.set_filter(FilterDescriptor::all().with_search("rent")).await;
    let page = view.load(fetch_expenses).await?;
    tracing::info!("Search returned {} expenses at {}", page.total, view.address().await);

    let updates = [
        FieldUpdate::DueDate(NaiveDate::from_ymd_opt(2024, 4, 10).ok_or("bad date")?),
        FieldUpdate::Amount(1250.0),
    ];
    tracing::info!("Sending patch: {}", build_patch(&updates));
    store.invalidate_scope(view.scope())?;

    tracing::info!("Live cache entries: {}", store.entry_count().await);

    Ok(())
}
