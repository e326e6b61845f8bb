use finance_query_cache::{
    cache::{address, QueryCacheManager, QueryView},
    config::Config,
    models::{FilterDescriptor, Scope},
    CacheError,
};
use futures::future::join_all;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting query cache concurrency checks...");

    let config = Config::from_env();
    let store: QueryCacheManager<Vec<String>> = QueryCacheManager::from_config(&config);

    // Test 1: concurrent identical requests share one fetch
    info!("Test 1: Coalescing concurrent fetches for one address");
    let fetches = Arc::new(AtomicUsize::new(0));
    let key = address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024));
    let start = Instant::now();

    let tasks = (0..50).map(|_| {
        let store = store.clone();
        let key = key.clone();
        let fetches = fetches.clone();
        tokio::spawn(async move {
            store
                .get_or_fetch(key, async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, String>(vec!["checking".to_string(), "savings".to_string()])
                })
                .await
        })
    });

    for result in join_all(tasks).await {
        let accounts = result??;
        assert_eq!(accounts.len(), 2);
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1, "Expected exactly one fetch");
    info!("✅ 50 callers served by one fetch in {:?}", start.elapsed());

    // Test 2: a filter change discards the in-flight fetch
    info!("Test 2: Superseding an in-flight fetch");
    let view = Arc::new(QueryView::new(
        Scope::EXPENSES,
        store.clone(),
        FilterDescriptor::single(1, 2024),
    ));
    let stale_address = view.address().await;

    let slow_view = view.clone();
    let slow = tokio::spawn(async move {
        slow_view
            .load(|_| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok::<_, String>(vec!["stale".to_string()])
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    view.set_filter(FilterDescriptor::single(2, 2024)).await;

    match slow.await? {
        Err(CacheError::Superseded(addr)) => info!("✅ Superseded fetch for {} discarded", addr),
        other => return Err(format!("Expected superseded fetch, got {:?}", other).into()),
    }
    assert!(store.get(&stale_address).await.is_none(), "Stale result must not be cached");

    // Test 3: prefix invalidation
    info!("Test 3: Prefix invalidation");
    store.invalidate_filtered(&Scope::ACCOUNTS)?;
    assert!(store.get(&key).await.is_none(), "Filtered entry should be gone");
    info!("✅ Filtered entries invalidated");

    info!("All concurrency checks passed");
    Ok(())
}
