//! tests/cache_tests.rs - Query cache store and view behaviour

#[cfg(test)]
mod tests {
    use crate::{
        cache::{address, filtered_address_prefix, CacheAddress, CacheError, QueryCacheManager, QueryView},
        config::Config,
        models::{FilterDescriptor, Scope},
        validation::ValidationError,
    };
    use chrono::NaiveDate;
    use futures::future::join_all;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    type Rows = Vec<String>;

    fn setup() -> QueryCacheManager<Rows> {
        QueryCacheManager::new(100, Duration::from_secs(60))
    }

    fn rows(names: &[&str]) -> Rows {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn january() -> FilterDescriptor {
        FilterDescriptor::range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_cache_hit_and_miss() {
        let cache = setup();
        let key = address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024));

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), rows(&["checking"])).await;
        assert_eq!(cache.get(&key).await, Some(rows(&["checking"])));

        // Same filter built another way hits the same entry
        let parsed: FilterDescriptor =
            serde_json::from_str(r#"{"month":3,"dateMode":"single","year":2024}"#).unwrap();
        assert_eq!(
            cache.get(&address(&Scope::ACCOUNTS, &parsed)).await,
            Some(rows(&["checking"]))
        );

        // Different month misses
        let other = address(&Scope::ACCOUNTS, &FilterDescriptor::single(4, 2024));
        assert!(cache.get(&other).await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_result() {
        let cache = setup();
        let key = address(&Scope::EXPENSES, &FilterDescriptor::single(3, 2024));
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(key.clone(), async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(rows(&["rent"]))
                })
                .await
                .unwrap();
            assert_eq!(value, rows(&["rent"]));
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_coalesce() {
        let cache = setup();
        let key = address(&Scope::INCOMES, &FilterDescriptor::single(6, 2024));
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks = (0..20).map(|_| {
            let cache = cache.clone();
            let key = key.clone();
            let fetches = fetches.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key, async move {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(rows(&["salary"]))
                    })
                    .await
            })
        });

        for result in join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap(), rows(&["salary"]));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1, "Fetcher should run once");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = setup();
        let key = address(&Scope::ACCOUNTS, &FilterDescriptor::all());

        let result = cache
            .get_or_fetch(key.clone(), async { Err::<Rows, _>("503 from api".to_string()) })
            .await;
        match result {
            Err(CacheError::Fetch { address, message }) => {
                assert_eq!(address, "accounts");
                assert!(message.contains("503"));
            }
            other => panic!("Expected fetch error, got {:?}", other),
        }
        assert!(cache.get(&key).await.is_none());

        let retried = cache
            .get_or_fetch(key, async { Ok::<_, String>(rows(&["checking"])) })
            .await
            .unwrap();
        assert_eq!(retried, rows(&["checking"]));
    }

    #[tokio::test]
    async fn test_empty_address_never_fetches() {
        let cache = setup();
        let fetches = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch(CacheAddress::empty(), async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(rows(&["x"]))
            })
            .await;

        assert!(matches!(result, Err(CacheError::EmptyAddress)));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);

        cache.insert(CacheAddress::empty(), rows(&["x"])).await;
        assert!(cache.get(&CacheAddress::empty()).await.is_none());
    }

    #[tokio::test]
    async fn test_filtered_prefix_invalidation() {
        let cache = setup();
        let single = address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024));
        let all = address(&Scope::ACCOUNTS, &FilterDescriptor::all());
        let range = address(&Scope::ACCOUNTS, &january());
        let other_scope = address(&Scope::EXPENSES, &FilterDescriptor::single(3, 2024));

        for key in [&single, &all, &range, &other_scope] {
            cache.insert(key.clone(), rows(&["row"])).await;
        }

        cache.invalidate_filtered(&Scope::ACCOUNTS).unwrap();

        assert!(cache.get(&single).await.is_none(), "SINGLE entry should be invalidated");
        assert!(cache.get(&all).await.is_some(), "ALL entry should survive");
        assert!(cache.get(&range).await.is_some(), "RANGE entry should survive");
        assert!(cache.get(&other_scope).await.is_some(), "Other scope should survive");
    }

    #[tokio::test]
    async fn test_filtered_invalidation_on_period_aware_scope() {
        let cache = setup();
        let all = address(&Scope::EXPENSES, &FilterDescriptor::all());
        let single = address(&Scope::EXPENSES, &FilterDescriptor::single(3, 2024));
        let range = address(&Scope::EXPENSES, &january());
        let search = address(&Scope::EXPENSES, &FilterDescriptor::all().with_search("rent"));

        for key in [&all, &single, &range, &search] {
            cache.insert(key.clone(), rows(&["row"])).await;
        }

        cache.invalidate_filtered(&Scope::EXPENSES).unwrap();

        assert!(cache.get(&all).await.is_none(), "ALL entry lives under the filter prefix");
        assert!(cache.get(&single).await.is_none(), "SINGLE entry should be invalidated");
        assert!(cache.get(&range).await.is_some(), "RANGE entry should survive");
        assert!(cache.get(&search).await.is_some(), "Search entry should survive");
    }

    #[tokio::test]
    async fn test_scope_invalidation() {
        let cache = setup();
        let keys = [
            address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024)),
            address(&Scope::ACCOUNTS, &FilterDescriptor::all()),
            address(&Scope::ACCOUNTS, &january()),
            address(&Scope::ACCOUNTS, &FilterDescriptor::all().with_search("bank")),
        ];
        let other = address(&Scope::EXPENSE_CATEGORIES, &FilterDescriptor::all());

        for key in &keys {
            cache.insert(key.clone(), rows(&["row"])).await;
        }
        cache.insert(other.clone(), rows(&["food"])).await;

        cache.invalidate_scope(&Scope::ACCOUNTS).unwrap();

        for key in &keys {
            assert!(cache.get(key).await.is_none(), "{} should be invalidated", key);
        }
        assert_eq!(cache.get(&other).await, Some(rows(&["food"])));
    }

    #[tokio::test]
    async fn test_entries_after_invalidation_are_kept() {
        let cache = setup();
        let key = address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024));

        cache.insert(key.clone(), rows(&["old"])).await;
        cache
            .invalidate_prefix(&filtered_address_prefix(&Scope::ACCOUNTS))
            .unwrap();
        assert!(cache.get(&key).await.is_none());

        // Let the clock move past the invalidation before writing again
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.insert(key.clone(), rows(&["new"])).await;
        assert_eq!(cache.get(&key).await, Some(rows(&["new"])));
    }

    #[tokio::test]
    async fn test_empty_prefix_invalidates_nothing() {
        let cache = setup();
        let key = address(&Scope::ACCOUNTS, &FilterDescriptor::all());
        cache.insert(key.clone(), rows(&["checking"])).await;

        cache.invalidate_prefix(&CacheAddress::empty()).unwrap();
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_exact_invalidation() {
        let cache = setup();
        let march = address(&Scope::ACCOUNTS, &FilterDescriptor::single(3, 2024));
        let april = address(&Scope::ACCOUNTS, &FilterDescriptor::single(4, 2024));
        cache.insert(march.clone(), rows(&["a"])).await;
        cache.insert(april.clone(), rows(&["b"])).await;

        cache.invalidate(&march).await;
        assert!(cache.get(&march).await.is_none());
        assert!(cache.get(&april).await.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache: QueryCacheManager<Rows> = QueryCacheManager::new(10, Duration::from_millis(100));
        let key = address(&Scope::ACCOUNTS, &FilterDescriptor::all());

        cache.insert(key.clone(), rows(&["checking"])).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get(&key).await.is_none(), "Entry should expire after TTL");
    }

    #[tokio::test]
    async fn test_cancelled_fetch_writes_nothing() {
        let cache = setup();
        let key = address(&Scope::EXPENSES, &FilterDescriptor::single(1, 2024));
        let cancel = tokio_util::sync::CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = cache
            .fetch_cancellable(
                key.clone(),
                async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok::<_, String>(rows(&["late"]))
                },
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(CacheError::Superseded(_))));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_view_supersedes_in_flight_fetch() {
        let cache = setup();
        let view = Arc::new(QueryView::new(
            Scope::EXPENSES,
            cache.clone(),
            FilterDescriptor::single(1, 2024),
        ));
        let january_key = view.address().await;

        let slow_view = view.clone();
        let slow = tokio::spawn(async move {
            slow_view
                .load(|_| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok::<_, String>(rows(&["january"]))
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        view.set_filter(FilterDescriptor::single(2, 2024)).await;

        let result = slow.await.unwrap();
        assert!(matches!(result, Err(CacheError::Superseded(_))));
        assert!(cache.get(&january_key).await.is_none());

        let february = view
            .load(|filter| async move {
                assert_eq!(filter.month, Some(2));
                Ok::<_, String>(rows(&["february"]))
            })
            .await
            .unwrap();
        assert_eq!(february, rows(&["february"]));
        assert_eq!(
            cache.get(&view.address().await).await,
            Some(rows(&["february"]))
        );
    }

    #[tokio::test]
    async fn test_view_tracks_current_filter() {
        let view: QueryView<Rows> =
            QueryView::new(Scope::INCOMES, setup(), FilterDescriptor::single(1, 2024));
        assert_eq!(view.filter().await, FilterDescriptor::single(1, 2024));
        assert_eq!(view.scope(), &Scope::INCOMES);

        let search = FilterDescriptor::all().with_search("salary");
        view.set_filter(search.clone()).await;
        assert_eq!(view.filter().await, search);
        assert_eq!(view.address().await.len(), 2);
    }

    #[tokio::test]
    async fn test_view_same_filter_keeps_fetch() {
        let cache = setup();
        let view = Arc::new(QueryView::new(
            Scope::ACCOUNTS,
            cache.clone(),
            FilterDescriptor::single(5, 2024),
        ));

        let slow_view = view.clone();
        let slow = tokio::spawn(async move {
            slow_view
                .load(|_| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, String>(rows(&["may"]))
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        view.set_filter(FilterDescriptor::single(5, 2024)).await;

        assert_eq!(slow.await.unwrap().unwrap(), rows(&["may"]));
    }

    #[tokio::test]
    async fn test_view_rejects_invalid_filter() {
        let cache = setup();
        let broken = FilterDescriptor::single(13, 2024);
        let view = QueryView::new(Scope::ACCOUNTS, cache, broken);

        let result = view
            .load(|_| async { Ok::<_, String>(rows(&["never"])) })
            .await;

        match result {
            Err(CacheError::InvalidFilter(ValidationError::InvalidParameter(msg))) => {
                assert!(msg.contains("month"));
            }
            other => panic!("Expected invalid filter, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_from_config() {
        let config = Config {
            cache_ttl: Duration::from_secs(5),
            cache_max_capacity: 10,
            ..Config::default()
        };
        let cache: QueryCacheManager<Rows> = crate::cache::init_cache(&config);

        let key = address(&Scope::CUSTOM_FIELDS, &FilterDescriptor::all());
        cache.insert(key.clone(), rows(&["project"])).await;
        assert_eq!(cache.entry_count().await, 1);
    }
}
