mod common;

use bursa_core::config::ListingConfig;
use bursa_market::controller::ListingController;
use bursa_market::listing::LoadStatus;
use common::MockProvider;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn controller(mock: MockProvider) -> (Arc<MockProvider>, ListingController) {
    let provider = Arc::new(mock);
    let controller = ListingController::new(provider.clone(), &ListingConfig::default());
    (provider, controller)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test(start_paused = true)]
async fn test_start_loads_first_page() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    assert_eq!(controller.view().status, LoadStatus::Idle);

    controller.start();
    settle().await;

    let view = controller.view();
    assert_eq!(view.status, LoadStatus::Ready);
    assert_eq!(view.page_index, 1);
    assert_eq!(view.page_size, 20);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.total_items, 45);
    assert_eq!(view.items.len(), 20);
    assert_eq!(view.sectors, vec!["Financials", "Energy", "Infrastructures"]);
    assert_eq!(provider.listings(), vec![(1, 20)]);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_typing_issues_one_search() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    controller.start();
    settle().await;

    controller.set_query("S");
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.set_query("St");
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.set_query("Stock 1");
    tokio::time::sleep(Duration::from_millis(990)).await;
    assert!(provider.searches().is_empty());
    assert!(!controller.view().searching);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(provider.searches(), vec!["Stock 1".to_string()]);

    let view = controller.view();
    assert!(view.searching);
    assert_eq!(view.status, LoadStatus::Ready);
    assert_eq!(view.items.len(), 11);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.page_index, 1);
    assert_eq!(view.total_items, 11);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_page_response_is_ignored() {
    let mut mock = MockProvider::with_stocks(45);
    mock.page_delays.insert(2, Duration::from_millis(500));
    mock.page_delays.insert(3, Duration::from_millis(10));
    let (provider, controller) = controller(mock);
    controller.start();
    settle().await;

    controller.go_to_page(2);
    controller.go_to_page(3);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(provider.listings(), vec![(1, 20), (2, 20), (3, 20)]);
    let view = controller.view();
    assert_eq!(view.page_index, 3);
    assert_eq!(view.items.len(), 5);
    assert_eq!(view.items[0].code, "S040");
}

#[tokio::test(start_paused = true)]
async fn test_clearing_query_cancels_pending_search() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    controller.start();
    settle().await;

    controller.set_query("St");
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.set_query("");
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(provider.searches().is_empty());
    assert_eq!(provider.listings(), vec![(1, 20)]);
    assert!(!controller.view().searching);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_search_returns_to_first_page_without_delay() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    controller.start();
    settle().await;
    controller.go_to_page(2);
    settle().await;

    controller.set_query("Stock 2");
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(controller.view().searching);

    controller.set_query("");
    settle().await;

    let view = controller.view();
    assert!(!view.searching);
    assert_eq!(view.page_index, 1);
    assert_eq!(view.items.len(), 20);
    assert_eq!(provider.listings(), vec![(1, 20), (2, 20), (1, 20)]);
}

#[tokio::test(start_paused = true)]
async fn test_page_size_change_refetches_first_page() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    controller.start();
    settle().await;
    controller.go_to_page(3);
    settle().await;

    controller.set_page_size(50);
    settle().await;

    assert_eq!(provider.listings().last(), Some(&(1, 50)));
    let view = controller.view();
    assert_eq!(view.page_index, 1);
    assert_eq!(view.page_size, 50);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.items.len(), 45);
}

#[tokio::test(start_paused = true)]
async fn test_sector_filter_does_not_refetch() {
    let (provider, controller) = controller(MockProvider::with_stocks(45));
    controller.start();
    settle().await;

    controller.select_sector(Some("Energy"));
    settle().await;

    let view = controller.view();
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(view.selected_sector.as_deref(), Some("Energy"));
    assert_eq!(view.items.len(), 7);
    assert!(view.items.iter().all(|s| s.sector() == Some("Energy")));
    assert_eq!(view.total_items, 45);

    controller.clear_filters();
    settle().await;
    assert_eq!(controller.view().items.len(), 20);
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_failure() {
    let mock = MockProvider::with_stocks(45);
    mock.fail_listing.store(true, Ordering::SeqCst);
    let (provider, controller) = controller(mock);
    controller.start();
    settle().await;
    assert!(matches!(controller.view().status, LoadStatus::Failed(_)));

    provider.fail_listing.store(false, Ordering::SeqCst);
    controller.retry();
    settle().await;
    assert_eq!(controller.view().status, LoadStatus::Ready);
    assert_eq!(provider.listings().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_observe_loading_then_ready() {
    let (_, controller) = controller(MockProvider::with_stocks(45));
    let mut rx = controller.subscribe();

    controller.start();
    assert_eq!(rx.borrow_and_update().status, LoadStatus::Loading);

    let view = rx
        .wait_for(|v| v.status == LoadStatus::Ready)
        .await
        .unwrap()
        .clone();
    assert_eq!(view.items.len(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_late_search_response_does_not_replace_browse_page() {
    let mut mock = MockProvider::with_stocks(45);
    mock.search_delay = Duration::from_millis(500);
    let (provider, controller) = controller(mock);
    controller.start();
    settle().await;

    controller.set_query("Stock 1");
    tokio::time::sleep(Duration::from_millis(1010)).await;
    // 搜索请求已发出但尚未返回
    assert_eq!(provider.searches(), vec!["Stock 1".to_string()]);
    assert_eq!(controller.view().status, LoadStatus::Loading);

    controller.set_query("");
    settle().await;
    assert!(!controller.view().searching);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let view = controller.view();
    assert_eq!(view.status, LoadStatus::Ready);
    assert!(!view.searching);
    assert_eq!(view.page_index, 1);
    assert_eq!(view.items.len(), 20);
    assert_eq!(view.items[0].code, "S000");
    assert_eq!(provider.listings(), vec![(1, 20), (1, 20)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_published_view_follows_last_transition() {
    for _ in 0..200 {
        let (_, controller) = controller(MockProvider::with_stocks(45));
        let mut rx = controller.subscribe();
        controller.start();

        let selectors: Vec<_> = (0..3)
            .map(|i| {
                let handle = controller.clone();
                std::thread::spawn(move || {
                    let sector = if i % 2 == 0 { "Energy" } else { "Financials" };
                    for _ in 0..20 {
                        handle.select_sector(Some(sector));
                    }
                })
            })
            .collect();
        for selector in selectors {
            selector.join().unwrap();
        }
        controller.select_sector(Some("Infrastructures"));

        let ready = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|v| v.status == LoadStatus::Ready),
        )
        .await
        .map(|r| r.is_ok());
        assert_eq!(ready, Ok(true));

        let view = controller.view();
        assert_eq!(view.status, LoadStatus::Ready);
        assert_eq!(view.selected_sector.as_deref(), Some("Infrastructures"));
        assert_eq!(view.items.len(), 6);
    }
}
