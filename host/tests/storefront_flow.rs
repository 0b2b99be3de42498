//! # 推广区域集成测试
//!
//! 测试 FeedSource → Runtime → CommandExecutor → RenderState 的完整链路。
//! 全部使用虚拟时间，不依赖真实等待。

use std::fs;
use std::time::Duration;

use promo_host::{
    AppConfig, BannerView, FsFeedSource, HostEvent, JsonFileStore, RecordingTracker, Scenario,
    StaticFeedSource, Storefront, TimedEvent, run_simulation,
};
use promo_runtime::store::KeyValueStore;
use promo_runtime::{
    CarouselItem, EventDisposition, ItemId, MemoryStore, PromotionalItem, RotationPhase,
};

fn promotions() -> Vec<PromotionalItem> {
    vec![
        PromotionalItem::new("spring", "Spring sale")
            .with_priority(5)
            .with_cta("Shop", "/deals/spring"),
        PromotionalItem::new("chef", "Meet the chef").with_priority(9),
        PromotionalItem::new("bread", "Fresh bread").with_priority(1),
    ]
}

fn carousel() -> Vec<CarouselItem> {
    vec![
        CarouselItem::new("eggs", "Eggs")
            .with_media("eggs.jpg")
            .with_target("/products/eggs"),
        CarouselItem::new("milk", "Milk").with_badge("Low stock"),
    ]
}

fn storefront_with(feed: StaticFeedSource, tracker: RecordingTracker) -> Storefront {
    Storefront::new(
        AppConfig::default(),
        Box::new(feed),
        Box::new(tracker),
        Box::new(MemoryStore::new()),
    )
}

fn mounted(tracker: RecordingTracker) -> Storefront {
    let mut storefront = storefront_with(StaticFeedSource::new(promotions(), carousel()), tracker);
    storefront.mount();
    storefront
}

/// 以 100ms 步长推进
fn run_for(storefront: &mut Storefront, millis: u64) {
    for _ in 0..millis / 100 {
        storefront.update(Duration::from_millis(100));
    }
}

/// 货架区域内的点（默认区域 y 从 480 到 840）
fn over_shelf() -> (f64, f64) {
    (100.0, 600.0)
}

#[test]
fn test_mount_shows_highest_priority_first() {
    let storefront = mounted(RecordingTracker::new());
    let state = storefront.render_state();

    assert_eq!(state.current_slide(), Some(&ItemId::new("chef")));
    assert_eq!(state.shelf.card_count, 4);
    assert_eq!(
        state.shelf.cards[0].media.as_ref().map(|m| m.path.as_str()),
        Some("/api/v1/uploads/products/eggs.jpg")
    );
}

#[test]
fn test_auto_rotation_follows_priority_order() {
    let mut storefront = mounted(RecordingTracker::new());

    run_for(&mut storefront, 4400);
    assert!(!storefront.render_state().is_transitioning());

    run_for(&mut storefront, 100);
    assert!(storefront.render_state().is_transitioning());

    run_for(&mut storefront, 500);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("spring"))
    );

    run_for(&mut storefront, 5000);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("bread"))
    );

    run_for(&mut storefront, 5000);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("chef"))
    );
    assert_eq!(storefront.render_state().slide_changes, 3);
}

#[test]
fn test_cta_tracks_and_navigates() {
    let tracker = RecordingTracker::new();
    let mut storefront = mounted(tracker.clone());

    storefront.dispatch(HostEvent::Next);
    run_for(&mut storefront, 300);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("spring"))
    );

    storefront.dispatch(HostEvent::ActivateCta);
    assert_eq!(tracker.clicks(), vec![ItemId::new("spring")]);
    assert_eq!(
        storefront.render_state().navigations,
        vec!["/deals/spring".to_string()]
    );
}

#[test]
fn test_tracking_failure_does_not_block_navigation() {
    let tracker = RecordingTracker::failing();
    let mut storefront = mounted(tracker.clone());

    storefront.dispatch(HostEvent::JumpTo { index: 1 });
    run_for(&mut storefront, 300);
    storefront.dispatch(HostEvent::ActivateCta);

    assert_eq!(tracker.clicks().len(), 1);
    assert_eq!(
        storefront.render_state().navigations,
        vec!["/deals/spring".to_string()]
    );
}

#[test]
fn test_dismiss_stops_rotation() {
    let mut storefront = mounted(RecordingTracker::new());

    storefront.dispatch(HostEvent::Next);
    storefront.dispatch(HostEvent::Dismiss);
    assert_eq!(storefront.rotation().pending_timers(), 0);

    run_for(&mut storefront, 60_000);
    let state = storefront.render_state();
    assert_eq!(state.banner, BannerView::Dismissed);
    assert_eq!(state.slide_changes, 0);

    // 关闭后的输入被忽略
    storefront.dispatch(HostEvent::ActivateCta);
    assert!(storefront.render_state().navigations.is_empty());
}

#[test]
fn test_unavailable_feed_shows_fallback() {
    let mut storefront = storefront_with(StaticFeedSource::unavailable(), RecordingTracker::new());
    storefront.mount();

    let state = storefront.render_state();
    assert_eq!(state.banner, BannerView::Fallback);
    assert_eq!(state.shelf.card_count, 0);
    assert_eq!(storefront.rotation().state().phase, RotationPhase::Empty);

    run_for(&mut storefront, 1000);
    assert_eq!(storefront.render_state().shelf.offset_px, 0.0);
}

#[test]
fn test_hover_pauses_shelf() {
    let mut storefront = mounted(RecordingTracker::new());
    let (x, y) = over_shelf();

    run_for(&mut storefront, 400);
    assert_eq!(storefront.render_state().shelf.offset_px, 2.0);

    storefront.dispatch(HostEvent::PointerEnter { x, y });
    run_for(&mut storefront, 1000);
    assert_eq!(storefront.render_state().shelf.offset_px, 2.0);

    // 在收藏按钮上切换收藏不会打断暂停
    storefront.dispatch(HostEvent::ToggleFavorite {
        id: ItemId::new("eggs"),
    });
    storefront.dispatch(HostEvent::PointerLeave { x: x + 5.0, y });
    run_for(&mut storefront, 200);
    assert_eq!(storefront.render_state().shelf.offset_px, 2.0);

    storefront.dispatch(HostEvent::PointerLeave { x, y: 100.0 });
    run_for(&mut storefront, 200);
    assert_eq!(storefront.render_state().shelf.offset_px, 3.0);
}

#[test]
fn test_wheel_remapped_only_over_shelf() {
    let mut storefront = mounted(RecordingTracker::new());
    let (x, y) = over_shelf();

    let disposition = storefront.dispatch(HostEvent::Wheel {
        x,
        y,
        delta_y: 120.0,
    });
    assert_eq!(disposition, EventDisposition::Consumed);
    assert_eq!(storefront.render_state().shelf.offset_px, 120.0);

    let disposition = storefront.dispatch(HostEvent::Wheel {
        x,
        y: 100.0,
        delta_y: 120.0,
    });
    assert_eq!(disposition, EventDisposition::PassThrough);
    assert_eq!(storefront.render_state().shelf.offset_px, 120.0);
}

#[test]
fn test_card_click_navigates() {
    let mut storefront = mounted(RecordingTracker::new());

    storefront.dispatch(HostEvent::ActivateCard {
        id: ItemId::new("eggs"),
    });
    storefront.dispatch(HostEvent::ActivateCard {
        id: ItemId::new("missing"),
    });

    assert_eq!(
        storefront.render_state().navigations,
        vec!["/products/eggs".to_string()]
    );
}

#[test]
fn test_location_change_refetches() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("promotions.json"),
        r#"[{ "id": 1, "title": "Everywhere" }, { "id": 2, "title": "Also" }]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("promotions.downtown.json"),
        r#"{ "data": [{ "id": "dt", "title": "Downtown only" }] }"#,
    )
    .unwrap();
    fs::write(dir.path().join("carousel.json"), r#"[{ "id": "c" }]"#).unwrap();

    let mut storefront = Storefront::new(
        AppConfig::default(),
        Box::new(FsFeedSource::new(dir.path())),
        Box::new(RecordingTracker::new()),
        Box::new(MemoryStore::new()),
    );
    storefront.mount();
    run_for(&mut storefront, 5000);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("2"))
    );

    storefront.dispatch(HostEvent::ChangeLocation {
        location: Some("downtown".to_string()),
    });

    assert_eq!(storefront.location(), Some("downtown"));
    assert_eq!(storefront.rotation().state().session, 2);
    assert_eq!(storefront.rotation().state().current_index, 0);
    assert_eq!(
        storefront.render_state().current_slide(),
        Some(&ItemId::new("dt"))
    );
    // 单条横幅不再轮播
    assert_eq!(storefront.rotation().pending_timers(), 0);
}

#[test]
fn test_favorites_persist_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");

    let mut storefront = Storefront::new(
        AppConfig::default(),
        Box::new(StaticFeedSource::new(promotions(), carousel())),
        Box::new(RecordingTracker::new()),
        Box::new(JsonFileStore::open(&path)),
    );
    storefront.mount();
    storefront.dispatch(HostEvent::ToggleFavorite {
        id: ItemId::new("milk"),
    });
    assert!(storefront.favorites().contains(&ItemId::new("milk")));

    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.get("favorites"), Some(r#"["milk"]"#.to_string()));
}

#[test]
fn test_simulation_runs_scenario() {
    let storefront = storefront_with(
        StaticFeedSource::new(promotions(), carousel()),
        RecordingTracker::new(),
    );
    let scenario = Scenario::new(vec![
        TimedEvent {
            at_ms: 1000,
            event: HostEvent::Next,
        },
        TimedEvent {
            at_ms: 2000,
            event: HostEvent::Dismiss,
        },
    ]);

    let report = run_simulation(
        storefront,
        scenario,
        Duration::from_secs(10),
        Duration::from_millis(100),
    );

    assert_eq!(report.frames, 100);
    assert_eq!(report.events, 2);
    assert_eq!(report.final_state.banner, BannerView::Dismissed);
    assert_eq!(report.final_state.slide_changes, 1);
}
