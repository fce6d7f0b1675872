use async_trait::async_trait;
use seatwatch_backend::engine::{MIN_INTERVAL, Notification, Notifier, POLL_INTERVAL};
use seatwatch_backend::obs::{CatalogOrigin, ProgramCatalog};
use seatwatch_backend::{ImmediateResult, Missing, QueryError, SeatSource, WatchEngine, WatchError};
use seatwatch_common::{SeatStatus, SubscriberId, WatchKey};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Seat source replaying a script per section; the last entry repeats forever
#[derive(Default)]
struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Result<SeatStatus, QueryError>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    delay: Duration,
}

impl ScriptedSource {
    fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Default::default() }
    }

    fn script(&self, section: &str, responses: Vec<Result<SeatStatus, QueryError>>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(section.to_string(), responses.into());
    }

    fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SeatSource for ScriptedSource {
    async fn query(&self, _provider_id: &str, section: &str) -> Result<SeatStatus, QueryError> {
        self.calls.lock().unwrap().push((section.to_string(), Instant::now()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get_mut(section) else {
            return Ok(SeatStatus::not_found());
        };
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or_else(|| Ok(SeatStatus::not_found()))
        }
    }
}

fn seats(capacity: u32, enrolled: u32) -> Result<SeatStatus, QueryError> {
    Ok(SeatStatus {
        found: true,
        course_code: "AAA 101".to_string(),
        course_name: "Test Course".to_string(),
        day: "Pazartesi".to_string(),
        time_slot: "0830/1129".to_string(),
        capacity,
        enrolled,
    })
}

fn setup(source: Arc<ScriptedSource>) -> (WatchEngine, UnboundedReceiver<Notification>) {
    let catalog = ProgramCatalog::new(
        vec![("AAA".to_string(), "1".to_string()), ("BBB".to_string(), "2".to_string())],
        CatalogOrigin::Remote,
    );
    let (notifier, rx) = Notifier::channel();
    (WatchEngine::new(Arc::new(catalog), source, notifier), rx)
}

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

const ALICE: SubscriberId = SubscriberId(1001);
const BOB: SubscriberId = SubscriberId(2002);

#[tokio::test(start_paused = true)]
async fn seat_opening_notifies_once_and_ends_watch() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![seats(30, 30), seats(30, 30), seats(30, 28)]);
    let (engine, mut rx) = setup(source.clone());

    let result = engine.submit(ALICE, "AAA", "11111").await.unwrap();
    assert!(matches!(result, ImmediateResult::WatchStarted(_)));
    assert_eq!(engine.status(ALICE).await, vec![WatchKey::new(ALICE, "AAA", "11111")]);

    // First poll: still 30/30
    tokio::time::sleep(POLL_INTERVAL + Duration::from_secs(1)).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(engine.status(ALICE).await.len(), 1);

    // Second poll: 28 enrolled
    tokio::time::sleep(POLL_INTERVAL).await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].key, WatchKey::new(ALICE, "AAA", "11111"));
    assert_eq!(notifications[0].status.open_seats(), 2);
    assert!(engine.status(ALICE).await.is_empty());

    // Timer is gone: no further queries or notifications
    let calls = source.call_count();
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(source.call_count(), calls);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_program_is_not_found_without_mutation() {
    let source = Arc::new(ScriptedSource::default());
    let (engine, _rx) = setup(source.clone());

    let result = engine.submit(ALICE, "ZZZ", "99999").await.unwrap();
    assert_eq!(result, ImmediateResult::NotFound(Missing::Program));
    assert_eq!(engine.active_watches().await, 0);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_section_is_not_found() {
    let source = Arc::new(ScriptedSource::default());
    let (engine, _rx) = setup(source.clone());

    let result = engine.submit(ALICE, "AAA", "424242").await.unwrap();
    assert_eq!(result, ImmediateResult::NotFound(Missing::Section));
    assert_eq!(engine.active_watches().await, 0);
}

#[tokio::test(start_paused = true)]
async fn available_section_is_not_watched() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![seats(30, 10)]);
    let (engine, mut rx) = setup(source.clone());

    let result = engine.submit(ALICE, "AAA", "11111").await.unwrap();
    match result {
        ImmediateResult::Available(status) => assert_eq!(status.open_seats(), 20),
        other => panic!("expected Available, got {:?}", other),
    }
    assert_eq!(engine.active_watches().await, 0);

    tokio::time::sleep(POLL_INTERVAL * 3).await;
    assert_eq!(source.call_count(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn resubmission_is_idempotent() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![seats(30, 30)]);
    let (engine, _rx) = setup(source);

    assert!(matches!(
        engine.submit(ALICE, "AAA", "11111").await.unwrap(),
        ImmediateResult::WatchStarted(_)
    ));
    assert!(matches!(
        engine.submit(ALICE, "aaa", "11111").await.unwrap(),
        ImmediateResult::AlreadyWatched(_)
    ));
    assert_eq!(engine.status(ALICE).await.len(), 1);

    // Another subscriber watching the same section gets its own watch
    assert!(matches!(
        engine.submit(BOB, "AAA", "11111").await.unwrap(),
        ImmediateResult::WatchStarted(_)
    ));
    assert_eq!(engine.active_watches().await, 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_submits_create_one_watch() {
    let source = Arc::new(ScriptedSource::with_delay(Duration::from_millis(300)));
    source.script("11111", vec![seats(30, 30)]);
    let (engine, _rx) = setup(source);

    let (a, b) = tokio::join!(
        engine.submit(ALICE, "AAA", "11111"),
        engine.submit(ALICE, "AAA", "11111")
    );
    let results = [a.unwrap(), b.unwrap()];

    let started = results.iter().filter(|r| matches!(r, ImmediateResult::WatchStarted(_))).count();
    let already = results.iter().filter(|r| matches!(r, ImmediateResult::AlreadyWatched(_))).count();
    assert_eq!((started, already), (1, 1));
    assert_eq!(engine.active_watches().await, 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_inflight_check_suppresses_notification() {
    let source = Arc::new(ScriptedSource::with_delay(Duration::from_secs(10)));
    source.script("11111", vec![seats(30, 30), seats(30, 20)]);
    let (engine, mut rx) = setup(source.clone());

    // Foreground query takes 10s; the timer starts once it returns
    assert!(matches!(
        engine.submit(ALICE, "AAA", "11111").await.unwrap(),
        ImmediateResult::WatchStarted(_)
    ));

    // First fire begins at +60s and its query is still running at +62s
    tokio::time::sleep(POLL_INTERVAL + Duration::from_secs(2)).await;
    assert_eq!(source.call_count(), 2);
    assert_eq!(engine.cancel(ALICE).await, 1);
    assert!(engine.status(ALICE).await.is_empty());

    tokio::time::sleep(POLL_INTERVAL * 3).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_one_leaves_other_watches() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![seats(30, 30), seats(30, 29)]);
    source.script("22222", vec![seats(10, 10), seats(10, 9)]);
    let (engine, mut rx) = setup(source);

    engine.submit(ALICE, "AAA", "11111").await.unwrap();
    engine.submit(ALICE, "BBB", "22222").await.unwrap();

    assert!(engine.cancel_one(&WatchKey::new(ALICE, "AAA", "11111")).await);
    assert!(!engine.cancel_one(&WatchKey::new(ALICE, "AAA", "11111")).await);
    assert_eq!(engine.status(ALICE).await, vec![WatchKey::new(ALICE, "BBB", "22222")]);

    tokio::time::sleep(POLL_INTERVAL * 2).await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].key.section(), "22222");
}

#[tokio::test(start_paused = true)]
async fn background_errors_keep_watch_active() {
    let source = Arc::new(ScriptedSource::default());
    source.script(
        "11111",
        vec![
            seats(30, 30),
            Err(QueryError::Timeout),
            Err(QueryError::UpstreamStatus(502)),
            Ok(SeatStatus::not_found()),
            seats(30, 29),
        ],
    );
    let (engine, mut rx) = setup(source);

    engine.submit(ALICE, "AAA", "11111").await.unwrap();

    tokio::time::sleep(POLL_INTERVAL * 3 + Duration::from_secs(1)).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(engine.status(ALICE).await.len(), 1);

    tokio::time::sleep(POLL_INTERVAL).await;
    assert_eq!(drain(&mut rx).len(), 1);
    assert!(engine.status(ALICE).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn foreground_error_creates_no_watch() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![Err(QueryError::ConnectionFailure("refused".into()))]);
    let (engine, _rx) = setup(source);

    let err = engine.submit(ALICE, "AAA", "11111").await.unwrap_err();
    assert!(matches!(err, WatchError::Upstream(QueryError::ConnectionFailure(_))));
    assert_eq!(engine.active_watches().await, 0);
}

#[tokio::test(start_paused = true)]
async fn foreground_and_background_queries_share_rate_limit() {
    let source = Arc::new(ScriptedSource::default());
    for section in ["1", "2", "3", "9"] {
        source.script(section, vec![seats(5, 5)]);
    }
    let (engine, _rx) = setup(source.clone());

    engine.submit(ALICE, "AAA", "1").await.unwrap();
    engine.submit(ALICE, "AAA", "2").await.unwrap();
    engine.submit(BOB, "AAA", "9").await.unwrap();

    // Land a foreground query right before the first background fire
    tokio::time::sleep(POLL_INTERVAL - Duration::from_millis(2500)).await;
    engine.submit(ALICE, "AAA", "3").await.unwrap();
    tokio::time::sleep(POLL_INTERVAL * 2).await;

    let calls = source.calls();
    let alice: Vec<Instant> = calls
        .iter()
        .filter(|(section, _)| section != "9")
        .map(|(_, at)| *at)
        .collect();
    let bob: Vec<Instant> = calls
        .iter()
        .filter(|(section, _)| section == "9")
        .map(|(_, at)| *at)
        .collect();

    assert!(alice.len() >= 7, "{} alice calls", alice.len());
    for pair in alice.windows(2) {
        assert!(pair[1] - pair[0] >= MIN_INTERVAL, "{:?}", pair);
    }

    // Bob was never held back by Alice's queries
    assert_eq!(bob[0], alice[1]);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_spacing_per_subscriber() {
    let source = Arc::new(ScriptedSource::default());
    for section in ["1", "2", "3", "4"] {
        source.script(section, vec![seats(5, 5)]);
    }
    let (engine, _rx) = setup(source.clone());

    let started = Instant::now();
    for section in ["1", "2", "3", "4"] {
        engine.submit(ALICE, "AAA", section).await.unwrap();
    }
    assert!(Instant::now() - started >= MIN_INTERVAL * 3);

    tokio::time::sleep(POLL_INTERVAL * 3).await;

    let calls = source.calls();
    assert!(calls.len() >= 12);
    for pair in calls.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= MIN_INTERVAL, "{:?}", pair);
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_polling() {
    let source = Arc::new(ScriptedSource::default());
    source.script("11111", vec![seats(30, 30)]);
    let (engine, _rx) = setup(source.clone());

    engine.submit(ALICE, "AAA", "11111").await.unwrap();
    engine.shutdown().await;

    tokio::time::sleep(POLL_INTERVAL * 3).await;
    assert_eq!(source.call_count(), 1);
}
