//! End-to-end handler behaviour against the in-memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use smartcollar_core::config::AlertConfig;
use smartcollar_core::{AlertType, DbPath, ManualClock, PetRef};
use smartcollar_notify::{NotifyError, PushMessage, PushOutcome, PushSender};
use smartcollar_storage::{MemoryStore, RealtimeStore};
use smartcollar_triggers::{
    AlertHandlers, HandlerOutcome, MonitorContext, SkipReason, TriggerRouter,
};

const START_MS: i64 = 1_700_000_000_000;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingSender {
    fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send_to_device(&self, token: &str, message: &PushMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((token.to_string(), message.clone()));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    sender: Arc<RecordingSender>,
    clock: Arc<ManualClock>,
    handlers: Arc<AlertHandlers>,
    router: TriggerRouter,
}

impl Harness {
    fn new(tree: Value) -> Self {
        let store = Arc::new(MemoryStore::from_value(tree));
        let sender = Arc::new(RecordingSender::default());
        let clock = Arc::new(ManualClock::new(START_MS));
        let ctx = MonitorContext::new(
            store.clone(),
            sender.clone(),
            clock.clone(),
            AlertConfig::default(),
        );
        let handlers = Arc::new(AlertHandlers::new(ctx));
        let router = TriggerRouter::new(handlers.clone());
        Self {
            store,
            sender,
            clock,
            handlers,
            router,
        }
    }

    async fn emit(&self, channel: &str, value: Value) -> HandlerOutcome {
        let path = format!("/users/u1/pets/rex/collar_data/{channel}");
        self.router.dispatch_raw(&path, value).await
    }

    async fn get(&self, raw: &str) -> Option<Value> {
        self.store.get(&DbPath::parse(raw)).await.unwrap()
    }

    async fn notifications(&self) -> Vec<Value> {
        match self.get("/users/u1/notifications").await {
            Some(Value::Object(map)) => map.into_iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }
}

fn settings() -> Value {
    json!({
        "heartRateAlert": true,
        "minHeartRate": 60,
        "maxHeartRate": 120,
        "tempAlert": true,
        "minTemp": 37.5,
        "maxTemp": 39.5
    })
}

fn user_tree(pet: Value) -> Value {
    json!({
        "users": {
            "u1": {
                "deviceToken": "device-token-u1",
                "pets": { "rex": pet }
            }
        }
    })
}

fn rex() -> PetRef {
    PetRef::new("u1", "rex")
}

// ── Threshold ───────────────────────────────────────────────────────

#[tokio::test]
async fn high_heart_rate_records_and_pushes() {
    let h = Harness::new(user_tree(json!({ "notification_settings": settings() })));

    let outcome = h.emit("bpm", json!(131)).await;
    let HandlerOutcome::Notified { alert_type, report } = outcome else {
        panic!("expected a notification, got {outcome:?}");
    };
    assert_eq!(alert_type, AlertType::HrHigh);
    assert!(report.record_written());
    assert!(report.push_sent());

    let records = h.notifications().await;
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0],
        json!({
            "title": "SmartCollar Alert: bpm",
            "message": "Heart rate too high: 131 bpm (max 120)",
            "timestamp": START_MS,
            "type": "hr_high",
            "petId": "rex",
            "source": "server"
        })
    );

    let sent = h.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "device-token-u1");
    assert_eq!(sent[0].1.title, "SmartCollar Alert: bpm");
    assert_eq!(sent[0].1.body, "Heart rate too high: 131 bpm (max 120)");

    let stamp = h.get("/users/u1/pets/rex/last_alerts/hr_high").await;
    assert_eq!(stamp, Some(json!(START_MS)));
}

#[tokio::test]
async fn repeat_alert_inside_window_is_suppressed() {
    let h = Harness::new(user_tree(json!({ "notification_settings": settings() })));

    assert!(matches!(h.emit("bpm", json!(140)).await, HandlerOutcome::Notified { .. }));

    h.clock.advance(60_000);
    assert_eq!(
        h.emit("bpm", json!(150)).await,
        HandlerOutcome::Suppressed(AlertType::HrHigh)
    );

    h.clock.advance(60_000);
    assert!(matches!(h.emit("bpm", json!(150)).await, HandlerOutcome::Notified { .. }));

    assert_eq!(h.notifications().await.len(), 2);
    assert_eq!(h.sender.sent().len(), 2);
}

#[tokio::test]
async fn low_temperature_uses_its_own_cooldown_entry() {
    let h = Harness::new(user_tree(json!({ "notification_settings": settings() })));

    assert!(matches!(h.emit("temperature", json!(40.1)).await, HandlerOutcome::Notified { .. }));
    let outcome = h.emit("temperature", json!(36.9)).await;
    let HandlerOutcome::Notified { alert_type, .. } = outcome else {
        panic!("expected a notification, got {outcome:?}");
    };
    assert_eq!(alert_type, AlertType::TempLow);

    let bodies: Vec<String> = h.sender.sent().into_iter().map(|(_, m)| m.body).collect();
    assert_eq!(
        bodies,
        vec![
            "Temperature too high: 40.1°C (max 39.5°C)".to_string(),
            "Temperature too low: 36.9°C (min 37.5°C)".to_string(),
        ]
    );
}

#[tokio::test]
async fn in_range_reading_clears_both_heart_rate_entries() {
    let h = Harness::new(user_tree(json!({
        "notification_settings": settings(),
        "last_alerts": { "hr_high": START_MS, "hr_low": START_MS, "temp_high": START_MS }
    })));

    assert_eq!(h.emit("bpm", json!(90)).await, HandlerOutcome::Cleared);

    assert_eq!(h.get("/users/u1/pets/rex/last_alerts/hr_high").await, None);
    assert_eq!(h.get("/users/u1/pets/rex/last_alerts/hr_low").await, None);
    assert_eq!(
        h.get("/users/u1/pets/rex/last_alerts/temp_high").await,
        Some(json!(START_MS))
    );

    // Cleared entry means the next excursion alerts immediately.
    assert!(matches!(h.emit("bpm", json!(45)).await, HandlerOutcome::Notified { .. }));
    assert_eq!(h.sender.sent().len(), 1);
}

#[tokio::test]
async fn missing_settings_skip_without_side_effects() {
    let h = Harness::new(user_tree(json!({ "name": "Rex" })));

    assert_eq!(
        h.emit("bpm", json!(200)).await,
        HandlerOutcome::Skipped(SkipReason::NotConfigured)
    );
    assert!(h.notifications().await.is_empty());
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn disabled_metric_never_alerts_or_clears() {
    let mut s = settings();
    s["heartRateAlert"] = json!(false);
    let h = Harness::new(user_tree(json!({
        "notification_settings": s,
        "last_alerts": { "hr_high": START_MS }
    })));

    assert_eq!(h.emit("bpm", json!(200)).await, HandlerOutcome::NoAlert);
    assert_eq!(h.emit("bpm", json!(90)).await, HandlerOutcome::NoAlert);
    assert_eq!(
        h.get("/users/u1/pets/rex/last_alerts/hr_high").await,
        Some(json!(START_MS))
    );
}

#[tokio::test]
async fn non_numeric_reading_is_skipped() {
    let h = Harness::new(user_tree(json!({ "notification_settings": settings() })));

    assert_eq!(
        h.emit("bpm", json!("racing")).await,
        HandlerOutcome::Skipped(SkipReason::InvalidReading)
    );
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn missing_device_token_still_writes_record() {
    let h = Harness::new(json!({
        "users": { "u1": { "pets": { "rex": { "notification_settings": settings() } } } }
    }));

    let outcome = h.emit("bpm", json!(131)).await;
    let HandlerOutcome::Notified { report, .. } = outcome else {
        panic!("expected a notification, got {outcome:?}");
    };
    assert!(report.record_written());
    assert_eq!(report.push, PushOutcome::NoDeviceToken);
    assert_eq!(h.notifications().await.len(), 1);
    assert!(h.sender.sent().is_empty());
}

// ── Geofence ────────────────────────────────────────────────────────

fn fenced() -> Value {
    user_tree(json!({
        "geofence": { "latitude": 0.0, "longitude": 0.0, "radius": 100.0 }
    }))
}

#[tokio::test]
async fn leaving_the_safe_zone_alerts() {
    let h = Harness::new(fenced());

    let outcome = h
        .emit("location", json!({ "latitude": 0.0, "longitude": 0.01 }))
        .await;
    let HandlerOutcome::Notified { alert_type, .. } = outcome else {
        panic!("expected a notification, got {outcome:?}");
    };
    assert_eq!(alert_type, AlertType::Geofence);

    let sent = h.sender.sent();
    assert_eq!(sent[0].1.title, "SmartCollar Alert: Geofence");
    assert!(
        sent[0].1.body.starts_with("Your pet has left the safe zone! Distance: 111"),
        "got {}",
        sent[0].1.body
    );
    assert!(sent[0].1.body.ends_with('m'));
}

#[tokio::test]
async fn returning_inside_clears_geofence_cooldown() {
    let h = Harness::new(fenced());

    assert!(matches!(
        h.emit("location", json!({ "latitude": 0.0, "longitude": 0.01 })).await,
        HandlerOutcome::Notified { .. }
    ));
    assert!(h.get("/users/u1/pets/rex/last_alerts/geofence").await.is_some());

    assert_eq!(
        h.emit("location", json!({ "latitude": 0.0, "longitude": 0.0001 })).await,
        HandlerOutcome::Cleared
    );
    assert_eq!(h.get("/users/u1/pets/rex/last_alerts/geofence").await, None);
}

#[tokio::test]
async fn no_geofence_means_no_alert() {
    let h = Harness::new(user_tree(json!({ "name": "Rex" })));

    assert_eq!(
        h.emit("location", json!({ "latitude": 10.0, "longitude": 10.0 })).await,
        HandlerOutcome::NoAlert
    );
    assert!(h.notifications().await.is_empty());
}

#[tokio::test]
async fn location_without_latitude_is_ignored() {
    let h = Harness::new(fenced());

    assert_eq!(
        h.emit("location", json!({ "longitude": 5.0 })).await,
        HandlerOutcome::Skipped(SkipReason::InvalidReading)
    );
    assert!(h.sender.sent().is_empty());
}

// ── Routing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn paths_outside_collar_data_are_skipped() {
    let h = Harness::new(fenced());

    let outcome = h
        .router
        .dispatch_raw("/users/u1/pets/rex/geofence", json!({ "radius": 5 }))
        .await;
    assert_eq!(outcome, HandlerOutcome::Skipped(SkipReason::InvalidPath));

    let outcome = h
        .router
        .dispatch_raw("/users/u1/pets/rex/collar_data/humidity", json!(40))
        .await;
    assert_eq!(outcome, HandlerOutcome::Skipped(SkipReason::InvalidPath));
}

#[tokio::test]
async fn handlers_can_be_called_directly() {
    let h = Harness::new(user_tree(json!({ "notification_settings": settings() })));

    let outcome = h
        .handlers
        .check_threshold(&rex(), smartcollar_rules::ThresholdKind::Bpm, 50.0)
        .await;
    assert!(matches!(
        outcome,
        HandlerOutcome::Notified { alert_type: AlertType::HrLow, .. }
    ));
    assert_eq!(
        h.sender.sent()[0].1.body,
        "Heart rate too low: 50 bpm (min 60)"
    );
}
