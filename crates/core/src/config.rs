use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Default notification title prefix ("SmartCollar Alert: bpm").
pub const DEFAULT_TITLE_PREFIX: &str = "SmartCollar Alert";

/// Default cap on concurrently running telemetry handlers.
pub const DEFAULT_MAX_INSTANCES: usize = 10;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub alerts: AlertConfig,
    pub push: PushConfig,
    pub runtime: RuntimeConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SMARTCOLLAR_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SMARTCOLLAR_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            alerts: AlertConfig::from_env_profiled(p),
            push: PushConfig::from_env_profiled(p),
            runtime: RuntimeConfig::from_env_profiled(p),
            store: StoreConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  alerts:   title_prefix={}", self.alerts.title_prefix);
        tracing::info!(
            "  push:     gateway={}, timeout={}s",
            self.push.gateway_url.as_deref().unwrap_or("(log only)"),
            self.push.timeout_secs
        );
        tracing::info!("  runtime:  max_instances={}", self.runtime.max_instances);
        tracing::info!(
            "  store:    snapshot={}",
            self.store
                .snapshot_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(empty)".to_string())
        );
    }

    /// Return a redacted view safe for logs and diagnostics (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "alerts": { "title_prefix": self.alerts.title_prefix },
            "push": {
                "gateway_url": self.push.gateway_url,
                "has_auth": self.push.auth_header.is_some(),
                "timeout_secs": self.push.timeout_secs,
                "configured": self.push.is_configured(),
            },
            "runtime": { "max_instances": self.runtime.max_instances },
            "store": { "snapshot_path": self.store.snapshot_path },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            alerts: AlertConfig::default(),
            push: PushConfig::default(),
            runtime: RuntimeConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

// ── Alerts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Prefix of every notification title.
    pub title_prefix: String,
}

impl AlertConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            title_prefix: profiled_env_or(p, "ALERT_TITLE_PREFIX", DEFAULT_TITLE_PREFIX),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
        }
    }
}

// ── Push gateway ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Webhook endpoint of the push gateway. `None` = log-only delivery.
    pub gateway_url: Option<String>,
    /// Raw `Authorization` header value sent to the gateway.
    pub auth_header: Option<String>,
    pub timeout_secs: u64,
}

impl PushConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            gateway_url: profiled_env_opt(p, "PUSH_GATEWAY_URL"),
            auth_header: profiled_env_opt(p, "PUSH_GATEWAY_AUTH"),
            timeout_secs: profiled_env_u64(p, "PUSH_TIMEOUT_SECS", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gateway_url.is_some()
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            auth_header: None,
            timeout_secs: 10,
        }
    }
}

// ── Runtime ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum number of telemetry handlers running at once.
    pub max_instances: usize,
}

impl RuntimeConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_instances: profiled_env_usize(p, "MAX_INSTANCES", DEFAULT_MAX_INSTANCES).max(1),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot used to seed the in-memory realtime store.
    pub snapshot_path: Option<PathBuf>,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            snapshot_path: profiled_env_opt(p, "STORE_SNAPSHOT").map(PathBuf::from),
        }
    }
}
