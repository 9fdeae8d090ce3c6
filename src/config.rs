use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::game_mode::{GameMode, default_registry};
use crate::model::Capability;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where and how to reach the analysis service. Injected into the request
/// layer; nothing in the crate reads the service address from a global.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    /// `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub routes: HashMap<Capability, String>,
    pub game_mode: GameMode,
    /// Serve canned demo responses instead of calling the service.
    pub offline: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            routes: default_routes(),
            game_mode: GameMode::valorant(),
            offline: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(base) = opt_env("COACH_API_BASE_URL") {
            cfg.base_url = normalize_base_url(&base);
        }
        let timeout = env::var("COACH_REQUEST_TIMEOUT_SECS").ok();
        cfg.request_timeout = parse_timeout(timeout.as_deref());

        for (cap, key) in [
            (Capability::Insights, "COACH_ROUTE_INSIGHTS"),
            (Capability::MacroReview, "COACH_ROUTE_MACRO_REVIEW"),
            (Capability::Prediction, "COACH_ROUTE_PREDICTION"),
        ] {
            if let Some(route) = opt_env(key) {
                cfg.routes.insert(cap, normalize_route(&route));
            }
        }

        if let Some(mode) = opt_env("COACH_GAME_MODE") {
            cfg.game_mode = default_registry().resolve(&mode);
        }
        cfg.offline = env_bool("COACH_OFFLINE", false);
        cfg
    }

    pub fn endpoint(&self, capability: Capability) -> String {
        let route = self
            .routes
            .get(&capability)
            .cloned()
            .unwrap_or_else(|| default_route(capability));
        format!("{}{}", self.base_url, route)
    }
}

pub fn default_route(capability: Capability) -> String {
    format!("/assistant/{}", capability.id())
}

fn default_routes() -> HashMap<Capability, String> {
    Capability::ALL
        .iter()
        .map(|cap| (*cap, default_route(*cap)))
        .collect()
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn normalize_route(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

fn env_bool(key: &str, default: bool) -> bool {
    parse_bool(env::var(key).ok().as_deref(), default)
}

/// Unset, unparsable or zero means no timeout.
fn parse_timeout(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    raw.map(|v| {
        let t = v.trim().to_ascii_lowercase();
        !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
    })
    .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_follow_capability_ids() {
        let cfg = ServiceConfig::default();
        assert_eq!(
            cfg.endpoint(Capability::Insights),
            "http://localhost:8000/assistant/personalized-insights"
        );
        assert_eq!(
            cfg.endpoint(Capability::Prediction),
            "http://localhost:8000/assistant/predict-scenario"
        );
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn route_overrides_are_slash_prefixed() {
        let mut cfg = ServiceConfig::default();
        cfg.base_url = normalize_base_url("https://coach.example.com/api/ ");
        cfg.routes
            .insert(Capability::MacroReview, normalize_route("v2/review"));
        assert_eq!(
            cfg.endpoint(Capability::MacroReview),
            "https://coach.example.com/api/v2/review"
        );
    }

    #[test]
    fn timeout_is_opt_in() {
        assert_eq!(parse_timeout(None), None);
        assert_eq!(parse_timeout(Some("0")), None);
        assert_eq!(parse_timeout(Some("soon")), None);
        assert_eq!(parse_timeout(Some(" 30 ")), Some(Duration::from_secs(30)));
    }

    #[test]
    fn offline_flag_parsing() {
        assert!(!parse_bool(None, false));
        assert!(parse_bool(None, true));
        assert!(parse_bool(Some("1"), false));
        assert!(parse_bool(Some("TRUE"), false));
        assert!(!parse_bool(Some("off"), true));
        assert!(!parse_bool(Some("0"), true));
        assert!(!parse_bool(Some(""), true));
    }
}
