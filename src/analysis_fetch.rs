use anyhow::Result;
use reqwest::blocking::Client;
use serde_json::{Map, Value};

use crate::config::ServiceConfig;
use crate::error::{ModelError, RequestError};
use crate::game_mode::{GameMode, GameModeRegistry, default_registry};
use crate::http_client::http_client;
use crate::model::{self, Capability, CapabilityResult};

/// One capability invocation: which analysis, for which game, with what input.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    pub capability: Capability,
    pub game_mode: GameMode,
    pub payload: Value,
}

impl CapabilityRequest {
    pub fn new(capability: Capability, game_mode: GameMode, payload: Value) -> Self {
        Self {
            capability,
            game_mode,
            payload,
        }
    }
}

/// Anything that can answer a capability request: the remote service, or the
/// offline demo provider. Both feed the same model and formatter.
pub trait AnalysisService: Send + Sync {
    fn invoke(&self, request: &CapabilityRequest) -> Result<CapabilityResult, RequestError>;

    fn describe(&self) -> String;
}

pub struct HttpAnalysisService {
    cfg: ServiceConfig,
    client: Client,
}

impl HttpAnalysisService {
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let client = http_client(&cfg)?;
        Ok(Self { cfg, client })
    }
}

impl AnalysisService for HttpAnalysisService {
    fn invoke(&self, request: &CapabilityRequest) -> Result<CapabilityResult, RequestError> {
        let url = self.cfg.endpoint(request.capability);
        let body = request_body(request, default_registry());

        let resp = self.client.post(&url).json(&body).send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        decode_response(request, status, &text)
    }

    fn describe(&self) -> String {
        self.cfg.base_url.clone()
    }
}

/// JSON body for a request: the capability payload plus the service's id for the game.
pub fn request_body(request: &CapabilityRequest, registry: &GameModeRegistry) -> Value {
    let game = if registry.contains(&request.game_mode) {
        registry.profile(&request.game_mode).service_id.clone()
    } else {
        request.game_mode.as_str().to_string()
    };

    let mut body = match &request.payload {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::new();
            map.insert("payload".to_string(), other.clone());
            map
        }
    };
    body.insert("game".to_string(), Value::String(game));
    Value::Object(body)
}

/// Classifies a raw service answer into a validated result or a typed failure.
pub fn decode_response(
    request: &CapabilityRequest,
    status: u16,
    body: &str,
) -> Result<CapabilityResult, RequestError> {
    if !(200..300).contains(&status) {
        let detail = service_detail(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no detail".to_string()
            } else {
                trimmed.to_string()
            }
        });
        return Err(RequestError::Service { status, detail });
    }

    let value: Value = serde_json::from_str(body.trim()).map_err(ModelError::Malformed)?;
    if let Some(detail) = embedded_error(&value) {
        return Err(RequestError::Service { status, detail });
    }
    Ok(model::result_from_value(
        request.capability,
        &request.game_mode,
        value,
    )?)
}

fn service_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// The service sometimes answers 200 with `{"error": "..."}` instead of a result.
fn embedded_error(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("error").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    fn prediction_request(mode: GameMode) -> CapabilityRequest {
        CapabilityRequest::new(
            Capability::Prediction,
            mode,
            json!({"scenario": {"question": "Contest drake?"}}),
        )
    }

    #[test]
    fn body_carries_service_game_id() {
        let registry = GameModeRegistry::builtin();
        let body = request_body(&prediction_request(GameMode::league_of_legends()), &registry);
        assert_eq!(body["game"], "lol");
        assert_eq!(body["scenario"]["question"], "Contest drake?");

        let body = request_body(&prediction_request(GameMode::new("dota-2")), &registry);
        assert_eq!(body["game"], "dota-2");
    }

    #[test]
    fn error_status_uses_detail() {
        let req = prediction_request(GameMode::valorant());
        let err = decode_response(&req, 400, r#"{"detail": "scenario is required"}"#)
            .expect_err("400 is a failure");
        assert_eq!(err.kind(), FailureKind::Service);
        assert!(err.to_string().contains("scenario is required"));
    }

    #[test]
    fn embedded_error_is_a_service_failure() {
        let req = CapabilityRequest::new(
            Capability::MacroReview,
            GameMode::league_of_legends(),
            json!({}),
        );
        let err = decode_response(&req, 200, r#"{"error": "No game data available"}"#)
            .expect_err("embedded error");
        assert!(matches!(err, RequestError::Service { status: 200, .. }));
    }

    #[test]
    fn undecodable_body_is_a_validation_failure() {
        let req = prediction_request(GameMode::valorant());
        let err = decode_response(&req, 200, "<html>").expect_err("not json");
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(matches!(err, RequestError::Validation(ModelError::Malformed(_))));
    }

    #[test]
    fn wrong_kind_is_a_validation_failure() {
        let req = CapabilityRequest::new(Capability::Insights, GameMode::valorant(), json!({}));
        let err = decode_response(&req, 200, r#"{"player_name": "OXY", "data_points": "x"}"#)
            .expect_err("bad data_points");
        assert!(matches!(
            err,
            RequestError::Validation(ModelError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn ok_body_becomes_result() {
        let req = prediction_request(GameMode::valorant());
        let result = decode_response(&req, 200, r#"{"scenario": "Save or retake?"}"#)
            .expect("valid");
        assert_eq!(result.capability(), Capability::Prediction);
        assert_eq!(result.game_mode, GameMode::valorant());
    }
}
