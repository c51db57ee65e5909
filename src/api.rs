use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use engagement_sim::{EngineError, RunReport, RunRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRunRequest {
    pub item_id: Option<String>,
    pub manual: Option<bool>,
    pub dry_run: Option<bool>,
    pub window_hours: Option<f64>,
    pub verbose: Option<bool>,
}

impl ApiRunRequest {
    pub fn into_request(self) -> Result<RunRequest, String> {
        if let Some(hours) = self.window_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(format!("windowHours must be positive, got {}", hours));
            }
        }
        let item_id = self
            .item_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(RunRequest {
            item_id,
            manual: self.manual.unwrap_or(false),
            dry_run: self.dry_run.unwrap_or(false),
            window_hours: self.window_hours,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiRunResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

impl ApiRunResponse {
    pub fn from_report(report: RunReport, verbose: bool) -> Self {
        Self {
            success: true,
            processed: Some(report.processed),
            error: None,
            report: if verbose { Some(report) } else { None },
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            processed: None,
            error: Some(message.into()),
            report: None,
        }
    }
}

pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_sim::{RunMode, StoreError};
    use serde_json::json;

    fn report(processed: usize) -> RunReport {
        let mut report = RunReport::new(RunMode::Auto, false, false, 6.0);
        report.processed = processed;
        report
    }

    #[test]
    fn success_carries_processed_count_only() {
        let body = serde_json::to_value(ApiRunResponse::from_report(report(3), false)).unwrap();
        assert_eq!(body, json!({ "success": true, "processed": 3 }));

        let verbose = serde_json::to_value(ApiRunResponse::from_report(report(3), true)).unwrap();
        assert_eq!(verbose["processed"], json!(3));
        assert_eq!(verbose["report"]["mode"], json!("auto"));
    }

    #[test]
    fn failure_carries_error_without_processed() {
        let body = serde_json::to_value(ApiRunResponse::failure("settings missing")).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "settings missing" }));
        assert!(body.get("processed").is_none());
    }

    #[test]
    fn engine_errors_map_to_status_codes() {
        assert_eq!(
            status_for(&EngineError::ItemNotFound("a-1".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&EngineError::InvalidRequest("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&EngineError::SettingsMissing),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&EngineError::SettingsInvalid("ratio".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&EngineError::Store(StoreError::Conflict("locked".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn request_body_maps_to_run_request() {
        let body: ApiRunRequest = serde_json::from_value(json!({
            "itemId": "  a-1 ",
            "manual": true,
            "dryRun": true,
            "windowHours": 3.0
        }))
        .unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.item_id.as_deref(), Some("a-1"));
        assert!(request.manual);
        assert!(request.dry_run);
        assert_eq!(request.window_hours, Some(3.0));

        let empty: ApiRunRequest = serde_json::from_value(json!({})).unwrap();
        let request = empty.into_request().unwrap();
        assert!(request.item_id.is_none());
        assert!(!request.manual);
        assert!(!request.dry_run);
    }

    #[test]
    fn blank_item_id_falls_back_to_auto() {
        let body: ApiRunRequest = serde_json::from_value(json!({ "itemId": "   " })).unwrap();
        assert!(body.into_request().unwrap().item_id.is_none());
    }

    #[test]
    fn non_positive_window_is_rejected() {
        for hours in [0.0, -2.0] {
            let body = ApiRunRequest {
                window_hours: Some(hours),
                ..ApiRunRequest::default()
            };
            assert!(body.into_request().is_err(), "window {}", hours);
        }
    }
}
