//! Service-level objectives
//!
//! Only the error budget of an existing SLO is read; SLO definitions are not
//! managed here.

mod error_budget;

pub use error_budget::ErrorBudget;

use crate::error::{ProviderError, Result};
use crate::kibana::client::KibanaClient;
use reqwest::StatusCode;
use serde_json::Value;

pub const SLOS_PATH: &str = "/api/observability/slos";

/// Extract `summary.errorBudget` from an SLO response
pub fn error_budget_from_slo(slo: &Value) -> Result<ErrorBudget> {
    let budget = slo
        .get("summary")
        .and_then(|s| s.get("errorBudget"))
        .ok_or_else(|| ProviderError::Decode("SLO response has no summary.errorBudget".to_string()))?;

    Ok(serde_json::from_value(budget.clone())?)
}

/// Fetch the current error budget of an SLO
pub async fn get_error_budget(client: &KibanaClient, space_id: &str, slo_id: &str) -> Result<ErrorBudget> {
    let url = client.space_url(
        space_id,
        &format!("{}/{}", SLOS_PATH, urlencoding::encode(slo_id)),
    );

    let body = match client.http.get(&url).await {
        Ok(body) => body,
        Err(ProviderError::Api { status, .. }) if status == StatusCode::NOT_FOUND => {
            return Err(ProviderError::NotFound {
                object_type: "slo".to_string(),
                id: slo_id.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let slo: Value = serde_json::from_str(&body)?;
    error_budget_from_slo(&slo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_budget_from_slo() {
        let slo = json!({
            "id": "slo-1",
            "name": "checkout latency",
            "summary": {
                "status": "HEALTHY",
                "sliValue": 0.999,
                "errorBudget": {
                    "initial": 0.01,
                    "consumed": 0.1,
                    "remaining": 0.9,
                    "isEstimated": false
                }
            }
        });

        let budget = error_budget_from_slo(&slo).unwrap();
        assert_eq!(budget.remaining, 0.9);
    }

    #[test]
    fn test_error_budget_missing_summary() {
        let err = error_budget_from_slo(&json!({"id": "slo-1"})).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));

        let err = error_budget_from_slo(&json!({"summary": {"errorBudget": {"initial": 0.01}}}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
