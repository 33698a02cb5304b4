//! Wire models for the turnstile API.
//!
//! Every response shares the `{ data, error: { code, message } }` envelope;
//! non-2xx responses use `{ status, code, error: { code, message } }`.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Embedded error block. A zero `code` means success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Success-status envelope around an operation's `data`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: ApiErrorBody,
}

/// Envelope carried by non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error: ApiErrorBody,
}

// ── checkIn ──────────────────────────────────────────────────────────

/// Gate registration returned by the connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    #[serde(default)]
    pub gate_name: String,
    #[serde(default)]
    pub site_name: String,
    /// 0 inbound only, 1 outbound only, 2 bidirectional.
    #[serde(default)]
    pub ctrl_dir: i32,
    /// 0 online, 1 offline, 2 both.
    #[serde(default)]
    pub network_mode: i32,
}

// ── checkAvailable ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckAvailableRequest<'a> {
    pub unique_code: &'a str,
    pub access_dir: u8,
}

/// Ticket details returned by the availability pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub access_dir: i32,
    /// Ticket id.
    #[serde(default)]
    pub serial_number: String,
}

// ── doConsume ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ConsumeRequest<'a> {
    pub guid: &'a str,
}

/// Outcome of consuming a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResult {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub guid: String,
    /// Human-readable message shown to the operator.
    #[serde(default)]
    pub verbose_result: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_consume_envelope_decodes() {
        let body = json!({
            "data": {"result": true, "guid": "SU_A:0", "verboseResult": "Welcome"},
            "error": {"code": 0, "message": ""}
        });
        let response: ApiResponse<ConsumeResult> = serde_json::from_value(body).unwrap();

        assert_eq!(response.error.code, 0);
        let data = response.data.unwrap();
        assert!(data.result);
        assert_eq!(data.verbose_result, "Welcome");
    }

    #[test]
    fn test_envelope_without_error_block() {
        let body = json!({"data": {"gateName": "North", "siteName": "Arena"}});
        let response: ApiResponse<SiteInfo> = serde_json::from_value(body).unwrap();

        assert_eq!(response.error, ApiErrorBody::default());
        let site = response.data.unwrap();
        assert_eq!(site.site_name, "Arena");
        assert_eq!(site.ctrl_dir, 0);
    }

    #[test]
    fn test_null_data_decodes_as_none() {
        let body = json!({"data": null, "error": {"code": 12, "message": "Unknown code"}});
        let response: ApiResponse<Availability> = serde_json::from_value(body).unwrap();

        assert!(response.data.is_none());
        assert_eq!(response.error.message, "Unknown code");
    }

    #[test]
    fn test_requests_serialize_camel_case() {
        let request = CheckAvailableRequest {
            unique_code: "PA_1",
            access_dir: 1,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"uniqueCode": "PA_1", "accessDir": 1})
        );
        assert_eq!(
            serde_json::to_value(ConsumeRequest { guid: "PA_1:1" }).unwrap(),
            json!({"guid": "PA_1:1"})
        );
    }

    #[test]
    fn test_error_response_decodes() {
        let body = json!({
            "status": "Forbidden",
            "code": 403,
            "error": {"code": 7, "message": "Gate not registered"}
        });
        let response: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.code, Some(403));
        assert_eq!(response.error.message, "Gate not registered");
    }

    #[test]
    fn test_error_response_without_error_block() {
        let body = json!({"status": "Internal Server Error", "code": 500});
        let response: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.code, Some(500));
        assert_eq!(response.error, ApiErrorBody::default());
    }

    #[test]
    fn test_envelope_without_data_field() {
        let body = json!({"error": {"code": 0, "message": ""}});
        let response: ApiResponse<ConsumeResult> = serde_json::from_value(body).unwrap();
        assert!(response.data.is_none());
    }
}
