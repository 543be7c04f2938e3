use serde::Serialize;

/// Response envelope shared by every endpoint, success and failure alike:
/// `{statusCode, data, message, success}`. Clients key off `success` and
/// `statusCode`; `data` is `null` for removals and failures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(status_code: u16, data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            data: Some(data),
            message: message.into(),
            success: status_code < 400,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Success with a null payload (toggle removals, deletions).
    pub fn message_only(status_code: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            data: None,
            message: message.into(),
            success: status_code < 400,
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            data: None,
            message: message.into(),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_keys() {
        let body = ApiResponse::ok(201, serde_json::json!({"id": 1}), "Created");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Created");
        assert_eq!(json["data"]["id"], 1);
    }

    #[test]
    fn removal_envelope_has_null_data_and_success_true() {
        let body = ApiResponse::message_only(200, "Video unliked successfully");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert!(json["data"].is_null());
        assert_eq!(json["success"], true);
    }

    #[test]
    fn failure_envelope_is_not_successful() {
        let body = ApiResponse::failure(403, "You are not allowed to update this video");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }
}
