use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub openai_base_url: String,
    pub openai_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            openai_base_url: "http://localhost:11434/v1".to_string(),
            openai_api_key: "test-openai-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point both external services at a mock server.
    pub fn with_mock_uri(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            openai_base_url: format!("{}/v1", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            openai_api_key: self.openai_api_key.clone(),
            ..AppConfig::default()
        }
    }
}

pub struct TestRoster;

impl TestRoster {
    /// Two weekday doctors and one weekend doctor.
    pub fn document() -> Value {
        json!({
            "doctor_list": [
                {
                    "name": "Dr. A",
                    "department": "Cardiology",
                    "availableDays": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                    "checkinTime": "09:00",
                    "checkoutTime": "12:00",
                    "appointmentSlotInMin": 30
                },
                {
                    "name": "Dr. B",
                    "department": "Neurology",
                    "availableDays": ["Monday", "Wednesday"],
                    "checkinTime": "14:00",
                    "checkoutTime": "16:00",
                    "appointmentSlotInMin": 45
                },
                {
                    "name": "Dr. C",
                    "department": "Pediatrics",
                    "availableDays": ["Saturday", "Sunday"],
                    "checkinTime": "10:00",
                    "checkoutTime": "11:00",
                    "appointmentSlotInMin": 20
                }
            ]
        })
    }

    pub fn json() -> String {
        Self::document().to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_response(doctor_name: &str, patient_name: &str, date: &str, time: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_name": doctor_name,
            "patient_name": patient_name,
            "appointment_date": date,
            "appointment_time": time,
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn booked_time_response(time: &str) -> Value {
        json!({ "appointment_time": time })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

pub struct MockOpenAiResponses;

impl MockOpenAiResponses {
    pub fn message_response(content: &str) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    pub fn tool_call_response(name: &str, arguments: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": name, "arguments": arguments.to_string() }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })
    }

    pub fn function_call_response(name: &str, arguments: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": { "name": name, "arguments": arguments.to_string() }
                },
                "finish_reason": "function_call"
            }]
        })
    }

    pub fn error_response(message: &str) -> Value {
        json!({
            "error": { "message": message, "type": "invalid_request_error", "code": null }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(app_config.is_configured());
        assert!(app_config.is_llm_configured());
    }

    #[test]
    fn test_mock_uri_routes_both_services() {
        let config = TestConfig::with_mock_uri("http://127.0.0.1:9999").to_app_config();
        assert_eq!(config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(config.openai_base_url, "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn test_roster_document_shape() {
        let doc = TestRoster::document();
        assert_eq!(doc["doctor_list"].as_array().unwrap().len(), 3);
        assert_eq!(doc["doctor_list"][0]["name"], "Dr. A");
    }

    #[test]
    fn test_tool_call_arguments_are_strings() {
        let response = MockOpenAiResponses::tool_call_response("get_list_of_doctors", json!({}));
        let args = &response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"];
        assert!(args.is_string());
    }
}
