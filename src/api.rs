//! Wire format of the compositing backend.
//!
//! Every endpoint answers with a JSON object carrying at least `success`.
//! FastAPI error responses carry `detail` instead, which we treat as
//! `success: false`.

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

pub const TRYON_PATH: &str = "/generate-tryon";
pub const VIDEO_PATH: &str = "/generate-video";
pub const AI_MODEL_PATH: &str = "/generate-ai-model";

/// Multipart field names.
pub const MODEL_IMAGE_FIELD: &str = "model_image";
pub const BAG_IMAGE_FIELD: &str = "bag_image";
pub const TRYON_URL_FIELD: &str = "tryon_image_url";

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Parse a response body. A body that is not JSON is a [`RequestError::Parse`].
    pub fn parse(body: &str) -> Result<Envelope<T>, RequestError>
    where
        T: for<'de> Deserialize<'de>,
    {
        Ok(serde_json::from_str(body)?)
    }

    /// Payload on success, otherwise a rejection carrying `failure` as the message.
    pub fn into_result(self, failure: &str) -> Result<T, RequestError> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(RequestError::Rejected {
                message: failure.to_string(),
                detail: self.detail.map(detail_text),
            })
        }
    }
}

// `detail` is a string for HTTPException, a list of objects for 422s.
fn detail_text(detail: serde_json::Value) -> String {
    match detail {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TryOnPayload {
    pub tryon_image_url: Option<String>,
    /// Server-side copies of the uploads.
    pub model_image_url: Option<String>,
    pub bag_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoPayload {
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiModelPayload {
    pub model_image_url: Option<String>,
    pub message: Option<String>,
}

/// Successful AI model generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModel {
    pub model_image_url: String,
    pub message: Option<String>,
}

pub const GENDERS: &[&str] = &["female", "male", "non-binary"];
pub const AGE_RANGES: &[&str] = &["18-25", "26-35", "36-45", "46-60"];
pub const BODY_TYPES: &[&str] = &["slim", "athletic", "average", "curvy", "plus-size"];
pub const POSES: &[&str] = &["standing", "walking", "sitting", "over-the-shoulder"];
pub const BACKGROUNDS: &[&str] = &["studio white", "street", "runway", "cafe"];

/// Form submitted to `/generate-ai-model`. The backend owns the meaning of
/// each field; empty fields are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelGenerationParams {
    pub gender: String,
    pub age_range: String,
    pub ethnicity: String,
    pub body_type: String,
    pub pose: String,
    pub background: String,
    /// Free-form additions to the generation prompt.
    pub prompt: String,
}

impl Default for ModelGenerationParams {
    fn default() -> Self {
        ModelGenerationParams {
            gender: GENDERS[0].to_string(),
            age_range: AGE_RANGES[1].to_string(),
            ethnicity: String::new(),
            body_type: BODY_TYPES[2].to_string(),
            pose: POSES[0].to_string(),
            background: BACKGROUNDS[0].to_string(),
            prompt: String::new(),
        }
    }
}

impl ModelGenerationParams {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("gender", &self.gender),
            ("age_range", &self.age_range),
            ("ethnicity", &self.ethnicity),
            ("body_type", &self.body_type),
            ("pose", &self.pose),
            ("background", &self.background),
            ("prompt", &self.prompt),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key, value.trim().to_string()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_is_flattened() {
        let env: Envelope<TryOnPayload> = Envelope::parse(
            r#"{"success":true,"tryon_image_url":"/static/results/t.png","model_image_url":"/static/results/m.png"}"#,
        )
        .unwrap();
        let payload = env.into_result("unused").unwrap();
        assert_eq!(payload.tryon_image_url.as_deref(), Some("/static/results/t.png"));
        assert_eq!(payload.bag_image_url, None);
    }

    #[test]
    fn fastapi_error_is_a_rejection_with_detail() {
        let env: Envelope<VideoPayload> =
            Envelope::parse(r#"{"detail":"Try-on image not found"}"#).unwrap();
        let err = env.into_result("Failed to generate video.").unwrap_err();
        assert_eq!(
            err,
            RequestError::Rejected {
                message: "Failed to generate video.".into(),
                detail: Some("Try-on image not found".into()),
            }
        );
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let env: Envelope<VideoPayload> = Envelope::parse(
            r#"{"detail":[{"loc":["body","tryon_image_url"],"msg":"field required"}]}"#,
        )
        .unwrap();
        match env.into_result("Failed").unwrap_err() {
            RequestError::Rejected { detail, .. } => {
                assert_eq!(detail.as_deref(), Some("field required"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        let err = Envelope::<TryOnPayload>::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[test]
    fn empty_form_fields_are_skipped() {
        let params = ModelGenerationParams {
            ethnicity: "  ".into(),
            prompt: " red dress ".into(),
            ..Default::default()
        };
        let fields = params.form_fields();
        assert!(fields.iter().all(|(k, _)| *k != "ethnicity"));
        assert!(fields.contains(&("prompt", "red dress".to_string())));
        assert_eq!(fields.len(), 6);
    }
}
