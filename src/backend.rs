//! The compositing backend.
//!
//! [`TryOnBackend`] is the seam the flows are written against; [`HttpBackend`]
//! talks to the real server over multipart HTTP.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::api::{
    self, AiModelPayload, Envelope, GeneratedModel, ModelGenerationParams, TryOnPayload,
    VideoPayload,
};
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::image_file::ImageFile;

pub const TRYON_FAILED: &str = "Failed to generate try-on image.";
pub const VIDEO_FAILED: &str = "Failed to generate video.";
pub const AI_MODEL_FAILED: &str = "Failed to generate AI model.";

pub trait TryOnBackend {
    /// Composite `bag` onto `model`. Returns the composite image URL.
    fn generate_tryon(
        &self,
        model: &ImageFile,
        bag: &ImageFile,
    ) -> impl Future<Output = Result<String, RequestError>>;

    /// Synthesize a video ad from a composite. Returns the video URL.
    fn generate_video(&self, tryon_url: &str)
    -> impl Future<Output = Result<String, RequestError>>;

    fn generate_ai_model(
        &self,
        params: &ModelGenerationParams,
    ) -> impl Future<Output = Result<GeneratedModel, RequestError>>;

    /// Download the bytes behind a URL returned by the server.
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, RequestError>>;
}

pub fn decode_tryon(body: &str) -> Result<String, RequestError> {
    let payload = Envelope::<TryOnPayload>::parse(body)?.into_result(TRYON_FAILED)?;
    if let Some(url) = &payload.model_image_url {
        log::debug!("server stored model image at {url}");
    }
    if let Some(url) = &payload.bag_image_url {
        log::debug!("server stored bag image at {url}");
    }
    payload
        .tryon_image_url
        .ok_or(RequestError::MissingField("tryon_image_url"))
}

pub fn decode_video(body: &str) -> Result<String, RequestError> {
    Envelope::<VideoPayload>::parse(body)?
        .into_result(VIDEO_FAILED)?
        .video_url
        .ok_or(RequestError::MissingField("video_url"))
}

pub fn decode_ai_model(body: &str) -> Result<GeneratedModel, RequestError> {
    let payload: AiModelPayload =
        Envelope::<AiModelPayload>::parse(body)?.into_result(AI_MODEL_FAILED)?;
    let model_image_url = payload
        .model_image_url
        .ok_or(RequestError::MissingField("model_image_url"))?;
    Ok(GeneratedModel {
        model_image_url,
        message: payload.message.filter(|m| !m.trim().is_empty()),
    })
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<HttpBackend, RequestError> {
        let client = reqwest::Client::builder().build()?;
        Ok(HttpBackend { client, config })
    }

    async fn post_form(
        &self,
        path: &str,
        form: Form,
        timeout_secs: u64,
    ) -> Result<String, RequestError> {
        let url = self.config.endpoint(path);
        log::debug!("POST {url}");
        let request = with_timeout(
            self.client.post(&url).multipart(form),
            Duration::from_secs(timeout_secs),
        );
        let response = request.send().await?;
        // Status is not checked; the body's `success` decides.
        log::debug!("POST {url} -> {}", response.status());
        Ok(response.text().await?)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn with_timeout(request: reqwest::RequestBuilder, timeout: Duration) -> reqwest::RequestBuilder {
    request.timeout(timeout)
}

// The browser owns timeouts for fetch.
#[cfg(target_arch = "wasm32")]
fn with_timeout(request: reqwest::RequestBuilder, _timeout: Duration) -> reqwest::RequestBuilder {
    request
}

fn file_part(file: &ImageFile) -> Result<Part, RequestError> {
    Ok(Part::bytes(file.bytes().to_vec())
        .file_name(file.name.clone())
        .mime_str(file.mime)?)
}

impl TryOnBackend for HttpBackend {
    async fn generate_tryon(
        &self,
        model: &ImageFile,
        bag: &ImageFile,
    ) -> Result<String, RequestError> {
        let form = Form::new()
            .part(api::MODEL_IMAGE_FIELD, file_part(model)?)
            .part(api::BAG_IMAGE_FIELD, file_part(bag)?);
        let body = self
            .post_form(api::TRYON_PATH, form, self.config.request_timeout_secs)
            .await?;
        decode_tryon(&body)
    }

    async fn generate_video(&self, tryon_url: &str) -> Result<String, RequestError> {
        let form = Form::new().text(api::TRYON_URL_FIELD, tryon_url.to_string());
        let body = self
            .post_form(api::VIDEO_PATH, form, self.config.video_timeout_secs)
            .await?;
        decode_video(&body)
    }

    async fn generate_ai_model(
        &self,
        params: &ModelGenerationParams,
    ) -> Result<GeneratedModel, RequestError> {
        let form = params
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));
        let body = self
            .post_form(api::AI_MODEL_PATH, form, self.config.request_timeout_secs)
            .await?;
        decode_ai_model(&body)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        let url = self.config.resolve(url);
        log::debug!("GET {url}");
        let response = with_timeout(
            self.client.get(&url),
            Duration::from_secs(self.config.request_timeout_secs),
        )
        .send()
        .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
