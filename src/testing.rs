//! In-memory backend for exercising the flows without a server.

use std::cell::RefCell;

use crate::api::{GeneratedModel, ModelGenerationParams};
use crate::backend::TryOnBackend;
use crate::error::RequestError;
use crate::image_file::ImageFile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    TryOn { model: String, bag: String },
    Video { tryon_url: String },
    AiModel { params: ModelGenerationParams },
    Fetch { url: String },
}

/// Answers every call with a canned result and records what was asked.
#[derive(Default)]
pub struct FakeBackend {
    tryon: Option<Result<String, RequestError>>,
    video: Option<Result<String, RequestError>>,
    ai_model: Option<Result<GeneratedModel, RequestError>>,
    fetch: Option<Result<Vec<u8>, RequestError>>,
    calls: RefCell<Vec<Call>>,
}

fn unconfigured<T>() -> Result<T, RequestError> {
    Err(RequestError::Transport("no canned response".into()))
}

impl FakeBackend {
    pub fn with_tryon(mut self, result: Result<String, RequestError>) -> Self {
        self.tryon = Some(result);
        self
    }

    pub fn with_video(mut self, result: Result<String, RequestError>) -> Self {
        self.video = Some(result);
        self
    }

    pub fn with_ai_model(mut self, result: Result<GeneratedModel, RequestError>) -> Self {
        self.ai_model = Some(result);
        self
    }

    pub fn with_fetch(mut self, result: Result<Vec<u8>, RequestError>) -> Self {
        self.fetch = Some(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl TryOnBackend for FakeBackend {
    async fn generate_tryon(
        &self,
        model: &ImageFile,
        bag: &ImageFile,
    ) -> Result<String, RequestError> {
        self.calls.borrow_mut().push(Call::TryOn {
            model: model.name.clone(),
            bag: bag.name.clone(),
        });
        self.tryon.clone().unwrap_or_else(unconfigured)
    }

    async fn generate_video(&self, tryon_url: &str) -> Result<String, RequestError> {
        self.calls.borrow_mut().push(Call::Video {
            tryon_url: tryon_url.to_string(),
        });
        self.video.clone().unwrap_or_else(unconfigured)
    }

    async fn generate_ai_model(
        &self,
        params: &ModelGenerationParams,
    ) -> Result<GeneratedModel, RequestError> {
        self.calls.borrow_mut().push(Call::AiModel {
            params: params.clone(),
        });
        self.ai_model.clone().unwrap_or_else(unconfigured)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.calls.borrow_mut().push(Call::Fetch {
            url: url.to_string(),
        });
        self.fetch.clone().unwrap_or_else(unconfigured)
    }
}
