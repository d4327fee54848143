//! The "choose a model" dialog.
//!
//! Two tabs: upload a photo directly, or have the backend generate one. A
//! generated image is only a candidate until confirmed; confirming downloads
//! it and assigns it to the model slot exactly like an upload would.

use crate::api::{GeneratedModel, ModelGenerationParams};
use crate::backend::TryOnBackend;
use crate::controller::{ImageSlot, TryOnController};
use crate::error::{RequestError, TryOnError, ValidationError};
use crate::image_file::ImageFile;

pub const AI_MODEL_READY: &str = "AI model generated. Review and confirm.";
pub const AI_MODEL_APPLIED: &str = "AI model applied!";
pub const MODEL_UPLOADED: &str = "Model image uploaded!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModalTab {
    #[default]
    Upload,
    Generate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModalToken(u64);

#[derive(Clone, Debug)]
pub struct GenerateRequest {
    pub token: ModalToken,
    pub params: ModelGenerationParams,
}

#[derive(Clone, Debug)]
pub struct ConfirmRequest {
    pub token: ModalToken,
    pub url: String,
}

#[derive(Default)]
pub struct ModelModal {
    open: bool,
    tab: ModalTab,
    pub form: ModelGenerationParams,
    candidate: Option<GeneratedModel>,
    show_preview: bool,
    busy: bool,
    scroll_to_preview: bool,
    // Bumped on every request and on reset, so late answers are ignored.
    seq: u64,
}

impl ModelModal {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn tab(&self) -> ModalTab {
        self.tab
    }

    pub fn candidate(&self) -> Option<&GeneratedModel> {
        self.candidate.as_ref()
    }

    pub fn preview_visible(&self) -> bool {
        self.show_preview
    }

    /// The form is hidden, not cleared, while the preview is up.
    pub fn form_visible(&self) -> bool {
        !self.show_preview
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn select_tab(&mut self, tab: ModalTab) {
        self.tab = tab;
    }

    /// Close and forget everything transient. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.open = false;
        self.reset();
    }

    /// A click landed on the dialog backdrop; `inside_content` says whether it
    /// hit the dialog itself.
    pub fn backdrop_clicked(&mut self, inside_content: bool) {
        if !inside_content {
            self.close();
        }
    }

    fn reset(&mut self) {
        self.form = ModelGenerationParams::default();
        self.candidate = None;
        self.show_preview = false;
        self.busy = false;
        self.scroll_to_preview = false;
        self.seq += 1;
    }

    /// One-shot request to scroll the preview into view.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_preview)
    }

    /// Upload tab: hand the file to the regular upload path, then close.
    pub fn upload(
        &mut self,
        file: Option<ImageFile>,
        controller: &mut TryOnController,
        now: f64,
    ) -> Result<(), ValidationError> {
        if file.is_none() {
            return Ok(());
        }
        controller.select_image(ImageSlot::Model, file, now)?;
        self.close();
        controller.banners.show_success(MODEL_UPLOADED, now);
        Ok(())
    }

    /// `None` while a request is already running.
    pub fn begin_generate(&mut self) -> Option<GenerateRequest> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.seq += 1;
        log::info!("requesting AI model: {:?}", self.form.form_fields());
        Some(GenerateRequest {
            token: ModalToken(self.seq),
            params: self.form.clone(),
        })
    }

    pub fn complete_generate(
        &mut self,
        token: ModalToken,
        result: Result<GeneratedModel, RequestError>,
        controller: &mut TryOnController,
        now: f64,
    ) -> bool {
        if token.0 != self.seq {
            log::debug!("dropping stale AI model response {token:?}");
            return false;
        }
        self.busy = false;
        match result {
            Ok(model) => {
                log::info!("AI model candidate: {}", model.model_image_url);
                let text = model.message.as_deref().unwrap_or(AI_MODEL_READY).to_string();
                self.candidate = Some(model);
                self.show_preview = true;
                self.scroll_to_preview = true;
                controller.banners.show_success(text, now);
            }
            Err(err) => controller.banners.show_error(err.banner_text(), now),
        }
        true
    }

    /// Back from the preview to the form, dropping the candidate.
    pub fn discard_candidate(&mut self) {
        self.candidate = None;
        self.show_preview = false;
    }

    pub fn begin_confirm(
        &mut self,
        controller: &mut TryOnController,
        now: f64,
    ) -> Result<ConfirmRequest, ValidationError> {
        let Some(url) = self.candidate.as_ref().map(|c| c.model_image_url.clone()) else {
            let err = ValidationError::MissingCandidate;
            controller.banners.show_error(err.to_string(), now);
            return Err(err);
        };
        self.busy = true;
        self.seq += 1;
        Ok(ConfirmRequest {
            token: ModalToken(self.seq),
            url,
        })
    }

    /// Turn the downloaded candidate into the model image.
    pub fn complete_confirm(
        &mut self,
        request: &ConfirmRequest,
        result: Result<Vec<u8>, RequestError>,
        controller: &mut TryOnController,
        now: f64,
    ) -> bool {
        if request.token.0 != self.seq {
            log::debug!("dropping stale candidate download {:?}", request.token);
            return false;
        }
        self.busy = false;
        match result {
            Ok(bytes) => {
                let file = ImageFile::new(candidate_file_name(&request.url), bytes);
                if controller
                    .select_image(ImageSlot::Model, Some(file), now)
                    .is_ok()
                {
                    self.close();
                    controller.banners.show_success(AI_MODEL_APPLIED, now);
                }
            }
            Err(err) => controller.banners.show_error(err.banner_text(), now),
        }
        true
    }

    pub async fn run_generate<B: TryOnBackend>(
        &mut self,
        backend: &B,
        controller: &mut TryOnController,
        now: f64,
    ) -> Result<(), TryOnError> {
        let Some(request) = self.begin_generate() else {
            return Ok(());
        };
        let result = backend.generate_ai_model(&request.params).await;
        self.complete_generate(request.token, result.clone(), controller, now);
        result?;
        Ok(())
    }

    pub async fn run_confirm<B: TryOnBackend>(
        &mut self,
        backend: &B,
        controller: &mut TryOnController,
        now: f64,
    ) -> Result<(), TryOnError> {
        let request = self.begin_confirm(controller, now)?;
        let result = backend.fetch_image(&request.url).await;
        self.complete_confirm(&request, result.clone(), controller, now);
        result?;
        Ok(())
    }
}

/// File name for a downloaded candidate, taken from the URL path.
pub fn candidate_file_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("ai-model.png")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::BannerKind;
    use crate::image_file::tests::png_bytes;
    use crate::testing::{Call, FakeBackend};
    use pollster::block_on;

    fn generated(url: &str) -> GeneratedModel {
        GeneratedModel {
            model_image_url: url.into(),
            message: None,
        }
    }

    fn assert_reset(modal: &ModelModal) {
        assert!(!modal.is_open());
        assert_eq!(modal.form, ModelGenerationParams::default());
        assert!(!modal.preview_visible());
        assert!(modal.candidate().is_none());
        assert!(!modal.is_busy());
    }

    #[test]
    fn close_resets_and_is_idempotent() {
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();
        modal.select_tab(ModalTab::Generate);
        modal.form.prompt = "red coat".into();
        let req = modal.begin_generate().unwrap();
        modal.complete_generate(req.token, Ok(generated("/m.png")), &mut c, 0.0);
        assert!(modal.preview_visible());

        modal.close();
        assert_reset(&modal);
        modal.close();
        assert_reset(&modal);
    }

    #[test]
    fn backdrop_click_outside_closes() {
        let mut modal = ModelModal::default();
        modal.open();
        modal.form.ethnicity = "any".into();
        modal.backdrop_clicked(true);
        assert!(modal.is_open());
        modal.backdrop_clicked(false);
        assert_reset(&modal);
    }

    #[test]
    fn generate_shows_preview_and_hides_form() {
        let backend = FakeBackend::default().with_ai_model(Ok(GeneratedModel {
            model_image_url: "/static/results/ai_model_1.png".into(),
            message: Some("Model generated".into()),
        }));
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();
        modal.select_tab(ModalTab::Generate);
        modal.form.prompt = "smiling".into();

        block_on(modal.run_generate(&backend, &mut c, 0.0)).unwrap();
        assert!(modal.preview_visible());
        assert!(!modal.form_visible());
        assert_eq!(modal.form.prompt, "smiling");
        assert!(modal.take_scroll_request());
        assert!(!modal.take_scroll_request());
        assert_eq!(c.banners.visible(), Some((BannerKind::Success, "Model generated")));
        assert!(matches!(&backend.calls()[0], Call::AiModel { params } if params.prompt == "smiling"));
    }

    #[test]
    fn failed_generate_keeps_form() {
        let backend = FakeBackend::default().with_ai_model(Err(RequestError::Rejected {
            message: crate::backend::AI_MODEL_FAILED.into(),
            detail: None,
        }));
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();

        assert!(block_on(modal.run_generate(&backend, &mut c, 0.0)).is_err());
        assert!(modal.form_visible());
        assert!(!modal.is_busy());
        assert!(modal.candidate().is_none());
        assert_eq!(c.banners.visible().map(|(k, _)| k), Some(BannerKind::Error));
    }

    #[test]
    fn confirm_matches_direct_upload() {
        let bytes = png_bytes(6, 8);
        let backend = FakeBackend::default()
            .with_ai_model(Ok(generated("/static/results/ai_model_7.png")))
            .with_fetch(Ok(bytes.clone()));
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();
        block_on(modal.run_generate(&backend, &mut c, 0.0)).unwrap();
        block_on(modal.run_confirm(&backend, &mut c, 1.0)).unwrap();

        let direct = ImageFile::new("ai_model_7.png", bytes);
        let model = c.image(ImageSlot::Model).unwrap();
        assert!(model.file.same_content(&direct));
        assert_eq!((model.preview.width, model.preview.height), (6, 8));
        assert_reset(&modal);
        assert_eq!(c.banners.visible(), Some((BannerKind::Success, AI_MODEL_APPLIED)));
        assert_eq!(
            backend.calls().last(),
            Some(&Call::Fetch {
                url: "/static/results/ai_model_7.png".into()
            })
        );

        c.select_image(ImageSlot::Bag, Some(ImageFile::new("bag.png", png_bytes(2, 2))), 2.0)
            .unwrap();
        assert!(c.view().tryon_button_enabled);
    }

    #[test]
    fn confirm_without_candidate_is_rejected() {
        let backend = FakeBackend::default();
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        let err = block_on(modal.run_confirm(&backend, &mut c, 0.0)).unwrap_err();
        assert_eq!(err, TryOnError::Validation(ValidationError::MissingCandidate));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn response_after_close_is_ignored() {
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();
        let req = modal.begin_generate().unwrap();
        modal.close();

        assert!(!modal.complete_generate(req.token, Ok(generated("/late.png")), &mut c, 1.0));
        assert!(modal.candidate().is_none());
        assert_eq!(c.banners.visible(), None);
    }

    #[test]
    fn upload_tab_assigns_model_and_closes() {
        let mut modal = ModelModal::default();
        let mut c = TryOnController::default();
        modal.open();
        modal.form.prompt = "leftover".into();

        modal.upload(None, &mut c, 0.0).unwrap();
        assert!(modal.is_open());

        let file = ImageFile::new("me.png", png_bytes(3, 3));
        modal.upload(Some(file), &mut c, 0.0).unwrap();
        assert_reset(&modal);
        assert_eq!(c.image(ImageSlot::Model).unwrap().file.name, "me.png");
    }

    #[test]
    fn candidate_names_come_from_url_path() {
        assert_eq!(candidate_file_name("/static/results/ai_1.png?v=2"), "ai_1.png");
        assert_eq!(candidate_file_name("https://host/"), "ai-model.png");
    }
}
