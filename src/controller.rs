//! Upload handling plus the try-on and video flows.
//!
//! Each flow is split in two halves so the UI can run the request elsewhere:
//! `begin_*` validates and puts the screen into its busy state, `complete_*`
//! applies the outcome and always runs the cleanup. A token ties the halves
//! together; completions carrying an outdated token are dropped.

use crate::backend::TryOnBackend;
use crate::banner::BannerNotifier;
use crate::error::{RequestError, TryOnError, ValidationError};
use crate::image_file::{ImageFile, ImagePreview};
use crate::view::{ActionAffordance, VideoPlayer, ViewState};

pub const TRYON_SUCCESS: &str = "Virtual try-on generated successfully!";
pub const VIDEO_SUCCESS: &str = "Video ad generated successfully!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    Model,
    Bag,
}

impl ImageSlot {
    pub fn label(&self) -> &'static str {
        match self {
            ImageSlot::Model => "model",
            ImageSlot::Bag => "bag",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Clone, Debug)]
pub struct SelectedImage {
    pub file: ImageFile,
    pub preview: ImagePreview,
}

#[derive(Clone, Debug)]
pub struct TryOnRequest {
    pub token: RequestToken,
    pub model: ImageFile,
    pub bag: ImageFile,
}

#[derive(Clone, Debug)]
pub struct VideoRequest {
    pub token: RequestToken,
    pub tryon_url: String,
}

pub struct TryOnController {
    model: Option<SelectedImage>,
    bag: Option<SelectedImage>,
    tryon_url: Option<String>,
    view: ViewState,
    video: VideoPlayer,
    pub banners: BannerNotifier,
    tryon_state: FlowState,
    video_state: FlowState,
    tryon_seq: u64,
    video_seq: u64,
}

impl Default for TryOnController {
    fn default() -> Self {
        TryOnController::new(BannerNotifier::default())
    }
}

impl TryOnController {
    pub fn new(banners: BannerNotifier) -> TryOnController {
        TryOnController {
            model: None,
            bag: None,
            tryon_url: None,
            view: ViewState::default(),
            video: VideoPlayer::default(),
            banners,
            tryon_state: FlowState::Idle,
            video_state: FlowState::Idle,
            tryon_seq: 0,
            video_seq: 0,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn video(&self) -> &VideoPlayer {
        &self.video
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&SelectedImage> {
        match slot {
            ImageSlot::Model => self.model.as_ref(),
            ImageSlot::Bag => self.bag.as_ref(),
        }
    }

    pub fn tryon_url(&self) -> Option<&str> {
        self.tryon_url.as_deref()
    }

    pub fn tryon_state(&self) -> FlowState {
        self.tryon_state
    }

    pub fn video_state(&self) -> FlowState {
        self.video_state
    }

    pub fn tryon_affordance(&self) -> ActionAffordance {
        ActionAffordance::new(self.view.tryon_button_enabled)
    }

    pub fn video_affordance(&self) -> ActionAffordance {
        ActionAffordance::new(self.view.video_button_enabled)
    }

    /// Store a picked file for `slot`. `None` (dialog cancelled) is ignored.
    /// A file that does not decode leaves the slot untouched.
    pub fn select_image(
        &mut self,
        slot: ImageSlot,
        file: Option<ImageFile>,
        now: f64,
    ) -> Result<(), ValidationError> {
        let Some(file) = file else {
            return Ok(());
        };
        let preview = match ImagePreview::decode(&file) {
            Ok(preview) => preview,
            Err(err) => {
                self.banners.show_error(err.to_string(), now);
                return Err(err);
            }
        };
        log::info!(
            "{} image selected: {} ({} bytes, {})",
            slot.label(),
            file.name,
            file.len(),
            file.mime
        );
        let selected = Some(SelectedImage { file, preview });
        match slot {
            ImageSlot::Model => self.model = selected,
            ImageSlot::Bag => self.bag = selected,
        }
        self.refresh_gate();
        Ok(())
    }

    fn refresh_gate(&mut self) {
        let tryon_busy = self.tryon_state == FlowState::Submitting;
        let video_busy = self.video_state == FlowState::Submitting;
        self.view.tryon_button_enabled = self.model.is_some() && self.bag.is_some() && !tryon_busy;
        self.view.video_button_enabled = self.tryon_url.is_some() && !tryon_busy && !video_busy;
    }

    pub fn begin_tryon(&mut self, now: f64) -> Result<TryOnRequest, ValidationError> {
        let (Some(model), Some(bag)) = (&self.model, &self.bag) else {
            let err = ValidationError::MissingImages;
            self.banners.show_error(err.to_string(), now);
            return Err(err);
        };
        let (model, bag) = (model.file.clone(), bag.file.clone());

        self.view.empty_state = false;
        self.view.tryon_result = false;
        self.view.video_result = false;
        self.banners.hide_all();
        self.view.tryon_loading = true;

        // The old composite no longer matches what is on screen.
        self.tryon_url = None;
        self.tryon_seq += 1;
        self.tryon_state = FlowState::Submitting;
        if self.video_state == FlowState::Submitting {
            log::debug!("try-on restarted, dropping in-flight video request");
            self.video_seq += 1;
            self.video_state = FlowState::Idle;
            self.view.video_loading = false;
        }
        self.refresh_gate();

        log::info!("submitting try-on: model={} bag={}", model.name, bag.name);
        Ok(TryOnRequest {
            token: RequestToken(self.tryon_seq),
            model,
            bag,
        })
    }

    /// Apply a try-on outcome. Returns false if the token is outdated.
    pub fn complete_tryon(
        &mut self,
        token: RequestToken,
        result: Result<String, RequestError>,
        now: f64,
    ) -> bool {
        if token.0 != self.tryon_seq {
            log::debug!("dropping stale try-on response {token:?}");
            return false;
        }
        match result {
            Ok(url) => {
                log::info!("try-on ready: {url}");
                self.tryon_url = Some(url);
                self.view.tryon_result = true;
                self.tryon_state = FlowState::Success;
                self.banners.show_success(TRYON_SUCCESS, now);
            }
            Err(err) => {
                self.tryon_state = FlowState::Failed;
                self.banners.show_error(err.banner_text(), now);
                self.view.empty_state = true;
            }
        }
        self.view.tryon_loading = false;
        self.refresh_gate();
        true
    }

    pub fn begin_video(&mut self, now: f64) -> Result<VideoRequest, ValidationError> {
        let Some(tryon_url) = self.tryon_url.clone() else {
            let err = ValidationError::MissingTryOn;
            self.banners.show_error(err.to_string(), now);
            return Err(err);
        };

        self.view.video_result = false;
        self.banners.hide_all();
        self.view.video_loading = true;
        self.video_seq += 1;
        self.video_state = FlowState::Submitting;
        self.refresh_gate();

        log::info!("submitting video for {tryon_url}");
        Ok(VideoRequest {
            token: RequestToken(self.video_seq),
            tryon_url,
        })
    }

    /// Apply a video outcome. Returns false if the token is outdated.
    pub fn complete_video(
        &mut self,
        token: RequestToken,
        result: Result<String, RequestError>,
        now: f64,
    ) -> bool {
        if token.0 != self.video_seq {
            log::debug!("dropping stale video response {token:?}");
            return false;
        }
        match result {
            Ok(url) => {
                log::info!("video ready: {url}");
                self.video.set_source(url);
                self.video.load();
                self.view.video_result = true;
                self.video_state = FlowState::Success;
                self.banners.show_success(VIDEO_SUCCESS, now);
            }
            Err(err) => {
                self.video_state = FlowState::Failed;
                self.banners.show_error(err.banner_text(), now);
            }
        }
        self.view.video_loading = false;
        self.refresh_gate();
        true
    }

    /// Whole try-on flow against `backend`.
    pub async fn run_tryon<B: TryOnBackend>(
        &mut self,
        backend: &B,
        now: f64,
    ) -> Result<String, TryOnError> {
        let request = self.begin_tryon(now)?;
        let result = backend.generate_tryon(&request.model, &request.bag).await;
        self.complete_tryon(request.token, result.clone(), now);
        Ok(result?)
    }

    /// Whole video flow against `backend`.
    pub async fn run_video<B: TryOnBackend>(
        &mut self,
        backend: &B,
        now: f64,
    ) -> Result<String, TryOnError> {
        let request = self.begin_video(now)?;
        let result = backend.generate_video(&request.tryon_url).await;
        self.complete_video(request.token, result.clone(), now);
        Ok(result?)
    }
}
