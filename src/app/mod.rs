mod gui;
mod task;

use std::sync::mpsc::{Receiver, Sender};

use uuid::Uuid;

use crate::api::GeneratedModel;
use crate::backend::{HttpBackend, TryOnBackend};
use crate::banner::BannerNotifier;
use crate::config::{self, ClientConfig};
use crate::controller::{ImageSlot, RequestToken, TryOnController};
use crate::error::RequestError;
use crate::image_file::{IMAGE_EXTENSIONS, ImageFile};
use crate::modal::{ConfirmRequest, ModalToken, ModelModal};

/// Where a picked file goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickTarget {
    Slot(ImageSlot),
    ModalUpload,
}

/// Results flowing back to the UI thread.
pub enum FlowMsg {
    Picked {
        target: PickTarget,
        file: ImageFile,
    },
    PickFailed(String),
    TryOn {
        token: RequestToken,
        result: Result<String, RequestError>,
    },
    Video {
        token: RequestToken,
        result: Result<String, RequestError>,
    },
    AiModel {
        token: ModalToken,
        result: Result<GeneratedModel, RequestError>,
    },
    CandidateFetched {
        request: ConfirmRequest,
        result: Result<Vec<u8>, RequestError>,
    },
}

#[derive(Default)]
struct PreviewTextures {
    model: Option<(Uuid, egui::TextureHandle)>,
    bag: Option<(Uuid, egui::TextureHandle)>,
}

pub struct TryOnApp {
    config: ClientConfig,
    backend: HttpBackend,
    controller: TryOnController,
    modal: ModelModal,
    msg_tx: Sender<FlowMsg>,
    msg_rx: Receiver<FlowMsg>,
    textures: PreviewTextures,
    settings_open: bool,
    backend_url_draft: String,
}

impl TryOnApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<TryOnApp, RequestError> {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<ClientConfig>(storage, config::STORAGE_KEY))
            .unwrap_or_else(ClientConfig::from_env);
        log::info!("using backend at {}", config.backend_url);

        let backend = HttpBackend::new(config.clone())?;
        let controller = TryOnController::new(BannerNotifier::new(config.banner_dwell_secs));
        let (msg_tx, msg_rx) = std::sync::mpsc::channel();

        Ok(TryOnApp {
            backend_url_draft: config.backend_url.clone(),
            config,
            backend,
            controller,
            modal: ModelModal::default(),
            msg_tx,
            msg_rx,
            textures: PreviewTextures::default(),
            settings_open: false,
        })
    }

    fn apply_backend_url(&mut self, now: f64) {
        let url = self.backend_url_draft.trim().to_string();
        if url.is_empty() || url == self.config.backend_url {
            return;
        }
        let mut config = self.config.clone();
        config.backend_url = url;
        match HttpBackend::new(config.clone()) {
            Ok(backend) => {
                log::info!("backend changed to {}", config.backend_url);
                self.backend = backend;
                self.config = config;
            }
            Err(err) => self.controller.banners.show_error(err.banner_text(), now),
        }
    }

    fn drain_messages(&mut self, now: f64) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                FlowMsg::Picked { target, file } => match target {
                    PickTarget::Slot(slot) => {
                        self.controller.select_image(slot, Some(file), now).ok();
                    }
                    PickTarget::ModalUpload => {
                        self.modal
                            .upload(Some(file), &mut self.controller, now)
                            .ok();
                    }
                },
                FlowMsg::PickFailed(err) => self.controller.banners.show_error(err, now),
                FlowMsg::TryOn { token, result } => {
                    self.controller.complete_tryon(token, result, now);
                }
                FlowMsg::Video { token, result } => {
                    self.controller.complete_video(token, result, now);
                }
                FlowMsg::AiModel { token, result } => {
                    self.modal
                        .complete_generate(token, result, &mut self.controller, now);
                }
                FlowMsg::CandidateFetched { request, result } => {
                    self.modal
                        .complete_confirm(&request, result, &mut self.controller, now);
                }
            }
        }
    }

    fn start_tryon(&mut self, ctx: &egui::Context, now: f64) {
        let Ok(request) = self.controller.begin_tryon(now) else {
            return;
        };
        let backend = self.backend.clone();
        let token = request.token;
        task::spawn_request(
            ctx,
            &self.msg_tx,
            move || async move { backend.generate_tryon(&request.model, &request.bag).await },
            move |result| FlowMsg::TryOn { token, result },
        );
    }

    fn start_video(&mut self, ctx: &egui::Context, now: f64) {
        let Ok(request) = self.controller.begin_video(now) else {
            return;
        };
        let backend = self.backend.clone();
        let token = request.token;
        task::spawn_request(
            ctx,
            &self.msg_tx,
            move || async move { backend.generate_video(&request.tryon_url).await },
            move |result| FlowMsg::Video { token, result },
        );
    }

    fn start_generate_model(&mut self, ctx: &egui::Context) {
        let Some(request) = self.modal.begin_generate() else {
            return;
        };
        let backend = self.backend.clone();
        let token = request.token;
        task::spawn_request(
            ctx,
            &self.msg_tx,
            move || async move { backend.generate_ai_model(&request.params).await },
            move |result| FlowMsg::AiModel { token, result },
        );
    }

    fn start_confirm_model(&mut self, ctx: &egui::Context, now: f64) {
        let Ok(request) = self.modal.begin_confirm(&mut self.controller, now) else {
            return;
        };
        let backend = self.backend.clone();
        let url = request.url.clone();
        task::spawn_request(
            ctx,
            &self.msg_tx,
            move || async move { backend.fetch_image(&url).await },
            move |result| FlowMsg::CandidateFetched { request, result },
        );
    }

    fn video_url(&self) -> Option<String> {
        let url = self.config.resolve(self.controller.video().source()?);
        log::info!("opening video {url}");
        Some(url)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_video(&self, _ctx: &egui::Context) {
        if let Some(url) = self.video_url() {
            if let Err(err) = opener::open(&url) {
                log::error!("failed to open video: {err}");
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn open_video(&self, ctx: &egui::Context) {
        if let Some(url) = self.video_url() {
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }
    }
}

fn prompt_image(
    title: &'static str,
    target: PickTarget,
    tx: &Sender<FlowMsg>,
    ctx: &egui::Context,
) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen_futures::spawn_local;
        let tx = tx.clone();
        let ctx = ctx.clone();

        spawn_local(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .set_title(title)
                .add_filter("image files", IMAGE_EXTENSIONS)
                .pick_file()
                .await
            {
                let data = handle.read().await;
                let file = ImageFile::new(handle.file_name(), data);
                tx.send(FlowMsg::Picked { target, file }).ok();
                ctx.request_repaint();
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = rfd::FileDialog::new()
            .set_title(title)
            .add_filter("image files", IMAGE_EXTENSIONS)
            .pick_file()
        {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string());
            let msg = match std::fs::read(&path) {
                Ok(data) => FlowMsg::Picked {
                    target,
                    file: ImageFile::new(name, data),
                },
                Err(err) => FlowMsg::PickFailed(format!("failed to load image: {err}")),
            };
            tx.send(msg).ok();
            ctx.request_repaint();
        }
    }
}
