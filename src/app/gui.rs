use std::time::Duration;

use eframe::App;
use eframe::Frame;
use egui::Color32;
use egui::Modal;
use egui::RichText;
use egui::Window;

use super::PickTarget;
use super::TryOnApp;
use super::prompt_image;
use crate::api;
use crate::banner::BannerKind;
use crate::config;
use crate::controller::ImageSlot;
use crate::modal::ModalTab;
use crate::view::ActionAffordance;

const PREVIEW_SIDE: f32 = 220.0;

impl App for TryOnApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, config::STORAGE_KEY, &self.config);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = ctx.input(|i| i.time);
        self.drain_messages(now);
        self.controller.banners.tick(now);
        self.sync_textures(ctx);

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::group(&ctx.style()).inner_margin(egui::Margin::symmetric(12, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("👜 Bag Virtual Try-On");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("⚙").on_hover_text("Settings").clicked() {
                            self.backend_url_draft = self.config.backend_url.clone();
                            self.settings_open = true;
                        }
                        ui.label(RichText::new(&self.config.backend_url).small().weak());
                    });
                });
            });

        egui::SidePanel::left("inputs_panel")
            .resizable(false)
            .default_width(PREVIEW_SIDE + 40.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.inputs_panel(ui, now));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.results_panel(ui, now));
        });

        self.model_modal(ctx, now);
        self.settings_window(ctx, now);
        self.banner_overlay(ctx);

        if let Some(secs) = self.controller.banners.time_to_next_hide(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(secs));
        }
    }
}

impl TryOnApp {
    fn sync_textures(&mut self, ctx: &egui::Context) {
        for slot in [ImageSlot::Model, ImageSlot::Bag] {
            let selected = self.controller.image(slot);
            let cached = match slot {
                ImageSlot::Model => &mut self.textures.model,
                ImageSlot::Bag => &mut self.textures.bag,
            };
            match selected {
                Some(sel) if cached.as_ref().map(|(id, _)| *id) != Some(sel.file.id) => {
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(sel.preview.size(), &sel.preview.rgba);
                    let handle = ctx.load_texture(
                        format!("{}_preview", slot.label()),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    *cached = Some((sel.file.id, handle));
                }
                None => *cached = None,
                _ => {}
            }
        }
    }

    fn inputs_panel(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.add_space(8.0);
        ui.label(RichText::new("1. Model photo").strong());
        self.slot_card(ui, ImageSlot::Model);
        ui.horizontal(|ui| {
            if ui.small_button("📁 Upload").clicked() {
                prompt_image(
                    "choose model image",
                    PickTarget::Slot(ImageSlot::Model),
                    &self.msg_tx,
                    ui.ctx(),
                );
            }
            if ui.small_button("✨ Choose or generate…").clicked() {
                self.modal.open();
            }
        });

        ui.add_space(12.0);
        ui.label(RichText::new("2. Bag photo").strong());
        self.slot_card(ui, ImageSlot::Bag);
        if ui.small_button("📁 Upload").clicked() {
            prompt_image(
                "choose bag image",
                PickTarget::Slot(ImageSlot::Bag),
                &self.msg_tx,
                ui.ctx(),
            );
        }

        ui.add_space(16.0);
        let affordance = self.controller.tryon_affordance();
        let fill = Color32::from_rgb(60, 140, 80);
        if action_button(ui, "▶ Generate Try-On", affordance, fill).clicked() {
            let ctx = ui.ctx().clone();
            self.start_tryon(&ctx, now);
        }
    }

    fn slot_card(&self, ui: &mut egui::Ui, slot: ImageSlot) {
        let texture = match slot {
            ImageSlot::Model => self.textures.model.as_ref(),
            ImageSlot::Bag => self.textures.bag.as_ref(),
        };
        let box_size = egui::vec2(PREVIEW_SIDE, PREVIEW_SIDE);

        if let Some((_, tex)) = texture {
            let size = fit_within(tex.size_vec2(), box_size);
            ui.add(egui::Image::new((tex.id(), size)).corner_radius(4.0));
            if let Some(selected) = self.controller.image(slot) {
                let name = &selected.file.name;
                let display_name = if name.chars().count() > 28 {
                    format!("{}…", name.chars().take(25).collect::<String>())
                } else {
                    name.clone()
                };
                ui.label(RichText::new(display_name).small().weak());
            }
        } else {
            let (rect, _resp) = ui.allocate_exact_size(box_size, egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 4.0, egui::Color32::from_gray(50));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("📷\nno {} image", slot.label()),
                egui::FontId::proportional(13.0),
                egui::Color32::from_rgb(150, 150, 180),
            );
        }
    }

    fn results_panel(&mut self, ui: &mut egui::Ui, now: f64) {
        let view = self.controller.view().clone();

        ui.heading("Try-on result");
        ui.add_space(6.0);

        if view.tryon_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Compositing the bag onto the model…");
            });
        }

        if view.empty_state {
            let (rect, _resp) =
                ui.allocate_exact_size(egui::vec2(ui.available_width(), 240.0), egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 6.0, egui::Color32::from_gray(40));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Upload a model and a bag, then generate a try-on.",
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(160),
            );
        }

        if view.tryon_result {
            if let Some(url) = self.controller.tryon_url() {
                ui.add(
                    egui::Image::new(self.config.resolve(url))
                        .max_height(420.0)
                        .corner_radius(6.0),
                );
            }
        }

        ui.add_space(12.0);
        ui.separator();
        ui.heading("Video ad");
        ui.add_space(6.0);

        let affordance = self.controller.video_affordance();
        let fill = Color32::from_rgb(70, 90, 160);
        if action_button(ui, "🎬 Generate Video Ad", affordance, fill).clicked() {
            let ctx = ui.ctx().clone();
            self.start_video(&ctx, now);
        }

        if view.video_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Generating the video ad, this can take a few minutes…");
            });
        }

        if view.video_result {
            ui.horizontal(|ui| {
                if ui.button("▶ Play video").clicked() {
                    self.open_video(ui.ctx());
                }
                if let Some(source) = self.controller.video().source() {
                    ui.label(RichText::new(source).small().weak());
                }
            });
        }
    }

    fn model_modal(&mut self, ctx: &egui::Context, now: f64) {
        if !self.modal.is_open() {
            return;
        }

        let mut close_clicked = false;
        let response = Modal::new(egui::Id::new("model_modal")).show(ctx, |ui| {
            ui.set_width(440.0);
            ui.horizontal(|ui| {
                ui.heading("Choose a model");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        close_clicked = true;
                    }
                });
            });

            let mut tab = self.modal.tab();
            ui.horizontal(|ui| {
                ui.selectable_value(&mut tab, ModalTab::Upload, "📁 Upload");
                ui.selectable_value(&mut tab, ModalTab::Generate, "✨ Generate with AI");
            });
            self.modal.select_tab(tab);
            ui.separator();

            match tab {
                ModalTab::Upload => {
                    ui.label("Use a photo of a person facing the camera.");
                    if ui.button("📁 Choose photo…").clicked() {
                        prompt_image(
                            "choose model image",
                            PickTarget::ModalUpload,
                            &self.msg_tx,
                            ui.ctx(),
                        );
                    }
                }
                ModalTab::Generate => {
                    egui::ScrollArea::vertical()
                        .max_height(480.0)
                        .show(ui, |ui| self.generate_tab(ui, now));
                }
            }
        });

        if close_clicked {
            self.modal.close();
        } else if response.backdrop_response.clicked() {
            self.modal.backdrop_clicked(false);
        } else if response.should_close() {
            self.modal.close();
        }
    }

    fn generate_tab(&mut self, ui: &mut egui::Ui, now: f64) {
        let busy = self.modal.is_busy();

        if self.modal.form_visible() {
            ui.add_enabled_ui(!busy, |ui| {
                let form = &mut self.modal.form;
                egui::Grid::new("model_form")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        choice(ui, "Gender", &mut form.gender, api::GENDERS);
                        choice(ui, "Age", &mut form.age_range, api::AGE_RANGES);
                        choice(ui, "Body type", &mut form.body_type, api::BODY_TYPES);
                        choice(ui, "Pose", &mut form.pose, api::POSES);
                        choice(ui, "Background", &mut form.background, api::BACKGROUNDS);
                        ui.label("Ethnicity");
                        ui.text_edit_singleline(&mut form.ethnicity);
                        ui.end_row();
                    });
                ui.label("Extra details");
                ui.add(
                    egui::TextEdit::multiline(&mut form.prompt)
                        .hint_text("e.g. short dark hair, beige trench coat")
                        .desired_rows(3),
                );
            });

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!busy, egui::Button::new("✨ Generate Model"))
                    .clicked()
                {
                    self.start_generate_model(ui.ctx());
                }
                if busy {
                    ui.spinner();
                    ui.label("Generating…");
                }
            });
        }

        if self.modal.preview_visible() {
            let url = self
                .modal
                .candidate()
                .map(|c| self.config.resolve(&c.model_image_url));
            if let Some(url) = url {
                let resp = ui.add(egui::Image::new(url).max_height(360.0).corner_radius(6.0));
                if self.modal.take_scroll_request() {
                    resp.scroll_to_me(Some(egui::Align::Center));
                }
            }
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!busy, egui::Button::new("✓ Use this model"))
                    .clicked()
                {
                    let ctx = ui.ctx().clone();
                    self.start_confirm_model(&ctx, now);
                }
                if ui
                    .add_enabled(!busy, egui::Button::new("↺ Try again"))
                    .clicked()
                {
                    self.modal.discard_candidate();
                }
                if busy {
                    ui.spinner();
                }
            });
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context, now: f64) {
        if !self.settings_open {
            return;
        }
        let mut open = true;
        Window::new("settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Backend URL");
                ui.text_edit_singleline(&mut self.backend_url_draft);
                if ui.button("apply").clicked() {
                    self.apply_backend_url(now);
                }
                ui.label(
                    RichText::new(format!("current: {}", self.config.backend_url))
                        .small()
                        .weak(),
                );
            });
        self.settings_open = open;
    }

    fn banner_overlay(&self, ctx: &egui::Context) {
        let Some((kind, text)) = self.controller.banners.visible() else {
            return;
        };
        let (fill, icon) = match kind {
            BannerKind::Error => (Color32::from_rgb(170, 50, 50), "⚠"),
            BannerKind::Success => (Color32::from_rgb(50, 130, 70), "✔"),
        };
        egui::Area::new(egui::Id::new("banner"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 56.0])
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(format!("{icon} {text}"))
                                .color(Color32::WHITE)
                                .strong(),
                        );
                    });
            });
    }
}

/// Full-width action button dimmed and marked not-allowed while disabled.
fn action_button(
    ui: &mut egui::Ui,
    text: &str,
    affordance: ActionAffordance,
    fill: Color32,
) -> egui::Response {
    let button = egui::Button::new(RichText::new(text).strong().size(14.0))
        .fill(if affordance.enabled {
            fill
        } else {
            Color32::from_gray(60)
        })
        .min_size(egui::vec2(ui.available_width(), 36.0));

    let response = ui
        .scope(|ui| {
            ui.multiply_opacity(affordance.opacity);
            ui.add_enabled(affordance.enabled, button)
        })
        .inner;
    if response.contains_pointer() {
        ui.ctx().set_cursor_icon(affordance.cursor);
    }
    response
}

fn choice(ui: &mut egui::Ui, label: &str, value: &mut String, options: &[&str]) {
    ui.label(label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(value.as_str())
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, option.to_string(), *option);
            }
        });
    ui.end_row();
}

fn fit_within(size: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.x / size.x).min(bounds.y / size.y);
    size * scale
}
