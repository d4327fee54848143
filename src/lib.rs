//! Virtual try-on client: pick a model photo and a bag photo, have the
//! backend composite them, then turn the composite into a short video ad.

pub mod api;
pub mod app;
pub mod backend;
pub mod banner;
pub mod config;
pub mod controller;
pub mod error;
pub mod image_file;
pub mod modal;
pub mod view;

#[cfg(test)]
mod testing;

pub use app::TryOnApp;
pub use backend::{HttpBackend, TryOnBackend};
pub use config::ClientConfig;
pub use controller::TryOnController;
pub use error::{RequestError, TryOnError, ValidationError};
pub use modal::ModelModal;
