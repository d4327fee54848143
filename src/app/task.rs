//! Running backend requests off the UI thread.
//!
//! Native builds give each request a thread with its own current-thread
//! tokio runtime; the web build hands the future to the browser's event
//! loop. Either way exactly one message comes back per request.

use std::future::Future;
use std::sync::mpsc::Sender;

use super::FlowMsg;
use crate::error::RequestError;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_request<T, F, Fut, M>(
    ctx: &egui::Context,
    tx: &Sender<FlowMsg>,
    request: F,
    into_msg: M,
) where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, RequestError>> + 'static,
    M: FnOnce(Result<T, RequestError>) -> FlowMsg + Send + 'static,
{
    let ctx = ctx.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let result = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt.block_on(request()),
            Err(err) => Err(RequestError::Transport(format!(
                "failed to start request runtime: {err}"
            ))),
        };
        tx.send(into_msg(result)).ok();
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_request<T, F, Fut, M>(
    ctx: &egui::Context,
    tx: &Sender<FlowMsg>,
    request: F,
    into_msg: M,
) where
    T: 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<T, RequestError>> + 'static,
    M: FnOnce(Result<T, RequestError>) -> FlowMsg + 'static,
{
    let ctx = ctx.clone();
    let tx = tx.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = request().await;
        tx.send(into_msg(result)).ok();
        ctx.request_repaint();
    });
}
