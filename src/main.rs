use tryon_studio::{ClientConfig, TryOnApp};

fn create_app(
    cc: &eframe::CreationContext<'_>,
) -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Box::new(TryOnApp::new(cc)?))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    let config = ClientConfig::from_env();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Bag Virtual Try-On")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "tryon-studio",
        native_options,
        Box::new(create_app),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;

    let config = ClientConfig::from_env();
    eframe::WebLogger::init(config.log_level.to_level_filter()).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async move {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("no document to attach to");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("the_canvas_id")
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("the_canvas_id is missing or not a canvas");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(canvas, web_options, Box::new(create_app))
            .await;

        if let Err(e) = start_result {
            log::error!("failed to start eframe: {e:?}");
        }
    });
}
