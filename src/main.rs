#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use paint_by_numbers::diagnostics::{self, BuildMode, DiagnosticsLog};
use paint_by_numbers::settings::Settings;

/// Reads the settings file named by the environment, if any. Problems are
/// logged and the defaults used instead.
#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> Settings {
    let Some(path) = std::env::var_os(paint_by_numbers::settings::CONFIG_ENV_VAR) else {
        return Settings::default();
    };
    match Settings::load(&path) {
        Ok(settings) => {
            diagnostics::get().log(format_args!("Loaded settings from {}", path.to_string_lossy()));
            settings
        }
        Err(err) => {
            diagnostics::get().error_with_cause("Could not load settings, using defaults", &err);
            Settings::default()
        }
    }
}

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    let mode = BuildMode::detect();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(mode.default_log_filter())).init();
    diagnostics::install(DiagnosticsLog::new(mode));

    let settings = load_settings();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Paint by Numbers")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([480.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Paint by Numbers",
        native_options,
        Box::new(|cc| Ok(Box::new(paint_by_numbers::PaintApp::new(cc, settings)))),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    let mode = BuildMode::detect();
    let level = if mode.is_development() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    eframe::WebLogger::init(level).ok();
    diagnostics::install(DiagnosticsLog::new(mode));

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("the_canvas_id"))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            diagnostics::get().error("Canvas element 'the_canvas_id' not found");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(paint_by_numbers::PaintApp::new(cc, Settings::default())))),
            )
            .await;

        if let Err(err) = start_result {
            diagnostics::get().error_with_cause("Failed to start eframe", &format!("{err:?}"));
        }
    });
}
