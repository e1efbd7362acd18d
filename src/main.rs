mod app;
mod event;
mod gemini;
mod model;
mod theme;
mod ui;

use app::LevelUpApp;
use eframe::egui;
use gemini::GeminiClient;
use std::sync::mpsc;
use theme::Theme;
use tracing_subscriber::EnvFilter;

fn api_key_from_env() -> String {
    let key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .unwrap_or_default();
    if key.is_empty() {
        tracing::warn!("no API key in GEMINI_API_KEY or API_KEY; remote calls will fail");
    }
    key
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("levelup=info")),
        )
        .init();

    let api_key = api_key_from_env();
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("levelup-runtime")
        .build()?;

    let client = GeminiClient::new(api_key, tx, runtime.handle().clone());
    let app = LevelUpApp::new(rx, client);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LevelUp AI",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
