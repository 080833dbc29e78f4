pub mod animation;
pub mod app;
pub mod catalog;
pub mod client;
pub mod config;
pub mod events;
pub mod languages;
pub mod logging;
pub mod models;
pub mod ui;

pub use app::App;
pub use client::HttpClient;
pub use config::AppConfig;
pub use events::EventHandler;
pub use models::*;
