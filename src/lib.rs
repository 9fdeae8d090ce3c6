pub mod analysis_fetch;
pub mod chat;
pub mod config;
pub mod demo;
pub mod error;
pub mod feed;
pub mod game_mode;
pub mod http_client;
pub mod model;
pub mod narrative;
pub mod state;
