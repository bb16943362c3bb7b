pub mod completion_client;
pub mod config;
pub mod context_loader;
pub mod embedder;
pub mod export;
pub mod search;
pub mod stream_decoder;
pub mod transcript;
pub mod video_search;
