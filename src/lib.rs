pub mod compare;
pub mod config;
pub mod football_api;
pub mod http_client;
pub mod llm_api;
pub mod models;
pub mod odds;
pub mod prediction;
pub mod sample_data;
pub mod selector;
