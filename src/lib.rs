pub mod config;
pub mod error;
pub mod intake;
pub mod openai;
pub mod prompt;
pub mod web_server;
