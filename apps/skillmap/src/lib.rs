pub mod clustering;
pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod recommendation;
pub mod state;
pub mod vocabulary;
