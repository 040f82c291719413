//! ollama-export CLI - export locally stored Ollama models.

pub mod commands;
pub mod output;
