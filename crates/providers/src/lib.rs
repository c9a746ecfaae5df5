//! LLM Provider implementations for Lucy.
//!
//! All providers implement the `lucy_core::Provider` trait. The companion
//! talks to one OpenAI-compatible endpoint, usually a local Ollama.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
