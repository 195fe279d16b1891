//! # AgentForge Providers
//!
//! Network-facing implementations of the core `Generator` and `Judge`
//! traits. Currently one backend: the Gemini REST API, streamed over SSE
//! for generation and called request-response for judging.

pub mod gemini;

pub use gemini::GeminiProvider;
