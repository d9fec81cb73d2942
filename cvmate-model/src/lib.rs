//! # cvmate-model
//!
//! Generative chat-model clients for the cvmate CV assistant.
//!
//! The [`ChatModel`] trait is the narrow contract the rest of the system
//! sees: a system instruction, a user message, and [`GenerationParams`] in;
//! raw text out. Currently shipped implementations:
//!
//! - [`DeepSeekClient`] — DeepSeek via the HuggingFace router's
//!   OpenAI-compatible chat-completions endpoint
//! - [`MockChatModel`] — deterministic test double
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use cvmate_model::{ChatModel, DeepSeekClient, DeepSeekConfig, GenerationParams};
//!
//! let model = DeepSeekClient::new(DeepSeekConfig::new(
//!     std::env::var("HUGGINGFACE_API_KEY").unwrap(),
//! ))?;
//! let answer = model
//!     .generate("You are a helpful assistant.", "Say hello.", &GenerationParams::default())
//!     .await?;
//! ```

pub mod chat;
pub mod deepseek;
pub mod error;
pub mod mock;

pub use chat::{ChatModel, GenerationParams};
pub use deepseek::{DeepSeekClient, DeepSeekConfig, ROUTER_API_URL};
pub use error::{ModelError, Result};
pub use mock::MockChatModel;
