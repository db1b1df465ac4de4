//! Chat-completion provider implementations for MathDesk.
//!
//! All providers implement the `mathdesk_core::Provider` trait.
//! The router builds the text and vision providers from configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;
