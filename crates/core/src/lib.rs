//! # MathDesk Core
//!
//! Domain types, traits, and error definitions for the MathDesk teaching
//! assistant. This crate performs **no I/O**: it defines the domain model
//! that the store, provider and tutor crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (the archive file, the completion endpoint)
//! is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with in-memory / scripted stand-ins
//! - Clean dependency graph (all crates depend inward on core)

pub mod archive;
pub mod error;
pub mod message;
pub mod provider;
pub mod record;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use archive::Archive;
pub use error::{Error, ProviderError, Result, StoreError};
pub use message::{ContentPart, ImageUrl, Message, MessageContent, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use record::{Record, RecordKind};
pub use store::ArchiveStore;
