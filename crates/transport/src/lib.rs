//! # Transport
//!
//! Messaging transport adapters.
//!
//! Responsibilities:
//! - Provide `MessagingTransport` implementations for the dispatch engine
//! - `GatewayTransport`: HTTP client for a messaging gateway that owns the
//!   actual session (pairing, reconnects)
//! - `MockTransport`: scriptable in-memory transport for tests and dry runs

pub mod gateway;
pub mod mock;

pub use contracts::{MessagingTransport, SessionState};
pub use gateway::{GatewayConfig, GatewayTransport};
pub use mock::{MockTransport, MockTransportConfig, SentMessage};
