//! # Contracts
//!
//! Frozen interface contracts shared by every broadcaster crate: the campaign
//! data model, observer events and the collaborator traits the dispatch engine
//! talks to. Business crates depend on this crate only; reverse dependencies
//! are prohibited.
//!
//! ## Addresses
//! - A recipient address is the raw digit string typed by the operator
//! - `SENTINEL_ADDRESS` stands in for anything missing or too short to be real

mod archive;
mod autoreply;
mod config;
mod error;
mod event;
mod observer;
mod outcome;
mod recipient;
mod request;
mod store;
mod transport;

pub use archive::*;
pub use autoreply::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use observer::*;
pub use outcome::*;
pub use recipient::*;
pub use request::*;
pub use store::*;
pub use transport::*;
