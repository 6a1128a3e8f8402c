//! Publisher-facing client for the Specify ad network.
//!
//! [`Specify`] resolves wallet-targeted ads over HTTP. Pluggable cache tiers
//! remember the server-issued session identifier and merge wallet addresses
//! across calls.

mod client;
mod compose;
mod error;
mod resolve;
mod transport;


pub use client::{ServeOptions, Specify, SpecifyBuilder};
pub use error::SpecifyError;
pub use transport::{AdRequest, AdTransport, HttpTransport, RawResponse};

pub use specify_domain::model::{
    FieldDetail, ImageFormat, PublisherKey, SpecifyAd, WalletAddress,
};
pub use specify_domain::session::{CachedSession, SessionStore};
