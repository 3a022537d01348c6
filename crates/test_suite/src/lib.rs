//! Shared helpers for the ember http server tests.
//!
//! [`ChannelReader`] feeds bytes to a parser in arbitrary fragments, [`RawClient`] speaks to a
//! running server over real TCP without any HTTP client logic of its own.

mod channel;
mod client;

pub use channel::ChannelReader;
pub use client::{RawClient, RawResponse};
