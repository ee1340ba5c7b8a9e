//! Client for the Panasonic Comfort Cloud air-conditioning API.

pub mod models {
    pub mod comfort;
}

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod transport;

pub use client::{ClientError, ComfortClient, SessionState};
pub use codec::{ControlCommand, ControlParameters};
