//! Cadence Player Library
//!
//! Headless player: loads CMS collections into a playback session, probes
//! durations over HTTP and simulates playback against the clock.
//!
//! This library exposes the components the binary wires together so they
//! can be tested on their own.

pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod runner;

pub use config::{PlayerConfig, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILTER};
pub use engine::HeadlessEngine;
pub use error::{PlayerError, Result};
pub use probe::HttpDurationProbe;
pub use runner::{render_listing, Player};
