//! Audio source implementations for desktop

pub mod local;

pub use local::{probe_duration, LocalSource};
