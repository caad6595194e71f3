//! Mixtape terminal host
//!
//! Renders the track list on stdout, reads commands from stdin and plays the
//! catalog through the desktop media resource.
//!
//! This library exposes the host components for testing purposes.

pub mod config;
pub mod error;
pub mod input;
pub mod session;
pub mod view;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CatalogEntry, PlayerSettings};
pub use error::{AppError, Result};
pub use session::{build_controller, probe_catalog, run_player, TerminalController};
pub use view::{render_screen, TerminalControls, TerminalTrack};
