//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, Pure Functions, das HTTP-Protokoll des
//! Farbindex-Dienstes und die Sync Engine der Freundschaftslampe.

#![no_std]

pub mod engine;
pub mod logic;
pub mod protocol;
pub mod remote;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use engine::{ButtonMonitor, EngineError, SyncEngine};
pub use logic::ButtonEdge;
pub use remote::{DeadlineStore, RemoteStateClient};
pub use traits::{ButtonInput, ColorController, ColorStore, InputError, LedError, RemoteError};
pub use types::{ChangeSource, ColorChange, Palette, PaletteColor, PaletteError};
