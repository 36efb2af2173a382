// Library-Root: Firmware der Freundschaftslampe
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von esp-core
pub use esp_core::{
    ButtonMonitor, ColorChange, ColorController, ColorStore, EngineError, LedError, Palette,
    PaletteColor, RemoteError, SyncEngine,
};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::hal::RmtLedWriter;
use crate::web::BoundedHttpStore;

// ============================================================================
// Type-Aliase
// ============================================================================
//
// Statt:  SyncEngine<CriticalSectionRawMutex, RmtLedWriter<'static>, BoundedHttpStore>
// Nutze:  LampEngine

/// Sync Engine mit echter Hardware und HTTP-Farbspeicher (mit Deadline)
///
/// CriticalSectionRawMutex, weil Taster- und Poll-Task die Engine teilen
/// (esp-hal stellt die Critical-Section-Implementierung bereit).
pub type LampEngine = SyncEngine<CriticalSectionRawMutex, RmtLedWriter<'static>, BoundedHttpStore>;

// ============================================================================
// Testing
// ============================================================================
//
// Dieses Crate kompiliert nur für riscv32imac-unknown-none-elf und hat
// deshalb keine eigenen Unit Tests. Die komplette Logik (Flankenerkennung,
// Sync Engine, HTTP-Protokoll) liegt in esp-core und wird in esp-tests mit
// Mock-LED, Mock-Taster und Mock-Farbspeicher auf dem Host getestet.
// Hier bleibt nur dünner Hardware-Glue (RMT, GPIO, TCP-Socket, WiFi).
