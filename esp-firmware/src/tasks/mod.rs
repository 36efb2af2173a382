// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Taster- und Poll-Task teilen sich die Sync Engine (static), die
// WiFi-Tasks halten den Netzwerk-Stack am Leben.

pub mod sync;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use sync::{button_task, poll_task};
pub use wifi::{connection_task, dhcp_task, net_task};
