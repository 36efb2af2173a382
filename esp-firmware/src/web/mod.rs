// Web-Modul: HTTP-Client für den Farbindex-Dienst
// Request-Aufbau und Response-Parsing liegen in esp_core::protocol

pub mod http_store;

pub use http_store::{BoundedHttpStore, HttpColorStore, http_deadline};
