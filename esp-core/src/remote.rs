//! Remote State Client
//!
//! Dünne Schicht über einem [`ColorStore`], die Netzwerkfehler schluckt:
//! Lesen fällt auf einen vom Aufrufer gelieferten Wert zurück, Schreiben
//! wird einmal versucht und bei Fehler verworfen.
//!
//! [`DeadlineStore`] begrenzt jede Anfrage zusätzlich auf eine feste
//! Gesamtdauer, damit ein hängender Server weder Poll-Worker noch
//! Taster-Schleife dauerhaft aufhält.

use core::future::Future;

use embassy_futures::select::{Either, select};

use crate::traits::{ColorStore, RemoteError};

/// Fehlertoleranter Client für den geteilten Farbindex
pub struct RemoteStateClient<S> {
    store: S,
}

impl<S: ColorStore> RemoteStateClient<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Zugriff auf den darunterliegenden Speicher
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Liest den Remote-Farbindex
    ///
    /// Bei jedem Fehler (Netzwerk, Timeout, kaputte Antwort) wird
    /// `fallback` unverändert zurückgegeben.
    pub async fn get_current_color(&self, fallback: i32) -> i32 {
        match self.store.fetch_color_index().await {
            Ok(index) => {
                #[cfg(feature = "defmt")]
                defmt::info!("REMOTE: Got color index {}", index);
                index
            }
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "REMOTE: Error getting current color: {}, keeping {}",
                    _error,
                    fallback
                );
                fallback
            }
        }
    }

    /// Veröffentlicht den Farbindex (best effort, kein Retry)
    pub async fn set_current_color(&self, index: usize) {
        match self.store.publish_color_index(index).await {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("REMOTE: Published color index {}", index);
            }
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("REMOTE: Error setting current color: {}", _error);
            }
        }
    }
}

/// Farbspeicher mit Gesamt-Deadline pro Anfrage
///
/// `deadline` liefert für jede Anfrage einen neuen Timer-Future
/// (Firmware: `Timer::after(...)`). Läuft er zuerst ab, wird die Anfrage
/// abgebrochen und `RemoteError::Timeout` gemeldet.
pub struct DeadlineStore<S, F> {
    store: S,
    deadline: F,
}

impl<S, F> DeadlineStore<S, F> {
    pub const fn new(store: S, deadline: F) -> Self {
        Self { store, deadline }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S, F, Fut> ColorStore for DeadlineStore<S, F>
where
    S: ColorStore,
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    async fn fetch_color_index(&self) -> Result<i32, RemoteError> {
        match select(self.store.fetch_color_index(), (self.deadline)()).await {
            Either::First(result) => result,
            Either::Second(()) => Err(RemoteError::Timeout),
        }
    }

    async fn publish_color_index(&self, index: usize) -> Result<(), RemoteError> {
        match select(self.store.publish_color_index(index), (self.deadline)()).await {
            Either::First(result) => result,
            Either::Second(()) => Err(RemoteError::Timeout),
        }
    }
}
