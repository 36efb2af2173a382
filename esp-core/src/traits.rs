//! Hardware- und Netzwerk-Abstraktion
//!
//! Diese Traits definieren die Schnittstellen zu LED, Taster und
//! Remote-Farbspeicher ohne konkrete Implementierung.

use rgb::RGB8;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für das Lesen des Tasters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    ReadFailed,
}

/// Fehler bei Zugriffen auf den Remote-Farbspeicher
///
/// Diese Fehler sind transient: der [`RemoteStateClient`](crate::RemoteStateClient)
/// loggt sie und reicht sie nie an die Sync Engine weiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteError {
    /// WLAN nicht verbunden oder noch keine IP
    NetworkDown,
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    /// Lesen/Schreiben auf dem Socket fehlgeschlagen
    Io,
    /// Anfrage hat die Gesamt-Deadline überschritten
    Timeout,
    RequestTooLarge,
    ResponseTooLarge,
    MalformedResponse,
    /// Server hat mit einem Nicht-2xx-Status geantwortet
    HttpStatus(u16),
}

/// Color Controller: steuert die physische LED an
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLed (in-memory Mock)
pub trait ColorController {
    /// Zeigt eine RGB-Farbe an
    ///
    /// Idempotent: dieselbe Farbe zweimal zu schreiben ändert nichts.
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn turn_on_color(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Digitaler Eingang des Tasters (Pull-Down, inaktiv = LOW)
pub trait ButtonInput {
    /// Liest den aktuellen Pegel, `true` = HIGH
    fn is_high(&mut self) -> Result<bool, InputError>;
}

/// Remote-Speicher für den geteilten Farbindex
///
/// Methoden nehmen `&self`, damit Poll-Worker und Taster-Pfad ohne
/// gemeinsames Lock auf das Netzwerk zugreifen können.
#[allow(async_fn_in_trait)]
pub trait ColorStore {
    /// Liest den aktuellen Farbindex (roh, nicht normalisiert)
    async fn fetch_color_index(&self) -> Result<i32, RemoteError>;

    /// Schreibt einen neuen Farbindex
    async fn publish_color_index(&self, index: usize) -> Result<(), RemoteError>;
}
