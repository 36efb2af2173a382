//! Core Types für die Farbsynchronisation
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;

/// Eine Farbe der Palette: RGB-Wert plus Anzeigename (für Logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub rgb: RGB8,
}

impl PaletteColor {
    pub const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name,
            rgb: RGB8 { r, g, b },
        }
    }
}

/// Fehler beim Erstellen einer Palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaletteError {
    /// Eine Palette braucht mindestens eine Farbe
    Empty,
}

/// Feste, geordnete Farbpalette (Länge N ≥ 1)
///
/// Wird einmal beim Start erstellt und danach nie verändert.
/// Alle Index-Berechnungen (Weiterschalten, Normalisieren) laufen hier,
/// damit ein ColorIndex immer in `[0, N)` liegt.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    colors: &'static [PaletteColor],
}

impl Palette {
    /// Erstellt eine Palette; leere Slices werden abgelehnt
    pub fn new(colors: &'static [PaletteColor]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { colors })
    }

    /// Anzahl der Farben (N)
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Immer `false`, existiert nur für Clippy (`len_without_is_empty`)
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Farbe an Position `index`
    ///
    /// # Panics
    /// Wenn `index >= len()`. Die Sync Engine hält ihren Index immer im
    /// gültigen Bereich.
    pub fn color(&self, index: usize) -> PaletteColor {
        self.colors[index]
    }

    /// Nächster Index: `(index + 1) mod N`
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.len()
    }

    /// Index eine Position vor `target`: `(target + N - 1) mod N`
    ///
    /// Nach anschließendem `next_index()` landet man genau auf `target`.
    pub fn pre_position(&self, target: usize) -> usize {
        (target % self.len() + self.len() - 1) % self.len()
    }

    /// Normalisiert einen Remote-Wert (beliebiges Vorzeichen) nach `[0, N)`
    pub fn wrap(&self, raw: i32) -> usize {
        i64::from(raw).rem_euclid(self.len() as i64) as usize
    }
}

/// Auslöser einer Farbänderung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChangeSource {
    /// Anzeige der Startfarbe beim Booten
    Startup,
    /// Lokaler Tastendruck
    Button,
    /// Änderung durch die Partner-Lampe (Poll)
    Remote,
}

/// Beschreibt eine angewendete Farbänderung
///
/// Wird von der Sync Engine zurückgegeben, damit Tasks loggen und Tests
/// prüfen können, was angezeigt wurde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorChange {
    pub index: usize,
    pub color: PaletteColor,
    pub source: ChangeSource,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for PaletteColor {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} ({}, {}, {})",
            self.name,
            self.rgb.r,
            self.rgb.g,
            self.rgb.b
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ColorChange {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ColorChange {{ index: {}, color: {}, source: {} }}",
            self.index,
            self.color,
            self.source
        )
    }
}
