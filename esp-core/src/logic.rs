//! Pure Business Logic
//!
//! Flankenerkennung für den Taster, ohne Hardware-Dependencies (testbar!)

/// Flankenerkennung für den Taster (Entprellen über Pegelvergleich)
///
/// Merkt sich den zuletzt gelesenen Pegel. Jede Änderung, egal ob
/// LOW → HIGH oder HIGH → LOW, zählt als Betätigung.
///
/// # Beispiele
///
/// ```
/// # use esp_core::ButtonEdge;
/// let mut edge = ButtonEdge::new(false);
/// assert!(!edge.update(false)); // keine Änderung
/// assert!(edge.update(true));   // steigende Flanke
/// assert!(!edge.update(true));  // Taster gehalten
/// assert!(edge.update(false));  // fallende Flanke
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    last_high: bool,
}

impl ButtonEdge {
    /// `initial_high` ist der Ruhepegel (Pull-Down → `false`)
    pub const fn new(initial_high: bool) -> Self {
        Self {
            last_high: initial_high,
        }
    }

    /// Übernimmt den neuen Pegel und meldet, ob eine Flanke vorlag
    ///
    /// Der gespeicherte Pegel wird immer aktualisiert.
    pub fn update(&mut self, is_high: bool) -> bool {
        let switched_high = is_high && !self.last_high;
        let switched_low = !is_high && self.last_high;
        self.last_high = is_high;
        switched_high || switched_low
    }

    /// Zuletzt gesehener Pegel
    pub fn last_high(&self) -> bool {
        self.last_high
    }
}
