// Push-Button - GPIO Eingang mit Pull-Down
//
// Ruhepegel LOW, gedrückt HIGH. Entprellt wird nicht hier, sondern
// über die Flankenerkennung in esp-core (ButtonEdge).

use esp_core::{ButtonInput, InputError};
use esp_hal::gpio::{Input, InputConfig, InputPin, Pull};

/// Taster an einem GPIO-Pin
pub struct GpioButton<'a> {
    input: Input<'a>,
}

impl<'a> GpioButton<'a> {
    /// Konfiguriert den Pin einmalig als Eingang mit Pull-Down
    pub fn new(pin: impl InputPin + 'a) -> Self {
        let input = Input::new(pin, InputConfig::default().with_pull(Pull::Down));
        Self { input }
    }
}

impl ButtonInput for GpioButton<'_> {
    fn is_high(&mut self) -> Result<bool, InputError> {
        // esp-hal liest den Pegel direkt aus dem Register, das kann nicht fehlschlagen
        Ok(self.input.is_high())
    }
}
