// SmartLED Writer - Color Controller für die WS2812 LED
//
// Implementiert den ColorController-Trait aus esp-core über das RMT
// Peripheral. Tests nutzen stattdessen MockLed (esp-tests).

use esp_core::{ColorController, LedError};
use esp_hal::Blocking;
use esp_hal::rmt::{PulseCode, Rmt};
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

/// Buffer-Größe für 1 LED (3 Farben * 8 Bits + 1 Reset)
pub const LED_BUFFER_SIZE: usize = 25;

/// RMT-Puffer, muss so lange leben wie der Writer
pub type LedBuffer = [PulseCode; LED_BUFFER_SIZE];

/// Real Hardware LED Writer
///
/// Nutzt ESP32 RMT Peripheral um WS2812 LEDs anzusteuern.
///
/// Hinweis: Der Writer gehört der Sync Engine (static), daher muss auch
/// der Buffer `'static` sein. Er wird in main.rs über StaticCell erzeugt.
pub struct RmtLedWriter<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
}

impl<'a> RmtLedWriter<'a> {
    /// Erstellt einen neuen RmtLedWriter
    ///
    /// # Parameter
    /// - `gpio8`: GPIO8 Peripheral für LED-Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer!(1) Macro)
    ///
    /// # Fehler
    /// `LedError::WriteFailed` wenn das RMT Peripheral nicht startet
    pub fn new(
        gpio8: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut LedBuffer,
    ) -> Result<Self, LedError> {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .map_err(|_| LedError::WriteFailed)?;

        let led = SmartLedsAdapter::new(rmt.channel0, gpio8, buffer);

        Ok(Self { led })
    }
}

impl ColorController for RmtLedWriter<'_> {
    fn turn_on_color(&mut self, color: RGB8) -> Result<(), LedError> {
        self.led
            .write([color].into_iter())
            .map_err(|_| LedError::WriteFailed)
    }
}
