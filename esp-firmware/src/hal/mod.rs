// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Hardware-Traits aus esp-core (ColorController,
// ButtonInput) für das ESP32-C6. Mocks dafür liegen in esp-tests.

pub mod button;
pub mod led_writer;

pub use button::GpioButton;
pub use led_writer::{LED_BUFFER_SIZE, LedBuffer, RmtLedWriter};
