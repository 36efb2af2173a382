// Sync Tasks - Taster-Schleife und Poll-Worker der Freundschaftslampe
use defmt::info;
use embassy_time::{Duration, Timer};
use esp_core::ButtonMonitor;

use crate::LampEngine;
use crate::config::POLL_INTERVAL_SECS;
use crate::hal::GpioButton;

/// Taster Task - Hauptschleife der Sync Engine
///
/// Zeigt die Startfarbe, prüft dann endlos den Taster und stößt Polls an.
/// Die Schleife gibt nach jeder Runde per `yield_now()` an den Executor ab,
/// schläft aber nie.
///
/// Hardware-Fehler sind nicht behebbar: die Task panict, esp-backtrace
/// gibt den Grund aus.
///
/// # Parameter
/// - `engine`: gemeinsame Sync Engine (static)
/// - `button`: Taster am GPIO (Pull-Down)
#[embassy_executor::task]
pub async fn button_task(engine: &'static LampEngine, button: GpioButton<'static>) {
    info!("SYNC: Button task started");

    let Err(e) = engine.run(ButtonMonitor::new(button)).await;
    defmt::panic!("SYNC: Unrecoverable hardware error: {}", e);
}

/// Poll Task - Worker für den Abgleich mit der Partner-Lampe
///
/// Wartet auf Anforderungen der Taster-Schleife. Pro Zyklus:
/// Remote-Index holen, ggf. übernehmen, `POLL_INTERVAL_SECS` warten,
/// dann ist der nächste Poll erlaubt.
#[embassy_executor::task]
pub async fn poll_task(engine: &'static LampEngine) {
    info!(
        "SYNC: Poll task started (interval {}s)",
        POLL_INTERVAL_SECS
    );

    let Err(e) = engine
        .run_poll_worker(|| Timer::after(Duration::from_secs(POLL_INTERVAL_SECS)))
        .await;
    defmt::panic!("SYNC: Unrecoverable hardware error: {}", e);
}
