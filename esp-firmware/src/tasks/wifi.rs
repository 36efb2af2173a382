// WiFi Tasks - Station-Modus, Netzwerk-Stack und DHCP
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// WiFi Connection Task
///
/// Hält die Verbindung zum Access Point:
/// - konfiguriert und startet den Controller (einmalig)
/// - verbindet und wartet auf `StaDisconnected`
/// - verbindet nach einem Abbruch erneut
///
/// Solange keine Verbindung steht, liefert der HttpColorStore
/// `RemoteError::NetworkDown` und die Lampe läuft lokal weiter.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Connection task started");

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );

            if let Err(e) = controller.set_config(&client_config) {
                error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
                retry_delay().await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                retry_delay().await;
                continue;
            }

            info!("WiFi: Controller started");
        }

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        if let Err(e) = controller.connect_async().await {
            warn!("WiFi: Connection failed: {}", Debug2Format(&e));
            retry_delay().await;
            continue;
        }
        info!("WiFi: Connected");

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Disconnected from AP, reconnecting...");
        Timer::after(Duration::from_secs(2)).await;
    }
}

async fn retry_delay() {
    Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
}

/// Network Task - treibt den embassy-net Stack (Pakete, TCP/IP, DNS)
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task
///
/// Loggt einmalig die per DHCP erhaltene Konfiguration und beendet sich.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address!");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
        info!("  DNS:     {}", Debug2Format(&config.dns_servers));
    }
}
