// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use esp_core::PaletteColor;

// ============================================================================
// LED Konfiguration
// ============================================================================

/// GPIO-Pin für die RGB LED (WS2812/Neopixel)
/// Nur Doku: der Pin wird in main.rs als `peripherals.GPIO8` übergeben
pub const LED_GPIO_PIN: u8 = 8;

/// Helligkeits-Level für die LED (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Farbpalette der Lampe, beide Lampen müssen dieselbe Reihenfolge haben
/// Der Farbindex auf dem Server zeigt in dieses Array
pub static PALETTE: [PaletteColor; 6] = [
    PaletteColor::new("Rot", LED_BRIGHTNESS, 0, 0),
    PaletteColor::new("Grün", 0, LED_BRIGHTNESS, 0),
    PaletteColor::new("Blau", 0, 0, LED_BRIGHTNESS),
    PaletteColor::new("Gelb", LED_BRIGHTNESS, LED_BRIGHTNESS, 0),
    PaletteColor::new("Türkis", 0, LED_BRIGHTNESS, LED_BRIGHTNESS),
    PaletteColor::new("Lila", LED_BRIGHTNESS, 0, LED_BRIGHTNESS),
];

/// Startindex beim Booten (keine Persistenz über Neustarts)
pub const INITIAL_COLOR_INDEX: usize = 0;

// ============================================================================
// Taster Konfiguration
// ============================================================================

/// GPIO-Pin für den Taster (Pull-Down, gedrückt = HIGH)
/// Nur Doku: der Pin wird in main.rs als `peripherals.GPIO4` übergeben
pub const PUSH_BUTTON_GPIO_PIN: u8 = 4;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach fehlgeschlagenem WiFi-Start/Connect in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Anzahl Sockets im embassy-net Stack
/// Poll (1) + Publish (1) + DNS (1) + Reserve
pub const NET_SOCKET_COUNT: usize = 4;

// ============================================================================
// Farbindex-Dienst Konfiguration
// ============================================================================

/// Hostname oder IPv4-Adresse des Farbindex-Dienstes
/// Kann über COLOR_SERVICE_HOST in .env überschrieben werden
pub const COLOR_SERVICE_HOST: &str = match option_env!("COLOR_SERVICE_HOST") {
    Some(host) => host,
    None => "friendshiplampscce.gearhostpreview.com",
};

/// HTTP Port des Dienstes (unverschlüsselt)
pub const COLOR_SERVICE_PORT: u16 = 80;

/// Wartezeit nach jedem Poll in Sekunden
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Timeout für eine komplette HTTP-Anfrage (DNS, Connect, Senden, Empfangen)
/// Gilt als Gesamt-Deadline (BoundedHttpStore) und als TCP-Inaktivitäts-Timeout
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// Empfangspuffer für die HTTP-Antwort (Header + JSON-Body)
pub const HTTP_RESPONSE_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 512;
