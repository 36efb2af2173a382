// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::smart_led_buffer;
use static_cell::StaticCell;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_friendship_lamp::config::{
    COLOR_SERVICE_HOST, COLOR_SERVICE_PORT, EXTRA_HEAP_SIZE, INITIAL_COLOR_INDEX, NET_SOCKET_COUNT,
    PALETTE, RMT_CLOCK_MHZ, WIFI_HEAP_SIZE,
};
use esp_friendship_lamp::hal::{GpioButton, LedBuffer, RmtLedWriter};
use esp_friendship_lamp::tasks::{button_task, connection_task, dhcp_task, net_task, poll_task};
use esp_friendship_lamp::web::HttpColorStore;
use esp_friendship_lamp::{LampEngine, Palette};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi und Sync Engine, spawnt die Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Netzwerk-Stack (STA interface, DHCP), Seed vom Hardware-RNG
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    static RESOURCES: StaticCell<StackResources<NET_SOCKET_COUNT>> = StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let stack = &*STACK.init(stack);

    // LED: RMT-Buffer muss 'static sein, weil der Writer in der Engine lebt
    static LED_BUFFER: StaticCell<LedBuffer> = StaticCell::new();
    let led_buffer = LED_BUFFER.init(smart_led_buffer!(1));
    let led = RmtLedWriter::new(peripherals.GPIO8, peripherals.RMT, RMT_CLOCK_MHZ, led_buffer)
        .expect("Failed to initialize RMT for LED");

    // Taster an GPIO4 mit Pull-Down
    let button = GpioButton::new(peripherals.GPIO4);

    // Sync Engine: Palette + LED + HTTP-Farbspeicher (jede Anfrage max. HTTP_TIMEOUT_SECS)
    let palette = Palette::new(&PALETTE).expect("Palette must not be empty");
    let store = HttpColorStore::new(stack, COLOR_SERVICE_HOST, COLOR_SERVICE_PORT).bounded();

    static ENGINE: StaticCell<LampEngine> = StaticCell::new();
    let engine = &*ENGINE.init(LampEngine::with_initial_index(
        palette,
        led,
        store,
        INITIAL_COLOR_INDEX,
    ));

    // Spawn WiFi Tasks
    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    // Spawn Sync Tasks (teilen sich die Engine)
    spawner.spawn(poll_task(engine)).unwrap();
    spawner.spawn(button_task(engine, button)).unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
