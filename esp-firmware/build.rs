// Build-Script: Wird vor dem Kompilieren ausgeführt
// Lädt die .env-Konfiguration und konfiguriert den Linker für ESP32-C6

/// Variablen aus .env, die zur Compile-Zeit in den Code eingebacken werden
/// (WIFI_* sind Pflicht, COLOR_SERVICE_HOST hat einen Default in config.rs)
const BAKED_ENV_VARS: [&str; 3] = ["WIFI_SSID", "WIFI_PASSWORD", "COLOR_SERVICE_HOST"];

fn main() {
    // Fehler ignorieren wenn .env nicht existiert (dann müssen ENV vars gesetzt sein)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  .env file nicht gefunden: {}", e);
        eprintln!("   Setze WIFI_SSID und WIFI_PASSWORD als Environment-Variablen");
    }

    for name in BAKED_ENV_VARS {
        println!("cargo:rerun-if-env-changed={}", name);
        if let Ok(value) = std::env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
        }
    }
    println!("cargo:rerun-if-changed=.env");

    linker_be_nice();

    // defmt.x - Symbole für defmt's binäres Log-Format
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    // linkall.x - Flash/RAM-Layout, muss als LETZTES kommen
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

// Error-Handler: Zeigt Tipps bei Linker-Fehlern
// Wird vom Linker als "--error-handling-script" aufgerufen
fn linker_be_nice() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 2 {
        let (kind, what) = (args[1].as_str(), args[2].as_str());
        if kind != "undefined-symbol" {
            std::process::exit(1);
        }

        let hint = match what {
            w if w.starts_with("_defmt_") => Some(
                "`defmt` not found - make sure `defmt.x` is added as a linker script and `esp-println` is linked",
            ),
            "_stack_start" => Some("Is the linker script `linkall.x` missing?"),
            w if w.starts_with("esp_rtos_") => Some(
                "`esp-radio` has no scheduler enabled. Make sure `esp_rtos::start` is called before WiFi init.",
            ),
            "free" | "malloc" | "calloc" | "get_free_internal_heap_size" | "malloc_internal"
            | "realloc_internal" | "calloc_internal" | "free_internal" => Some(
                "Did you forget the `esp-alloc` dependency or didn't enable the `compat` feature on it?",
            ),
            _ => None,
        };

        if let Some(hint) = hint {
            eprintln!();
            eprintln!("💡 {}", hint);
            eprintln!();
        }
        std::process::exit(0);
    }

    let exe = std::env::current_exe().expect("build script path");
    println!(
        "cargo:rustc-link-arg=--error-handling-script={}",
        exe.display()
    );
}
