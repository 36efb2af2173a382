//! Sync Engine - Herzstück der Freundschaftslampe
//!
//! Verbindet zwei Pfade, die beide den Farbindex ändern:
//! - **Taster-Pfad:** enge Schleife, liest den Taster, schaltet weiter,
//!   zeigt an und veröffentlicht den neuen Index
//! - **Poll-Pfad:** eigener Worker, liest den Remote-Index, übernimmt
//!   Änderungen der Partner-Lampe und wartet dann das Poll-Intervall ab
//!
//! Farbindex, Revision und LED liegen gemeinsam hinter einem async Mutex.
//! Das Poll-Flag ist ein `AtomicBool`, damit die Taster-Schleife es ohne
//! Lock prüfen kann.

use core::convert::Infallible;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::logic::ButtonEdge;
use crate::remote::RemoteStateClient;
use crate::traits::{ButtonInput, ColorController, ColorStore, InputError, LedError};
use crate::types::{ChangeSource, ColorChange, Palette};

/// Fatale Hardware-Fehler der Sync Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    Input(InputError),
    Led(LedError),
}

impl From<InputError> for EngineError {
    fn from(error: InputError) -> Self {
        EngineError::Input(error)
    }
}

impl From<LedError> for EngineError {
    fn from(error: LedError) -> Self {
        EngineError::Led(error)
    }
}

/// Taster plus Flankenerkennung
///
/// Gehört exklusiv der Taster-Schleife, braucht daher kein Lock.
pub struct ButtonMonitor<B> {
    input: B,
    edge: ButtonEdge,
}

impl<B: ButtonInput> ButtonMonitor<B> {
    /// Startet mit Ruhepegel LOW (Pull-Down)
    pub const fn new(input: B) -> Self {
        Self::with_initial_level(input, false)
    }

    pub const fn with_initial_level(input: B, initial_high: bool) -> Self {
        Self {
            input,
            edge: ButtonEdge::new(initial_high),
        }
    }

    /// Liest den Pegel genau einmal und meldet eine Flanke
    pub fn sample(&mut self) -> Result<bool, InputError> {
        let is_high = self.input.is_high()?;
        Ok(self.edge.update(is_high))
    }
}

/// Zustand hinter dem Mutex
struct LampState<L> {
    color_index: usize,
    // wird bei jedem Tastendruck erhöht, Polls davor gelten als veraltet
    revision: u32,
    led: L,
}

impl<L: ColorController> LampState<L> {
    /// Schaltet um eins weiter und zeigt die neue Farbe an
    ///
    /// Einzige Stelle, an der der Index (außer beim Vorpositionieren)
    /// verändert wird.
    fn switch_to_next_color(
        &mut self,
        palette: &Palette,
        source: ChangeSource,
    ) -> Result<ColorChange, LedError> {
        self.color_index = palette.next_index(self.color_index);
        self.show(palette, source)
    }

    fn show(&mut self, palette: &Palette, source: ChangeSource) -> Result<ColorChange, LedError> {
        let color = palette.color(self.color_index);
        self.led.turn_on_color(color.rgb)?;
        Ok(ColorChange {
            index: self.color_index,
            color,
            source,
        })
    }
}

/// Sync Engine für Farbindex, Taster und Remote-Poll
///
/// # Generische Parameter
/// - `M`: RawMutex (Firmware: `CriticalSectionRawMutex`, Tests: `NoopRawMutex`)
/// - `L`: Color Controller (LED)
/// - `S`: Remote-Farbspeicher
pub struct SyncEngine<M: RawMutex, L, S> {
    palette: Palette,
    state: Mutex<M, LampState<L>>,
    remote: RemoteStateClient<S>,
    poll_in_flight: AtomicBool,
    poll_request: Signal<M, ()>,
}

impl<M, L, S> SyncEngine<M, L, S>
where
    M: RawMutex,
    L: ColorController,
    S: ColorStore,
{
    /// Erstellt die Engine mit Startindex 0
    pub fn new(palette: Palette, led: L, store: S) -> Self {
        Self::with_initial_index(palette, led, store, 0)
    }

    /// Erstellt die Engine mit beliebigem Startindex (wird nach `[0, N)` gebracht)
    pub fn with_initial_index(palette: Palette, led: L, store: S, initial_index: usize) -> Self {
        Self {
            palette,
            state: Mutex::new(LampState {
                color_index: initial_index % palette.len(),
                revision: 0,
                led,
            }),
            remote: RemoteStateClient::new(store),
            poll_in_flight: AtomicBool::new(false),
            poll_request: Signal::new(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn remote(&self) -> &RemoteStateClient<S> {
        &self.remote
    }

    /// Aktueller Farbindex
    pub async fn color_index(&self) -> usize {
        self.state.lock().await.color_index
    }

    /// `true` solange ein Poll-Zyklus läuft
    pub fn is_poll_in_flight(&self) -> bool {
        self.poll_in_flight.load(Ordering::Acquire)
    }

    /// Zeigt die aktuelle Farbe an, ohne den Index zu ändern (Boot)
    pub async fn show_current_color(&self) -> Result<ColorChange, LedError> {
        let mut state = self.state.lock().await;
        state.show(&self.palette, ChangeSource::Startup)
    }

    /// Schaltet um eins weiter und zeigt an, rein lokal
    ///
    /// Veröffentlicht NICHT. Der vollständige Taster-Pfad (Flanke erkennen,
    /// weiterschalten, veröffentlichen) ist [`check_button_input`](Self::check_button_input).
    /// Zählt als lokale Änderung: ein gerade laufender Poll wird verworfen.
    pub async fn switch_to_next_color(&self) -> Result<ColorChange, LedError> {
        let mut state = self.state.lock().await;
        let change = state.switch_to_next_color(&self.palette, ChangeSource::Button)?;
        state.revision = state.revision.wrapping_add(1);
        Ok(change)
    }

    /// Prüft den Taster; bei einer Flanke: weiterschalten, anzeigen, veröffentlichen
    ///
    /// Das Lock bleibt bis nach dem Veröffentlichen gehalten, damit der
    /// Poll-Pfad dazwischen nichts ändern kann. Die Dauer ist durch den
    /// Farbspeicher begrenzt (Firmware: [`DeadlineStore`](crate::DeadlineStore)).
    pub async fn check_button_input<B: ButtonInput>(
        &self,
        button: &mut ButtonMonitor<B>,
    ) -> Result<Option<ColorChange>, EngineError> {
        if !button.sample()? {
            return Ok(None);
        }

        let mut state = self.state.lock().await;
        let change = state.switch_to_next_color(&self.palette, ChangeSource::Button)?;
        state.revision = state.revision.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::info!("SYNC: Button pressed, now {}", change);

        self.remote.set_current_color(change.index).await;
        Ok(Some(change))
    }

    /// Holt den Remote-Index und übernimmt ihn, falls er abweicht
    ///
    /// Der Netzwerkzugriff läuft ohne Lock. Wurde währenddessen der Taster
    /// gedrückt, ist der gelesene Wert veraltet und wird verworfen.
    pub async fn check_for_new_color(&self) -> Result<Option<ColorChange>, LedError> {
        let (current, revision) = {
            let state = self.state.lock().await;
            (state.color_index, state.revision)
        };

        let remote = self.remote.get_current_color(current as i32).await;
        let target = self.palette.wrap(remote);

        let mut state = self.state.lock().await;
        if state.revision != revision {
            #[cfg(feature = "defmt")]
            defmt::info!(
                "SYNC: Discarding remote index {}, button pressed during poll",
                target
            );
            return Ok(None);
        }
        if target == state.color_index {
            return Ok(None);
        }

        // eine Position vor das Ziel, damit switch_to_next_color genau dort landet
        state.color_index = self.palette.pre_position(target);
        let change = state.switch_to_next_color(&self.palette, ChangeSource::Remote)?;

        #[cfg(feature = "defmt")]
        defmt::info!("SYNC: Partner changed color, now {}", change);

        Ok(Some(change))
    }

    /// Setzt das Poll-Flag, falls frei (`true` = dieser Aufrufer hat es bekommen)
    pub fn try_begin_poll(&self) -> bool {
        self.poll_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Gibt das Poll-Flag wieder frei
    pub fn finish_poll(&self) {
        self.poll_in_flight.store(false, Ordering::Release);
    }

    /// Fordert einen Poll-Zyklus an, sofern keiner läuft
    pub fn request_poll(&self) -> bool {
        if !self.try_begin_poll() {
            return false;
        }
        self.poll_request.signal(());
        true
    }

    /// Ein Poll-Zyklus: Remote prüfen, `delay` abwarten, Flag freigeben
    pub async fn poll_cycle<F, Fut>(&self, delay: F) -> Result<Option<ColorChange>, LedError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let change = self.check_for_new_color().await?;
        delay().await;
        self.finish_poll();
        Ok(change)
    }

    /// Poll-Worker: wartet auf Anforderungen aus `run()` und führt Zyklen aus
    ///
    /// Kehrt nur bei einem LED-Fehler zurück.
    pub async fn run_poll_worker<F, Fut>(&self, mut delay: F) -> Result<Infallible, LedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            self.poll_request.wait().await;
            self.poll_cycle(&mut delay).await?;
        }
    }

    /// Hauptschleife: Startfarbe zeigen, dann endlos Taster prüfen und Polls anstoßen
    ///
    /// Kein Sleep, nur ein `yield_now()` pro Runde, damit der Executor
    /// den Poll-Worker und die Netzwerk-Tasks laufen lassen kann.
    /// Kehrt nur bei einem Hardware-Fehler zurück.
    pub async fn run<B: ButtonInput>(
        &self,
        mut button: ButtonMonitor<B>,
    ) -> Result<Infallible, EngineError> {
        let _startup = self.show_current_color().await?;

        #[cfg(feature = "defmt")]
        defmt::info!("SYNC: Showing startup color {}", _startup);

        loop {
            self.check_button_input(&mut button).await?;
            self.request_poll();
            yield_now().await;
        }
    }
}
