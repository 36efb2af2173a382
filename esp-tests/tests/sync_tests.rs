//! Integration Tests für die Sync Engine
//!
//! Diese Tests laufen auf dem Host (x86_64) mit Mock-LED, Mock-Taster und
//! Mock-Farbspeicher. Async Code wird mit `embassy_futures::block_on` getrieben.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_futures::join::join;
use embassy_futures::{block_on, yield_now};
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use esp_core::{
    ButtonInput, ButtonMonitor, ChangeSource, ColorController, ColorStore, DeadlineStore,
    EngineError, InputError, LedError, Palette, PaletteColor, RemoteError, RemoteStateClient,
    SyncEngine,
};
use rgb::RGB8;

// ============================================================================
// Mocks
// ============================================================================

/// LED-Mock: protokolliert alle geschriebenen Farben
///
/// Geteilte Zähler über `Rc`, weil die Engine den Mock besitzt.
#[derive(Clone, Default)]
pub struct MockLed {
    pub writes: Rc<RefCell<Vec<RGB8>>>,
    pub fail_next_write: Rc<Cell<bool>>,
}

impl MockLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn last_color(&self) -> Option<RGB8> {
        self.writes.borrow().last().copied()
    }
}

impl ColorController for MockLed {
    fn turn_on_color(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write.replace(false) {
            return Err(LedError::WriteFailed);
        }
        self.writes.borrow_mut().push(color);
        Ok(())
    }
}

/// Taster-Mock: liefert die vorgegebenen Pegel, danach `ReadFailed`
pub struct MockButton {
    levels: VecDeque<bool>,
}

impl MockButton {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
        }
    }

    /// `presses` Flanken: HIGH, LOW, HIGH, ...
    pub fn toggling(presses: usize) -> Self {
        let levels: Vec<bool> = (0..presses).map(|i| i % 2 == 0).collect();
        Self::new(&levels)
    }
}

impl ButtonInput for MockButton {
    fn is_high(&mut self) -> Result<bool, InputError> {
        self.levels.pop_front().ok_or(InputError::ReadFailed)
    }
}

/// Farbspeicher-Mock mit vorgegebenen Fetch-Ergebnissen
#[derive(Default)]
pub struct MockStore {
    pub fetch_results: RefCell<VecDeque<Result<i32, RemoteError>>>,
    pub fetch_count: Cell<usize>,
    pub published: RefCell<Vec<usize>>,
    pub fail_publish: Cell<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetches(results: &[Result<i32, RemoteError>]) -> Self {
        let store = Self::new();
        store.fetch_results.borrow_mut().extend(results.iter().copied());
        store
    }
}

impl ColorStore for MockStore {
    async fn fetch_color_index(&self) -> Result<i32, RemoteError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        self.fetch_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(RemoteError::NetworkDown))
    }

    async fn publish_color_index(&self, index: usize) -> Result<(), RemoteError> {
        if self.fail_publish.get() {
            return Err(RemoteError::ConnectionFailed);
        }
        self.published.borrow_mut().push(index);
        Ok(())
    }
}

/// Farbspeicher, dessen Fetch erst antwortet, wenn der Test es freigibt
pub struct GatedStore {
    pub gate: Signal<NoopRawMutex, i32>,
    pub published: RefCell<Vec<usize>>,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            gate: Signal::new(),
            published: RefCell::new(Vec::new()),
        }
    }
}

impl ColorStore for GatedStore {
    async fn fetch_color_index(&self) -> Result<i32, RemoteError> {
        Ok(self.gate.wait().await)
    }

    async fn publish_color_index(&self, index: usize) -> Result<(), RemoteError> {
        self.published.borrow_mut().push(index);
        Ok(())
    }
}

/// Farbspeicher, der nie antwortet (Server nimmt an, schweigt dann)
pub struct HungStore;

impl ColorStore for HungStore {
    async fn fetch_color_index(&self) -> Result<i32, RemoteError> {
        core::future::pending().await
    }

    async fn publish_color_index(&self, _index: usize) -> Result<(), RemoteError> {
        core::future::pending().await
    }
}

/// Taster, der bei jedem Lesen den Pegel wechselt und Lesezugriffe zählt
pub struct TogglingButton {
    level: bool,
    pub samples: Rc<Cell<usize>>,
}

impl TogglingButton {
    pub fn new() -> Self {
        Self {
            level: false,
            samples: Rc::new(Cell::new(0)),
        }
    }
}

impl ButtonInput for TogglingButton {
    fn is_high(&mut self) -> Result<bool, InputError> {
        self.samples.set(self.samples.get() + 1);
        self.level = !self.level;
        Ok(self.level)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Deadline nach einigen Executor-Runden statt nach echter Zeit
async fn short_deadline() {
    for _ in 0..10 {
        yield_now().await;
    }
}

const RED: RGB8 = RGB8 { r: 10, g: 0, b: 0 };
const GREEN: RGB8 = RGB8 { r: 0, g: 10, b: 0 };
const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 10 };

static RGB_PALETTE: [PaletteColor; 3] = [
    PaletteColor::new("Rot", 10, 0, 0),
    PaletteColor::new("Grün", 0, 10, 0),
    PaletteColor::new("Blau", 0, 0, 10),
];

static WIDE_PALETTE: [PaletteColor; 5] = [
    PaletteColor::new("Rot", 10, 0, 0),
    PaletteColor::new("Grün", 0, 10, 0),
    PaletteColor::new("Blau", 0, 0, 10),
    PaletteColor::new("Gelb", 10, 10, 0),
    PaletteColor::new("Weiß", 10, 10, 10),
];

fn rgb_palette() -> Palette {
    Palette::new(&RGB_PALETTE).unwrap()
}

type TestEngine<S> = SyncEngine<NoopRawMutex, MockLed, S>;

fn engine_with(store: MockStore) -> (TestEngine<MockStore>, MockLed) {
    let led = MockLed::new();
    let engine = SyncEngine::new(rgb_palette(), led.clone(), store);
    (engine, led)
}

// ============================================================================
// Tests: switch_to_next_color()
// ============================================================================

#[test]
fn test_switch_to_next_color_displays_exactly_once() {
    let (engine, led) = engine_with(MockStore::new());

    let change = block_on(engine.switch_to_next_color()).unwrap();

    assert_eq!(change.index, 1);
    assert_eq!(change.color.name, "Grün");
    assert_eq!(led.write_count(), 1);
    assert_eq!(led.last_color(), Some(GREEN));
    // rein lokal, kein Publish
    assert!(engine.remote().store().published.borrow().is_empty());
}

#[test]
fn test_switch_to_next_color_wraps_to_first() {
    let led = MockLed::new();
    let engine: TestEngine<MockStore> =
        SyncEngine::with_initial_index(rgb_palette(), led.clone(), MockStore::new(), 2);

    let change = block_on(engine.switch_to_next_color()).unwrap();

    assert_eq!(change.index, 0);
    assert_eq!(led.last_color(), Some(RED));
}

#[test]
fn test_initial_index_is_wrapped_into_palette() {
    let engine: TestEngine<MockStore> =
        SyncEngine::with_initial_index(rgb_palette(), MockLed::new(), MockStore::new(), 7);
    assert_eq!(block_on(engine.color_index()), 1);
}

#[test]
fn test_show_current_color_keeps_index() {
    let (engine, led) = engine_with(MockStore::new());

    let change = block_on(engine.show_current_color()).unwrap();

    assert_eq!(change.source, ChangeSource::Startup);
    assert_eq!(block_on(engine.color_index()), 0);
    assert_eq!(led.last_color(), Some(RED));
}

// ============================================================================
// Tests: check_button_input()
// ============================================================================

#[test]
fn test_button_press_advances_and_publishes() {
    let (engine, led) = engine_with(MockStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[true]));

    let change = block_on(engine.check_button_input(&mut button)).unwrap();

    let change = change.expect("rising edge should switch color");
    assert_eq!(change.index, 1);
    assert_eq!(change.source, ChangeSource::Button);
    assert_eq!(led.last_color(), Some(GREEN));
    assert_eq!(*engine.remote().store().published.borrow(), vec![1]);
}

#[test]
fn test_button_held_does_not_repeat() {
    let (engine, led) = engine_with(MockStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[true, true, true]));

    for _ in 0..3 {
        block_on(engine.check_button_input(&mut button)).unwrap();
    }

    assert_eq!(block_on(engine.color_index()), 1);
    assert_eq!(led.write_count(), 1);
}

#[test]
fn test_button_release_also_switches() {
    let (engine, _led) = engine_with(MockStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[true, false]));

    block_on(engine.check_button_input(&mut button)).unwrap();
    block_on(engine.check_button_input(&mut button)).unwrap();

    assert_eq!(block_on(engine.color_index()), 2);
    assert_eq!(*engine.remote().store().published.borrow(), vec![1, 2]);
}

#[test]
fn test_button_at_rest_does_nothing() {
    let (engine, led) = engine_with(MockStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[false, false]));

    for _ in 0..2 {
        let change = block_on(engine.check_button_input(&mut button)).unwrap();
        assert_eq!(change, None);
    }

    assert_eq!(led.write_count(), 0);
    assert!(engine.remote().store().published.borrow().is_empty());
}

#[test]
fn test_k_presses_land_on_initial_plus_k() {
    for len in 1..=WIDE_PALETTE.len() {
        let palette = Palette::new(&WIDE_PALETTE[..len]).unwrap();
        for initial in 0..len {
            let presses = 2 * len + 1;
            let led = MockLed::new();
            let engine: TestEngine<MockStore> =
                SyncEngine::with_initial_index(palette, led.clone(), MockStore::new(), initial);
            let mut button = ButtonMonitor::new(MockButton::toggling(presses));

            for _ in 0..presses {
                block_on(engine.check_button_input(&mut button)).unwrap();
            }

            assert_eq!(block_on(engine.color_index()), (initial + presses) % len);
            assert_eq!(led.write_count(), presses);
        }
    }
}

#[test]
fn test_publish_failure_keeps_local_change() {
    let store = MockStore::new();
    store.fail_publish.set(true);
    let (engine, led) = engine_with(store);
    let mut button = ButtonMonitor::new(MockButton::new(&[true]));

    let change = block_on(engine.check_button_input(&mut button)).unwrap();

    assert!(change.is_some());
    assert_eq!(block_on(engine.color_index()), 1);
    assert_eq!(led.last_color(), Some(GREEN));
    assert!(engine.remote().store().published.borrow().is_empty());
}

#[test]
fn test_button_read_failure_is_fatal() {
    let (engine, _led) = engine_with(MockStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[]));

    let result = block_on(engine.check_button_input(&mut button));

    assert_eq!(result, Err(EngineError::Input(InputError::ReadFailed)));
}

#[test]
fn test_led_failure_is_fatal() {
    let (engine, led) = engine_with(MockStore::new());
    led.fail_next_write.set(true);
    let mut button = ButtonMonitor::new(MockButton::new(&[true]));

    let result = block_on(engine.check_button_input(&mut button));

    assert_eq!(result, Err(EngineError::Led(LedError::WriteFailed)));
    assert!(engine.remote().store().published.borrow().is_empty());
}

// ============================================================================
// Tests: check_for_new_color()
// ============================================================================

#[test]
fn test_remote_change_is_applied_exactly() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(2)]));

    let change = block_on(engine.check_for_new_color()).unwrap();

    let change = change.expect("remote differs from local");
    assert_eq!(change.index, 2);
    assert_eq!(change.source, ChangeSource::Remote);
    assert_eq!(led.write_count(), 1);
    assert_eq!(led.last_color(), Some(BLUE));
}

#[test]
fn test_remote_change_wraps_at_boundaries() {
    // R = 0 von Index 2 aus
    let led = MockLed::new();
    let engine: TestEngine<MockStore> = SyncEngine::with_initial_index(
        rgb_palette(),
        led.clone(),
        MockStore::with_fetches(&[Ok(0)]),
        2,
    );
    block_on(engine.check_for_new_color()).unwrap();
    assert_eq!(block_on(engine.color_index()), 0);
    assert_eq!(led.last_color(), Some(RED));

    // R = N-1 von Index 0 aus
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(2)]));
    block_on(engine.check_for_new_color()).unwrap();
    assert_eq!(block_on(engine.color_index()), 2);
    assert_eq!(led.last_color(), Some(BLUE));
}

#[test]
fn test_out_of_range_remote_index_is_normalized() {
    let (engine, _led) = engine_with(MockStore::with_fetches(&[Ok(5), Ok(-1)]));

    block_on(engine.check_for_new_color()).unwrap();
    assert_eq!(block_on(engine.color_index()), 2);

    // -1 ≡ 2 (mod 3): keine Änderung mehr
    let change = block_on(engine.check_for_new_color()).unwrap();
    assert_eq!(change, None);
    assert_eq!(block_on(engine.color_index()), 2);
}

#[test]
fn test_same_remote_index_changes_nothing() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(0)]));

    let change = block_on(engine.check_for_new_color()).unwrap();

    assert_eq!(change, None);
    assert_eq!(led.write_count(), 0);
    assert_eq!(block_on(engine.color_index()), 0);
}

#[test]
fn test_failed_fetch_changes_nothing() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Err(RemoteError::DnsTimeout)]));

    let change = block_on(engine.check_for_new_color()).unwrap();

    assert_eq!(change, None);
    assert_eq!(led.write_count(), 0);
    assert_eq!(block_on(engine.color_index()), 0);
    assert_eq!(engine.remote().store().fetch_count.get(), 1);
}

#[test]
fn test_poll_never_publishes() {
    let (engine, _led) = engine_with(MockStore::with_fetches(&[Ok(1)]));

    block_on(engine.check_for_new_color()).unwrap();

    assert!(engine.remote().store().published.borrow().is_empty());
}

#[test]
fn test_press_then_remote_scenario() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(2)]));
    let mut button = ButtonMonitor::new(MockButton::new(&[true]));

    let press = block_on(engine.check_button_input(&mut button)).unwrap();
    assert_eq!(press.map(|change| change.index), Some(1));
    assert_eq!(*engine.remote().store().published.borrow(), vec![1]);

    let poll = block_on(engine.check_for_new_color()).unwrap();
    assert_eq!(poll.map(|change| change.index), Some(2));

    assert_eq!(*led.writes.borrow(), vec![GREEN, BLUE]);
}

#[test]
fn test_stale_poll_discarded_after_button_press() {
    let led = MockLed::new();
    let engine: TestEngine<GatedStore> =
        SyncEngine::new(rgb_palette(), led.clone(), GatedStore::new());
    let mut button = ButtonMonitor::new(MockButton::new(&[true]));

    // Poll hängt im Fetch, während der Taster gedrückt wird
    let (poll, press) = block_on(join(engine.check_for_new_color(), async {
        let press = engine.check_button_input(&mut button).await;
        engine.remote().store().gate.signal(2);
        press
    }));

    assert_eq!(press.unwrap().map(|change| change.index), Some(1));
    assert_eq!(poll.unwrap(), None);
    assert_eq!(block_on(engine.color_index()), 1);
    assert_eq!(*led.writes.borrow(), vec![GREEN]);
    assert_eq!(*engine.remote().store().published.borrow(), vec![1]);
}

// ============================================================================
// Tests: Poll-Flag und Poll-Zyklus
// ============================================================================

#[test]
fn test_only_one_poll_in_flight() {
    let (engine, _led) = engine_with(MockStore::new());

    assert!(engine.request_poll());
    assert!(!engine.request_poll());
    assert!(engine.is_poll_in_flight());

    engine.finish_poll();
    assert!(!engine.is_poll_in_flight());
    assert!(engine.request_poll());
}

#[test]
fn test_poll_cycle_holds_flag_during_delay() {
    let (engine, _led) = engine_with(MockStore::with_fetches(&[Ok(1)]));
    assert!(engine.try_begin_poll());

    let engine_ref = &engine;
    let change = block_on(engine.poll_cycle(|| async move {
        assert!(engine_ref.is_poll_in_flight());
        assert!(!engine_ref.request_poll());
    }))
    .unwrap();

    assert_eq!(change.map(|change| change.index), Some(1));
    assert!(!engine.is_poll_in_flight());
}

#[test]
fn test_poll_worker_stops_on_led_failure() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(1)]));
    led.fail_next_write.set(true);
    assert!(engine.request_poll());

    let Err(error) = block_on(engine.run_poll_worker(|| async {}));

    assert_eq!(error, LedError::WriteFailed);
}

// ============================================================================
// Tests: run()
// ============================================================================

#[test]
fn test_run_shows_startup_color_and_counts_presses() {
    let (engine, led) = engine_with(MockStore::new());
    let button = ButtonMonitor::new(MockButton::new(&[false, true, true, false]));

    let Err(error) = block_on(engine.run(button));

    assert_eq!(error, EngineError::Input(InputError::ReadFailed));
    assert_eq!(*led.writes.borrow(), vec![RED, GREEN, BLUE]);
    assert_eq!(*engine.remote().store().published.borrow(), vec![1, 2]);
    // ohne Worker bleibt die erste Poll-Anforderung offen
    assert!(engine.is_poll_in_flight());
    assert_eq!(engine.remote().store().fetch_count.get(), 0);
}

#[test]
fn test_run_with_poll_worker_mirrors_partner() {
    let (engine, led) = engine_with(MockStore::with_fetches(&[Ok(2)]));
    let button = ButtonMonitor::new(MockButton::new(&[false, false, false]));

    let result = block_on(select(
        engine.run(button),
        engine.run_poll_worker(|| async {}),
    ));

    match result {
        Either::First(Err(error)) => assert_eq!(error, EngineError::Input(InputError::ReadFailed)),
        Either::Second(Err(error)) => panic!("poll worker failed: {:?}", error),
    }
    assert_eq!(led.writes.borrow().first(), Some(&RED));
    assert_eq!(led.last_color(), Some(BLUE));
    assert_eq!(block_on(engine.color_index()), 2);
    assert!(engine.remote().store().fetch_count.get() >= 1);
}

// ============================================================================
// Tests: RemoteStateClient
// ============================================================================

#[test]
fn test_get_current_color_returns_remote_value() {
    let client = RemoteStateClient::new(MockStore::with_fetches(&[Ok(4)]));
    assert_eq!(block_on(client.get_current_color(0)), 4);
}

#[test]
fn test_get_current_color_falls_back_on_error() {
    let client = RemoteStateClient::new(MockStore::with_fetches(&[
        Err(RemoteError::MalformedResponse),
        Err(RemoteError::HttpStatus(500)),
    ]));
    assert_eq!(block_on(client.get_current_color(3)), 3);
    assert_eq!(block_on(client.get_current_color(1)), 1);
}

#[test]
fn test_set_current_color_swallows_errors() {
    let store = MockStore::new();
    store.fail_publish.set(true);
    let client = RemoteStateClient::new(store);

    block_on(client.set_current_color(2));

    assert!(client.store().published.borrow().is_empty());
}

// ============================================================================
// Tests: DeadlineStore
// ============================================================================

#[test]
fn test_deadline_store_passes_fast_results_through() {
    let store = DeadlineStore::new(MockStore::with_fetches(&[Ok(2)]), short_deadline);

    assert_eq!(block_on(store.fetch_color_index()), Ok(2));
    assert_eq!(block_on(store.publish_color_index(1)), Ok(()));
    assert_eq!(*store.inner().published.borrow(), vec![1]);
}

#[test]
fn test_deadline_store_times_out_hung_requests() {
    let store = DeadlineStore::new(HungStore, short_deadline);

    assert_eq!(block_on(store.fetch_color_index()), Err(RemoteError::Timeout));
    assert_eq!(block_on(store.publish_color_index(1)), Err(RemoteError::Timeout));
}

#[test]
fn test_hung_fetch_keeps_local_color() {
    let led = MockLed::new();
    let engine: SyncEngine<NoopRawMutex, _, _> =
        SyncEngine::new(rgb_palette(), led.clone(), DeadlineStore::new(HungStore, short_deadline));

    let change = block_on(engine.check_for_new_color()).unwrap();

    assert_eq!(change, None);
    assert_eq!(block_on(engine.color_index()), 0);
    assert_eq!(led.write_count(), 0);
}

#[test]
fn test_hung_publish_does_not_stall_button_loop() {
    let led = MockLed::new();
    let engine: SyncEngine<NoopRawMutex, _, _> =
        SyncEngine::new(rgb_palette(), led.clone(), DeadlineStore::new(HungStore, short_deadline));
    let button = TogglingButton::new();
    let samples = button.samples.clone();

    let result = block_on(select(engine.run(ButtonMonitor::new(button)), async {
        for _ in 0..10_000 {
            yield_now().await;
        }
    }));

    if let Either::First(Err(error)) = result {
        panic!("run loop failed: {:?}", error);
    }
    // jeder Tastendruck wartet höchstens die Deadline ab, dann geht es weiter
    assert!(samples.get() > 100, "button samples: {}", samples.get());
    assert!(led.write_count() > 100);
}
