use super::*;
use crate::{
    display::Canvas,
    input::mock::MockInput,
    preset::{Preset, PresetType},
    settings::MemoryStore,
    text::bounded,
    transit::{Connection, ConnectionList, Route},
    wifi::{NetworkList, NetworkRecord},
};

/// Counts every primitive and keeps the text drawn since the last `clear`.
#[derive(Default)]
struct RecordingCanvas {
    ops: usize,
    shows: usize,
    texts: Vec<std::string::String>,
}

impl RecordingCanvas {
    fn reset_counters(&mut self) {
        self.ops = 0;
        self.shows = 0;
    }

    fn shows_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|text| text.contains(needle))
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.ops += 1;
        self.texts.clear();
    }

    fn draw_text(&mut self, _x: i32, _y: i32, text: &str, _size: u8, _inverted: bool) {
        self.ops += 1;
        self.texts.push(text.to_owned());
    }

    fn draw_rect(&mut self, _x: i32, _y: i32, _w: i32, _h: i32) {
        self.ops += 1;
    }

    fn fill_rect(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _on: bool) {
        self.ops += 1;
    }

    fn draw_circle(&mut self, _cx: i32, _cy: i32, _r: i32, _on: bool) {
        self.ops += 1;
    }

    fn fill_circle(&mut self, _cx: i32, _cy: i32, _r: i32, _on: bool) {
        self.ops += 1;
    }

    fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _on: bool) {
        self.ops += 1;
    }

    fn show(&mut self) {
        self.shows += 1;
    }
}

fn booted() -> (StateMachine<MemoryStore>, RecordingCanvas) {
    let mut app = StateMachine::new(MemoryStore::new());
    let mut canvas = RecordingCanvas::default();
    app.start(0, &mut canvas);
    (app, canvas)
}

/// Runs one tick per scripted step, advancing time by the loop delay.
fn run(
    app: &mut StateMachine<MemoryStore>,
    input: &mut MockInput,
    canvas: &mut RecordingCanvas,
    mut now_ms: u64,
) -> u64 {
    while !input.is_empty() {
        now_ms += 50;
        let _ = app.tick(now_ms, input, canvas);
    }
    now_ms
}

fn connection(departure: &str, arrival: &str, platform: &str, cancelled: bool) -> Connection {
    Connection {
        departure: bounded(departure),
        arrival: bounded(arrival),
        platform: bounded(platform),
        train_number: if cancelled { bounded("") } else { bounded("IC 1") },
        delay_min: 0,
        cancelled,
        fetched_at_ms: 0,
    }
}

#[test]
fn idle_frame_touches_nothing() {
    let (mut app, mut canvas) = booted();
    assert_eq!(canvas.shows, 1);
    canvas.reset_counters();

    let mut input = MockInput::new();
    for step in 1..=10 {
        assert_eq!(app.tick(step * 50, &mut input, &mut canvas), TickResult::NoRender);
    }
    assert_eq!(canvas.ops, 0);
    assert_eq!(canvas.shows, 0);
}

#[test]
fn boot_without_credentials_shows_no_wifi_and_opens_menu() {
    let (mut app, mut canvas) = booted();
    assert!(app.credentials().is_none());
    assert_eq!(app.presets().len(), 4);
    assert!(canvas.shows_text("No WiFi"));
    assert!(canvas.shows_text("Long press for menu"));

    let mut input = MockInput::new();
    input.long();
    run(&mut app, &mut input, &mut canvas, 0);

    assert_eq!(app.state(), AppState::Menu);
    assert!(canvas.shows_text("MAIN MENU"));
    assert!(app.take_request().is_none());
}

#[test]
fn wifi_setup_persists_credentials_after_connect() {
    let (mut app, mut canvas) = booted();
    let mut input = MockInput::new();
    // Menu -> Settings -> WiFi Setup.
    input.long().short().short();
    let mut now = run(&mut app, &mut input, &mut canvas, 0);

    assert_eq!(app.state(), AppState::WifiScan);
    assert_eq!(app.take_request(), Some(IoRequest::Scan));
    assert!(canvas.shows_text("Scanning..."));

    let mut networks = NetworkList::new();
    let _ = networks.push(NetworkRecord::new("HomeNet", -48, true));
    let _ = networks.push(NetworkRecord::new("Cafe", -70, false));
    app.resolve(IoOutcome::Scanned(Ok(networks)), now);

    input.short();
    now = run(&mut app, &mut input, &mut canvas, now);
    assert_eq!(app.state(), AppState::WifiPassword);

    // "pass1234" on the keyboard carousel; the cursor stays where it was.
    input
        .rotate(15)
        .short()
        .rotate(-15)
        .short()
        .rotate(18)
        .short()
        .short()
        .rotate(35)
        .short()
        .rotate(1)
        .short()
        .rotate(1)
        .short()
        .rotate(1)
        .short();
    // Modal, then Save.
    input.long().rotate(1).short();
    now = run(&mut app, &mut input, &mut canvas, now);

    let expected = Credentials::new("HomeNet", "pass1234");
    assert_eq!(app.take_request(), Some(IoRequest::Connect(expected.clone())));

    let link = LinkStatus {
        connected: true,
        rssi: Some(-48),
    };
    app.resolve(IoOutcome::Connected(Ok(link)), now);
    let _ = app.tick(now + 50, &mut input, &mut canvas);

    assert_eq!(app.state(), AppState::Main);
    assert!(app.net().link.connected);
    assert_eq!(settings::load_wifi_credentials(app.store()), Some(expected));
    assert!(app.handoff().selected_ssid.is_none());
}

#[test]
fn fetched_rows_render_with_three_row_layout() {
    let (mut app, mut canvas) = booted();
    app.presets_mut()
        .update(0, Preset::train("", "Lausanne", "Bern", 3))
        .unwrap();

    let request = app.refresh_current(100);
    let route = Route::new("Lausanne", "Bern");
    assert_eq!(
        request,
        Some(IoRequest::Fetch {
            route: route.clone(),
            limit: 3
        })
    );

    let mut rows = ConnectionList::new();
    let _ = rows.push(connection("15:30", "16:35", "7", false));
    let _ = rows.push(connection("16:00", "17:00", "8", false));
    let _ = rows.push(connection("16:30", "17:35", "7", false));
    app.resolve(
        IoOutcome::Fetched {
            route,
            result: Ok(rows),
        },
        100,
    );

    let mut input = MockInput::new();
    assert_eq!(
        app.tick(150, &mut input, &mut canvas),
        TickResult::RenderRequested
    );
    assert!(canvas.shows_text("Lausanne -> Bern"));
    assert!(canvas.shows_text("15:30"));
    assert!(canvas.shows_text("16:30"));
    assert!(canvas.shows_text("Pl8"));
    assert!(canvas.shows_text("1h05"));
    assert!(!canvas.shows_text("Loading..."));

    canvas.reset_counters();
    assert_eq!(app.tick(200, &mut input, &mut canvas), TickResult::NoRender);
    assert_eq!(canvas.ops, 0);
}

#[test]
fn cancelled_single_row_is_flagged() {
    let (mut app, mut canvas) = booted();
    let route = Route::new("Lausanne", "Geneve");
    let mut rows = ConnectionList::new();
    let _ = rows.push(connection("08:12", "08:48", "?", true));
    app.resolve(
        IoOutcome::Fetched {
            route,
            result: Ok(rows),
        },
        10,
    );

    let mut input = MockInput::new();
    let _ = app.tick(50, &mut input, &mut canvas);
    assert!(canvas.shows_text("CANCELLED"));
    assert!(!canvas.shows_text("08:12"));
}

#[test]
fn failed_fetch_opens_error_screen_then_dismisses() {
    let (mut app, mut canvas) = booted();
    let error = crate::error::ErrorInfo::new(
        crate::error::ErrorKind::NoConnections,
        "No connections",
        "",
        10,
    );
    app.resolve(
        IoOutcome::Fetched {
            route: Route::new("Lausanne", "Geneve"),
            result: Err(error),
        },
        10,
    );

    let mut input = MockInput::new();
    let _ = app.tick(50, &mut input, &mut canvas);
    assert_eq!(app.state(), AppState::Error);

    input.short();
    run(&mut app, &mut input, &mut canvas, 50);
    assert_eq!(app.state(), AppState::Main);
    assert!(canvas.shows_text("No connections"));
}

#[test]
fn failed_fetch_after_link_loss_falls_back_to_no_wifi() {
    let (mut app, mut canvas) = booted();
    app.set_link(LinkStatus {
        connected: true,
        rssi: Some(-60),
    });
    let mut input = MockInput::new();
    let _ = app.tick(50, &mut input, &mut canvas);
    assert!(canvas.shows_text("Loading..."));

    let request = app.refresh_current(100);
    let Some(IoRequest::Fetch { route, .. }) = request else {
        panic!("expected a fetch, got {:?}", request);
    };
    // The executor found the link down while running the fetch.
    app.set_link(LinkStatus::default());
    let error = crate::transit::TransitError::Network.to_error_info("http://x", b"", 120);
    app.resolve(
        IoOutcome::Fetched {
            route,
            result: Err(error),
        },
        120,
    );

    let _ = app.tick(150, &mut input, &mut canvas);
    assert_eq!(app.state(), AppState::Error);

    input.short();
    run(&mut app, &mut input, &mut canvas, 150);
    assert_eq!(app.state(), AppState::Main);
    assert!(canvas.shows_text("No WiFi"));
    assert!(!canvas.shows_text("Loading..."));
}

#[test]
fn no_connections_cue_stays_on_the_failed_route() {
    let (mut app, mut canvas) = booted();
    app.set_link(LinkStatus {
        connected: true,
        rssi: Some(-60),
    });
    app.presets_mut()
        .update(0, Preset::train("", "Lausanne", "Bern", 2))
        .unwrap();
    app.presets_mut()
        .update(1, Preset::train("", "Zurich", "Basel", 2))
        .unwrap();

    let error = crate::transit::TransitError::NoConnections.to_error_info("", b"", 10);
    app.resolve(
        IoOutcome::Fetched {
            route: Route::new("Lausanne", "Bern"),
            result: Err(error),
        },
        10,
    );
    let mut input = MockInput::new();
    let _ = app.tick(50, &mut input, &mut canvas);
    input.short();
    let now = run(&mut app, &mut input, &mut canvas, 50);
    assert_eq!(app.state(), AppState::Main);
    assert!(canvas.shows_text("No connections"));

    input.rotate(1);
    run(&mut app, &mut input, &mut canvas, now);
    assert_eq!(app.presets().current_index(), 1);
    assert!(!canvas.shows_text("No connections"));
    assert!(canvas.shows_text("Loading..."));
}

#[test]
fn last_preset_cannot_be_deleted() {
    let (mut app, mut canvas) = booted();
    while app.presets().len() > 1 {
        app.presets_mut().delete(1).unwrap();
    }

    let mut input = MockInput::new();
    // Menu -> Presets -> first entry -> Delete -> confirm.
    input
        .long()
        .rotate(1)
        .short()
        .short()
        .rotate(3)
        .short()
        .rotate(1)
        .short();
    run(&mut app, &mut input, &mut canvas, 0);

    assert_eq!(app.state(), AppState::PresetSelect);
    assert_eq!(app.presets().len(), 1);
    assert!(canvas.shows_text("Can't delete last"));
}

#[test]
fn creating_a_clock_preset_returns_to_the_list() {
    let (mut app, mut canvas) = booted();
    let before = app.presets().len();

    let mut input = MockInput::new();
    // Menu -> Presets -> "+ Add New" -> Clock -> Save.
    input
        .long()
        .rotate(1)
        .short()
        .rotate(before as i32)
        .short()
        .rotate(1)
        .short();
    let now = run(&mut app, &mut input, &mut canvas, 0);
    assert_eq!(app.state(), AppState::PresetEdit);
    assert!(canvas.shows_text("Name: Clock"));
    assert!(canvas.shows_text("Cancel"));

    input.rotate(1).short();
    run(&mut app, &mut input, &mut canvas, now);

    assert_eq!(app.state(), AppState::PresetSelect);
    assert_eq!(app.presets().len(), before + 1);
    let created = app.presets().get(before).unwrap();
    assert_eq!(created.kind, PresetType::Clock);
    assert_eq!(created.name.as_str(), "Clock");
    assert_eq!(settings::load_preset_count(app.store()), before + 1);
}

#[test]
fn edit_from_main_returns_to_main_without_saving_on_long_press() {
    let (mut app, mut canvas) = booted();
    let mut input = MockInput::new();
    input.short();
    let now = run(&mut app, &mut input, &mut canvas, 0);
    assert_eq!(app.state(), AppState::PresetEdit);
    assert!(canvas.shows_text("Trains: 1"));

    // Trains row, cycle once, then leave.
    input.rotate(3).short().long();
    run(&mut app, &mut input, &mut canvas, now);
    assert_eq!(app.state(), AppState::Main);
    assert_eq!(app.presets().current().unwrap().trains_to_display, 1);
}

#[test]
fn main_encoder_switches_preset_and_marks_dirty() {
    let (mut app, mut canvas) = booted();
    let mut input = MockInput::new();
    input.rotate(1);
    run(&mut app, &mut input, &mut canvas, 0);

    assert_eq!(app.presets().current_index(), 1);
    assert!(app.presets().is_dirty());
    app.save_presets().unwrap();
    assert_eq!(settings::load_current_index(app.store()), 1);
}
