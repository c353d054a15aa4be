#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Instant, Timer};
use esp_hal::{
    clock::CpuClock,
    gpio::{Event, Input, InputConfig, Io, Pull},
    handler,
    i2c::master::{Config as I2cConfig, I2c},
    ram,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info, warn};
use static_cell::{ConstStaticCell, StaticCell};
use traindisplay_core::{
    app::StateMachine,
    clock::WallClock,
    config::{
        DAYLIGHT_OFFSET_SEC, ENCODER_CLK_PIN, ENCODER_DT_PIN, ENCODER_SW_PIN, I2C_SCL_PIN,
        I2C_SDA_PIN, MAIN_LOOP_DELAY_MS, SCREEN_ADDRESS, TIMEZONE_OFFSET_SEC,
    },
    input::{ButtonConfig, EncoderConfig, QuadratureDecoder},
    settings::{self, MemoryStore},
    ui::BootNotice,
    wifi::Credentials,
};
use traindisplay_hal_esp32s3::{
    input::rotary::{EncoderPins, RotaryInput, SharedEncoderPins, service_encoder_edge},
    network::{ConnectivityHandle, ntp, wifi::WifiFacade},
    platform::display::{DisplayConfig, OledCanvas},
    storage::nvs_store::NvsStore,
};

use preset_sync::PresetSyncState;
use services::Services;
use store::BoardStore;

#[path = "main/preset_sync.rs"]
mod preset_sync;
#[path = "main/services.rs"]
mod services;
#[path = "main/store.rs"]
mod store;

const I2C_HZ: u32 = 400_000;
const ENCODER_DIRECTION_INVERTED: bool = false;
const FETCH_BODY_BYTES: usize = 64 * 1024;
const SPLASH_STEPS: u32 = 10;
const LINK_POLL_MS: u64 = 5_000;

const SEED_WIFI_SSID: Option<&str> = option_env!("TRAINDISPLAY_WIFI_SSID");
const SEED_WIFI_PASSWORD: Option<&str> = option_env!("TRAINDISPLAY_WIFI_PASSWORD");

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static CLOCK: WallClock = WallClock::new(TIMEZONE_OFFSET_SEC + DAYLIGHT_OFFSET_SEC);
static DECODER: QuadratureDecoder = QuadratureDecoder::new(
    EncoderConfig::new().with_direction_inverted(ENCODER_DIRECTION_INVERTED),
);
static ENCODER_PINS: SharedEncoderPins<Input<'static>, Input<'static>> =
    critical_section::Mutex::new(core::cell::RefCell::new(None));
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();
static FETCH_BODY: ConstStaticCell<[u8; FETCH_BODY_BYTES]> =
    ConstStaticCell::new([0u8; FETCH_BODY_BYTES]);

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[handler]
#[ram]
fn encoder_interrupt() {
    let now_ms = esp_hal::time::Instant::now()
        .duration_since_epoch()
        .as_millis() as u32;

    critical_section::with(|cs| {
        if let Some(pins) = ENCODER_PINS.borrow_ref_mut(cs).as_mut() {
            let (clk, dt) = pins.pins_mut();
            clk.clear_interrupt();
            dt.clear_interrupt();
        }
    });
    service_encoder_edge(&ENCODER_PINS, &DECODER, now_ms);
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

async fn hold(notice: BootNotice) {
    let hold_ms = notice.hold_ms();
    if hold_ms > 0 {
        Timer::after_millis(hold_ms).await;
    }
}

/// Opens flash storage and seeds build-time credentials on a blank store.
fn open_store() -> BoardStore {
    let mut store = match NvsStore::open() {
        Ok(store) => BoardStore::Flash(store),
        Err(err) => {
            warn!("nvs: open failed ({:?}); settings will not survive a reset", err);
            BoardStore::Volatile(MemoryStore::new())
        }
    };

    if let Some(ssid) = SEED_WIFI_SSID.filter(|ssid| !ssid.is_empty())
        && settings::load_wifi_credentials(&store).is_none()
    {
        let seed = Credentials::new(ssid, SEED_WIFI_PASSWORD.unwrap_or(""));
        match settings::save_wifi_credentials(&mut store, &seed) {
            Ok(()) => info!("nvs: seeded wifi credentials ssid={}", ssid),
            Err(err) => warn!("nvs: seeding wifi credentials failed: {:?}", err),
        }
    }
    store
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: traindisplay starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let i2c_config = I2cConfig::default().with_frequency(Rate::from_hz(I2C_HZ));
    let i2c = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => i2c
            .with_sda(peripherals.GPIO4)
            .with_scl(peripherals.GPIO5),
        Err(err) => {
            info!("display: i2c config rejected: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let mut canvas = OledCanvas::new(i2c, DisplayConfig::default().with_address(SCREEN_ADDRESS));
    esp_println::println!(
        "display: init begin (SDA={} SCL={} addr=0x{:02X})",
        I2C_SDA_PIN,
        I2C_SCL_PIN,
        SCREEN_ADDRESS
    );
    if let Err(err) = canvas.initialize() {
        esp_println::println!("display: initialize failed");
        info!("display initialize failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }
    esp_println::println!("display: initialize ok");

    BootNotice::Splash.draw(&mut canvas);
    let step_ms = BootNotice::Splash.hold_ms() / SPLASH_STEPS as u64;
    for step in 1..=SPLASH_STEPS {
        BootNotice::draw_splash_progress(&mut canvas, step, SPLASH_STEPS);
        Timer::after_millis(step_ms).await;
    }

    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let mut encoder_clk = Input::new(peripherals.GPIO14, input_cfg);
    let mut encoder_dt = Input::new(peripherals.GPIO12, input_cfg);
    let encoder_sw = Input::new(peripherals.GPIO13, input_cfg);

    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(encoder_interrupt);
    DECODER.prime(encoder_clk.is_high(), encoder_dt.is_high());
    critical_section::with(|cs| {
        encoder_clk.listen(Event::AnyEdge);
        encoder_dt.listen(Event::AnyEdge);
        ENCODER_PINS
            .borrow_ref_mut(cs)
            .replace(EncoderPins::new(encoder_clk, encoder_dt));
    });

    let mut input = match RotaryInput::new(&DECODER, encoder_sw, ButtonConfig::default(), now_ms())
    {
        Ok(input) => input,
        Err(err) => {
            info!("input: button init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    info!(
        "Encoder pins: CLK=GPIO{} DT=GPIO{} SW=GPIO{}",
        ENCODER_CLK_PIN, ENCODER_DT_PIN, ENCODER_SW_PIN
    );

    let store = open_store();
    if store.is_volatile() {
        info!("settings: running on volatile storage");
    }
    let mut machine = StateMachine::new(store).with_clock(&CLOCK);
    info!("presets: loaded count={}", machine.presets().len());

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(ClientConfig::default())) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x7D15_5A1E_C0FF_EE42,
    );

    let wifi = WifiFacade::new(wifi_controller, stack, &CONNECTIVITY);
    let mut services = Services::new(wifi, stack, FETCH_BODY.take());

    let net_future = net_runner.run();
    let clock_future = ntp::run(stack, &CLOCK, now_ms);
    let ui_future = async {
        if let Some(credentials) = machine.credentials() {
            info!("wifi: auto-connect ssid={}", credentials.ssid);
            BootNotice::Connecting.draw(&mut canvas);

            match services.connect(&credentials).await {
                Ok(()) => {
                    machine.set_link(CONNECTIVITY.snapshot());
                    BootNotice::Connected.draw(&mut canvas);
                    hold(BootNotice::Connected).await;

                    if let Some(request) = machine.refresh_current(now_ms()) {
                        let outcome = services.execute(request).await;
                        machine.resolve(outcome, now_ms());
                    }
                }
                Err(err) => {
                    info!("wifi: auto-connect failed: {:?}", err);
                    BootNotice::ConnectFailed.draw(&mut canvas);
                    hold(BootNotice::ConnectFailed).await;
                }
            }
        } else {
            info!("wifi: no credentials saved");
        }

        machine.start(now_ms(), &mut canvas);
        let mut preset_sync = PresetSyncState::new(machine.presets().current_index());
        let mut button_fault_logged = false;
        let mut last_connectivity_revision = CONNECTIVITY.revision();
        let mut last_link_poll_ms = now_ms();

        loop {
            let now = now_ms();
            if now.saturating_sub(last_link_poll_ms) >= LINK_POLL_MS {
                services.poll_link();
                last_link_poll_ms = now;
            }
            if let Err(err) = input.update(now)
                && !button_fault_logged
            {
                info!("input: button read failed: {:?}", err);
                button_fault_logged = true;
            }

            let revision = CONNECTIVITY.revision();
            if revision != last_connectivity_revision {
                machine.set_link(CONNECTIVITY.snapshot());
                last_connectivity_revision = revision;
            }

            machine.tick(now, &mut input, &mut canvas);

            if let Some(request) = machine.take_request() {
                let outcome = services.execute(request).await;
                last_connectivity_revision = CONNECTIVITY.revision();
                machine.set_link(CONNECTIVITY.snapshot());
                machine.resolve(outcome, now_ms());
            }

            preset_sync.track_current(
                machine.presets().is_dirty(),
                machine.presets().current_index(),
                now,
            );
            preset_sync.flush_if_due(&mut machine, now);

            Timer::after_millis(MAIN_LOOP_DELAY_MS).await;
        }
    };

    let _ = embassy_futures::join::join3(net_future, clock_future, ui_future).await;
    unreachable!()
}
