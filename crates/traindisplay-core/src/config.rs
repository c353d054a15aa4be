//! Board wiring, layout metrics, timeouts and storage keys.

// Wiring (ESP32-S3 GPIO numbers).
pub const I2C_SDA_PIN: u8 = 4;
pub const I2C_SCL_PIN: u8 = 5;
pub const ENCODER_CLK_PIN: u8 = 14;
pub const ENCODER_DT_PIN: u8 = 12;
pub const ENCODER_SW_PIN: u8 = 13;

pub const SCREEN_WIDTH: i32 = 128;
pub const SCREEN_HEIGHT: i32 = 64;
pub const SCREEN_ADDRESS: u8 = 0x3C;

/// Top rows rendered in yellow on two-colour panels.
pub const YELLOW_ZONE_Y: i32 = 0;
pub const YELLOW_ZONE_HEIGHT: i32 = 16;
pub const BLUE_ZONE_Y: i32 = 16;
pub const BLUE_ZONE_HEIGHT: i32 = 48;

pub const ENCODER_DEBOUNCE_MS: u32 = 5;
pub const BUTTON_DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 1_000;

pub const TRAIN_FETCH_INTERVAL_MS: u64 = 60_000;
pub const HTTP_TIMEOUT_MS: u64 = 7_000;
pub const WIFI_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const WIFI_SCAN_MAX_NETWORKS: usize = 20;
pub const ERROR_DISPLAY_MS: u64 = 5_000;
pub const NOTICE_DISPLAY_MS: u64 = 1_500;
pub const SPLASH_MS: u64 = 2_000;
pub const MAIN_LOOP_DELAY_MS: u64 = 50;
pub const CLOCK_QUERY_TIMEOUT_MS: u64 = 100;
pub const PRESET_SAVE_DEBOUNCE_MS: u64 = 1_500;

pub const MAX_VISIBLE_MENU_ITEMS: usize = 5;
pub const MENU_ITEM_HEIGHT: i32 = 10;
pub const TITLE_BAR_PADDING: i32 = 2;
pub const TEXT_INPUT_VISIBLE_CHARS: usize = 20;

pub const KEYBOARD_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 !@#$%&*()-_=+[]{};:,.<>?";
pub const STATION_CHARS: &str = "abcdefghijklmnopqrstuvwxyz ";

pub const API_HOST: &str = "transport.opendata.ch";
pub const API_PORT: u16 = 80;
pub const API_BASE_PATH: &str = "/v1";
pub const API_BASE_URL: &str = "http://transport.opendata.ch/v1";
pub const MAX_TRAINS: u8 = 4;

pub const NTP_SERVER_1: &str = "pool.ntp.org";
pub const NTP_SERVER_2: &str = "time.nist.gov";
pub const CLOCK_SYNC_RETRY_MS: u64 = 30_000;
pub const CLOCK_RESYNC_MS: u64 = 3_600_000;
pub const TIMEZONE_OFFSET_SEC: i32 = 3_600;
pub const DAYLIGHT_OFFSET_SEC: i32 = 3_600;

pub const FIRMWARE_VERSION: &str = "v2.0";

/// Non-volatile namespace holding every key below.
pub const PREFS_NAMESPACE: &str = "trainDisplay";
pub const PREFS_WIFI_SSID: &str = "ssid";
pub const PREFS_WIFI_PASSWORD: &str = "password";
pub const PREFS_PRESET_COUNT: &str = "presetCount";
pub const PREFS_CURRENT_PRESET: &str = "currentPreset";
pub const PREFS_PRESET_PREFIX: &str = "preset_";

pub const MAX_PRESETS: usize = 12;
pub const PRESET_NAME_CHARS: usize = 20;
pub const STATION_NAME_CHARS: usize = 32;
pub const SSID_CHARS: usize = 32;
pub const PASSWORD_CHARS: usize = 64;
