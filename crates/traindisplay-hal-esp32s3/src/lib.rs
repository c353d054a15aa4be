#![no_std]

//! ESP32-S3 board layer for the train display: encoder and button pins, the
//! SSD1306 canvas, the flash-backed key/value store and the network clients.

pub mod input {
    pub mod rotary;
}
pub mod network;
pub mod platform {
    pub mod display;
}
pub mod render;
pub mod storage {
    pub mod nvs_store;
}
