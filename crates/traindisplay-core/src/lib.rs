#![cfg_attr(not(test), no_std)]

//! Host-testable core of the train display firmware: input classification,
//! persisted presets, transit parsing, widgets, screens and the state machine.

pub mod app;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod preset;
pub mod screens;
pub mod settings;
pub mod text;
pub mod transit;
pub mod ui;
pub mod wifi;
