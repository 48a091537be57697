//! Library entry for dockman exposing the controller for integration tests.

pub mod app;
pub mod config;
pub mod controller;
pub mod events;
pub mod lifecycle;
pub mod net;
pub mod state;
pub mod theme;
pub mod ui;
pub mod util;
