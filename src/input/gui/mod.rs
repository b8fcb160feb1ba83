//! Windowed front end: winit for the window, pixels for the framebuffer.

mod app;

pub use app::run_gui;
