//! Input adapters that turn window events into render requests.

pub mod gui;
