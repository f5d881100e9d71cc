// UI module - GUI logic and event loop bridge
//
// This module contains:
// - EventLoopBridge: Coordinates between tokio async runtime and Slint event loop
// - GuiController: Wires the bar chart and buttons to the sort runner

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle, FrameGate};
pub use controller::GuiController;
