//! A virtual multitouch touchscreen driven by a line oriented text protocol.
//!
//! Clients write records such as `"s 2\na 1\nX 300\nY 400\nT 7\nS 0\n"`; each record
//! is one command character and one integer. The records are applied to a per-slot
//! contact state machine and turned into input events (absolute axes, `BTN_TOUCH`,
//! slot updates and sync markers) for an `EventSink`, such as a uinput device.

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

pub extern crate evdev;

/// Error and diagnostic types
pub mod error;

/// The record protocol, the contact state machine and the event sinks
pub mod input;

/// Ties the line splitter, the command parser and the state machine together
pub mod interpreter;

/// Device profiles: axis ranges and names registered with the input subsystem
pub mod device;

/// Exclusive open, writes and help text reads, i.e. the character device contract
pub mod chardev;

pub use crate::chardev::{Session, VirtualTouchscreen};
pub use crate::device::DeviceProfile;
pub use crate::error::{Diagnostic, Error, Result};
pub use crate::input::{EventSink, InputEvent};
pub use crate::interpreter::{Interpreter, WriteReport};
