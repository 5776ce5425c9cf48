use crate::error::{Error, Result};
use crate::input::{DeviceState, EventSink};
use crate::interpreter::{Interpreter, WriteReport};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Returned verbatim on read
pub const HELP: &str = "Usage: write the following commands to /dev/virtual_touchscreen:\n\
    \x20   x num  - move to (x, ...)\n\
    \x20   y num  - move to (..., y)\n\
    \x20   d 0    - touch down\n\
    \x20   u 0    - touch up\n\
    \x20   s slot - select multitouch slot (0 to 9)\n\
    \x20   a flag - report if the selected slot is active\n\
    \x20   e 0    - trigger input_mt_report_pointer_emulation\n\
    \x20   X num  - report ABS_MT_POSITION_X for the selected slot\n\
    \x20   Y num  - report ABS_MT_POSITION_Y for the selected slot\n\
    \x20   S 0    - sync (should be after every block of commands)\n\
    \x20   M 0    - multitouch sync\n\
    \x20   T num  - report ABS_MT_TRACKING_ID\n\
    \x20   0 num  - report ABS_MT_TOUCH_MAJOR\n\
    \x20   ...    - ...\n\
    \x20   ; num  - report ABS_MT_DISTANCE\n\
    \x20 x and y from 0 to 1023\n\
    \x20 Each command is char and int: sscanf(\"%c%d\",...)\n\
    \x20 Entries separated with '\\n'. Short writes == dropped commands.\n";

/// Copies the part of `HELP` starting at `offset` into `buf`.
///
/// Returns the number of bytes copied, 0 once `offset` is past the end.
pub fn read_help(offset: usize, buf: &mut [u8]) -> usize {
    let message = HELP.as_bytes();
    if offset >= message.len() {
        return 0;
    }
    let length = buf.len().min(message.len() - offset);
    buf[..length].copy_from_slice(&message[offset..offset + length]);
    length
}

/// The character device side of the touchscreen: one writer at a time.
///
/// The interpreter itself does no locking; writers are serialized here.
pub struct VirtualTouchscreen<S: EventSink> {
    interpreter: Mutex<Interpreter<S>>,
    open: AtomicBool,
}

impl<S: EventSink> VirtualTouchscreen<S> {
    pub fn new(sink: S) -> VirtualTouchscreen<S> {
        VirtualTouchscreen {
            interpreter: Mutex::new(Interpreter::new(sink)),
            open: AtomicBool::new(false),
        }
    }

    /// Fails with `Error::Busy` while another session is alive
    pub fn open(&self) -> Result<Session<'_, S>> {
        if self
            .open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        debug!("session opened");
        Ok(Session { device: self })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Copy of the current device state
    pub fn state(&self) -> DeviceState {
        self.lock().state().clone()
    }

    pub fn with_sink<R, F: FnOnce(&mut S) -> R>(&self, f: F) -> R {
        f(self.lock().sink_mut())
    }

    pub fn into_interpreter(self) -> Interpreter<S> {
        self.interpreter
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Interpreter<S>> {
        // a panicking sink leaves the state as consistent as any single command does
        self.interpreter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// An open handle on the device. Dropping it releases the device.
pub struct Session<'a, S: EventSink> {
    device: &'a VirtualTouchscreen<S>,
}

impl<'a, S: EventSink> Session<'a, S> {
    pub fn write(&mut self, buf: &[u8]) -> WriteReport {
        self.device.lock().write(buf)
    }

    pub fn read(&self, offset: usize, buf: &mut [u8]) -> usize {
        read_help(offset, buf)
    }
}

impl<'a, S: EventSink> Drop for Session<'a, S> {
    fn drop(&mut self) {
        self.device.open.store(false, Ordering::Release);
        debug!("session closed");
    }
}
