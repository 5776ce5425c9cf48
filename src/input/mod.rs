/// Used event codes
pub mod ecodes;

/// Contains the code to split a written buffer into newline terminated records
pub mod lines;

/// Contains the record parser and the `Command` type
pub mod command;

/// Contains the per-slot contact state machine
pub mod multitouch;

/// Contains the code to translate events to evdev and emit them through uinput
pub mod ev;

pub use self::command::{Command, MtAxis};
pub use self::multitouch::{DeviceState, Slot, MAX_CONTACTS};

/// Which kind of synchronization marker closes a batch of updates
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum FrameKind {
    /// `SYN_REPORT`: everything since the previous one is one atomic update
    Full,
    /// `SYN_MT_REPORT`: separator of the legacy (type A) multitouch protocol
    LegacyMulti,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ToolType {
    Finger,
}

/// Events produced by the state machine, in the order they are applied.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum InputEvent {
    /// An absolute axis update outside of any slot context (single touch axes and
    /// raw pass-through axes)
    AxisUpdate { axis: u16, value: i32 },
    /// Position update of one multitouch slot
    SlotAxisUpdate { slot: usize, axis: u16, value: i32 },
    ButtonUpdate { pressed: bool },
    SlotStateUpdate { slot: usize, active: bool, tool: ToolType },
    /// `None` retires the contact in this slot
    TrackingUpdate { slot: usize, id: Option<i32> },
    FrameBoundary { kind: FrameKind },
}

/// Trait to implement to be handed the events produced by the interpreter
pub trait EventSink {
    fn submit(&mut self, event: &InputEvent);
}

impl<'a, S: EventSink + ?Sized> EventSink for &'a mut S {
    fn submit(&mut self, event: &InputEvent) {
        (**self).submit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn submit(&mut self, event: &InputEvent) {
        (**self).submit(event)
    }
}

/// Keeps every submitted event.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<InputEvent>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    /// Returns the recorded events, leaving the sink empty
    pub fn take(&mut self) -> Vec<InputEvent> {
        std::mem::replace(&mut self.events, Vec::new())
    }

    /// Complete frames seen so far, i.e. the number of `FrameBoundary::Full` events
    pub fn frames(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                **e == InputEvent::FrameBoundary {
                    kind: FrameKind::Full,
                }
            })
            .count()
    }
}

impl EventSink for RecordingSink {
    fn submit(&mut self, event: &InputEvent) {
        self.events.push(*event);
    }
}

/// Logs every event and drops it.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl EventSink for LogSink {
    fn submit(&mut self, event: &InputEvent) {
        info!("{:?}", event);
    }
}
