use super::ecodes;
use super::multitouch::MAX_CONTACTS;
use super::{EventSink, FrameKind, InputEvent};
use crate::device::DeviceProfile;
use crate::error::Result;

use evdev::uinput::VirtualDevice;
use evdev::{AbsInfo, AbsoluteAxisCode, AttributeSet, KeyCode, UinputAbsSetup};

/// Largest tracking id registered with the device; fresh ids wrap around here.
const MAX_TRACKING_ID: i32 = 0xffff;

/// A batch that grows past this without a sync is dropped.
pub const MAX_PENDING: usize = 512;

/// Translates interpreter events to kernel input events.
///
/// The state machine tags slot updates with the slot they belong to, while the
/// evdev protocol is stateful: `ABS_MT_SLOT` is only reported when the slot
/// being written to differs from the last one reported.
///
/// A slot only becomes a contact once it has a tracking id, so activating a
/// slot the client never gave one assigns the next free id, like
/// `input_mt_report_slot_state` does in the kernel.
#[derive(Debug, Default)]
pub struct EvdevEncoder {
    reported_slot: Option<usize>,
    tracking: [Option<i32>; MAX_CONTACTS],
    next_id: i32,
}

impl EvdevEncoder {
    pub fn new() -> EvdevEncoder {
        EvdevEncoder::default()
    }

    /// Forgets everything the device is assumed to know, keeping the id counter.
    /// Used after a batch was lost.
    pub fn reset(&mut self) {
        self.reported_slot = None;
        self.tracking = [None; MAX_CONTACTS];
    }

    pub fn encode(&mut self, event: &InputEvent, out: &mut Vec<evdev::InputEvent>) {
        match *event {
            InputEvent::AxisUpdate { axis, value } => out.push(abs(axis, value)),
            InputEvent::SlotAxisUpdate { slot, axis, value } => {
                self.select(slot, out);
                out.push(abs(axis, value));
            }
            InputEvent::ButtonUpdate { pressed } => out.push(evdev::InputEvent::new(
                ecodes::EV_KEY,
                ecodes::BTN_TOUCH,
                pressed as i32,
            )),
            InputEvent::SlotStateUpdate { slot, active, .. } => {
                self.select(slot, out);
                if active {
                    if self.tracking_id(slot).is_none() {
                        let id = self.fresh_id();
                        self.set_tracking_id(slot, Some(id));
                        out.push(abs(ecodes::ABS_MT_TRACKING_ID, id));
                    }
                    out.push(abs(ecodes::ABS_MT_TOOL_TYPE, ecodes::MT_TOOL_FINGER));
                } else {
                    self.set_tracking_id(slot, None);
                    out.push(abs(ecodes::ABS_MT_TRACKING_ID, -1));
                }
            }
            InputEvent::TrackingUpdate { slot, id } => {
                self.select(slot, out);
                self.set_tracking_id(slot, id);
                out.push(abs(ecodes::ABS_MT_TRACKING_ID, id.unwrap_or(-1)));
            }
            InputEvent::FrameBoundary { kind } => {
                let code = match kind {
                    FrameKind::Full => ecodes::SYN_REPORT,
                    FrameKind::LegacyMulti => ecodes::SYN_MT_REPORT,
                };
                out.push(evdev::InputEvent::new(ecodes::EV_SYN, code, 0));
            }
        }
    }

    fn select(&mut self, slot: usize, out: &mut Vec<evdev::InputEvent>) {
        if self.reported_slot != Some(slot) {
            out.push(abs(ecodes::ABS_MT_SLOT, slot as i32));
            self.reported_slot = Some(slot);
        }
    }

    fn tracking_id(&self, slot: usize) -> Option<i32> {
        self.tracking.get(slot).copied().flatten()
    }

    fn set_tracking_id(&mut self, slot: usize, id: Option<i32>) {
        if let Some(t) = self.tracking.get_mut(slot) {
            *t = id;
        }
    }

    fn fresh_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = if id >= MAX_TRACKING_ID { 0 } else { id + 1 };
        id
    }
}

fn abs(code: u16, value: i32) -> evdev::InputEvent {
    evdev::InputEvent::new(ecodes::EV_ABS, code, value)
}

/// Collects encoded events until a `FrameBoundary::Full` completes the frame.
///
/// `LegacyMulti` boundaries stay inside the batch as `SYN_MT_REPORT`. The
/// terminating `SYN_REPORT` is not part of the returned batch.
#[derive(Debug, Default)]
pub struct FrameBatcher {
    encoder: EvdevEncoder,
    pending: Vec<evdev::InputEvent>,
}

impl FrameBatcher {
    pub fn new() -> FrameBatcher {
        FrameBatcher::default()
    }

    /// Returns the finished batch when `event` closes a frame
    pub fn push(&mut self, event: &InputEvent) -> Option<Vec<evdev::InputEvent>> {
        if let InputEvent::FrameBoundary {
            kind: FrameKind::Full,
        } = *event
        {
            return Some(std::mem::replace(&mut self.pending, Vec::new()));
        }

        self.encoder.encode(event, &mut self.pending);
        if self.pending.len() > MAX_PENDING {
            warn!(
                "Dropping {} events written without a sync",
                self.pending.len()
            );
            self.discard();
        }
        None
    }

    /// Drops the pending events and makes the next batch restate the slot context
    pub fn discard(&mut self) {
        self.pending.clear();
        self.encoder.reset();
    }

    /// Events waiting for the next sync
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Forwards events to a uinput device.
///
/// Events are held back until a `FrameBoundary::Full` arrives, the whole batch is
/// then written followed by `SYN_REPORT`. A client that never syncs never gets
/// anything delivered.
pub struct UinputSink {
    device: VirtualDevice,
    batcher: FrameBatcher,
}

impl UinputSink {
    /// Registers the uinput device described by `profile`
    pub fn new(profile: &DeviceProfile) -> Result<UinputSink> {
        let mut keys = AttributeSet::<KeyCode>::new();
        keys.insert(KeyCode::BTN_TOUCH);

        let x = AbsInfo::new(profile.x_min, profile.x_min, profile.x_max, 0, 0, 0);
        let y = AbsInfo::new(profile.y_min, profile.y_min, profile.y_max, 0, 0, 0);
        let slots = AbsInfo::new(0, 0, MAX_CONTACTS as i32 - 1, 0, 0, 0);
        let tracking = AbsInfo::new(0, 0, MAX_TRACKING_ID, 0, 0, 0);
        let tool = AbsInfo::new(0, 0, ecodes::MT_TOOL_PEN, 0, 0, 0);
        let size = AbsInfo::new(0, 0, 0xff, 0, 0, 0);

        let device = VirtualDevice::builder()?
            .name(&profile.device_name)
            .with_keys(&keys)?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, x))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, y))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_MT_SLOT, slots))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_MT_POSITION_X, x))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_MT_POSITION_Y, y))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisCode::ABS_MT_TRACKING_ID,
                tracking,
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_MT_TOOL_TYPE, tool))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisCode::ABS_MT_TOUCH_MAJOR,
                size,
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_MT_PRESSURE, size))?
            .build()?;

        info!(
            "Registered '{}' ({}) with X {}..{} Y {}..{}",
            profile.device_name,
            profile.phys,
            profile.x_min,
            profile.x_max,
            profile.y_min,
            profile.y_max
        );

        Ok(UinputSink {
            device,
            batcher: FrameBatcher::new(),
        })
    }

    /// Events waiting for the next sync
    pub fn pending(&self) -> usize {
        self.batcher.pending()
    }
}

impl EventSink for UinputSink {
    fn submit(&mut self, event: &InputEvent) {
        if let Some(batch) = self.batcher.push(event) {
            // emit() terminates the batch with SYN_REPORT itself
            if let Err(e) = self.device.emit(&batch) {
                error!("Failed to write frame to uinput device: {}", e);
                self.batcher.discard();
            }
        }
    }
}
