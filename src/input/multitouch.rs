use super::command::Command;
use super::ecodes;
use super::{FrameKind, InputEvent, ToolType};
use crate::error::Diagnostic;

/// Number of contact slots, one per finger
pub const MAX_CONTACTS: usize = 10;

/// One contact channel.
///
/// Positions are never cleared when the slot is released; a client may also
/// position a slot before activating it.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct Slot {
    pub position_x: i32,
    pub position_y: i32,
    pub tracking_id: Option<i32>,
    pub active: bool,
}

/// Everything the interpreter remembers between commands.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct DeviceState {
    pub touch_axis_x: i32,
    pub touch_axis_y: i32,
    pub button_down: bool,
    pub selected_slot: usize,
    pub slots: [Slot; MAX_CONTACTS],
}

impl DeviceState {
    pub fn new() -> DeviceState {
        DeviceState::default()
    }

    pub fn selected(&self) -> &Slot {
        &self.slots[self.selected_slot]
    }

    fn selected_mut(&mut self) -> &mut Slot {
        &mut self.slots[self.selected_slot]
    }

    /// The slot acting as the single touch pointer: the lowest indexed active one
    pub fn pointer_slot(&self) -> Option<(usize, &Slot)> {
        self.slots.iter().enumerate().find(|(_, s)| s.active)
    }

    /// Applies one command and returns the events it produces, in order.
    ///
    /// A `Sync` is never inserted here; clients must send `S` themselves for the
    /// preceding updates to form a frame.
    pub fn apply(&mut self, command: Command) -> Result<Vec<InputEvent>, Diagnostic> {
        let slot = self.selected_slot;
        let events = match command {
            Command::MoveTo { x, y } => {
                self.touch_axis_x = x;
                self.touch_axis_y = y;
                vec![
                    InputEvent::AxisUpdate {
                        axis: ecodes::ABS_X,
                        value: x,
                    },
                    InputEvent::AxisUpdate {
                        axis: ecodes::ABS_Y,
                        value: y,
                    },
                ]
            }
            Command::MoveX(x) => {
                self.touch_axis_x = x;
                vec![InputEvent::AxisUpdate {
                    axis: ecodes::ABS_X,
                    value: x,
                }]
            }
            Command::MoveY(y) => {
                self.touch_axis_y = y;
                vec![InputEvent::AxisUpdate {
                    axis: ecodes::ABS_Y,
                    value: y,
                }]
            }
            Command::TouchDown | Command::TouchUp => {
                let pressed = command == Command::TouchDown;
                self.button_down = pressed;
                vec![InputEvent::ButtonUpdate { pressed }]
            }
            Command::SelectSlot(index) => {
                if index < 0 || index as usize >= MAX_CONTACTS {
                    return Err(Diagnostic::SlotIndexOutOfRange {
                        index,
                        max: MAX_CONTACTS,
                    });
                }
                self.selected_slot = index as usize;
                vec![]
            }
            Command::SetSlotActive(active) => {
                self.selected_mut().active = active;
                vec![InputEvent::SlotStateUpdate {
                    slot,
                    active,
                    tool: ToolType::Finger,
                }]
            }
            Command::PointerEmulate => self.emulate_pointer(),
            Command::SetSlotX(x) => {
                self.selected_mut().position_x = x;
                vec![InputEvent::SlotAxisUpdate {
                    slot,
                    axis: ecodes::ABS_MT_POSITION_X,
                    value: x,
                }]
            }
            Command::SetSlotY(y) => {
                self.selected_mut().position_y = y;
                vec![InputEvent::SlotAxisUpdate {
                    slot,
                    axis: ecodes::ABS_MT_POSITION_Y,
                    value: y,
                }]
            }
            Command::Sync => vec![InputEvent::FrameBoundary {
                kind: FrameKind::Full,
            }],
            Command::MultiTouchSync => vec![InputEvent::FrameBoundary {
                kind: FrameKind::LegacyMulti,
            }],
            Command::SetTrackingId(value) => {
                // any negative id releases the contact, as ABS_MT_TRACKING_ID -1 does
                let id = if value < 0 { None } else { Some(value) };
                self.selected_mut().tracking_id = id;
                vec![InputEvent::TrackingUpdate { slot, id }]
            }
            Command::RawAxis(axis, value) => vec![InputEvent::AxisUpdate {
                axis: axis.code(),
                value,
            }],
            Command::Unknown(command, value) => {
                return Err(Diagnostic::UnknownCommand {
                    command: char::from(command),
                    value,
                });
            }
        };

        debug!("{:?} -> {} event(s)", command, events.len());
        Ok(events)
    }

    fn emulate_pointer(&self) -> Vec<InputEvent> {
        match self.pointer_slot() {
            Some((_, s)) => vec![
                InputEvent::ButtonUpdate { pressed: true },
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_X,
                    value: s.position_x,
                },
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_Y,
                    value: s.position_y,
                },
            ],
            None => vec![InputEvent::ButtonUpdate { pressed: false }],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::command::MtAxis;

    fn apply_all(state: &mut DeviceState, commands: &[Command]) -> Vec<InputEvent> {
        let mut out = Vec::new();
        for c in commands {
            out.extend(state.apply(*c).unwrap());
        }
        out
    }

    #[test]
    fn test_legacy_axes_are_reported_eagerly() {
        let mut state = DeviceState::new();
        let events = apply_all(&mut state, &[Command::MoveX(512), Command::MoveY(40)]);
        assert_eq!(
            events,
            vec![
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_X,
                    value: 512
                },
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_Y,
                    value: 40
                },
            ]
        );

        let mut expected = DeviceState::new();
        expected.touch_axis_x = 512;
        expected.touch_axis_y = 40;
        assert_eq!(state, expected);
    }

    #[test]
    fn test_move_to_sets_both_axes() {
        let mut state = DeviceState::new();
        let events = state.apply(Command::MoveTo { x: 1, y: 2 }).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!((state.touch_axis_x, state.touch_axis_y), (1, 2));
    }

    #[test]
    fn test_touch_down_up() {
        let mut state = DeviceState::new();
        assert_eq!(
            state.apply(Command::TouchDown).unwrap(),
            vec![InputEvent::ButtonUpdate { pressed: true }]
        );
        assert!(state.button_down);
        assert_eq!(
            state.apply(Command::TouchUp).unwrap(),
            vec![InputEvent::ButtonUpdate { pressed: false }]
        );
        assert_eq!(state, DeviceState::new());
    }

    #[test]
    fn test_state_isolation() {
        // every command only touches the fields it is documented to touch
        let cases: [(Command, fn(&mut DeviceState)); 16] = [
            (Command::MoveX(3), |s: &mut DeviceState| s.touch_axis_x = 3),
            (Command::MoveY(4), |s: &mut DeviceState| s.touch_axis_y = 4),
            (Command::MoveTo { x: 6, y: 7 }, |s: &mut DeviceState| {
                s.touch_axis_x = 6;
                s.touch_axis_y = 7;
            }),
            (Command::TouchDown, |s: &mut DeviceState| s.button_down = true),
            (Command::TouchUp, |s: &mut DeviceState| s.button_down = false),
            (Command::SelectSlot(5), |s: &mut DeviceState| s.selected_slot = 5),
            (Command::SetSlotActive(true), |s: &mut DeviceState| {
                s.slots[s.selected_slot].active = true
            }),
            (Command::SetSlotActive(false), |s: &mut DeviceState| {
                s.slots[s.selected_slot].active = false
            }),
            (Command::SetSlotX(8), |s: &mut DeviceState| {
                s.slots[s.selected_slot].position_x = 8
            }),
            (Command::SetSlotY(9), |s: &mut DeviceState| {
                s.slots[s.selected_slot].position_y = 9
            }),
            (Command::SetTrackingId(11), |s: &mut DeviceState| {
                s.slots[s.selected_slot].tracking_id = Some(11)
            }),
            (Command::SetTrackingId(-1), |s: &mut DeviceState| {
                s.slots[s.selected_slot].tracking_id = None
            }),
            (Command::Sync, |_: &mut DeviceState| {}),
            (Command::MultiTouchSync, |_: &mut DeviceState| {}),
            (Command::PointerEmulate, |_: &mut DeviceState| {}),
            (
                Command::RawAxis(MtAxis::new(ecodes::ABS_MT_PRESSURE).unwrap(), 30),
                |_: &mut DeviceState| {},
            ),
        ];

        // a fresh device, and one with a contact down in a non-zero slot
        let mut busy = DeviceState::new();
        busy.selected_slot = 3;
        busy.button_down = true;
        busy.slots[3] = Slot {
            position_x: 100,
            position_y: 200,
            tracking_id: Some(4),
            active: true,
        };
        let bases = [DeviceState::new(), busy];

        for base in bases.iter() {
            for &(command, mutate) in cases.iter() {
                let mut state = base.clone();
                let mut expected = base.clone();
                state.apply(command).unwrap();
                mutate(&mut expected);
                assert_eq!(state, expected, "{:?} from {:?}", command, base);
            }
        }
    }

    #[test]
    fn test_double_sync() {
        let mut state = DeviceState::new();
        state.apply(Command::SetSlotX(10)).unwrap();
        let before = state.clone();
        let events = apply_all(&mut state, &[Command::Sync, Command::Sync]);
        assert_eq!(
            events,
            vec![
                InputEvent::FrameBoundary {
                    kind: FrameKind::Full
                };
                2
            ]
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_reselecting_keeps_position() {
        let mut state = DeviceState::new();
        apply_all(
            &mut state,
            &[
                Command::SelectSlot(3),
                Command::SetSlotX(100),
                Command::SelectSlot(3),
            ],
        );
        assert_eq!(state.slots[3].position_x, 100);
        assert_eq!(state.selected().position_x, 100);
    }

    #[test]
    fn test_select_slot_out_of_range() {
        let mut state = DeviceState::new();
        state.apply(Command::SelectSlot(4)).unwrap();
        assert_eq!(
            state.apply(Command::SelectSlot(10)),
            Err(Diagnostic::SlotIndexOutOfRange { index: 10, max: 10 })
        );
        assert_eq!(
            state.apply(Command::SelectSlot(-1)),
            Err(Diagnostic::SlotIndexOutOfRange { index: -1, max: 10 })
        );
        assert_eq!(state.selected_slot, 4);
    }

    #[test]
    fn test_slot_events_carry_selected_slot() {
        let mut state = DeviceState::new();
        let events = apply_all(
            &mut state,
            &[
                Command::SelectSlot(2),
                Command::SetSlotActive(true),
                Command::SetSlotX(300),
                Command::SetTrackingId(7),
            ],
        );
        assert_eq!(
            events,
            vec![
                InputEvent::SlotStateUpdate {
                    slot: 2,
                    active: true,
                    tool: ToolType::Finger
                },
                InputEvent::SlotAxisUpdate {
                    slot: 2,
                    axis: ecodes::ABS_MT_POSITION_X,
                    value: 300
                },
                InputEvent::TrackingUpdate {
                    slot: 2,
                    id: Some(7)
                },
            ]
        );
    }

    #[test]
    fn test_negative_tracking_id_releases() {
        let mut state = DeviceState::new();
        state.apply(Command::SetTrackingId(5)).unwrap();
        assert_eq!(
            state.apply(Command::SetTrackingId(-1)).unwrap(),
            vec![InputEvent::TrackingUpdate { slot: 0, id: None }]
        );
        assert_eq!(state.slots[0].tracking_id, None);
    }

    #[test]
    fn test_deactivating_keeps_stale_position() {
        let mut state = DeviceState::new();
        apply_all(
            &mut state,
            &[
                Command::SetSlotX(1),
                Command::SetSlotActive(true),
                Command::SetSlotActive(false),
            ],
        );
        assert!(!state.slots[0].active);
        assert_eq!(state.slots[0].position_x, 1);
    }

    #[test]
    fn test_pointer_emulation_uses_lowest_active_slot() {
        let mut state = DeviceState::new();
        apply_all(
            &mut state,
            &[
                Command::SelectSlot(1),
                Command::SetSlotX(50),
                Command::SetSlotY(60),
                Command::SetSlotActive(true),
                Command::SelectSlot(4),
                Command::SetSlotX(7),
                Command::SetSlotActive(true),
            ],
        );
        assert_eq!(
            state.apply(Command::PointerEmulate).unwrap(),
            vec![
                InputEvent::ButtonUpdate { pressed: true },
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_X,
                    value: 50
                },
                InputEvent::AxisUpdate {
                    axis: ecodes::ABS_Y,
                    value: 60
                },
            ]
        );
        assert_eq!(state.touch_axis_x, 0);
        assert!(!state.button_down);
    }

    #[test]
    fn test_pointer_emulation_without_contacts() {
        let mut state = DeviceState::new();
        assert_eq!(
            state.apply(Command::PointerEmulate).unwrap(),
            vec![InputEvent::ButtonUpdate { pressed: false }]
        );
    }

    #[test]
    fn test_raw_axis_passes_through() {
        let mut state = DeviceState::new();
        let axis = MtAxis::new(ecodes::ABS_MT_TOUCH_MAJOR).unwrap();
        assert_eq!(
            state.apply(Command::RawAxis(axis, -3)).unwrap(),
            vec![InputEvent::AxisUpdate {
                axis: ecodes::ABS_MT_TOUCH_MAJOR,
                value: -3
            }]
        );
    }

    #[test]
    fn test_unknown_command() {
        let mut state = DeviceState::new();
        assert_eq!(
            state.apply(Command::Unknown(b'z', 1)),
            Err(Diagnostic::UnknownCommand {
                command: 'z',
                value: 1
            })
        );
        assert_eq!(state, DeviceState::new());
    }
}
