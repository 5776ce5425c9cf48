use super::ecodes;
use crate::error::Diagnostic;

/// One of the generic multitouch axis codes `ABS_MT_TOUCH_MAJOR..=ABS_MT_DISTANCE`.
///
/// These are addressed on the wire by the characters `'0'..=';'`, whose byte
/// values happen to be exactly the axis codes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct MtAxis(u16);

impl MtAxis {
    pub fn new(code: u16) -> Option<MtAxis> {
        if code >= ecodes::ABS_MT_TOUCH_MAJOR && code <= ecodes::ABS_MT_DISTANCE {
            Some(MtAxis(code))
        } else {
            None
        }
    }

    pub fn code(self) -> u16 {
        self.0
    }
}

/// A single parsed record.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Command {
    /// `m x y`, the move record of the first protocol version
    MoveTo { x: i32, y: i32 },
    MoveX(i32),
    MoveY(i32),
    TouchDown,
    TouchUp,
    SelectSlot(i32),
    SetSlotActive(bool),
    PointerEmulate,
    SetSlotX(i32),
    SetSlotY(i32),
    Sync,
    MultiTouchSync,
    SetTrackingId(i32),
    RawAxis(MtAxis, i32),
    Unknown(u8, i32),
}

impl Command {
    /// Parses a record (without its newline) the way `sscanf(record, "%c%d")`
    /// would: the very first byte is the command, then optional whitespace and
    /// a signed decimal integer. Anything following the integer is ignored.
    pub fn parse(record: &[u8]) -> Result<Command, Diagnostic> {
        let malformed = || Diagnostic::MalformedRecord {
            record: String::from_utf8_lossy(record).into_owned(),
        };

        let (&c, rest) = record.split_first().ok_or_else(malformed)?;
        let (value, rest) = scan_int(rest).ok_or_else(malformed)?;

        let command = match c {
            b'm' => {
                let (y, _) = scan_int(rest).ok_or_else(malformed)?;
                Command::MoveTo { x: value, y }
            }
            b'x' => Command::MoveX(value),
            b'y' => Command::MoveY(value),
            b'd' => Command::TouchDown,
            b'u' => Command::TouchUp,
            b's' => Command::SelectSlot(value),
            b'a' => Command::SetSlotActive(value != 0),
            b'e' => Command::PointerEmulate,
            b'X' => Command::SetSlotX(value),
            b'Y' => Command::SetSlotY(value),
            b'S' => Command::Sync,
            b'M' => Command::MultiTouchSync,
            b'T' => Command::SetTrackingId(value),
            other => match MtAxis::new(u16::from(other)) {
                Some(axis) => Command::RawAxis(axis, value),
                None => Command::Unknown(other, value),
            },
        };
        Ok(command)
    }
}

/// `%d`: skips leading whitespace, reads an optional sign and at least one digit.
/// Returns the value and the remaining input, `None` on no digits or overflow.
fn scan_int(input: &[u8]) -> Option<(i32, &[u8])> {
    let start = input
        .iter()
        .position(|b| !is_c_space(*b))
        .unwrap_or_else(|| input.len());
    let mut rest = &input[start..];

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    // accumulate negatively so that i32::MIN is representable
    let mut acc: i32 = 0;
    for d in &rest[..digits] {
        acc = acc.checked_mul(10)?.checked_sub(i32::from(*d - b'0'))?;
    }
    let value = if negative { acc } else { acc.checked_neg()? };

    Some((value, &rest[digits..]))
}

// isspace() in the "C" locale
fn is_c_space(b: u8) -> bool {
    b == b' ' || (b'\t'..=b'\r').contains(&b)
}
