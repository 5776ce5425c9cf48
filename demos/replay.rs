//! Feeds stdin to a virtual touchscreen, 64 bytes at a time like `write(2)` would.
//!
//! ```sh
//! printf 's 0\na 1\nT 1\nX 100\nY 200\nS 0\n' | cargo run --example replay
//! cargo run --example replay -- --uinput --profile narrow < gesture.txt
//! ```

use std::io::Read;

use virtual_touchscreen::input::ev::UinputSink;
use virtual_touchscreen::input::{lines, LogSink};
use virtual_touchscreen::{DeviceProfile, EventSink, VirtualTouchscreen};

fn main() {
    env_logger::init();

    let mut use_uinput = false;
    let mut profile = DeviceProfile::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--uinput" => use_uinput = true,
            "--profile" => {
                let name = args.next().unwrap_or_default();
                profile = DeviceProfile::named(&name)
                    .or_else(|_| DeviceProfile::load(&name))
                    .unwrap_or_else(|e| panic!("Failed to load profile {:?}: {}", name, e));
            }
            other => panic!("Unknown argument {:?}", other),
        }
    }

    let sink: Box<dyn EventSink> = if use_uinput {
        Box::new(
            UinputSink::new(&profile)
                .unwrap_or_else(|e| panic!("Failed to create uinput device: {}", e)),
        )
    } else {
        Box::new(LogSink)
    };

    let touchscreen = VirtualTouchscreen::new(sink);
    let mut session = touchscreen.open().expect("fresh device cannot be busy");

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .unwrap_or_else(|e| panic!("Failed to read stdin: {}", e));

    // Retry what was not consumed, the way a client looping on write(2) does
    let mut pending = &input[..];
    while !pending.is_empty() {
        let chunk = &pending[..pending.len().min(lines::WRITE_CAP)];
        let report = session.write(chunk);
        for d in &report.diagnostics {
            eprintln!("{}", d);
        }
        pending = &pending[report.consumed..];
    }

    drop(session);
    eprintln!("{:#?}", touchscreen.state());
}
