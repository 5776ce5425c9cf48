use crate::error::Diagnostic;
use crate::input::command::Command;
use crate::input::lines;
use crate::input::{DeviceState, EventSink};

/// Outcome of one write.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WriteReport {
    /// Bytes to report as written back to the client
    pub consumed: usize,
    /// Commands that were applied
    pub applied: usize,
    /// Everything that went wrong, in input order. Never fatal.
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives the line splitter, the parser and the state machine, and hands the
/// produced events to `S`.
pub struct Interpreter<S: EventSink> {
    state: DeviceState,
    sink: S,
}

impl<S: EventSink> Interpreter<S> {
    pub fn new(sink: S) -> Interpreter<S> {
        Interpreter {
            state: DeviceState::new(),
            sink,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Processes one written buffer to completion.
    ///
    /// Records are independent: a bad record is reported and skipped, records
    /// before and after it are still applied.
    pub fn write(&mut self, buf: &[u8]) -> WriteReport {
        let split = lines::split(buf);
        let mut report = WriteReport {
            consumed: split.consumed,
            ..WriteReport::default()
        };

        if let Some(d) = split.truncated {
            warn!("{}", d);
            report.diagnostics.push(d);
        }

        for record in split.records {
            match self.execute(record) {
                Ok(()) => report.applied += 1,
                Err(d) => {
                    warn!("{}", d);
                    report.diagnostics.push(d);
                }
            }
        }
        report
    }

    /// Parses and applies a single record
    pub fn execute(&mut self, record: &[u8]) -> Result<(), Diagnostic> {
        let command = Command::parse(record)?;
        for event in self.state.apply(command)? {
            trace!("emit {:?}", event);
            self.sink.submit(&event);
        }
        Ok(())
    }
}
