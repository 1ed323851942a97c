//! Trigger signaling over serial/parallel port devices.
//!
//! Playback drivers mark stimulus onsets for external recording hardware by sending short codes.
//! All port state lives in a [`SignalSession`] that the caller opens, passes around and closes;
//! signaling failures never affect rendering.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::foundation::error::{CheckergenError, CheckergenResult};

/// Code sent when a stimulus group starts (`0b0010_1010`).
pub const GROUP_START: u8 = 42;
/// Code sent when a stimulus group stops (`0b0001_0001`).
pub const GROUP_STOP: u8 = 17;
/// Serial line speed used when none is configured.
pub const DEFAULT_BAUD: u32 = 9600;

const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

/// Signal value to put on the ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A stimulus group starts.
    GroupStart,
    /// A stimulus group stops.
    GroupStop,
    /// Nothing pending.
    None,
}

impl Signal {
    /// Wire code, `None` when nothing is pending.
    pub fn code(self) -> Option<u8> {
        match self {
            Signal::GroupStart => Some(GROUP_START),
            Signal::GroupStop => Some(GROUP_STOP),
            Signal::None => None,
        }
    }
}

/// One output port.
pub trait SignalPort: Send {
    /// Put `signal` on the port.
    fn send(&mut self, signal: Signal) -> CheckergenResult<()>;
    /// Release the port. Called at most once.
    fn close(&mut self) -> CheckergenResult<()>;
}

/// Trigger devices to open for a playback run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalPorts {
    /// Serial device path, e.g. `/dev/ttyS0` or `COM1`.
    pub serial: Option<PathBuf>,
    /// Serial line speed in bits per second.
    pub baud: u32,
    /// Parallel port device path, e.g. `/dev/parport0`.
    pub parallel: Option<PathBuf>,
}

impl Default for SignalPorts {
    fn default() -> Self {
        Self {
            serial: None,
            baud: DEFAULT_BAUD,
            parallel: None,
        }
    }
}

/// Serial trigger line. Codes go out as ASCII decimal text, 8N1; [`Signal::None`] writes nothing.
pub struct SerialLine<W = Box<dyn SerialPort>> {
    name: String,
    line: W,
}

impl SerialLine {
    /// Open the serial device at `path` at `baud` bits per second, 8 data bits, no parity, one
    /// stop bit, no flow control.
    pub fn open(path: &Path, baud: u32) -> CheckergenResult<Self> {
        let name = path.to_string_lossy().into_owned();
        tracing::info!(port = %name, baud, "opening serial trigger port");
        let line = serialport::new(name.as_str(), baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(SERIAL_TIMEOUT)
            .open()
            .with_context(|| format!("open serial port '{name}' at {baud} bps"))?;
        Ok(Self { name, line })
    }
}

impl<W: Write + Send> SerialLine<W> {
    /// Serial trigger encoding over an already open byte stream.
    pub fn from_writer(name: impl Into<String>, line: W) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.line
    }
}

impl<W: Write + Send> SignalPort for SerialLine<W> {
    fn send(&mut self, signal: Signal) -> CheckergenResult<()> {
        let Some(code) = signal.code() else {
            return Ok(());
        };
        self.line
            .write_all(code.to_string().as_bytes())
            .and_then(|()| self.line.flush())
            .with_context(|| format!("write to serial port '{}'", self.name))?;
        Ok(())
    }

    fn close(&mut self) -> CheckergenResult<()> {
        Ok(())
    }
}

/// Parallel port backed by a character device such as `/dev/parport0`.
///
/// Codes are written as a raw data byte; [`Signal::None`] and closing clear the data lines.
pub struct ParallelPort {
    path: PathBuf,
    file: File,
}

impl ParallelPort {
    /// Open the device at `path` with all data lines low.
    pub fn open(path: &Path) -> CheckergenResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("open parallel port '{}'", path.display()))?;
        let mut port = Self {
            path: path.to_path_buf(),
            file,
        };
        port.write(0)?;
        Ok(port)
    }

    fn write(&mut self, byte: u8) -> CheckergenResult<()> {
        self.file
            .write_all(&[byte])
            .and_then(|()| self.file.flush())
            .with_context(|| format!("write to parallel port '{}'", self.path.display()))?;
        Ok(())
    }
}

impl SignalPort for ParallelPort {
    fn send(&mut self, signal: Signal) -> CheckergenResult<()> {
        self.write(signal.code().unwrap_or(0))
    }

    fn close(&mut self) -> CheckergenResult<()> {
        self.write(0)
    }
}

/// In-memory port that records what it was sent.
#[derive(Clone, Debug, Default)]
pub struct RecordingPort {
    log: Arc<Mutex<Vec<Option<u8>>>>,
    closed: Arc<Mutex<bool>>,
}

impl RecordingPort {
    /// Create an empty recording port. Clones share the same log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes received so far.
    pub fn sent(&self) -> Vec<Option<u8>> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// `true` once the owning session closed the port.
    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }
}

impl SignalPort for RecordingPort {
    fn send(&mut self, signal: Signal) -> CheckergenResult<()> {
        self.log
            .lock()
            .map_err(|_| CheckergenError::validation("recording port poisoned"))?
            .push(signal.code());
        Ok(())
    }

    fn close(&mut self) -> CheckergenResult<()> {
        *self
            .closed
            .lock()
            .map_err(|_| CheckergenError::validation("recording port poisoned"))? = true;
        Ok(())
    }
}

/// Owns the open ports of one playback run.
#[derive(Default)]
pub struct SignalSession {
    ports: Vec<Box<dyn SignalPort>>,
}

impl SignalSession {
    /// Session without ports; sends are no-ops.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the serial and/or parallel devices named in `ports`.
    pub fn open(ports: &SignalPorts) -> CheckergenResult<Self> {
        let mut session = Self::new();
        if let Some(path) = &ports.serial {
            session.add_port(Box::new(SerialLine::open(path, ports.baud)?));
        }
        if let Some(path) = &ports.parallel {
            session.add_port(Box::new(ParallelPort::open(path)?));
        }
        Ok(session)
    }

    /// Take ownership of another port.
    pub fn add_port(&mut self, port: Box<dyn SignalPort>) {
        self.ports.push(port);
    }

    /// `true` when no port is attached.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Send `signal` on every port. Every port is tried; the first error is returned.
    pub fn send(&mut self, signal: Signal) -> CheckergenResult<()> {
        let mut first_err = None;
        for port in &mut self.ports {
            if let Err(e) = port.send(signal) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Close every port and drop them.
    pub fn close(&mut self) -> CheckergenResult<()> {
        let mut first_err = None;
        for mut port in self.ports.drain(..) {
            if let Err(e) = port.close() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for SignalSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "closing signal ports failed");
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/signal.rs"]
mod tests;
