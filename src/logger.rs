use core::fmt::{self, Display, Formatter, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::{RwLock, RwLockReadGuard};

use crate::sys::jiffies;

/// Ring buffer holding the most recent log lines
#[derive(Default)]
pub struct LogBuffer {
    buffer: Option<&'static mut [u8]>,
    index: usize,
}

impl LogBuffer {
    const fn empty() -> Self {
        Self { buffer: None, index: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Bytes written since init, including overwritten ones
    pub fn written(&self) -> usize {
        self.index
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let buffer = match self.buffer.as_mut() {
            Some(buffer) if buffer.len() > 0 => buffer,
            _ => return Ok(()),
        };
        let size = buffer.len();
        for &byte in s.as_bytes() {
            // Non-ascii bytes would break utf8 at the wrap point
            buffer[self.index % size] = if byte.is_ascii() { byte } else { b'?' };
            self.index += 1;
        }
        Ok(())
    }
}

impl Display for LogBuffer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let buffer = match self.buffer.as_ref() {
            Some(buffer) => buffer,
            None => return Ok(()),
        };
        if self.index <= buffer.len() {
            return f.write_str(to_str(&buffer[..self.index])?);
        }
        let index = self.index % buffer.len();
        f.write_str(to_str(&buffer[index..])?)?;
        f.write_str(to_str(&buffer[..index])?)
    }
}

fn to_str(bytes: &[u8]) -> Result<&str, fmt::Error> {
    core::str::from_utf8(bytes).map_err(|_| fmt::Error)
}

static LOG_BUFFER: RwLock<LogBuffer> = RwLock::new(LogBuffer::empty());

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let millis = jiffies::get().as_millis() as u32;
        let mut buffer = LOG_BUFFER.write();
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        writeln!(buffer, "[{:5}.{:03}] {} {}", millis / 1000, millis % 1000, level, record.args())
            .ok();
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn get() -> RwLockReadGuard<'static, LogBuffer> {
    LOG_BUFFER.read()
}

pub fn init(buffer: &'static mut [u8], level: LevelFilter) {
    *LOG_BUFFER.write() = LogBuffer { buffer: Some(buffer), index: 0 };
    log::set_max_level(level);
    log::set_logger(&LOGGER).ok();
}

mod test {
    #[test]
    fn test_ring_buffer_wrap() {
        use core::fmt::Write;
        use std::string::ToString;

        use super::LogBuffer;

        let storage = std::boxed::Box::leak(std::boxed::Box::new([0u8; 8]));
        let mut buffer = LogBuffer { buffer: Some(storage), index: 0 };
        write!(buffer, "abcdef").unwrap();
        assert_eq!(buffer.to_string(), "abcdef");
        write!(buffer, "ghij").unwrap();
        assert_eq!(buffer.to_string(), "cdefghij");
        assert_eq!(buffer.written(), 10);
        write!(buffer, "é").unwrap();
        assert_eq!(buffer.to_string(), "efghij??");
    }

    #[test]
    fn test_empty_buffer() {
        use core::fmt::Write;
        use std::string::ToString;

        use super::LogBuffer;

        let mut buffer = LogBuffer::default();
        write!(buffer, "dropped").unwrap();
        assert_eq!(buffer.to_string(), "");
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    #[serial_test::serial]
    fn test_logger() {
        use std::string::ToString;

        use log::LevelFilter;

        let storage = std::boxed::Box::leak(std::boxed::Box::new([0u8; 256]));
        super::init(storage, LevelFilter::Info);
        info!("horizon ready");
        debug!("filtered");
        let logs = (*super::get()).to_string();
        assert!(logs.contains("[    1.000] INFO horizon ready\n"));
        assert!(!logs.contains("filtered"));
        log::set_max_level(LevelFilter::Off);
    }
}
