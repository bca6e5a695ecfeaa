use log::debug;
use serialport::SerialPort;
use std::io::{self, Read};
use std::mem;
use std::thread;
use std::time::{Duration, Instant};
use triggercore::interface::{LineRead, LinkConnector, SerialLink};
use triggercore::prelude::LinkError;

use crate::config::ListenerConfig;

/// Byte source behind a [`PortLink`]: a readable port that can report how
/// many bytes are queued without blocking.
pub trait PortIo: Read {
    fn pending_bytes(&self) -> io::Result<u32>;

    /// Upper bound for the next blocking `read`.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl PortIo for Box<dyn SerialPort> {
    fn pending_bytes(&self) -> io::Result<u32> {
        self.bytes_to_read().map_err(io::Error::from)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Splits a port's byte stream into newline-terminated lines.
pub struct PortLink<P> {
    name: String,
    port: Option<P>,
    pending: Vec<u8>,
    read_timeout: Duration,
}

impl<P: PortIo> PortLink<P> {
    pub fn new(name: String, port: P, read_timeout: Duration) -> Self {
        Self {
            name,
            port: Some(port),
            pending: Vec::new(),
            read_timeout,
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        Some(self.pending.drain(..=end).collect())
    }

    fn take_partial(&mut self) -> LineRead {
        if self.pending.is_empty() {
            LineRead::Idle
        } else {
            LineRead::Line(mem::take(&mut self.pending))
        }
    }
}

impl<P: PortIo> SerialLink for PortLink<P> {
    fn data_waiting(&mut self) -> Result<bool, LinkError> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        let port = self
            .port
            .as_ref()
            .ok_or_else(|| LinkError::Device(format!("{} is closed", self.name)))?;
        Ok(port.pending_bytes()? > 0)
    }

    fn read_line(&mut self) -> Result<LineRead, LinkError> {
        // The timeout covers the whole line, not each read. A timeout too
        // large to place on the clock leaves only the per-read bound.
        let deadline = Instant::now().checked_add(self.read_timeout);
        let mut chunk = [0u8; 256];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(LineRead::Line(line));
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => self.read_timeout,
            };
            if remaining.is_zero() {
                return Ok(self.take_partial());
            }

            let port = self
                .port
                .as_mut()
                .ok_or_else(|| LinkError::Device(format!("{} is closed", self.name)))?;
            port.set_read_timeout(remaining)?;
            match port.read(&mut chunk) {
                Ok(0) if self.pending.is_empty() => return Ok(LineRead::Eof),
                Ok(0) => return Ok(self.take_partial()),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                    return Ok(self.take_partial())
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(LinkError::Read(err)),
            }
        }
    }

    fn close(&mut self) -> Result<(), LinkError> {
        // Dropping the handle closes the device.
        self.port.take();
        self.pending.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Opens the configured serial device.
pub struct SerialConnector {
    port: String,
    baud_rate: u32,
    read_timeout: Duration,
    settle_delay: Duration,
}

impl SerialConnector {
    pub fn from_config(config: &ListenerConfig) -> Self {
        Self {
            port: config.port.clone(),
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout(),
            settle_delay: config.settle_delay(),
        }
    }
}

impl LinkConnector for SerialConnector {
    type Link = PortLink<Box<dyn SerialPort>>;

    fn open(&mut self) -> Result<Self::Link, LinkError> {
        let port = serialport::new(self.port.as_str(), self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(|err| LinkError::Open {
                port: self.port.clone(),
                reason: err.to_string(),
            })?;

        if !self.settle_delay.is_zero() {
            debug!(
                "Waiting {:?} for the device on {} to reset",
                self.settle_delay, self.port
            );
            thread::sleep(self.settle_delay);
        }

        Ok(PortLink::new(
            format!("{} at {} baud", self.port, self.baud_rate),
            port,
            self.read_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Serves queued chunks, each after its delay, then times out like an
    /// idle device. A chunk whose delay exceeds the current read timeout
    /// stays queued with the remaining delay.
    struct FakePort {
        chunks: VecDeque<(Duration, io::Result<Vec<u8>>)>,
        timeout: Duration,
        timeouts: Vec<Duration>,
    }

    impl FakePort {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self::with_delays(chunks.into_iter().map(|c| (Duration::ZERO, c)).collect())
        }

        fn with_delays(chunks: Vec<(Duration, io::Result<Vec<u8>>)>) -> Self {
            Self {
                chunks: chunks.into(),
                timeout: Duration::ZERO,
                timeouts: Vec::new(),
            }
        }
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let timed_out = io::Error::new(io::ErrorKind::TimedOut, "no data");
            let Some((delay, _)) = self.chunks.front_mut() else {
                return Err(timed_out);
            };
            if *delay > self.timeout {
                *delay -= self.timeout;
                thread::sleep(self.timeout);
                return Err(timed_out);
            }
            thread::sleep(*delay);
            match self.chunks.pop_front() {
                Some((_, Ok(bytes))) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some((_, Err(err))) => Err(err),
                None => Err(timed_out),
            }
        }
    }

    impl PortIo for FakePort {
        fn pending_bytes(&self) -> io::Result<u32> {
            Ok(match self.chunks.front() {
                Some((delay, _)) if !delay.is_zero() => 0,
                Some((_, Ok(bytes))) => bytes.len() as u32,
                Some((_, Err(_))) => 1,
                None => 0,
            })
        }

        fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.timeout = timeout;
            self.timeouts.push(timeout);
            Ok(())
        }
    }

    fn link(chunks: Vec<io::Result<Vec<u8>>>) -> PortLink<FakePort> {
        PortLink::new("fake".into(), FakePort::new(chunks), Duration::from_secs(1))
    }

    fn line(text: &str) -> LineRead {
        LineRead::Line(text.as_bytes().to_vec())
    }

    #[test]
    fn splits_chunks_into_lines() {
        let mut link = link(vec![Ok(b"10,5\r\n12,".to_vec()), Ok(b"22\r\n".to_vec())]);

        assert!(link.data_waiting().unwrap());
        assert_eq!(link.read_line().unwrap(), line("10,5\r\n"));
        assert!(link.data_waiting().unwrap());
        assert_eq!(link.read_line().unwrap(), line("12,22\r\n"));
        assert!(!link.data_waiting().unwrap());
    }

    #[test]
    fn timeout_returns_partial_line_or_idle() {
        let mut link = link(vec![Ok(b"12,2".to_vec())]);
        assert_eq!(link.read_line().unwrap(), line("12,2"));
        assert_eq!(link.read_line().unwrap(), LineRead::Idle);
    }

    #[test]
    fn zero_length_read_is_end_of_stream() {
        let mut link = link(vec![Ok(Vec::new())]);
        assert_eq!(link.read_line().unwrap(), LineRead::Eof);
    }

    #[test]
    fn device_errors_are_fatal() {
        let mut link = link(vec![Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "unplugged",
        ))]);
        assert!(matches!(link.read_line(), Err(LinkError::Read(_))));
    }

    #[test]
    fn closed_link_reports_device_error() {
        let mut link = link(vec![Ok(b"1,2\n".to_vec())]);
        link.close().unwrap();
        assert!(matches!(link.data_waiting(), Err(LinkError::Device(_))));
        assert!(matches!(link.read_line(), Err(LinkError::Device(_))));
    }

    #[test]
    fn slow_line_is_cut_off_at_one_timeout() {
        let ms = Duration::from_millis;
        let port = FakePort::with_delays(vec![
            (ms(150), Ok(b"12,".to_vec())),
            (ms(1000), Ok(b"22\n".to_vec())),
        ]);
        let mut link = PortLink::new("slow".into(), port, ms(300));

        let started = Instant::now();
        let read = link.read_line().unwrap();
        let took = started.elapsed();

        assert_eq!(read, line("12,"));
        assert!(took < ms(450), "read_line took {:?} with a 300ms timeout", took);
        let timeouts = &link.port.as_ref().unwrap().timeouts;
        assert_eq!(timeouts.len(), 2);
        assert!(timeouts[1] <= ms(150), "second read allowed {:?}", timeouts[1]);
    }

    #[test]
    fn huge_timeout_does_not_overflow_deadline() {
        let port = FakePort::new(vec![Ok(b"1,2\n".to_vec())]);
        let mut link = PortLink::new("fake".into(), port, Duration::MAX);
        assert_eq!(link.read_line().unwrap(), line("1,2\n"));
    }
}
