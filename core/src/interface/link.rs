use crate::prelude::LinkError;
use log::{info, warn};

/// Result of one bounded read on the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// One line without its terminator. A read that timed out part-way
    /// through a line yields the partial bytes.
    Line(Vec<u8>),
    /// The read timed out before any byte arrived.
    Idle,
    /// The device reported end of stream.
    Eof,
}

/// An open, line-oriented connection to the sensor.
pub trait SerialLink {
    /// Non-blocking check for unread input.
    fn data_waiting(&mut self) -> Result<bool, LinkError>;

    /// Blocks for at most the configured read timeout.
    fn read_line(&mut self) -> Result<LineRead, LinkError>;

    fn close(&mut self) -> Result<(), LinkError>;

    fn describe(&self) -> String;
}

/// Opens a [`SerialLink`]. Nothing needs releasing when `open` fails.
pub trait LinkConnector {
    type Link: SerialLink;

    fn open(&mut self) -> Result<Self::Link, LinkError>;
}

/// Owns an acquired link and closes it exactly once, either through
/// [`LinkGuard::release`] or on drop.
pub struct LinkGuard<L: SerialLink> {
    link: L,
    closed: bool,
}

impl<L: SerialLink> LinkGuard<L> {
    pub fn new(link: L) -> Self {
        info!("Connected to {}.", link.describe());
        Self {
            link,
            closed: false,
        }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn release(mut self) {
        self.close_link();
    }

    fn close_link(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.link.close() {
            Ok(()) => info!("Serial connection closed."),
            Err(err) => warn!("Closing {} failed: {}", self.link.describe(), err),
        }
    }
}

impl<L: SerialLink> Drop for LinkGuard<L> {
    fn drop(&mut self) {
        self.close_link();
    }
}
