pub mod action;
pub mod clock;
pub mod link;

pub use action::ActionSink;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use link::{LineRead, LinkConnector, LinkGuard, SerialLink};
