pub mod cooldown;
pub mod parser;
pub mod pipeline;
pub mod threshold;

pub use cooldown::CooldownFilter;
pub use parser::{decode_line, parse_sample};
pub use pipeline::TriggerPipeline;
pub use threshold::ThresholdGate;
