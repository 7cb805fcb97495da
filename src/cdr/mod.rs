//! CDR synthesis
//!
//! - **Cdr**: the generated record and its self-validation
//! - **DurationPolicy** / **TimestampPolicy** / **ServiceSelection**: how durations, start times and services are drawn
//! - **CdrSynthesizer**: builds one record from a calling party, a technology and a random stream
//! - **IntervalSplitter**: cuts long calls into partial records at interval boundaries

pub mod record;
pub mod sampling;
pub mod split;
pub mod synthesizer;

pub use record::*;
pub use sampling::*;
pub use split::*;
pub use synthesizer::*;
