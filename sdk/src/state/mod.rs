//! Consumer lifecycle bookkeeping: who needs which capabilities, and how the
//! SDK moves between capability sets.

mod registry;
mod teardown;
mod transition;

pub use registry::{ConsumerEntry, ConsumerRegistry, ConsumerToken, ReleaseFlag};
pub use teardown::{StateHandle, TeardownQueue};
pub use transition::StateStep;
