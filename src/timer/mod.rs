mod state;
mod ticker;

pub use state::{FinishKind, Timer, TimerError, TimerEvent, TimerStatus};
pub use ticker::{spawn_ticker, SharedTimer, TimerSignal};
