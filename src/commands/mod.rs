pub mod timeout;
pub mod executor;
pub mod dispatcher;
pub mod status_query;

pub use timeout::{TimeoutPhase, TimeoutStrategy, TimeoutTracker};
pub use executor::{Invocation, ProcessOutput};
pub use dispatcher::{ActionOutcome, CommandDispatcher, DispatchReceipt};
pub use status_query::StatusQuery;
