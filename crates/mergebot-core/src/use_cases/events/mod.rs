pub(crate) mod dispatch_event;

pub use dispatch_event::{DispatchEventInterface, DispatchReport, EventType};
#[cfg(any(test, feature = "testkit"))]
pub use dispatch_event::MockDispatchEventInterface;
