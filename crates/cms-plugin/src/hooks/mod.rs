//! Hook system: typed hook points, the handler registry and dispatchers.

pub mod definitions;
pub mod dispatcher;
pub mod registry;
pub mod remote;

pub use definitions::{DispatchOutcome, HandlerFailure, HandlerReport, HookAction, HookPoint};
pub use dispatcher::{Dispatcher, LocalDispatcher};
pub use registry::{HookEntry, HookHandler, HookRegistration, HookRegistry};
pub use remote::RemoteDispatcher;
