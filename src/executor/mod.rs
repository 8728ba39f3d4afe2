mod executor;
mod launcher;
mod path_resolver;
mod redirect;
mod signals;
pub mod builtin;


pub use builtin::{BuiltinError, BuiltinManager, BuiltinOutcome};
pub use executor::{ExecError, ExecOutcome, ExecStatus, Executor};
pub use launcher::{ProcessLauncher, EXEC_FAILED};
pub use path_resolver::PathResolver;
pub use redirect::StdoutRedirect;
pub use signals::{ChildSignals, SignalGuard};
