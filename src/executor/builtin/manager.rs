use std::collections::HashMap;

use crate::environment::Environment;
use crate::executor::builtin::commands::{CdCommand, ExitCommand, PathCommand};
use crate::executor::builtin::BuiltinStatus;

/// A command the shell interprets itself instead of forking.
pub trait BuiltinCommand: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, args: &[String], env: &mut Environment) -> BuiltinStatus;
}

pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(ExitCommand));
        mgr.register(Box::new(CdCommand));
        mgr.register(Box::new(PathCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Exact-name match; `exitfoo` is not `exit`.
    pub fn lookup(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}
