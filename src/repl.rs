use std::error::Error;
use std::thread;

use tracing::{debug, info};

use crate::ast::CommandGroup;
use crate::environment::Environment;
use crate::error::{ShellError, ShellResult};
use crate::executor::{BuiltinManager, BuiltinOutcome, ExecError, ExecStatus, Executor};
use crate::io::{InputError, InputSource};
use crate::lexer::split_groups;
use crate::parser::parse_group;
use crate::prompt::ShellPrompt;

/// What the loop does after a line has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit(i32),
}

pub struct Shell<E: Executor> {
    env: Environment,
    builtins: BuiltinManager,
    executor: E,
    prompt: Option<ShellPrompt>,
}

impl<E: Executor> Shell<E> {
    pub fn new(env: Environment, executor: E) -> Self {
        Shell {
            env,
            builtins: BuiltinManager::new(),
            executor,
            prompt: None,
        }
    }

    /// Prompt shown before each interactive read.
    pub fn with_prompt(mut self, prompt: ShellPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Read and dispatch lines until end of input or `exit`.
    ///
    /// Returns the status the process should exit with.
    pub fn run(&mut self, input: &mut InputSource) -> ShellResult<i32> {
        let interactive = input.is_interactive();
        if interactive {
            if let Some(prompt) = &self.prompt {
                prompt.show_banner();
            }
        }

        loop {
            if interactive {
                if let Some(prompt) = &self.prompt {
                    prompt.show_prompt();
                }
            }

            let line = match input.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    if interactive {
                        println!();
                    }
                    info!("end of input");
                    return Ok(0);
                }
                Err(err @ InputError::LineTooLong { .. }) => {
                    report(&err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if line.trim().is_empty() {
                continue;
            }
            debug!(%line, "read line");

            if let LineOutcome::Exit(code) = self.dispatch_line(&line)? {
                info!(code, "exit requested");
                return Ok(code);
            }
        }
    }

    /// Run every group of one line and return once all of them are done.
    ///
    /// Consecutive external groups share a batch of concurrent lanes. A
    /// builtin waits for the batch before it, then runs alone on this thread.
    pub fn dispatch_line(&mut self, line: &str) -> ShellResult<LineOutcome> {
        let mut batch: Vec<CommandGroup> = Vec::new();

        for raw in split_groups(line) {
            let group = match parse_group(raw) {
                Ok(group) => group,
                Err(err) => {
                    report(&err);
                    continue;
                }
            };

            let Some(builtin) = self.builtins.lookup(group.program()) else {
                batch.push(group);
                continue;
            };

            self.run_batch(std::mem::take(&mut batch))?;
            if group.redirect().is_some() {
                debug!(builtin = group.program(), "redirection ignored for builtin");
            }
            match builtin.run(group.args(), &mut self.env) {
                Ok(BuiltinOutcome::Continue) => {}
                Ok(BuiltinOutcome::Exit(code)) => return Ok(LineOutcome::Exit(code)),
                Err(err) => report(&err),
            }
        }

        self.run_batch(batch)?;
        Ok(LineOutcome::Continue)
    }

    /// One scoped thread per group, joined before returning.
    fn run_batch(&self, groups: Vec<CommandGroup>) -> ShellResult<()> {
        match groups.len() {
            0 => return Ok(()),
            1 => {
                let status = self.executor.exec(&groups[0], &self.env);
                return settle(vec![(groups[0].program(), status)], None);
            }
            n => debug!(lanes = n, "starting lanes"),
        }

        let env = &self.env;
        let executor = &self.executor;

        let (results, spawn_error) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(groups.len());
            let mut spawn_error = None;

            for (lane, group) in groups.iter().enumerate() {
                let spawned = thread::Builder::new()
                    .name(format!("lane-{lane}"))
                    .spawn_scoped(scope, move || executor.exec(group, env));
                match spawned {
                    Ok(handle) => handles.push((group.program(), handle)),
                    Err(err) => {
                        spawn_error = Some(ExecError::Spawn(err));
                        break;
                    }
                }
            }

            let results: Vec<(&str, ExecStatus)> = handles
                .into_iter()
                .map(|(program, handle)| {
                    let status = handle
                        .join()
                        .unwrap_or_else(|_| Err(ExecError::LanePanicked(program.to_string())));
                    (program, status)
                })
                .collect();
            (results, spawn_error)
        });

        settle(results, spawn_error)
    }
}

/// Report per-lane failures; hand back the first fatal one, if any.
fn settle(results: Vec<(&str, ExecStatus)>, mut fatal: Option<ExecError>) -> ShellResult<()> {
    for (program, status) in results {
        match status {
            Ok(outcome) => debug!(program, code = outcome.code(), "lane finished"),
            Err(err) if err.is_fatal() => {
                if fatal.is_none() {
                    fatal = Some(err);
                } else {
                    report(&err);
                }
            }
            Err(err) => report(&err),
        }
    }
    match fatal {
        Some(err) => Err(ShellError::Exec(err)),
        None => Ok(()),
    }
}

/// One line on stderr: the error followed by each of its sources.
fn report(err: &dyn Error) {
    eprintln!("ansh: {}", error_chain(err));
}

fn error_chain(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    use crate::environment::SearchPath;
    use crate::executor::BuiltinError;
    use crate::executor::tests::{MockExecutor, RENDEZVOUS};

    fn shell(mock: MockExecutor) -> Shell<MockExecutor> {
        Shell::new(Environment::new(), mock)
    }

    fn programs(shell: &Shell<MockExecutor>) -> Vec<String> {
        let mut programs: Vec<String> = shell
            .executor()
            .calls()
            .into_iter()
            .map(|argv| argv[0].clone())
            .collect();
        programs.sort();
        programs
    }

    fn script(text: &str) -> InputSource {
        InputSource::from_reader(Cursor::new(text.as_bytes().to_vec()), false, 200)
    }

    #[test]
    fn test_every_group_is_launched() {
        let mut sh = shell(MockExecutor::new());
        let outcome = sh.dispatch_line("ls -l & echo hi   &pwd").unwrap();
        assert_eq!(outcome, LineOutcome::Continue);
        assert_eq!(programs(&sh), vec!["echo", "ls", "pwd"]);
    }

    #[test]
    fn test_groups_run_concurrently() {
        let mut sh = shell(MockExecutor::new().with_rendezvous(3));
        let line = format!("{RENDEZVOUS} & {RENDEZVOUS} & {RENDEZVOUS}");
        sh.dispatch_line(&line).unwrap();
        assert!(sh.executor().all_met());
    }

    #[test]
    fn test_path_builtin_runs_between_batches() {
        let mut sh = shell(MockExecutor::new());
        sh.dispatch_line("ls & path /custom/bin & cat").unwrap();
        assert_eq!(programs(&sh), vec!["cat", "ls"]);
        assert_eq!(
            sh.env().search_path(),
            &SearchPath::new(vec![PathBuf::from("/custom/bin")])
        );
    }

    #[test]
    fn test_path_without_args_clears() {
        let mut sh = shell(MockExecutor::new());
        sh.dispatch_line("path").unwrap();
        assert!(sh.env().search_path().is_empty());
    }

    #[test]
    fn test_failing_group_does_not_cancel_siblings() {
        let mut sh = shell(MockExecutor::new().with_missing("nope").with_code("false", 1));
        let outcome = sh.dispatch_line("nope & false & echo ok").unwrap();
        assert_eq!(outcome, LineOutcome::Continue);
        assert_eq!(programs(&sh), vec!["echo", "false", "nope"]);
    }

    #[test]
    fn test_parse_error_abandons_only_its_group() {
        let mut sh = shell(MockExecutor::new());
        sh.dispatch_line("> out & echo ok & ls > a b").unwrap();
        assert_eq!(programs(&sh), vec!["echo"]);
    }

    #[test]
    fn test_exit_stops_the_line() {
        let mut sh = shell(MockExecutor::new());
        let outcome = sh.dispatch_line("ls & exit & echo never").unwrap();
        assert_eq!(outcome, LineOutcome::Exit(0));
        assert_eq!(programs(&sh), vec!["ls"]);
    }

    #[test]
    fn test_exit_with_arguments_is_reported() {
        let mut sh = shell(MockExecutor::new());
        let outcome = sh.dispatch_line("exit 3").unwrap();
        assert_eq!(outcome, LineOutcome::Continue);
    }

    #[test]
    fn test_builtins_match_exact_names() {
        let mut sh = shell(MockExecutor::new());
        sh.dispatch_line("exitfoo & pathfinder").unwrap();
        assert_eq!(programs(&sh), vec!["exitfoo", "pathfinder"]);
    }

    #[test]
    fn test_fork_failure_is_fatal_after_barrier() {
        let mut sh = shell(MockExecutor::new().with_fork_failure("boom"));
        let err = sh.dispatch_line("boom & echo ok").unwrap_err();
        assert!(matches!(err, ShellError::Exec(ExecError::Fork(_))));
        assert_eq!(programs(&sh), vec!["boom", "echo"]);
    }

    #[test]
    fn test_run_skips_blank_lines_and_stops_at_exit() {
        let mut sh = shell(MockExecutor::new());
        let mut input = script("echo a\n\n   \nexit\necho never\n");
        assert_eq!(sh.run(&mut input).unwrap(), 0);
        assert_eq!(sh.executor().calls(), vec![vec!["echo".to_string(), "a".to_string()]]);
    }

    #[test]
    fn test_run_ends_at_eof() {
        let mut sh = shell(MockExecutor::new());
        let mut input = script("ls\npwd");
        assert_eq!(sh.run(&mut input).unwrap(), 0);
        assert_eq!(programs(&sh), vec!["ls", "pwd"]);
    }

    #[test]
    fn test_run_skips_overlong_lines() {
        let mut sh = shell(MockExecutor::new());
        let long = format!("echo {}\nls\n", "x".repeat(300));
        let mut input = script(&long);
        assert_eq!(sh.run(&mut input).unwrap(), 0);
        assert_eq!(programs(&sh), vec!["ls"]);
    }

    #[test]
    fn test_error_chain_names_each_cause_once() {
        let err = BuiltinError::ChangeDir {
            dir: PathBuf::from("nowhere"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(error_chain(&err), "cd: nowhere: entity not found");

        let err = ExecError::Fork(nix::errno::Errno::EAGAIN);
        assert_eq!(error_chain(&err), format!("fork failed: {}", nix::errno::Errno::EAGAIN));
    }

    #[test]
    fn test_run_propagates_fatal_errors() {
        let mut sh = shell(MockExecutor::new().with_fork_failure("boom"));
        let mut input = script("boom\necho never\n");
        assert!(sh.run(&mut input).is_err());
        assert_eq!(programs(&sh), vec!["boom"]);
    }
}
