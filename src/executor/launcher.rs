use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::RawFd;
use std::os::raw::c_char;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use tracing::debug;

use crate::ast::CommandGroup;
use crate::environment::Environment;
use crate::executor::path_resolver::PathResolver;
use crate::executor::redirect::StdoutRedirect;
use crate::executor::signals::{ChildSignals, SignalGuard};
use crate::executor::{ExecError, ExecOutcome, ExecStatus, Executor};

/// Exit status of a child whose exec failed.
pub const EXEC_FAILED: i32 = 127;

/// Fork/exec/wait for one external command group.
pub struct ProcessLauncher {
    resolver: PathResolver,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        ProcessLauncher {
            resolver: PathResolver,
        }
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ProcessLauncher {
    fn exec(&self, group: &CommandGroup, env: &Environment) -> ExecStatus {
        let program = group.program();
        let path = self
            .resolver
            .resolve(program, env.search_path())
            .ok_or_else(|| ExecError::CommandNotFound(program.to_string()))?;
        let image = ExecImage::new(&path, group.argv())?;
        let redirect = group.redirect().map(StdoutRedirect::open).transpose()?;

        // Anything still buffered would otherwise be written twice.
        let _ = io::stdout().flush();

        let guard = SignalGuard::engage().map_err(ExecError::Signal)?;
        // SAFETY: the child branch only resets signals, dup2s and execs.
        let child = match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => child,
            Ok(ForkResult::Child) => exec_child(
                &image,
                guard.child_signals(),
                redirect.as_ref().map(StdoutRedirect::raw_fd),
            ),
            Err(errno) => return Err(ExecError::Fork(errno)),
        };
        debug!(pid = %child, program, path = %path.display(), "forked");

        let status = wait_for(child);
        drop(guard);
        drop(redirect);
        status
    }
}

/// Everything the child needs, allocated before fork.
struct ExecImage {
    path: CString,
    // Owns the strings `argv_ptrs` points into.
    _argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
    exec_failed: Vec<u8>,
    redirect_failed: Vec<u8>,
}

impl ExecImage {
    fn new(path: &Path, argv: &[String]) -> Result<Self, ExecError> {
        let to_cstring = |s: &str| {
            CString::new(s).map_err(|_| {
                ExecError::InvalidArgument(format!("'{}' contains a NUL byte", s.escape_debug()))
            })
        };
        let path_str = path.to_string_lossy();
        let program = argv.first().map(String::as_str).unwrap_or_default();
        let argv: Vec<CString> = argv
            .iter()
            .map(|arg| to_cstring(arg.as_str()))
            .collect::<Result<_, _>>()?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Ok(ExecImage {
            path: to_cstring(path_str.as_ref())?,
            _argv: argv,
            argv_ptrs,
            exec_failed: format!("ansh: Unknown command: {program}\n").into_bytes(),
            redirect_failed: format!("ansh: {program}: cannot redirect output\n").into_bytes(),
        })
    }
}

fn exec_child(image: &ExecImage, signals: ChildSignals, stdout_fd: Option<RawFd>) -> ! {
    signals.apply();
    if let Some(fd) = stdout_fd {
        if StdoutRedirect::apply_in_child(fd).is_err() {
            write_stderr(&image.redirect_failed);
            // SAFETY: leaves without running the parent's exit handlers.
            unsafe { libc::_exit(1) }
        }
    }
    // SAFETY: both pointers come from live CStrings and the array ends in NULL.
    unsafe {
        libc::execv(image.path.as_ptr(), image.argv_ptrs.as_ptr());
    }
    write_stderr(&image.exec_failed);
    // SAFETY: as above.
    unsafe { libc::_exit(EXEC_FAILED) }
}

fn write_stderr(msg: &[u8]) {
    // SAFETY: plain write(2) of a live buffer.
    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
    }
}

/// Block until `child` terminates. EINTR is retried.
fn wait_for(child: Pid) -> ExecStatus {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!(pid = %child, code, "child reaped");
                return Ok(ExecOutcome::Exited(code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                debug!(pid = %child, ?signal, "child killed by signal");
                return Ok(ExecOutcome::Signaled(signal as i32));
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ExecError::Wait {
                    pid: child.as_raw(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Redirect;
    use crate::environment::SearchPath;
    use crate::executor::signals::SIGNAL_TEST_LOCK;
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::MutexGuard;
    use tempfile::tempdir;

    fn serial() -> MutexGuard<'static, ()> {
        SIGNAL_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn group(words: &[&str], redirect: Option<Redirect>) -> CommandGroup {
        CommandGroup::new(words.iter().map(|s| s.to_string()).collect(), redirect).unwrap()
    }

    fn run(words: &[&str]) -> ExecStatus {
        ProcessLauncher::new().exec(&group(words, None), &Environment::new())
    }

    #[test]
    fn test_exit_codes() {
        let _serial = serial();
        assert!(matches!(run(&["true"]), Ok(ExecOutcome::Exited(0))));
        assert!(matches!(run(&["false"]), Ok(ExecOutcome::Exited(1))));
        assert!(matches!(run(&["sh", "-c", "exit 7"]), Ok(ExecOutcome::Exited(7))));
    }

    #[test]
    fn test_killed_child_is_not_an_error() {
        let _serial = serial();
        let status = run(&["sh", "-c", "kill -TERM $$"]);
        assert!(matches!(status, Ok(ExecOutcome::Signaled(15))));
    }

    fn with_interrupt<T>(handler: SigHandler, f: impl FnOnce() -> T) -> T {
        let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        let previous = unsafe { sigaction(Signal::SIGINT, &action) }.unwrap();
        let result = f();
        unsafe { sigaction(Signal::SIGINT, &previous) }.unwrap();
        result
    }

    #[test]
    fn test_child_interrupt_is_default() {
        let _serial = serial();
        let status = with_interrupt(SigHandler::SigDfl, || run(&["sh", "-c", "kill -INT $$"]));
        assert!(matches!(status, Ok(ExecOutcome::Signaled(2))));
    }

    #[test]
    fn test_inherited_ignored_interrupt_stays_ignored() {
        let _serial = serial();
        let status = with_interrupt(SigHandler::SigIgn, || run(&["sh", "-c", "kill -INT $$"]));
        assert!(matches!(status, Ok(ExecOutcome::Exited(0))));
    }

    #[test]
    fn test_not_found_does_not_fork() {
        let _serial = serial();
        let err = run(&["no-such-program-anywhere"]).unwrap_err();
        assert!(matches!(
            err,
            ExecError::CommandNotFound(ref name) if name == "no-such-program-anywhere"
        ));
    }

    #[test]
    fn test_empty_search_path_finds_nothing() {
        let _serial = serial();
        let env = Environment::with_search_path(SearchPath::new(Vec::<String>::new()));
        let err = ProcessLauncher::new().exec(&group(&["true"], None), &env).unwrap_err();
        assert!(matches!(err, ExecError::CommandNotFound(_)));
    }

    #[test]
    fn test_redirects_child_stdout_only() {
        let _serial = serial();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let status = ProcessLauncher::new().exec(
            &group(&["echo", "hello", "world"], Some(Redirect::new(&out))),
            &Environment::new(),
        );
        assert!(matches!(status, Ok(ExecOutcome::Exited(0))));
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");

        let next = dir.path().join("next.txt");
        ProcessLauncher::new()
            .exec(&group(&["echo", "second"], Some(Redirect::new(&next))), &Environment::new())
            .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
        assert_eq!(fs::read_to_string(&next).unwrap(), "second\n");
    }

    #[test]
    fn test_quoted_argument_reaches_child_intact() {
        let _serial = serial();
        let dir = tempdir().unwrap();
        let out = dir.path().join("args.txt");
        let parsed = crate::parser::parse_group(&format!(
            r#"printf %s "two  spaced" > {}"#,
            out.display()
        ))
        .unwrap();
        ProcessLauncher::new().exec(&parsed, &Environment::new()).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "two  spaced");
    }

    #[test]
    fn test_exec_failure_exits_127() {
        let _serial = serial();
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus");
        fs::write(&bogus, [0x7f, b'E', b'L', b'F', 0, 0, 0, 0]).unwrap();
        fs::set_permissions(&bogus, fs::Permissions::from_mode(0o755)).unwrap();

        let env = Environment::with_search_path(SearchPath::new([dir.path()]));
        let status = ProcessLauncher::new().exec(&group(&["bogus"], None), &env);
        assert!(matches!(status, Ok(ExecOutcome::Exited(EXEC_FAILED))));
    }

    #[test]
    fn test_unopenable_redirect_is_reported() {
        let _serial = serial();
        let dir = tempdir().unwrap();
        let out = dir.path().join("nope").join("out.txt");
        let err = ProcessLauncher::new()
            .exec(&group(&["true"], Some(Redirect::new(&out))), &Environment::new())
            .unwrap_err();
        assert!(matches!(err, ExecError::Redirect { .. }));
    }

    #[test]
    fn test_nul_byte_argument_is_rejected() {
        let _serial = serial();
        let err = run(&["echo", "a\0b"]).unwrap_err();
        assert!(matches!(err, ExecError::InvalidArgument(_)));
    }
}
