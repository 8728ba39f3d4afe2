//! Signal state around a child launch.
//!
//! While a launch is in flight the parent blocks SIGCHLD on the launching
//! thread and ignores SIGINT and SIGQUIT process-wide. Dispositions are
//! shared by every lane, so they are reference-counted: the first launch
//! records the prior actions, the last one to finish puts them back.

use std::sync::{Mutex, MutexGuard};

use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use tracing::{debug, warn};

struct SavedActions {
    int: SigAction,
    quit: SigAction,
}

struct Shared {
    active: usize,
    saved: Option<SavedActions>,
}

static SHARED: Mutex<Shared> = Mutex::new(Shared {
    active: 0,
    saved: None,
});

fn shared() -> MutexGuard<'static, Shared> {
    SHARED.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What the child must undo before exec. Computed before fork so the child
/// never touches a lock.
#[derive(Debug, Clone, Copy)]
pub struct ChildSignals {
    reset_int: bool,
    reset_quit: bool,
    mask: SigSet,
}

impl ChildSignals {
    /// Child side only. A disposition the shell itself inherited as ignored
    /// stays ignored; everything else goes back to default.
    pub fn apply(&self) {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        // SAFETY: SIG_DFL installs no handler code.
        unsafe {
            if self.reset_int {
                let _ = sigaction(Signal::SIGINT, &default);
            }
            if self.reset_quit {
                let _ = sigaction(Signal::SIGQUIT, &default);
            }
        }
        let _ = self.mask.thread_set_mask();
    }
}

/// Scoped signal state for one launch; dropping it restores the prior state.
///
/// Engage it only when a fork is about to happen.
pub struct SignalGuard {
    orig_mask: SigSet,
    child: ChildSignals,
}

impl SignalGuard {
    pub fn engage() -> Result<Self, Errno> {
        let mut block = SigSet::empty();
        block.add(Signal::SIGCHLD);
        let orig_mask = block.thread_swap_mask(SigmaskHow::SIG_BLOCK)?;

        let mut state = shared();
        if state.active == 0 {
            match ignore_interactive() {
                Ok(saved) => state.saved = Some(saved),
                Err(err) => {
                    let _ = orig_mask.thread_set_mask();
                    return Err(err);
                }
            }
        }
        state.active += 1;

        let (reset_int, reset_quit) = state
            .saved
            .as_ref()
            .map(|saved| (!is_ignored(&saved.int), !is_ignored(&saved.quit)))
            .unwrap_or((true, true));
        debug!(active = state.active, reset_int, reset_quit, "signal state engaged");

        Ok(SignalGuard {
            orig_mask,
            child: ChildSignals {
                reset_int,
                reset_quit,
                mask: orig_mask,
            },
        })
    }

    pub fn child_signals(&self) -> ChildSignals {
        self.child
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        // Callers may still inspect errno from the wait that preceded this.
        let errno = Errno::last_raw();

        if let Err(err) = self.orig_mask.thread_set_mask() {
            warn!(error = %err, "failed to restore signal mask");
        }

        let mut state = shared();
        state.active = state.active.saturating_sub(1);
        if state.active == 0 {
            if let Some(saved) = state.saved.take() {
                // SAFETY: reinstalls actions that were in place before engage.
                unsafe {
                    let _ = sigaction(Signal::SIGINT, &saved.int);
                    let _ = sigaction(Signal::SIGQUIT, &saved.quit);
                }
                debug!("signal dispositions restored");
            }
        }
        drop(state);

        Errno::set_raw(errno);
    }
}

fn ignore_interactive() -> Result<SavedActions, Errno> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // SAFETY: SIG_IGN installs no handler code.
    let int = unsafe { sigaction(Signal::SIGINT, &ignore) }?;
    let quit = match unsafe { sigaction(Signal::SIGQUIT, &ignore) } {
        Ok(quit) => quit,
        Err(err) => {
            // SAFETY: puts back the action returned just above.
            unsafe {
                let _ = sigaction(Signal::SIGINT, &int);
            }
            return Err(err);
        }
    };
    Ok(SavedActions { int, quit })
}

fn is_ignored(action: &SigAction) -> bool {
    matches!(action.handler(), SigHandler::SigIgn)
}

#[cfg(test)]
pub(crate) static SIGNAL_TEST_LOCK: Mutex<()> = Mutex::new(());
