//! Keeps Ctrl-C and termination requests from killing this process while the
//! session plugin owns the terminal. The plugin forwards them into the
//! remote shell itself.

#[cfg(all(unix, feature = "nix_support"))]
mod imp {
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use stacked_errors::{Result, StackableErr};
    use tracing::warn;

    pub(super) const GUARDED: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];

    extern "C" fn swallow(_: nix::libc::c_int) {}

    /// Installs a no-op handler for the guarded signals and restores the
    /// previous actions on drop. A handler is used instead of `SIG_IGN` because
    /// ignored dispositions survive `exec` and the child should get the
    /// defaults.
    #[derive(Debug)]
    pub struct SignalGuard {
        previous: Vec<(Signal, SigAction)>,
    }

    impl SignalGuard {
        pub fn suppress_interrupts() -> Result<Self> {
            let action = SigAction::new(
                SigHandler::Handler(swallow),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            let mut guard = Self { previous: vec![] };
            for signal in GUARDED {
                // Safety: `swallow` is async-signal-safe, it does nothing
                let previous = unsafe { sigaction(signal, &action) }.stack_err_with(|| {
                    format!("SignalGuard::suppress_interrupts -> sigaction({signal:?}) failed")
                })?;
                // if a later signal fails, dropping `guard` restores the earlier ones
                guard.previous.push((signal, previous));
            }
            Ok(guard)
        }
    }

    impl Drop for SignalGuard {
        fn drop(&mut self) {
            while let Some((signal, previous)) = self.previous.pop() {
                // Safety: restores exactly what was installed before
                if let Err(e) = unsafe { sigaction(signal, &previous) } {
                    warn!("SignalGuard failed to restore the action for {signal:?}: {e}");
                }
            }
        }
    }
}

#[cfg(not(all(unix, feature = "nix_support")))]
mod imp {
    use stacked_errors::Result;
    use tokio::task::JoinHandle;

    /// Drains Ctrl-C events on a background task until dropped. Once tokio
    /// has registered its handler it stays installed for the life of the
    /// process, so Ctrl-C keeps being swallowed after the guard is dropped.
    #[derive(Debug)]
    pub struct SignalGuard {
        drain: JoinHandle<()>,
    }

    impl SignalGuard {
        pub fn suppress_interrupts() -> Result<Self> {
            let drain = tokio::task::spawn(async {
                while tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("interrupt received while the session is running");
                }
            });
            Ok(Self { drain })
        }
    }

    impl Drop for SignalGuard {
        fn drop(&mut self) {
            self.drain.abort();
        }
    }
}

pub use imp::SignalGuard;

/// Serializes tests that change the process wide signal dispositions
#[cfg(test)]
pub(crate) static DISPOSITION_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
