//! Temporary package rename with guaranteed restore
//!
//! While artifacts are built and uploaded the manifest carries a public
//! "publish name". The original name comes back on every exit path:
//!
//! - the body returns `Ok` or `Err` (explicit restore),
//! - the body panics (`Drop` on `NameSwap`),
//! - the process receives SIGINT/SIGTERM/SIGHUP (signal-hook listener thread, unix).
//!
//! Restoration happens at most once; the `active` flag in the shared
//! `NameSwapState` is the single source of truth for all three paths.

use crate::core::error::ReleaseResult;
use crate::release::manifest::Manifest;
use crate::ui::output;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Transient record of an in-flight rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSwapState {
  pub original_name: String,
  pub active: bool,
}

/// A manifest whose `name` may currently be swapped
///
/// Dropping an active swap restores the original name.
pub struct NameSwap {
  manifest: Manifest,
  state: Arc<Mutex<NameSwapState>>,
}

impl NameSwap {
  /// Prepare a swap that remembers `original_name` (nothing is written yet)
  pub fn new(manifest: Manifest, original_name: impl Into<String>) -> Self {
    Self {
      manifest,
      state: Arc::new(Mutex::new(NameSwapState {
        original_name: original_name.into(),
        active: false,
      })),
    }
  }

  /// Write the temporary name and mark the swap active
  pub fn activate(&self, temp_name: &str) -> ReleaseResult<()> {
    let mut state = lock(&self.state);
    self.manifest.write_field("name", temp_name)?;
    state.active = true;
    tracing::debug!(original = %state.original_name, temp_name, "name swap active");
    Ok(())
  }

  /// Write the original name back if the swap is active; no-op otherwise
  pub fn restore(&self) -> ReleaseResult<()> {
    restore_state(&self.manifest, &self.state)
  }

  /// Snapshot of the current state
  pub fn state(&self) -> NameSwapState {
    lock(&self.state).clone()
  }
}

impl Drop for NameSwap {
  fn drop(&mut self) {
    if let Err(err) = self.restore() {
      tracing::warn!(error = %err, "failed to restore package name on drop");
      output::error(format!("Failed to restore package name: {}", err));
    }
  }
}

fn lock(state: &Mutex<NameSwapState>) -> MutexGuard<'_, NameSwapState> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn restore_state(manifest: &Manifest, state: &Mutex<NameSwapState>) -> ReleaseResult<()> {
  let mut state = lock(state);
  if !state.active {
    return Ok(());
  }

  manifest.write_field("name", &state.original_name)?;
  state.active = false;
  tracing::debug!(original = %state.original_name, "name swap restored");
  Ok(())
}

/// Run `body` with the manifest `name` set to `temp_name`
///
/// Skips the swap entirely when the manifest already carries `temp_name`.
/// If `body` fails, its error is returned even when the restore also fails
/// (the restore failure is logged). If `body` succeeds but the restore fails,
/// the restore error is returned.
pub fn with_temporary_name<T, F>(manifest: &Manifest, temp_name: &str, body: F) -> ReleaseResult<T>
where
  F: FnOnce() -> ReleaseResult<T>,
{
  let original = manifest.name()?;
  if original == temp_name {
    tracing::debug!(name = %original, "manifest already uses the publish name");
    return body();
  }

  let swap = NameSwap::new(manifest.clone(), original.clone());
  let _trap = interrupt::InterruptTrap::install(manifest.clone(), Arc::clone(&swap.state))?;

  output::info(format!("Temporarily renaming package: {} -> {}", original, temp_name));
  swap.activate(temp_name)?;

  let result = body();
  let restored = swap.restore();

  match (result, restored) {
    (Ok(value), Ok(())) => {
      output::info(format!("Restored package name: {}", original));
      Ok(value)
    }
    (Ok(_), Err(restore_err)) => Err(restore_err),
    (Err(body_err), Ok(())) => {
      output::info(format!("Restored package name: {}", original));
      Err(body_err)
    }
    (Err(body_err), Err(restore_err)) => {
      tracing::warn!(error = %restore_err, "failed to restore package name after error");
      output::error(format!("Failed to restore package name: {}", restore_err));
      Err(body_err)
    }
  }
}

#[cfg(unix)]
mod interrupt {
  use super::{NameSwapState, restore_state};
  use crate::core::error::{ExitCode, ReleaseResult, ResultExt};
  use crate::release::manifest::Manifest;
  use crate::ui::output;
  use signal_hook::SigId;
  use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
  use signal_hook::iterator::{Handle, Signals};
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};
  use std::thread::{self, JoinHandle};

  const TRAPPED: [i32; 3] = [SIGINT, SIGTERM, SIGHUP];

  /// Restores the name and exits when SIGINT/SIGTERM/SIGHUP arrives
  ///
  /// Signals are observed twice: the listener thread reacts immediately, and
  /// the `received` flag is set from the handler itself. A signal whose
  /// delivery races with closing the listener is still honored on drop.
  pub(super) struct InterruptTrap {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
    received: Arc<AtomicBool>,
    flag_ids: Vec<SigId>,
    manifest: Manifest,
    state: Arc<Mutex<NameSwapState>>,
  }

  impl InterruptTrap {
    pub(super) fn install(manifest: Manifest, state: Arc<Mutex<NameSwapState>>) -> ReleaseResult<Self> {
      let received = Arc::new(AtomicBool::new(false));
      let mut flag_ids = Vec::with_capacity(TRAPPED.len());
      for signal in TRAPPED {
        let id = signal_hook::flag::register(signal, Arc::clone(&received))
          .context("Failed to register signal handlers")?;
        flag_ids.push(id);
      }

      let mut signals = Signals::new(TRAPPED).context("Failed to register signal handlers")?;
      let handle = signals.handle();

      let listener_manifest = manifest.clone();
      let listener_state = Arc::clone(&state);
      let thread = thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
          tracing::debug!(signal, "interrupted during name swap");
          exit_interrupted(&listener_manifest, &listener_state);
        }
      });

      Ok(Self {
        handle,
        thread: Some(thread),
        received,
        flag_ids,
        manifest,
        state,
      })
    }
  }

  fn exit_interrupted(manifest: &Manifest, state: &Mutex<NameSwapState>) -> ! {
    match restore_state(manifest, state) {
      Ok(()) => output::error("Interrupted; package name restored"),
      Err(err) => output::error(format!("Interrupted; failed to restore package name: {}", err)),
    }
    std::process::exit(ExitCode::Interrupted.as_i32());
  }

  impl Drop for InterruptTrap {
    fn drop(&mut self) {
      self.handle.close();
      if let Some(thread) = self.thread.take() {
        let _ = thread.join();
      }
      for id in self.flag_ids.drain(..) {
        signal_hook::low_level::unregister(id);
      }

      // The listener is gone, so this is the only thread that can exit here.
      if self.received.load(Ordering::SeqCst) {
        tracing::debug!("interrupt observed while closing the trap");
        exit_interrupted(&self.manifest, &self.state);
      }
    }
  }
}

#[cfg(not(unix))]
mod interrupt {
  use super::NameSwapState;
  use crate::core::error::ReleaseResult;
  use crate::release::manifest::Manifest;
  use std::sync::{Arc, Mutex};

  /// No signal trap off unix; `Drop` on `NameSwap` still covers unwinding
  pub(super) struct InterruptTrap;

  impl InterruptTrap {
    pub(super) fn install(_manifest: Manifest, _state: Arc<Mutex<NameSwapState>>) -> ReleaseResult<Self> {
      Ok(Self)
    }
  }
}
