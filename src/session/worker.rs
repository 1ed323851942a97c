use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::foundation::core::Resolution;
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::project::model::Project;
use crate::session::display::{CancelToken, DisplayOpts, DisplayStats, Presenter, run_display};
use crate::session::export::{ExportOpts, ExportStats, export_project};
use crate::signal::SignalSession;

/// Builds the presenter inside the display worker, from the surface size and the fullscreen
/// flag. Window handles are usually tied to the thread that created them.
pub type PresenterFactory =
    Box<dyn FnOnce(Resolution, bool) -> CheckergenResult<Box<dyn Presenter>> + Send>;

/// Handle to a session running on a worker thread.
pub struct SessionHandle<T> {
    cancel: CancelToken,
    rx: mpsc::Receiver<CheckergenResult<T>>,
    join: Option<JoinHandle<()>>,
}

impl<T> SessionHandle<T> {
    /// Ask the session to stop. Exports ignore this once started.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Result of the session if it already finished.
    pub fn try_result(&mut self) -> Option<CheckergenResult<T>> {
        match self.rx.try_recv() {
            Ok(res) => {
                self.reap();
                Some(res)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.reap();
                Some(Err(worker_died()))
            }
        }
    }

    /// Block until the session finishes.
    pub fn wait(mut self) -> CheckergenResult<T> {
        let res = self.rx.recv().unwrap_or_else(|_| Err(worker_died()));
        self.reap();
        res
    }

    fn reap(&mut self) {
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            tracing::error!("session worker panicked");
        }
    }
}

fn worker_died() -> CheckergenError {
    CheckergenError::Other(anyhow::anyhow!("session worker exited without a result"))
}

/// Clears the display slot when the display worker ends, however it ends.
struct DisplaySlot(Arc<AtomicBool>);

impl Drop for DisplaySlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts display and export sessions on owned project snapshots.
///
/// At most one display session runs at a time; exports are not limited. Clones share the
/// display slot.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    display_busy: Arc<AtomicBool>,
}

impl SessionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a display session holds the slot.
    pub fn display_active(&self) -> bool {
        self.display_busy.load(Ordering::SeqCst)
    }

    /// Play a snapshot of `project` on a worker thread.
    ///
    /// Fails with [`CheckergenError::SessionBusy`] while another display runs. Later edits to
    /// `project` do not reach the running session.
    pub fn spawn_display(
        &self,
        project: &Project,
        opts: DisplayOpts,
        factory: PresenterFactory,
        signals: Option<SignalSession>,
    ) -> CheckergenResult<SessionHandle<DisplayStats>> {
        if self
            .display_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CheckergenError::SessionBusy);
        }
        let slot = DisplaySlot(Arc::clone(&self.display_busy));
        let mut snapshot = project.snapshot();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();

        spawn("checkergen-display", cancel, move || {
            let _slot = slot;
            let mut signals = signals;
            let mut presenter = factory(snapshot.res(), opts.fullscreen)?;
            run_display(
                &mut snapshot,
                presenter.as_mut(),
                &opts,
                &worker_cancel,
                signals.as_mut(),
            )
        })
    }

    /// Export a snapshot of `project` on a worker thread.
    ///
    /// Runs without asking: over-limit frame counts fail unless `opts.force` is set.
    pub fn spawn_export(
        &self,
        project: &Project,
        opts: ExportOpts,
    ) -> CheckergenResult<SessionHandle<ExportStats>> {
        let snapshot = project.snapshot();
        spawn("checkergen-export", CancelToken::new(), move || {
            export_project(&snapshot, &opts)
        })
    }
}

fn spawn<T, F>(name: &str, cancel: CancelToken, work: F) -> CheckergenResult<SessionHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> CheckergenResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let join = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            // The receiver may already be gone if the caller dropped the handle.
            let _ = tx.send(work());
        })
        .with_context(|| format!("spawn {name} worker"))?;
    Ok(SessionHandle {
        cancel,
        rx,
        join: Some(join),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/worker.rs"]
mod tests;
