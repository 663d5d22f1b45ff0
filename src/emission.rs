// src/emission.rs
use crate::config::DEFAULT_EMIT_TIMEOUT;
use crate::error::FormmarkError;
use crate::form::FormDocument;
use formmark_core::{AnnotationEmitter, AuthoringService, EmittedDocument, LayoutGrid, SelectionStore, Size};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

/// Clears the in-flight flag when the blocking emission finishes, even if
/// the caller stopped waiting for it.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs emissions off the async executor, one at a time.
pub struct EmissionController<A: AuthoringService> {
    emitter: Arc<AnnotationEmitter<A>>,
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
}

impl<A> EmissionController<A>
where
    A: AuthoringService + Send + Sync + 'static,
{
    pub fn new(emitter: AnnotationEmitter<A>) -> Self {
        Self {
            emitter: Arc::new(emitter),
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout: DEFAULT_EMIT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Emits a snapshot of `selections` onto `form`.
    ///
    /// Fails with [`FormmarkError::Busy`] while an earlier emission is still
    /// running, including one whose caller already saw a timeout.
    pub async fn emit(
        &self,
        form: &FormDocument,
        selections: &SelectionStore,
        grid: &LayoutGrid,
        display: Size,
    ) -> Result<EmittedDocument, FormmarkError> {
        let guard = InFlight::acquire(&self.in_flight).ok_or(FormmarkError::Busy)?;

        let emitter = Arc::clone(&self.emitter);
        let source = form.shared_bytes();
        let snapshot = selections.clone();
        let grid = grid.clone();
        log::debug!(
            "Starting emission of {} selection(s) onto '{}'.",
            snapshot.len(),
            form.path().display()
        );

        let handle = task::spawn_blocking(move || {
            let _guard = guard;
            emitter.emit(&source, &snapshot, &grid, display)
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_error)) => Err(FormmarkError::Task(join_error.to_string())),
            Err(_) => {
                log::warn!("Emission timed out after {:?}.", self.timeout);
                Err(FormmarkError::Timeout(self.timeout))
            }
        }
    }
}
