//! Synthesis worker: runs one [`Tts`] engine on a dedicated OS thread.
//!
//! ```text
//! submit(req) ──► job queue (unbounded) ──► worker thread ──► Tts::synthesize_with_progress
//!      ▲                                                            │
//!      └──────── per-request event channel (unbounded) ◄────────────┘
//!                    Progress* then exactly one Complete | Failed
//! ```
//!
//! Requests run one at a time in submission order. The engine never leaves the
//! worker thread, and it never waits on a caller: a request produces at most
//! units + 2 events, so a receiver that is never read cannot stall the queue.

use super::engine::{SynthesisProgress, Tts};
use super::error::TtsError;
use super::request::GenerationRequest;
use super::response::TtsResult;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

/// Events for one submitted request.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(SynthesisProgress),
    /// Terminal: the request finished.
    Complete(TtsResult),
    /// Terminal: the request was aborted.
    Failed(TtsError),
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerEvent::Progress(_))
    }
}

struct Job {
    request: GenerationRequest,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

/// Handle to the synthesis thread.
///
/// Dropping the handle closes the queue, lets queued requests finish and
/// joins the thread.
///
/// ```rust,no_run
/// use narrator_core::tts::{GenerationRequest, SynthesisWorker, Tts};
///
/// # async fn run() -> Result<(), narrator_core::tts::TtsError> {
/// let worker = SynthesisWorker::spawn(Tts::new("assets/onnx")?)?;
/// let result = worker
///     .synthesize(GenerationRequest::new("Hello there.", "F1"))
///     .await?;
/// println!("{:.2}s of audio", result.duration);
/// # Ok(())
/// # }
/// ```
pub struct SynthesisWorker {
    sender: Option<mpsc::UnboundedSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl SynthesisWorker {
    /// Move `tts` onto a new worker thread.
    pub fn spawn(tts: Tts) -> Result<Self, TtsError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = thread::Builder::new()
            .name("narrator-synthesis".to_string())
            .spawn(move || run_worker(tts, receiver))
            .map_err(|e| TtsError::Initialization(format!("failed to spawn synthesis worker: {}", e)))?;

        log::debug!(target: "narrator_core", "synthesis worker started");
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue a request and return its event stream.
    pub fn submit(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::UnboundedReceiver<WorkerEvent>, TtsError> {
        let (events, receiver) = mpsc::unbounded_channel();
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| TtsError::Inference("synthesis worker has shut down".to_string()))?;
        sender
            .send(Job { request, events })
            .map_err(|_| TtsError::Inference("synthesis worker has stopped".to_string()))?;
        Ok(receiver)
    }

    /// Submit a request and wait for its terminal event.
    pub async fn synthesize(&self, request: GenerationRequest) -> Result<TtsResult, TtsError> {
        let mut events = self.submit(request)?;
        while let Some(event) = events.recv().await {
            match event {
                WorkerEvent::Progress(_) => {}
                WorkerEvent::Complete(result) => return Ok(result),
                WorkerEvent::Failed(err) => return Err(err),
            }
        }
        Err(TtsError::Inference(
            "synthesis worker exited before finishing the request".to_string(),
        ))
    }

    /// Close the queue and wait for the thread to finish queued work.
    pub fn shutdown(mut self) -> Result<(), TtsError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), TtsError> {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| TtsError::Inference("synthesis worker panicked".to_string()))?;
            log::debug!(target: "narrator_core", "synthesis worker stopped");
        }
        Ok(())
    }
}

impl Drop for SynthesisWorker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_worker(tts: Tts, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(Job { request, events }) = jobs.blocking_recv() {
        // A dropped receiver only means nobody is listening; the request still runs.
        let outcome = tts.synthesize_with_progress(&request, &mut |progress| {
            let _ = events.send(WorkerEvent::Progress(progress));
        });
        let terminal = match outcome {
            Ok(result) => WorkerEvent::Complete(result),
            Err(err) => {
                log::warn!(target: "narrator_core", "synthesis failed: {}", err);
                WorkerEvent::Failed(err)
            }
        };
        let _ = events.send(terminal);
    }
}
