use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::buffer::SharedIndexBuffer;
use crate::filter::RowFilter;
use crate::sort::{compare_rows, sort_by};
use crate::{Row, ViewConfig};

/// Messages from the interactive context to the worker.
#[derive(Debug)]
pub(crate) enum Request {
    /// Replaces the worker's copy of the dataset.
    SetRows(Vec<Row>),
    /// Extends the worker's copy of the dataset.
    AppendRows(Vec<Row>),
    Compute(ViewConfig),
    Shutdown,
}

/// Sent back after a computation wrote its result into the shared buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub version: u64,
    pub region: usize,
    pub count: usize,
}

/// The background view computation, owned by [`crate::ViewManager`].
///
/// Dropping it asks the thread to stop and joins it. A computation in progress observes the
/// shutdown through its cancellation checkpoints only if a newer version was dispatched; otherwise
/// it finishes first.
#[derive(Debug)]
pub(crate) struct BackgroundView {
    requests: Sender<Request>,
    completions: Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundView {
    pub(crate) fn spawn(buffer: Arc<SharedIndexBuffer>) -> io::Result<Self> {
        let (requests, request_rx) = channel::unbounded();
        let (completion_tx, completions) = channel::unbounded();
        let handle = thread::Builder::new()
            .name("tablegrid-view".into())
            .spawn(move || run(&buffer, &request_rx, &completion_tx))?;
        Ok(Self {
            requests,
            completions,
            handle: Some(handle),
        })
    }

    /// Returns `false` if the worker is gone.
    pub(crate) fn send(&self, request: Request) -> bool {
        self.requests.send(request).is_ok()
    }

    pub(crate) fn try_recv(&self) -> Option<Completion> {
        self.completions.try_recv().ok()
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<Completion, RecvTimeoutError> {
        self.completions.recv_timeout(timeout)
    }
}

impl Drop for BackgroundView {
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                vwarn!("view worker panicked");
            }
        }
    }
}

fn run(buffer: &SharedIndexBuffer, requests: &Receiver<Request>, completions: &Sender<Completion>) {
    let mut rows: Vec<Row> = Vec::new();
    vdebug!("view worker started");

    while let Ok(request) = requests.recv() {
        let mut config = match request {
            Request::SetRows(next) => {
                rows = next;
                continue;
            }
            Request::AppendRows(more) => {
                rows.extend(more);
                continue;
            }
            Request::Compute(config) => config,
            Request::Shutdown => break,
        };

        // Collapse a burst of requests: dataset messages apply in order, only the newest
        // compute request runs.
        let mut shutdown = false;
        while let Ok(next) = requests.try_recv() {
            match next {
                Request::SetRows(next) => rows = next,
                Request::AppendRows(more) => rows.extend(more),
                Request::Compute(newer) => {
                    vtrace!(skipped = config.version, next = newer.version, "superseded in queue");
                    config = newer;
                }
                Request::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }
        if shutdown {
            break;
        }

        if let Some(done) = compute(buffer, &rows, &config) {
            if completions.send(done).is_err() {
                break;
            }
        }
    }
    vdebug!("view worker stopped");
}

/// Filters and sorts `rows` for `config`, then writes the result into the free buffer region.
///
/// Returns `None` when the computation was superseded before it could publish.
pub(crate) fn compute(
    buffer: &SharedIndexBuffer,
    rows: &[Row],
    config: &ViewConfig,
) -> Option<Completion> {
    let version = config.version;
    let cancelled = || buffer.is_superseded(version);

    let Ok(mut positions) = RowFilter::new(&config.filter).apply(rows, cancelled) else {
        vdebug!(version, "filter cancelled");
        return None;
    };

    if !config.sort.is_empty() {
        let keys = config.sort.as_slice();
        let sorted = sort_by(
            &mut positions,
            |a, b| compare_rows(&rows[*a as usize], &rows[*b as usize], keys),
            cancelled,
        );
        if sorted.is_err() {
            vdebug!(version, "sort cancelled");
            return None;
        }
    }

    if cancelled() {
        vdebug!(version, "superseded before publish");
        return None;
    }

    let region = buffer.write_region();
    let Some(view) = buffer.write(region, version, &positions) else {
        vwarn!(
            version,
            count = positions.len(),
            capacity = buffer.capacity(),
            "view result exceeds buffer capacity"
        );
        return None;
    };
    vdebug!(version, region, count = view.count, "view computed");
    Some(Completion {
        version,
        region: view.region,
        count: view.count,
    })
}
