//! Log buffering and batched delivery
//!
//! Framework log records are stamped with the active test id at emit time,
//! queued to a background worker, and shipped in batches. Two triggers
//! flush a batch: a count threshold and a wall-clock window. A batch whose
//! send fails is dropped, never re-queued; losing log lines is preferred to
//! blocking the host's test execution.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{error, warn};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

use shared::messages::{epoch_millis, LogEntry};

use crate::state::RunContext;
use crate::traits::ReportingApi;

const DEFAULT_MAX_BATCH: usize = 20;
const DEFAULT_FLUSH_WINDOW: Duration = Duration::from_secs(1);

enum BufferOp {
    Record(LogEntry),
    Flush(oneshot::Sender<()>),
}

/// Buffered, batching bridge between log records and the reporting API.
pub struct LogBuffer {
    tx: mpsc::UnboundedSender<BufferOp>,
    context: Arc<RunContext>,
}

impl LogBuffer {
    pub fn new<A: ReportingApi + 'static>(
        api: Arc<A>,
        context: Arc<RunContext>,
        send_logs: bool,
    ) -> Self {
        Self::with_thresholds(api, context, send_logs, DEFAULT_MAX_BATCH, DEFAULT_FLUSH_WINDOW)
    }

    /// Construct with explicit triggers. Must be called inside a tokio
    /// runtime; the delivery worker is spawned immediately.
    pub fn with_thresholds<A: ReportingApi + 'static>(
        api: Arc<A>,
        context: Arc<RunContext>,
        send_logs: bool,
        max_batch: usize,
        flush_window: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker_context = Arc::clone(&context);
        tokio::spawn(run_worker(rx, api, worker_context, send_logs, max_batch, flush_window));

        Self { tx, context }
    }

    /// Record one log line. Records observed while no test is active are
    /// dropped, not buffered.
    pub fn emit(&self, level: &str, message: &str) {
        if !self.context.test_is_active() {
            return;
        }
        let Ok(test_id) = self.context.test_id() else {
            return;
        };

        let entry = LogEntry::new(test_id, level.to_uppercase(), epoch_millis(), message);
        if self.tx.send(BufferOp::Record(entry)).is_err() {
            warn!("log delivery worker is gone; dropping record");
        }
    }

    /// Force the current batch out and wait for the send to complete. Called
    /// once at run finish so trailing records are not lost.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(BufferOp::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run_worker<A: ReportingApi>(
    mut rx: mpsc::UnboundedReceiver<BufferOp>,
    api: Arc<A>,
    context: Arc<RunContext>,
    send_logs: bool,
    max_batch: usize,
    flush_window: Duration,
) {
    let mut entries: Vec<LogEntry> = Vec::new();
    let mut timer = tokio::time::interval(flush_window);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the window starts now.
    timer.tick().await;

    loop {
        tokio::select! {
            op = rx.recv() => match op {
                Some(BufferOp::Record(entry)) => {
                    entries.push(entry);
                    if entries.len() >= max_batch {
                        push_batch(&api, &context, send_logs, &mut entries).await;
                        timer.reset();
                    }
                }
                Some(BufferOp::Flush(ack)) => {
                    push_batch(&api, &context, send_logs, &mut entries).await;
                    timer.reset();
                    let _ = ack.send(());
                }
                None => {
                    // Buffer handle dropped: deliver what is left and stop.
                    push_batch(&api, &context, send_logs, &mut entries).await;
                    break;
                }
            },
            _ = timer.tick() => {
                push_batch(&api, &context, send_logs, &mut entries).await;
            }
        }
    }
}

async fn push_batch<A: ReportingApi>(
    api: &Arc<A>,
    context: &Arc<RunContext>,
    send_logs: bool,
    entries: &mut Vec<LogEntry>,
) {
    let batch = std::mem::take(entries);
    if batch.is_empty() {
        return;
    }
    if !send_logs || !context.run_is_active() {
        return;
    }
    let Ok(run_id) = context.run_id() else {
        return;
    };

    if let Err(e) = api.send_logs(run_id, batch).await {
        error!(error = %e, "failed to send buffered logs");
    }
}

/// `tracing` layer feeding host log records into a [`LogBuffer`].
pub struct BufferingLayer {
    buffer: Arc<LogBuffer>,
}

impl BufferingLayer {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for BufferingLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        let target = event.metadata().target();
        // The agent's own diagnostics (and its HTTP stack's) must not feed
        // back into the buffer, or every flush would generate new records.
        if target.starts_with("agent") || target.starts_with("reqwest") || target.starts_with("hyper")
        {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if !visitor.message.is_empty() {
            self.buffer.emit(event.metadata().level().as_str(), &visitor.message);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
