use anyhow::{anyhow, Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::buffers::ChannelStore;
use crate::config::PipelineConfig;
use crate::core::SampleBatch;
use crate::engine::{AdaptiveController, TuningHandle};
use crate::observability::{PerfHistory, PerfSample, PerfSnapshot, PipelineMetrics};
use crate::pipeline::streamer::OutboundBlock;
use crate::pipeline::{Pipeline, Plotter, Recorder, StorageBackend, Streamer, Transport};
use crate::queue::IngestQueue;

/// Acquisition collaborator: yields batches until exhausted or stopped.
/// Called from the producer thread; blocking here delays only that thread.
pub trait SampleSource: Send + 'static {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>>;
}

/// Rendering consumer, invoked at refresh cadence from the consumer domain
/// with the channel registry and the batches drained this frame.
pub type RenderFn = Box<dyn FnMut(&ChannelStore, &[SampleBatch]) + Send>;

/// Ties the two scheduling domains together.
///
/// The producer domain is a dedicated OS thread running the acquisition loop
/// and the fan-out; the consumer domain is a tokio task draining the ingest
/// queue at refresh cadence, rendering, and stepping the adaptive controller
/// on its own coarser period. The only crossing points are the ingest queue
/// (non-blocking by construction) and the mutex-guarded rendering buffers.
pub struct Engine {
    config: PipelineConfig,
    tuning: TuningHandle,
    store: Arc<ChannelStore>,
    queue: Arc<IngestQueue<SampleBatch>>,
    outbound: Arc<IngestQueue<OutboundBlock>>,
    metrics: Arc<PipelineMetrics>,
    perf: Arc<Mutex<PerfHistory>>,
    stop: Arc<AtomicBool>,
    producer: Option<thread::JoinHandle<()>>,
    consumer: Option<tokio::task::JoinHandle<()>>,
}

impl Engine {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let queue = Arc::new(IngestQueue::new(config.queue_capacity));
        let tuning = TuningHandle::new(
            config.streamer_decimation(),
            config.plotter_decimation(),
            queue.clone(),
            config.controller.clone(),
            config.refresh_interval_ms,
        );
        Ok(Self {
            store: Arc::new(ChannelStore::new(config.ring_capacity)),
            queue,
            outbound: Arc::new(IngestQueue::new(config.queue_capacity)),
            metrics: Arc::new(PipelineMetrics::new()),
            perf: Arc::new(Mutex::new(PerfHistory::new(256, 0.2))),
            stop: Arc::new(AtomicBool::new(false)),
            producer: None,
            consumer: None,
            tuning,
            config,
        })
    }

    pub fn tuning(&self) -> TuningHandle {
        self.tuning.clone()
    }

    pub fn store(&self) -> Arc<ChannelStore> {
        self.store.clone()
    }

    /// Decimated blocks awaiting a polling transport.
    pub fn outbound(&self) -> Arc<IngestQueue<OutboundBlock>> {
        self.outbound.clone()
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    /// Spawn both scheduling domains. Must run inside a tokio runtime.
    pub fn start<S: SampleSource>(
        &mut self,
        source: S,
        storage: Box<dyn StorageBackend>,
        transport: Option<Box<dyn Transport>>,
        render: RenderFn,
    ) -> Result<()> {
        if self.producer.is_some() || self.consumer.is_some() {
            return Err(anyhow!("engine already started"));
        }
        self.stop.store(false, Ordering::Relaxed);

        let recorder = Recorder::new(storage, self.config.recorder_flush_threshold);
        let mut streamer = Streamer::new(self.tuning.shared_streamer_config())
            .with_outbound(self.outbound.clone());
        if let Some(transport) = transport {
            streamer = streamer.with_transport(transport);
        }
        let plotter = Plotter::new(self.tuning.shared_plotter_config(), self.store.clone());
        let pipeline = Pipeline::new(
            Box::new(recorder),
            Box::new(streamer),
            Box::new(plotter),
            self.metrics.clone(),
        );

        self.producer = Some(spawn_producer(
            source,
            pipeline,
            self.queue.clone(),
            self.stop.clone(),
        )?);
        self.consumer = Some(spawn_consumer(
            self.tuning.clone(),
            self.store.clone(),
            self.queue.clone(),
            self.perf.clone(),
            self.stop.clone(),
            Duration::from_millis(self.config.control_period_ms.max(1)),
            render,
        ));
        Ok(())
    }

    /// Signal both domains to stop, wait a bounded time for each, and discard
    /// whatever is still queued.
    pub async fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.producer.take() {
            let join = tokio::task::spawn_blocking(move || handle.join());
            match tokio::time::timeout(Duration::from_secs(2), join).await {
                Ok(Ok(Ok(()))) => {}
                Ok(_) => log::warn!("producer thread panicked during shutdown"),
                Err(_) => log::warn!("producer thread did not stop within the grace period"),
            }
        }

        if let Some(mut task) = self.consumer.take() {
            if tokio::time::timeout(Duration::from_secs(2), &mut task)
                .await
                .is_err()
            {
                task.abort();
            }
        }

        let discarded = self.queue.drain_all().len();
        if discarded > 0 {
            log::debug!("discarded {discarded} queued batches on stop");
        }
    }

    /// Diagnostics for a UI or remote status surface.
    pub fn snapshot(&self) -> PerfSnapshot {
        let perf = self
            .perf
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        PerfSnapshot {
            recent_rate_hz: perf.recent_rate_hz(),
            avg_processing_ms: perf.smoothed_processing_ms().unwrap_or(0.0),
            current_decimation_factor: self.tuning.plotter_factor(),
            current_refresh_interval_ms: self.tuning.refresh_interval_ms(),
            queue_dropped: self.queue.dropped() + self.outbound.dropped(),
        }
    }
}

fn spawn_producer<S: SampleSource>(
    mut source: S,
    mut pipeline: Pipeline,
    queue: Arc<IngestQueue<SampleBatch>>,
    stop: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("sampleflow-producer".into())
        .spawn(move || {
            // Stop is checked between batches, never mid-batch.
            while !stop.load(Ordering::Relaxed) {
                match source.next_batch() {
                    Ok(Some(batch)) => {
                        if let Err(e) =
                            pipeline.handle_samples(&batch.channel, &batch.times, &batch.values)
                        {
                            log::error!("rejected batch for {}: {e}", batch.channel);
                            continue;
                        }
                        queue.offer(batch);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("acquisition failed: {e:#}");
                        break;
                    }
                }
            }
            pipeline.flush();
        })
        .context("failed to spawn producer thread")
}

fn spawn_consumer(
    tuning: TuningHandle,
    store: Arc<ChannelStore>,
    queue: Arc<IngestQueue<SampleBatch>>,
    perf: Arc<Mutex<PerfHistory>>,
    stop: Arc<AtomicBool>,
    control_period: Duration,
    mut render: RenderFn,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut controller = AdaptiveController::new(tuning.clone());
        let mut last_control = Instant::now();

        loop {
            // Re-read each frame so controller adjustments apply immediately.
            let refresh = Duration::from_millis(tuning.refresh_interval_ms());
            tokio::time::sleep(refresh).await;
            if stop.load(Ordering::Relaxed) {
                break;
            }

            let frame_start = Instant::now();
            let batches = queue.drain_all();
            let drained: usize = batches.iter().map(SampleBatch::len).sum();
            render(&store, &batches);
            let frame_duration = frame_start.elapsed();

            {
                let mut perf = perf
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                perf.record(
                    PerfSample {
                        frame_start,
                        frame_duration,
                        worst_case_latency: refresh + frame_duration,
                    },
                    drained,
                );
            }

            if last_control.elapsed() >= control_period {
                last_control = Instant::now();
                let cost = perf
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .smoothed_processing_ms();
                controller.step(cost);
            }
        }
    })
}
