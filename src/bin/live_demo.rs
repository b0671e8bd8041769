use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use sampleflow::core::{Axis, ChannelKey, DecimatedBlock, SampleBatch};
use sampleflow::engine::SampleSource;
use sampleflow::pipeline::{StorageBackend, Transport};
use sampleflow::{Engine, PipelineConfig};

/// Synthetic logger: a device thread pushes sine-plus-noise chunks through a
/// bounded channel, standing in for real acquisition hardware.
fn spawn_device(rate_hz: f64, run_for: Duration) -> Receiver<SampleBatch> {
    let (tx, rx): (Sender<SampleBatch>, Receiver<SampleBatch>) = bounded(8);
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let channel = ChannelKey::new("imu-0", Axis::X);
        let chunk = 50usize;
        let dt = 1.0 / rate_hz;
        let mut t = 0.0f64;
        while t < run_for.as_secs_f64() {
            let mut batch = SampleBatch::new(channel.clone());
            for _ in 0..chunk {
                let value = (t * 6.0).sin() * 10.0 + rng.gen_range(-0.5..0.5);
                batch.push(t, value);
                t += dt;
            }
            // Drop the chunk if the consumer side is saturated.
            let _ = tx.try_send(batch);
            thread::sleep(Duration::from_secs_f64(dt * chunk as f64));
        }
        // Dropping the sender ends the acquisition loop.
    });
    rx
}

struct DeviceSource {
    rx: Receiver<SampleBatch>,
    idle_key: ChannelKey,
}

impl SampleSource for DeviceSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>> {
        match self.rx.recv_timeout(Duration::from_millis(200)) {
            Ok(batch) => Ok(Some(batch)),
            // Empty batch keeps the producer loop responsive to stop.
            Err(RecvTimeoutError::Timeout) => Ok(Some(SampleBatch::new(self.idle_key.clone()))),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}

struct CsvStorage {
    writer: BufWriter<File>,
}

impl CsvStorage {
    fn create(path: &PathBuf) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "channel,timestamp_s,value")?;
        Ok(Self { writer })
    }
}

impl StorageBackend for CsvStorage {
    fn store_batch(&mut self, channel: &ChannelKey, times: &[f64], values: &[f64]) -> Result<()> {
        for (t, v) in times.iter().zip(values) {
            writeln!(self.writer, "{channel},{t:.6},{v:.4}")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Into::into)
    }
}

struct LogTransport;

impl Transport for LogTransport {
    fn send_block(&mut self, channel: &ChannelKey, block: &DecimatedBlock) -> Result<()> {
        log::info!("stream: {} points for {channel}", block.len());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = PipelineConfig::from_json(serde_json::json!({
        "source_rate_hz": 500.0,
        "streamer_target_hz": 25.0,
        "plotter_target_hz": 60.0,
        "smoothing_alpha": 0.3,
        "refresh_interval_ms": 100
    }))?;

    let recording = std::env::temp_dir().join("sampleflow_demo.csv");
    let storage = CsvStorage::create(&recording)?;

    let mut engine = Engine::new(config)?;
    let rx = spawn_device(500.0, Duration::from_secs(3));
    let source = DeviceSource {
        rx,
        idle_key: ChannelKey::new("imu-0", Axis::X),
    };

    engine.start(
        source,
        Box::new(storage),
        Some(Box::new(LogTransport)),
        Box::new(|store, batches| {
            if batches.is_empty() {
                return;
            }
            for channel in store.channels() {
                if let Some(latest) = store.latest_timestamp(&channel) {
                    let window = store.window(&channel, latest - 1.0, latest);
                    log::info!("render: {channel} has {} points in the last second", window.len());
                }
            }
        }),
    )?;

    tokio::time::sleep(Duration::from_secs(4)).await;
    engine.stop().await;

    let snapshot = engine.snapshot();
    println!("recent rate:        {:.1} Hz", snapshot.recent_rate_hz);
    println!("avg processing:     {:.3} ms", snapshot.avg_processing_ms);
    println!("decimation factor:  {}", snapshot.current_decimation_factor);
    println!("refresh interval:   {} ms", snapshot.current_refresh_interval_ms);
    println!("queue drops:        {}", snapshot.queue_dropped);
    println!("recording saved to  {}", recording.display());

    Ok(())
}
