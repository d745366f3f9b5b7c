//! Audio level metering for the local microphone track.
//!
//! A sampling task polls a [`SampleSource`] at roughly the browser's
//! animation-frame cadence, reduces each window to a 0–100 loudness scalar
//! and publishes it on a watch channel. The task only ever writes that
//! scalar; session and participant state are untouched, so the meter can
//! run independently of the controller loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time};

/// Empirical gain mapping RMS amplitude onto the 0–100 UI range.
const LEVEL_GAIN: f32 = 220.0;

/// Polling cadence; stands in for the animation-frame callback.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(16);

/// A tap on a live audio track yielding time-domain sample windows.
///
/// Implementations return samples in `[-1.0, 1.0]`; an empty window means
/// no data was available this tick and reads as silence.
pub trait SampleSource: Send {
    fn read_samples(&mut self) -> Vec<f32>;
}

/// Reduces one sample window to the 0–100 loudness estimate.
pub fn level_from_samples(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_square = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    (mean_square.sqrt() * LEVEL_GAIN).clamp(0.0, 100.0)
}

/// Owns one running sampling loop.
///
/// Stopping or dropping the handle aborts the task; a leaked loop across
/// reconnects is a defect, so whoever starts the meter keeps the handle.
pub struct MeterHandle {
    task: JoinHandle<()>,
}

impl MeterHandle {
    /// Spawns the sampling loop, writing levels into `level_tx`.
    pub fn start(mut source: Box<dyn SampleSource>, level_tx: Arc<watch::Sender<f32>>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(SAMPLE_INTERVAL);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let level = level_from_samples(&source.read_samples());
                if level_tx.send(level).is_err() {
                    // Every receiver is gone; nothing left to meter for.
                    break;
                }
            }
        });
        Self { task }
    }

    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for MeterHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
