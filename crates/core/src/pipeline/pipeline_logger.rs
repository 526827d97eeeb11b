use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for clustering pass events.
///
/// Keeps the use case free of any particular output mechanism; the CLI
/// routes events to `log`, tests discard them.
pub trait PipelineLogger: Send {
    /// Images fully processed so far.
    fn progress(&mut self, current: usize, total: usize);

    /// Duration of one named stage (`detect`, `embed`, `match`) for one unit of work.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time value such as faces found in an image.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-pass report. Default: no-op.
    fn summary(&self) {}
}

/// Logger that drops every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` crate that aggregates stage timings and
/// metrics into a summary at the end of the pass.
///
/// Progress lines are emitted every `throttle_images` images and on the last one.
pub struct LogPipelineLogger {
    throttle_images: usize,
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    start_time: Instant,
    images_done: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_images: usize) -> Self {
        Self {
            throttle_images: throttle_images.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            images_done: 0,
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(Vec::as_slice)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    /// Formatted report, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Clustering summary ({} images, {elapsed_s:.1}s):",
            self.images_done
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:8}: {:5} calls  avg {avg_ms:7.1}ms  total {total_ms:8.0}ms",
                durations.len()
            ));
        }

        for (name, values) in &self.metrics {
            let total: f64 = values.iter().sum();
            lines.push(format!("  {name}: total {total:.0}  avg {:.1}", mean(values)));
        }

        if self.images_done > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.2} images/s",
                self.images_done as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.images_done = current;
        if total > 0 && (current % self.throttle_images == 0 || current == total) {
            log::info!("Clustered {current}/{total} images");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
