use std::time::{Duration, Instant};

use bindle_common::FxIndexMap;
use rustc_hash::FxHashMap;

/// Wall-clock accounting for the build and generate phases, armed by the
/// `perf` input option and surfaced through the bundle handle.
#[derive(Debug, Default)]
pub struct Timings {
  enabled: bool,
  started: FxHashMap<&'static str, Instant>,
  spans: FxIndexMap<&'static str, Duration>,
}

impl Timings {
  pub fn new(enabled: bool) -> Self {
    Self { enabled, ..Self::default() }
  }

  pub fn start(&mut self, label: &'static str) {
    if self.enabled {
      self.started.insert(label, Instant::now());
    }
  }

  pub fn end(&mut self, label: &'static str) {
    if let Some(started) = self.started.remove(label) {
      *self.spans.entry(label).or_default() += started.elapsed();
    }
  }

  pub fn snapshot(&self) -> Option<Vec<(String, Duration)>> {
    self
      .enabled
      .then(|| self.spans.iter().map(|(label, span)| ((*label).to_string(), *span)).collect())
  }
}
