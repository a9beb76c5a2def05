use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn percent(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some(self.loaded as f32 / total as f32 * 100.0),
            _ => None,
        }
    }
}

/// Receives intermediate download progress. Advisory only.
pub type ProgressSink = Arc<dyn Fn(LoadProgress) + Send + Sync>;

pub fn logging_sink(source: String) -> ProgressSink {
    Arc::new(move |progress: LoadProgress| match progress.percent() {
        Some(percent) => tracing::debug!("{}: {:.0}% loaded", source, percent),
        None => tracing::debug!("{}: {} bytes loaded", source, progress.loaded),
    })
}
