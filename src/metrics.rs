use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use crate::error::PipelineError;
use crate::pipeline::Component;

/// Timed unit of work inside one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LoadTransforms,
    LoadModel,
    Numeric,
    Embed(Component),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::LoadTransforms => f.write_str("load_transforms"),
            Stage::LoadModel => f.write_str("load_model"),
            Stage::Numeric => f.write_str("numeric"),
            Stage::Embed(component) => write!(f, "embed_{}", component.name()),
        }
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, result: Result<(), &PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Runs `f` and reports its latency and outcome to the installed recorder, if any.
pub(crate) fn timed<T>(
    stage: Stage,
    f: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let Some(recorder) = metrics_recorder() else {
        return f();
    };
    let start = Instant::now();
    let result = f();
    recorder.record_stage(stage, start.elapsed(), result.as_ref().map(|_| ()));
    result
}
