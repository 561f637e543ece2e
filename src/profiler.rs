use std::time::Instant;

use crate::types::ParamSet;

/// Observer around one `execute` call.
///
/// `start` runs before the first statement, `log` once after every statement
/// of the template succeeded.
pub trait Profiler: Send {
    fn start(&mut self);
    fn log(&mut self, template_id: &str, params: &ParamSet);
}

/// Emits one `tracing` debug event per successful call, with elapsed time.
#[derive(Debug, Default)]
pub struct TracingProfiler {
    started: Option<Instant>,
}

impl Profiler for TracingProfiler {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn log(&mut self, template_id: &str, params: &ParamSet) {
        let elapsed_ms = self
            .started
            .take()
            .map_or(0.0, |t| t.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            template_id,
            params = %params.to_json_string(),
            elapsed_ms,
            "template executed"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    fn start(&mut self) {}
    fn log(&mut self, _template_id: &str, _params: &ParamSet) {}
}
