//! One tick, end to end.
//!
//! ```text
//! refresh chain → snapshot input → condition → apply chain → send
//! ```
//!
//! The same [`TickPipeline`] runs on the engine's tick thread and under the
//! manual-clock harness, so tests exercise the production path.

use std::sync::Arc;
use std::time::Duration;

use stickflow_atomic::LoopCounters;
use stickflow_pipeline::{ActiveChain, Conditioner, GameProfile, OutputFrame, TickContext};
use stickflow_scheduler::{LatenessMetrics, Tick};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::events::{EngineEvent, EventPublisher};
use crate::input::SharedInput;
use crate::ports::OutputSink;

/// Per-tick work between the scheduler and the sink.
///
/// # RT Safety
///
/// [`TickPipeline::run_tick`] does not allocate, except that a retired chain
/// is freed on the tick that replaces it.
#[derive(Debug)]
pub struct TickPipeline<S> {
    period: Duration,
    input: Arc<SharedInput>,
    conditioner: Conditioner,
    chain: ActiveChain,
    sink: S,
    counters: Arc<LoopCounters>,
    events: Option<EventPublisher>,
}

impl<S: OutputSink> TickPipeline<S> {
    /// Assemble a pipeline ticking every `period`.
    pub fn new(
        profile: &GameProfile,
        period: Duration,
        input: Arc<SharedInput>,
        chain: ActiveChain,
        sink: S,
        counters: Arc<LoopCounters>,
    ) -> Self {
        let rate_hz = 1.0 / period.as_secs_f64().max(1e-6);
        Self {
            period,
            input,
            conditioner: Conditioner::new(profile, rate_hz),
            chain,
            sink,
            counters,
            events: None,
        }
    }

    /// Publish loop events on `events`.
    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = Some(events);
        self
    }

    /// Process one scheduler tick and return the frame that was sent.
    ///
    /// # Errors
    ///
    /// [`EngineError::Tick`] when the chain faults, [`EngineError::Sink`] when
    /// the sink refuses the frame. Either is fatal to the loop.
    pub fn run_tick(&mut self, tick: &Tick) -> Result<OutputFrame, EngineError> {
        if let Some(retired) = self.chain.refresh() {
            self.counters.inc_chain_swap();
            debug!(
                tick = tick.index,
                version = self.chain.version(),
                rules = self.chain.chain().len(),
                "adopted new rule chain"
            );
            self.publish(EngineEvent::ChainSwapped {
                tick: tick.index,
                version: self.chain.version(),
            });
            drop(retired);
        }

        if tick.resynced {
            self.counters.record_resync(tick.dropped);
            warn!(
                tick = tick.index,
                dropped = tick.dropped,
                "tick loop fell behind, resynchronised"
            );
            self.publish(EngineEvent::Resynced {
                tick: tick.index,
                dropped: tick.dropped,
            });
        }
        if tick.lateness > self.period {
            self.counters.inc_late_tick();
        }

        let input = self.input.snapshot();
        let mut frame = self.conditioner.condition(&input);
        let ctx = TickContext::new(tick.index, tick.fired_at, tick.dt_secs());

        if let Err(error) = self.chain.apply(&ctx, &input, &mut frame) {
            self.publish(EngineEvent::Faulted {
                tick: tick.index,
                code: error.code(),
            });
            return Err(EngineError::Tick {
                tick: tick.index,
                error,
            });
        }

        if let Err(source) = self.sink.send(&frame) {
            self.publish(EngineEvent::Faulted {
                tick: tick.index,
                code: source.rt_error().code(),
            });
            return Err(EngineError::Sink {
                tick: tick.index,
                source,
            });
        }

        self.counters.inc_tick();
        Ok(frame)
    }

    /// The chain currently running.
    pub fn chain(&self) -> &ActiveChain {
        &self.chain
    }

    /// The stick conditioner.
    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }

    /// The output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the sink back.
    pub fn into_sink(self) -> S {
        self.sink
    }

    #[inline]
    fn publish(&self, event: EngineEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

/// Timing summary of a finished loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopReport {
    /// Configured period
    pub period: Duration,
    /// Ticks the scheduler fired
    pub ticks: u64,
    /// Ticks that fired more than one period late
    pub late_ticks: u64,
    /// Largest lateness seen
    pub max_lateness: Duration,
    /// Mean lateness
    pub mean_lateness: Duration,
    /// Median lateness over the recent window
    pub p50_lateness: Duration,
    /// 99th-percentile lateness over the recent window
    pub p99_lateness: Duration,
    /// Backlog resynchronisations
    pub resyncs: u64,
    /// Deadlines skipped by resynchronisation
    pub dropped_ticks: u64,
}

impl LoopReport {
    /// Summarise scheduler statistics.
    pub fn from_metrics(
        period: Duration,
        metrics: &mut LatenessMetrics,
        resyncs: u64,
        dropped_ticks: u64,
    ) -> Self {
        let mean_ns = metrics.mean_lateness_ns();
        Self {
            period,
            ticks: metrics.total_ticks,
            late_ticks: metrics.late_ticks,
            max_lateness: Duration::from_nanos(metrics.max_lateness_ns),
            mean_lateness: Duration::from_secs_f64(mean_ns.max(0.0) / 1e9),
            p50_lateness: Duration::from_nanos(metrics.p50_ns()),
            p99_lateness: Duration::from_nanos(metrics.p99_ns()),
            resyncs,
            dropped_ticks,
        }
    }

    /// Fraction of ticks that were late, `[0, 1]`.
    pub fn late_rate(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.late_ticks as f64 / self.ticks as f64
    }
}
