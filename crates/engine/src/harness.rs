//! Deterministic test harness.
//!
//! Drives the production [`TickPipeline`] from a [`ManualClock`] on the
//! calling thread, so a test controls exactly when each tick fires and what
//! the input holds at that moment.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use stickflow_atomic::{CounterSnapshot, LoopCounters};
use stickflow_pipeline::{ActiveChain, ChainSlot, OutputFrame, RuleChain};
use stickflow_scheduler::{Clock, ManualClock, SimulatedWait, TickScheduler};

use crate::config::StickflowConfig;
use crate::error::EngineError;
use crate::input::SharedInput;
use crate::ports::{OutputSink, SinkError};
use crate::tick::{LoopReport, TickPipeline};

/// Sink that keeps every frame it receives.
///
/// Clones share one recording, so a test can keep a handle while the engine
/// owns the sink.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<OutputFrame>>>,
    fail_at: Option<usize>,
}

impl RecordingSink {
    /// Record everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the frame at position `index` (zero-based) with
    /// [`SinkError::Rejected`].
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Copy of every recorded frame.
    pub fn frames(&self) -> Vec<OutputFrame> {
        self.frames.lock().clone()
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Most recent frame.
    pub fn last(&self) -> Option<OutputFrame> {
        self.frames.lock().last().copied()
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        let mut frames = self.frames.lock();
        if self.fail_at == Some(frames.len()) {
            return Err(SinkError::Rejected("scripted failure".to_string()));
        }
        frames.push(*frame);
        Ok(())
    }
}

/// Runs ticks on a manual clock, one call at a time.
///
/// # Example
///
/// ```
/// use stickflow_engine::harness::ManualHarness;
/// use stickflow_engine::{InputUpdate, StickflowConfig};
/// use stickflow_pipeline::RuleChain;
///
/// let mut harness = ManualHarness::new(&StickflowConfig::default(), RuleChain::new());
/// harness.input().apply_batch(&[InputUpdate::RightX(255)]);
/// let frame = harness.step()?;
/// assert!(frame.right_x > 0.9);
/// # Ok::<(), stickflow_engine::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ManualHarness {
    pipeline: TickPipeline<RecordingSink>,
    scheduler: TickScheduler<ManualClock, SimulatedWait>,
    clock: ManualClock,
    input: Arc<SharedInput>,
    slot: Arc<ChainSlot>,
    counters: Arc<LoopCounters>,
    recording: RecordingSink,
}

impl ManualHarness {
    /// Harness for `config` starting on `chain`, recording every frame.
    pub fn new(config: &StickflowConfig, chain: RuleChain) -> Self {
        Self::with_sink(config, chain, RecordingSink::new())
    }

    /// Harness delivering to a specific recording sink.
    pub fn with_sink(config: &StickflowConfig, chain: RuleChain, sink: RecordingSink) -> Self {
        let clock = ManualClock::new();
        let period = config.tick_period();
        let input = Arc::new(SharedInput::new());
        let slot = Arc::new(ChainSlot::new());
        let counters = Arc::new(LoopCounters::new());
        let pipeline = TickPipeline::new(
            &config.game_profile(),
            period,
            Arc::clone(&input),
            ActiveChain::new(chain, Arc::clone(&slot)),
            sink.clone(),
            Arc::clone(&counters),
        );
        let scheduler =
            TickScheduler::with_clock(period, clock.clone(), SimulatedWait::new(clock.clone()));
        Self {
            pipeline,
            scheduler,
            clock,
            input,
            slot,
            counters,
            recording: sink,
        }
    }

    /// Shared input the ticks read.
    pub fn input(&self) -> &Arc<SharedInput> {
        &self.input
    }

    /// Slot for publishing replacement chains.
    pub fn chain_slot(&self) -> &Arc<ChainSlot> {
        &self.slot
    }

    /// The harness clock. Advancing it past several deadlines before the next
    /// [`ManualHarness::step`] simulates a stall.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Whatever the tick raised; the harness can keep stepping afterwards.
    pub fn step(&mut self) -> Result<OutputFrame, EngineError> {
        let tick = self.scheduler.wait_for_tick();
        self.pipeline.run_tick(&tick)
    }

    /// Run `ticks` ticks, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first tick error.
    pub fn run(&mut self, ticks: u64) -> Result<(), EngineError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Run `ticks` ticks, calling `before` with the tick index, the shared
    /// input and the chain slot ahead of each one.
    ///
    /// # Errors
    ///
    /// The first tick error.
    pub fn run_with<F>(&mut self, ticks: u64, mut before: F) -> Result<(), EngineError>
    where
        F: FnMut(u64, &SharedInput, &ChainSlot),
    {
        for _ in 0..ticks {
            before(self.scheduler.tick_count(), &self.input, &self.slot);
            self.step()?;
        }
        Ok(())
    }

    /// Every frame delivered so far.
    pub fn frames(&self) -> Vec<OutputFrame> {
        self.recording.frames()
    }

    /// Loop counters.
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// The running pipeline.
    pub fn pipeline(&self) -> &TickPipeline<RecordingSink> {
        &self.pipeline
    }

    /// Timing summary so far.
    pub fn report(&mut self) -> LoopReport {
        let period = self.scheduler.period();
        let resyncs = self.scheduler.resyncs();
        let dropped = self.scheduler.dropped_ticks();
        LoopReport::from_metrics(period, self.scheduler.metrics_mut(), resyncs, dropped)
    }

    /// Simulated time on the harness clock.
    pub fn elapsed(&self) -> Duration {
        self.clock.now()
    }
}
