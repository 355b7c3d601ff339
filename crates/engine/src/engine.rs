//! Engine lifecycle: the dedicated tick thread and its handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::Receiver;
use stickflow_atomic::LoopCounters;
use stickflow_pipeline::{ActiveChain, ChainSlot, GameProfile, RuleChain};
use stickflow_scheduler::TickScheduler;
use tracing::{error, info, warn};

use crate::config::StickflowConfig;
use crate::error::EngineError;
use crate::events::{EVENT_CAPACITY, EngineEvent, EventPublisher, event_channel};
use crate::input::SharedInput;
use crate::ports::OutputSink;
use crate::tick::{LoopReport, TickPipeline};

/// Name of the tick thread.
pub const TICK_THREAD_NAME: &str = "stickflow-tick";

/// What the tick thread hands back when it ends.
#[derive(Debug)]
struct LoopOutcome {
    report: LoopReport,
    result: Result<u64, EngineError>,
}

/// Runs the rule pipeline on a dedicated fixed-tick thread.
///
/// The transport writes [`SharedInput`]; the engine reads it once per tick,
/// conditions it, runs the current rule chain and hands the frame to the
/// sink. A new chain can be published from any thread with
/// [`Engine::replace_chain`] and is adopted at the next tick boundary.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stickflow_engine::{Engine, NullSink, SharedInput, StickflowConfig, build_rule_chain};
///
/// let config = StickflowConfig::sample();
/// let mut engine = Engine::new(&config, Arc::new(SharedInput::new()));
/// engine.start(build_rule_chain(&config.macros)?, NullSink)?;
/// std::thread::sleep(std::time::Duration::from_millis(50));
/// engine.stop()?;
/// # Ok::<(), stickflow_engine::EngineError>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    period: Duration,
    profile: GameProfile,
    input: Arc<SharedInput>,
    slot: Arc<ChainSlot>,
    counters: Arc<LoopCounters>,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    events_tx: EventPublisher,
    events_rx: Receiver<EngineEvent>,
    tick_thread: Option<JoinHandle<LoopOutcome>>,
    last_report: Option<LoopReport>,
}

impl Engine {
    /// Create a stopped engine for `config`, reading from `input`.
    pub fn new(config: &StickflowConfig, input: Arc<SharedInput>) -> Self {
        let (events_tx, events_rx) = event_channel(EVENT_CAPACITY);
        Self {
            period: config.tick_period(),
            profile: config.game_profile(),
            input,
            slot: Arc::new(ChainSlot::new()),
            counters: Arc::new(LoopCounters::new()),
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx,
            tick_thread: None,
            last_report: None,
        }
    }

    /// Spawn the tick thread running `chain`, delivering frames to `sink`.
    ///
    /// Anything published to the chain slot before this call is ignored;
    /// `chain` is what runs first.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyRunning`] if a tick thread exists (including one
    /// that ended on a fault and has not been collected with
    /// [`Engine::stop`]), [`EngineError::Spawn`] if the thread cannot start.
    pub fn start<S>(&mut self, chain: RuleChain, sink: S) -> Result<(), EngineError>
    where
        S: OutputSink + 'static,
    {
        if self.tick_thread.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        info!(
            period_us = self.period.as_micros(),
            rules = chain.len(),
            "starting engine"
        );

        let pipeline = TickPipeline::new(
            &self.profile,
            self.period,
            Arc::clone(&self.input),
            ActiveChain::new(chain, Arc::clone(&self.slot)),
            sink,
            Arc::clone(&self.counters),
        )
        .with_events(self.events_tx.clone());
        let scheduler = TickScheduler::new(self.period);

        self.stop.store(false, Ordering::Release);
        self.running.store(true, Ordering::Release);

        let stop = Arc::clone(&self.stop);
        let running = Arc::clone(&self.running);
        let events = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name(TICK_THREAD_NAME.to_string())
            .spawn(move || tick_thread_main(pipeline, scheduler, &stop, &running, &events));

        match spawned {
            Ok(handle) => {
                self.tick_thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                error!(error = %e, "failed to spawn tick thread");
                Err(EngineError::Spawn(e))
            }
        }
    }

    /// Signal the tick thread to stop and wait for it.
    ///
    /// The stop flag is polled once per tick boundary, so this returns within
    /// about one period. Does nothing if no thread was started.
    ///
    /// # Errors
    ///
    /// The fault that ended the loop, or [`EngineError::TickThreadPanicked`].
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let Some(handle) = self.tick_thread.take() else {
            return Ok(());
        };

        info!("stopping engine");
        self.stop.store(true, Ordering::Release);

        let joined = handle.join();
        self.running.store(false, Ordering::Release);
        match joined {
            Ok(outcome) => {
                self.last_report = Some(outcome.report);
                let ticks = outcome.result?;
                info!(ticks, "engine stopped");
                Ok(())
            }
            Err(_) => {
                error!("tick thread panicked");
                Err(EngineError::TickThreadPanicked)
            }
        }
    }

    /// Publish a new chain; the tick thread adopts it at its next tick
    /// boundary. Returns the chain's version. Callable from any thread
    /// through [`Engine::chain_slot`].
    pub fn replace_chain(&self, chain: RuleChain) -> u64 {
        let rules = chain.len();
        let version = self.slot.publish(chain);
        info!(version, rules, "published rule chain");
        version
    }

    /// Handle for publishing chains from other threads.
    pub fn chain_slot(&self) -> Arc<ChainSlot> {
        Arc::clone(&self.slot)
    }

    /// Whether the tick thread is running. Turns false as soon as the loop
    /// ends, including on a fault.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Loop counters, shared with the tick thread.
    pub fn counters(&self) -> Arc<LoopCounters> {
        Arc::clone(&self.counters)
    }

    /// Loop events. Every clone of the receiver competes for the same events.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events_rx.clone()
    }

    /// The shared input the engine reads.
    pub fn input(&self) -> &Arc<SharedInput> {
        &self.input
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timing summary of the most recently stopped loop.
    pub fn last_report(&self) -> Option<&LoopReport> {
        self.last_report.as_ref()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.tick_thread.is_some() {
            warn!("engine dropped while running, stopping");
            if let Err(e) = self.stop() {
                warn!(error = %e, "tick loop ended with error");
            }
        }
    }
}

fn tick_thread_main<S: OutputSink>(
    mut pipeline: TickPipeline<S>,
    mut scheduler: TickScheduler,
    stop: &AtomicBool,
    running: &AtomicBool,
    events: &EventPublisher,
) -> LoopOutcome {
    let period = scheduler.period();
    info!(period_us = period.as_micros(), "tick thread started");
    events.publish(EngineEvent::Started {
        period_us: u64::try_from(period.as_micros()).unwrap_or(u64::MAX),
    });

    let result = scheduler.run_until(stop, |tick| pipeline.run_tick(tick).map(|_| ()));
    running.store(false, Ordering::Release);

    let resyncs = scheduler.resyncs();
    let dropped = scheduler.dropped_ticks();
    let report = LoopReport::from_metrics(period, scheduler.metrics_mut(), resyncs, dropped);

    match &result {
        Ok(ticks) => {
            info!(ticks = *ticks, "tick thread stopping");
            events.publish(EngineEvent::Stopped { ticks: *ticks });
        }
        Err(e) => error!(error = %e, "tick loop faulted"),
    }

    LoopOutcome { report, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{NullSink, SinkError};
    use stickflow_pipeline::OutputFrame;
    use std::time::Instant;

    #[derive(Debug)]
    struct FailAfter(u32);

    impl OutputSink for FailAfter {
        fn send(&mut self, _frame: &OutputFrame) -> Result<(), SinkError> {
            if self.0 == 0 {
                return Err(SinkError::Rejected("test".to_string()));
            }
            self.0 -= 1;
            Ok(())
        }
    }

    fn config() -> StickflowConfig {
        StickflowConfig {
            tick_ms: 2,
            ..StickflowConfig::default()
        }
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn start_and_stop() -> Result<(), EngineError> {
        let mut engine = Engine::new(&config(), Arc::new(SharedInput::new()));
        assert!(!engine.is_running());

        engine.start(RuleChain::new(), NullSink)?;
        assert!(engine.is_running());
        let counters = engine.counters();
        assert!(wait_for(|| counters.total_ticks() >= 5));

        engine.stop()?;
        assert!(!engine.is_running());
        let report = engine.last_report().copied();
        assert!(report.is_some_and(|r| r.ticks >= 5 && r.period == Duration::from_millis(2)));
        Ok(())
    }

    #[test]
    fn second_start_is_rejected() -> Result<(), EngineError> {
        let mut engine = Engine::new(&config(), Arc::new(SharedInput::new()));
        engine.start(RuleChain::new(), NullSink)?;
        assert!(matches!(
            engine.start(RuleChain::new(), NullSink),
            Err(EngineError::AlreadyRunning)
        ));
        engine.stop()
    }

    #[test]
    fn stop_without_start_is_ok() {
        let mut engine = Engine::new(&config(), Arc::new(SharedInput::new()));
        assert!(engine.stop().is_ok());
        assert!(engine.last_report().is_none());
    }

    #[test]
    fn sink_fault_ends_loop_and_surfaces_on_stop() {
        let mut engine = Engine::new(&config(), Arc::new(SharedInput::new()));
        let events = engine.events();
        assert!(engine.start(RuleChain::new(), FailAfter(3)).is_ok());

        assert!(wait_for(|| !engine.is_running()));
        assert!(matches!(engine.stop(), Err(EngineError::Sink { tick: 3, .. })));
        assert_eq!(engine.counters().total_ticks(), 3);

        let seen: Vec<_> = events.try_iter().collect();
        assert!(matches!(seen.first(), Some(EngineEvent::Started { .. })));
        assert!(seen.iter().any(|e| matches!(e, EngineEvent::Faulted { tick: 3, .. })));
    }

    #[test]
    fn engine_can_restart_after_stop() -> Result<(), EngineError> {
        let mut engine = Engine::new(&config(), Arc::new(SharedInput::new()));
        engine.start(RuleChain::new(), NullSink)?;
        engine.stop()?;
        engine.start(RuleChain::new(), NullSink)?;
        assert!(engine.is_running());
        engine.stop()
    }
}
