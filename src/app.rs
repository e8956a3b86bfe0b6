use crate::config::Config;
use crate::model::{CommandOutcome, Indicator, MenuDisplayState, VpnAction};
use crate::monitor::StatusCollector;
use crate::reconciler::StateReconciler;
use crate::runner::CommandWorker;
use crate::scheduler::{Scheduler, TICK_PERIOD};
use crate::ui::tray::TrayManager;
use std::time::{Instant, SystemTime};
use tao::event_loop::ControlFlow;

pub struct App {
    collector: StatusCollector,
    reconciler: StateReconciler,
    display: MenuDisplayState,
    scheduler: Scheduler,
    worker: CommandWorker,
    tray: Option<TrayManager>,
}

impl App {
    pub fn new(config: &Config, worker: CommandWorker) -> Self {
        Self::with_collector(
            StatusCollector::for_cli_dir(&config.pvpn_dir, config.show_usage),
            worker,
        )
    }

    pub fn with_collector(collector: StatusCollector, worker: CommandWorker) -> Self {
        Self {
            collector,
            reconciler: StateReconciler::new(),
            display: MenuDisplayState::default(),
            scheduler: Scheduler::new(TICK_PERIOD),
            worker,
            tray: None,
        }
    }

    /// Shows the tray, arms the timer and ticks once without waiting.
    /// Without a tray the display state is still kept current.
    pub fn start(&mut self, tray: Option<TrayManager>, now: Instant) {
        self.tray = tray;
        self.scheduler.start(now);
        self.tick();
    }

    /// Deregisters the timer. The caller exits the loop afterwards.
    pub fn stop(&mut self) {
        if self.scheduler.is_running() {
            self.scheduler.stop();
            tracing::info!("tick timer stopped");
        }
    }

    pub fn tick_if_due(&mut self, now: Instant) {
        if self.scheduler.due(now) {
            self.tick();
        }
    }

    pub fn control_flow(&self) -> ControlFlow {
        self.scheduler.control_flow()
    }

    pub fn tick(&mut self) {
        let snapshot = self.collector.poll();
        let change = self
            .reconciler
            .reconcile(&snapshot, SystemTime::now(), &mut self.display);
        self.render(change);
    }

    pub fn request(&self, action: VpnAction) {
        tracing::info!(%action, "requested");
        self.worker.submit(action);
    }

    /// Outcomes come back through the event loop so only this thread
    /// touches the connection flags.
    pub fn on_outcome(&mut self, outcome: CommandOutcome) {
        self.reconciler.apply_outcome(&outcome);
        tracing::debug!(
            action = %outcome.action,
            kind = ?outcome.kind,
            sample = %outcome.raw_output_sample,
            state = ?self.reconciler.status().state(),
            "command outcome applied"
        );
    }

    fn render(&mut self, change: Option<Indicator>) {
        if let Some(tray) = &mut self.tray {
            tray.update(&self.display, change);
        }
    }
}
