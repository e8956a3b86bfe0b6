mod app;
mod cli;
mod config;
mod error;
mod logger;
mod model;
mod monitor;
mod reconciler;
mod runner;
mod scheduler;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::Args;
use config::Config;
use model::CommandOutcome;
use runner::{CommandRunner, CommandWorker, ProcessExecutor};
use std::time::Instant;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tray_icon::menu::MenuEvent;
use tray_icon::TrayIconEvent;
use ui::tray::{menu_action, MenuAction, TrayManager};

#[derive(Debug)]
enum UserEvent {
    Menu(MenuEvent),
    CommandFinished(CommandOutcome),
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, warning) = Config::load(&args);
    logger::init(&config.log_filter);
    if let Some(warning) = warning {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        pvpn_dir = %config.pvpn_dir.display(),
        elevation = config.elevation.program(),
        show_usage = config.show_usage,
        "starting"
    );

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    let menu_proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = menu_proxy.send_event(UserEvent::Menu(event));
    }));
    // Clicks and hovers on the icon itself carry no action; the menu does.
    TrayIconEvent::set_event_handler(Some(|event: TrayIconEvent| {
        tracing::trace!(?event, "tray icon event ignored");
    }));

    let outcome_proxy = event_loop.create_proxy();
    let runner = CommandRunner::new(ProcessExecutor, config.elevation, config.cli_binary.clone());
    let worker = CommandWorker::spawn(runner, move |outcome| {
        let _ = outcome_proxy.send_event(UserEvent::CommandFinished(outcome));
    })
    .context("starting command worker")?;

    let mut app = App::new(&config, worker);

    event_loop.run(move |event, _, control_flow| {
        if *control_flow == ControlFlow::Exit {
            return;
        }

        match event {
            // The tray needs the toolkit running before it can be created.
            Event::NewEvents(StartCause::Init) => match TrayManager::new() {
                Ok(tray) => app.start(Some(tray), Instant::now()),
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "cannot create tray icon");
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            },
            Event::UserEvent(UserEvent::Menu(event)) => match menu_action(&event.id) {
                Some(MenuAction::Vpn(action)) => app.request(action),
                Some(MenuAction::Quit) => {
                    app.stop();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                None => {}
            },
            Event::UserEvent(UserEvent::CommandFinished(outcome)) => app.on_outcome(outcome),
            _ => {}
        }

        app.tick_if_due(Instant::now());
        *control_flow = app.control_flow();
    });
}
