//! Async driver: feeds queued presentation commands into the orchestrator
//! and pumps its scheduler once per frame interval.

use std::time::Duration;

use shared::{domain::ViewTag, error::HeroError, protocol::InputEvent};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, trace, warn};

use crate::orchestrator::Orchestrator;

#[derive(Debug, Clone, PartialEq)]
pub enum HeroCommand {
    Input(InputEvent),
    StartPlayback,
    StopPlayback,
    ToggleAudio,
    ChangeView(ViewTag),
    GoBack,
    Shutdown,
}

impl HeroCommand {
    pub fn name(&self) -> &'static str {
        match self {
            HeroCommand::Input(InputEvent::Wheel { .. }) => "input_wheel",
            HeroCommand::Input(InputEvent::TouchStart { .. }) => "input_touch_start",
            HeroCommand::Input(InputEvent::TouchMove { .. }) => "input_touch_move",
            HeroCommand::Input(InputEvent::TouchEnd) => "input_touch_end",
            HeroCommand::Input(InputEvent::Tap) => "input_tap",
            HeroCommand::Input(InputEvent::VideoTimeUpdate { .. }) => "input_video_time_update",
            HeroCommand::Input(InputEvent::VideoMetadataLoaded { .. }) => {
                "input_video_metadata_loaded"
            }
            HeroCommand::StartPlayback => "start_playback",
            HeroCommand::StopPlayback => "stop_playback",
            HeroCommand::ToggleAudio => "toggle_audio",
            HeroCommand::ChangeView(_) => "change_view",
            HeroCommand::GoBack => "go_back",
            HeroCommand::Shutdown => "shutdown",
        }
    }
}

/// Queues a command without waiting. A full queue is reported rather than
/// blocking the caller's event handler.
pub fn dispatch_command(
    cmd_tx: &mpsc::Sender<HeroCommand>,
    cmd: HeroCommand,
) -> Result<(), HeroError> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            debug!(command = cmd_name, "queued hero command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            warn!(command = cmd_name, "hero command queue is full");
            Err(HeroError::CommandQueueFull)
        }
        Err(TrySendError::Closed(_)) => Err(HeroError::RuntimeClosed),
    }
}

pub struct HeroRuntime {
    orchestrator: Orchestrator,
    commands: mpsc::Receiver<HeroCommand>,
    frame_interval: Duration,
}

impl HeroRuntime {
    pub fn new(orchestrator: Orchestrator, capacity: usize) -> (Self, mpsc::Sender<HeroCommand>) {
        let (cmd_tx, commands) = mpsc::channel(capacity.max(1));
        let frame_interval = Duration::from_millis(orchestrator.settings().frame_interval_ms);
        (
            Self {
                orchestrator,
                commands,
                frame_interval,
            },
            cmd_tx,
        )
    }

    /// Runs until `Shutdown` arrives or every sender is gone, then tears the
    /// orchestrator down and hands it back for inspection.
    pub async fn run(mut self) -> Orchestrator {
        self.orchestrator.activate();
        let started = Instant::now();
        let mut frames = time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            frame_interval_ms = self.frame_interval.as_millis() as u64,
            "hero runtime started"
        );

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    let now_ms = elapsed_ms(started);
                    match cmd {
                        Some(HeroCommand::Shutdown) => {
                            info!("hero runtime shutdown requested");
                            break;
                        }
                        Some(cmd) => self.apply(cmd, now_ms),
                        None => {
                            info!("hero command channel closed");
                            break;
                        }
                    }
                }
                _ = frames.tick() => {
                    self.orchestrator.tick(elapsed_ms(started));
                }
            }
        }

        self.orchestrator.teardown();
        self.orchestrator
    }

    fn apply(&mut self, cmd: HeroCommand, now_ms: u64) {
        let cmd_name = cmd.name();
        if let HeroCommand::Input(event) = cmd {
            let disposition = self.orchestrator.handle_input(event, now_ms);
            trace!(command = cmd_name, ?disposition, now_ms, "input applied");
            return;
        }

        self.orchestrator.tick(now_ms);
        match cmd {
            HeroCommand::StartPlayback => self.orchestrator.start_playback(),
            HeroCommand::StopPlayback => self.orchestrator.stop_playback(),
            HeroCommand::ToggleAudio => self.orchestrator.toggle_audio(),
            HeroCommand::ChangeView(view) => {
                if let Err(err) = self.orchestrator.change_view(view) {
                    warn!(command = cmd_name, error = %err, "hero command failed");
                }
            }
            HeroCommand::GoBack => self.orchestrator.go_back(),
            HeroCommand::Input(_) | HeroCommand::Shutdown => {}
        }
        debug!(command = cmd_name, now_ms, "hero command applied");
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
