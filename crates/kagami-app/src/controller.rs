use std::time::Duration;

use kagami_translator::JobReport;
use kagami_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::console::console_io;
use crate::overlay::{Overlay, overlay_loop};

/// Centralized channel management
pub struct ChannelSet {
    /// Pointer, command and persona events into the overlay loop
    pub input: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Finished jobs from workers back to the overlay loop
    pub reports: (AsyncSender<JobReport>, AsyncReceiver<JobReport>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            input: kanal::bounded_async(256), // pointer bursts
            reports: kanal::bounded_async(16),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            channels: ChannelSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn report_sender(&self) -> AsyncSender<JobReport> {
        self.channels.reports.0.clone()
    }

    pub fn spawn_tasks(&self, overlay: Overlay, tick: Duration) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Overlay loop
        tasks.spawn(overlay_loop(
            overlay,
            self.channels.input.1.clone(),
            self.channels.reports.1.clone(),
            tick,
            self.cancel_token.clone(),
        ));

        // Console input
        tasks.spawn(console_io(
            self.channels.input.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
