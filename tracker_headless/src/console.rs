// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use async_trait::async_trait;
use module_core::{EventKind, Module, ModuleCtx};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracking_session::ui::{Notification, TrackButton, TrackingUi};

/// Terminal stand in for the driver page.
///
/// The bus is fixed on the command line, button changes and notifications
/// are written to the terminal.
pub struct ConsoleUi {
    bus_id: String,
    button: Mutex<TrackButton>,
}

impl ConsoleUi {
    pub fn new(bus_id: &str) -> Self {
        ConsoleUi {
            bus_id: bus_id.to_string(),
            button: Mutex::new(TrackButton::START),
        }
    }

    pub fn button(&self) -> TrackButton {
        *self.button.lock().unwrap_or_else(|button| button.into_inner())
    }
}

impl TrackingUi for ConsoleUi {
    fn selected_bus_id(&self) -> String {
        self.bus_id.clone()
    }

    fn set_track_button(&self, button: TrackButton) {
        info!("[{}]", button.label);
        *self.button.lock().unwrap_or_else(|button| button.into_inner()) = button;
    }

    fn notify(&self, notification: Notification) {
        println!("{notification}");
    }
}

/// What a line typed on the terminal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Quit,
}

impl ConsoleCommand {
    /// `q` or `quit` ends the program, any other line presses the track button.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "q" | "quit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Toggle,
        }
    }
}

/// Turns lines read from stdin into toggle and quit events.
pub struct ConsoleInput {
    ctx: ModuleCtx,
}

impl ConsoleInput {
    pub fn new(ctx: ModuleCtx) -> Self {
        ConsoleInput { ctx }
    }
}

#[async_trait]
impl Module for ConsoleInput {
    async fn run(&mut self) -> Result<(), ()> {
        println!("Press <Enter> to start or stop tracking, type q to quit.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut run = true;
        while run {
            tokio::select! {
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            let kind = match ConsoleCommand::parse(&line) {
                                ConsoleCommand::Toggle => EventKind::ToggleTrackingEvent,
                                ConsoleCommand::Quit => EventKind::QuitEvent,
                            };
                            let _ = self.ctx.publish_event(kind);
                        }
                        Ok(None) => {
                            debug!("stdin closed, waiting for quit");
                            stdin_open = false;
                        }
                        Err(e) => {
                            debug!("Failed to read stdin. Error: {e}");
                            stdin_open = false;
                        }
                    }
                }
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => {
                            if let EventKind::QuitEvent = event.kind {
                                run = false;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => run = false,
                        Err(_) => (),
                    }
                }
            }
        }
        Ok(())
    }
}
