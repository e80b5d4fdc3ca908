//! Interactive session wiring the world, its systems and the save store.

use anyhow::{Context, Result};
use geocoin_core::{Command, Event, FixTicket, GeoPoint, SensorError};
use geocoin_system_spawning::Spawning;
use geocoin_system_status::Status;
use geocoin_world::{
    self as world,
    persistence::{self, BlobStore},
    query, World,
};
use log::warn;

use crate::{
    input::{Action, HELP},
    settings::Settings,
};

/// Result of performing one player action.
#[derive(Debug, PartialEq)]
pub(crate) enum Reply {
    /// Lines to print before prompting again.
    Show(Vec<String>),
    /// The player asked to leave.
    Quit,
}

/// Owns the world and the systems reacting to it for one play session.
pub(crate) struct Session<S> {
    world: World,
    spawning: Spawning,
    status: Status,
    store: S,
}

impl<S: BlobStore> Session<S> {
    /// Restores the saved game from `store`, or starts a fresh one.
    pub(crate) fn resume(settings: Settings, store: S) -> Result<Self> {
        let world = persistence::restore(settings.world, &store)
            .context("invalid world configuration")?;
        Ok(Self {
            world,
            spawning: Spawning::new(settings.spawning),
            status: Status::new(),
            store,
        })
    }

    /// Materializes the neighbourhood and returns the opening screen.
    pub(crate) fn open(&mut self) -> Vec<String> {
        let events = self.pump(Command::Refresh);
        let mut lines = vec![self.status.welcome_banner(&self.world).to_owned()];
        lines.extend(self.render(&events));
        lines
    }

    /// Performs `action` and returns what should be shown afterwards.
    pub(crate) fn perform(&mut self, action: Action) -> Reply {
        let mut lines = match action {
            Action::Quit => return Reply::Quit,
            Action::Help => return Reply::Show(vec![HELP.to_owned()]),
            Action::Look => return Reply::Show(self.look()),
            Action::Save => {
                return Reply::Show(vec![self
                    .persist()
                    .unwrap_or_else(|| "Game saved.".to_owned())])
            }
            Action::Move(direction) => {
                let events = self.pump(Command::MovePlayer { direction });
                self.render(&events)
            }
            Action::Collect(cell) => {
                let events = self.pump(Command::Collect { cell });
                if events.is_empty() {
                    vec![format!("Nothing to collect at {cell}.")]
                } else {
                    self.render(&events)
                }
            }
            Action::Deposit(cell) => {
                let events = self.pump(Command::Deposit { cell });
                if events.is_empty() {
                    vec![format!("Nothing to deposit at {cell}.")]
                } else {
                    self.render(&events)
                }
            }
            Action::Locate(reading) => self.locate(reading),
        };

        lines.extend(self.persist());
        Reply::Show(lines)
    }

    fn locate(&mut self, reading: Option<GeoPoint>) -> Vec<String> {
        let requested = self.pump(Command::RequestLocationFix);
        let Some(ticket) = requested.iter().find_map(|event| match event {
            Event::LocationFixRequested { ticket } => Some(*ticket),
            _ => None,
        }) else {
            return Vec::new();
        };

        self.resolve(ticket, reading.ok_or(SensorError::Unavailable))
    }

    fn resolve(&mut self, ticket: FixTicket, reading: Result<GeoPoint, SensorError>) -> Vec<String> {
        let events = self.pump(Command::ResolveLocationFix { ticket, reading });
        self.render(&events)
    }

    fn pump(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.spawning.handle(&events, &mut pending);
            self.status.handle(&events);
            log.extend(events);
        }

        log
    }

    fn render(&mut self, events: &[Event]) -> Vec<String> {
        let mut lines = Vec::new();
        for event in events {
            match event {
                Event::LocationFixFailed { error, .. } => {
                    lines.push(format!("Location fix failed: {error}"));
                }
                Event::LocationFixDiscarded { .. } => {
                    lines.push("Location fix arrived too late and was ignored.".to_owned());
                }
                _ => {}
            }
        }

        let redraw = self.status.take_redraw();
        if redraw.map {
            lines.push(self.map_line());
        }
        if redraw.panel {
            lines.push(self.status.status_panel(&self.world).to_string());
        }
        for cell in redraw.caches {
            if let Some(popup) = self.status.cache_popup(&self.world, cell) {
                lines.push(popup.to_string());
            }
        }
        lines
    }

    fn look(&mut self) -> Vec<String> {
        let _ = self.status.take_redraw();
        let mut lines = vec![
            self.map_line(),
            self.status.status_panel(&self.world).to_string(),
        ];
        for cell in query::active_caches(&self.world) {
            if let Some(popup) = self.status.cache_popup(&self.world, cell) {
                lines.push(popup.to_string());
            }
        }
        lines
    }

    fn map_line(&self) -> String {
        let position = query::player_position(&self.world);
        format!(
            "At ({:.6}, {:.6}) in cell {}; {} caches nearby.",
            position.lat(),
            position.lng(),
            query::player_cell(&self.world),
            query::active_caches(&self.world).len()
        )
    }

    fn persist(&mut self) -> Option<String> {
        match persistence::save(&self.world, &mut self.store) {
            Ok(()) => None,
            Err(error) => {
                warn!("failed to save game: {error:#}");
                Some(format!("Could not save the game: {error}"))
            }
        }
    }
}
