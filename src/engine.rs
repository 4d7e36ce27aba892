use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use crossbeam_channel::Receiver;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::TrackerConfig,
    dispatch::{DecodeError, Dispatcher},
    handlers::{self, BehaviorObservation, Collaborators, Tracker},
    projection::{DisplayStats, ProjectionUpdate, Projector},
    protocol::{BehaviorFrame, IncomingMessage, TelemetryEvent},
    run_state::RunState,
};

struct Shared {
    tracker: Tracker,
    projector: Projector,
}

// Entry point for both inbound channels. The telemetry callback and the
// per-frame behavior callback may run on different threads; both go through
// the same lock.
pub struct Engine {
    dispatcher: Dispatcher<Tracker>,
    shared: Mutex<Shared>,
}

impl Engine {
    pub fn new(tracker: Tracker, projector: Projector) -> Self {
        let mut dispatcher = Dispatcher::new();
        handlers::register_all(&mut dispatcher);
        Self {
            dispatcher,
            shared: Mutex::new(Shared { tracker, projector }),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let collaborators: Collaborators = config.load_collaborators()?;
        let tracker = Tracker::new(collaborators, config.tracker_settings());
        let projector = Projector::new(config.playstyle_seed, config.resolve_names);
        info!(
            grace_secs = config.item_pickup_grace_secs,
            resolve_names = config.resolve_names,
            "tracker engine ready"
        );
        Ok(Self::new(tracker, projector))
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> Receiver<ProjectionUpdate> {
        self.lock().projector.subscribe()
    }

    pub fn snapshot(&self) -> Option<DisplayStats> {
        self.lock().projector.current().cloned()
    }

    pub fn with_state<R>(&self, read: impl FnOnce(&RunState) -> R) -> R {
        read(&self.lock().tracker.state)
    }

    pub fn handle_message(&self, message: &IncomingMessage) -> Result<bool, DecodeError> {
        match message {
            IncomingMessage::Telemetry(event) => self.handle_event(event),
            IncomingMessage::Behaviors(frame) => Ok(self.observe_frame(frame)),
        }
    }

    pub fn handle_event(&self, event: &TelemetryEvent) -> Result<bool, DecodeError> {
        self.handle_raw(&event.name, &event.value, event.timestamp)
    }

    pub fn handle_raw(&self, name: &str, payload: &Value, timestamp: f64) -> Result<bool, DecodeError> {
        let event = match self.dispatcher.decode(name, payload, timestamp) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(name, timestamp, "unhandled telemetry event");
                return Ok(false);
            }
            Err(err) => {
                warn!(?err, name, timestamp, "dropping malformed telemetry event");
                return Err(err);
            }
        };

        let mut guard = self.lock();
        let Shared { tracker, projector } = &mut *guard;
        tracker.state.begin_event(timestamp);
        self.dispatcher.invoke(tracker, &event);
        projector.refresh(tracker);
        Ok(true)
    }

    pub fn observe_frame(&self, frame: &BehaviorFrame) -> bool {
        self.observe_behaviors(&frame.behaviors)
    }

    pub fn observe_behaviors(&self, observations: &[BehaviorObservation]) -> bool {
        let mut guard = self.lock();
        let Shared { tracker, projector } = &mut *guard;
        let changed = tracker.observe_behaviors(observations);
        if changed {
            projector.refresh(tracker);
        }
        changed
    }
}
