use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::events::{EventKind, ServerEvent};

pub type Handler<S> = Box<dyn Fn(&mut S, &ServerEvent) + Send + Sync>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {name} payload")]
    Payload {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Payload { name, .. } => *name,
        }
    }
}

struct Route<S> {
    kind: EventKind,
    handlers: Vec<Handler<S>>,
}

pub struct Dispatcher<S> {
    routes: HashMap<&'static str, Route<S>>,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<S> Dispatcher<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&mut S, &ServerEvent) + Send + Sync + 'static,
    {
        self.routes
            .entry(kind.name())
            .or_insert_with(|| Route {
                kind,
                handlers: Vec::new(),
            })
            .handlers
            .push(Box::new(handler));
    }

    pub fn decode(
        &self,
        name: &str,
        payload: &Value,
        timestamp: f64,
    ) -> Result<Option<ServerEvent>, DecodeError> {
        let Some(route) = self.routes.get(name) else {
            return Ok(None);
        };
        let value = route
            .kind
            .decode(payload)
            .map_err(|source| DecodeError::Payload {
                name: route.kind.name(),
                source,
            })?;
        Ok(Some(ServerEvent {
            kind: route.kind,
            timestamp,
            value,
        }))
    }

    pub fn invoke(&self, state: &mut S, event: &ServerEvent) {
        if let Some(route) = self.routes.get(event.kind.name()) {
            for handler in &route.handlers {
                handler(state, event);
            }
        }
    }

    pub fn dispatch(
        &self,
        state: &mut S,
        name: &str,
        payload: &Value,
        timestamp: f64,
    ) -> Result<bool, DecodeError> {
        let Some(event) = self.decode(name, payload, timestamp)? else {
            return Ok(false);
        };
        self.invoke(state, &event);
        Ok(true)
    }
}
