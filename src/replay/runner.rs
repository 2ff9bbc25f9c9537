use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::debug;
use serde::Serialize;

use super::scenario::{DOCUMENT, Scenario, Step};
use crate::config::{Config, OutputFormat};
use crate::error::ScrollSpyError;
use crate::host::{Container, ElementId, MemoryHost};
use crate::spy::{Disposer, ScrollSpy, SpyCallback, StateCallback};

/// A callback invocation observed during a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayEvent {
    Spy { name: String, x: f64, y: f64 },
    State { name: String },
}

impl fmt::Display for ReplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayEvent::Spy { name, x, y } => write!(f, "spy {} {} {}", name, x, y),
            ReplayEvent::State { name } => write!(f, "state {}", name),
        }
    }
}

type EventLog = Rc<RefCell<Vec<ReplayEvent>>>;

struct Replay<'a> {
    config: &'a Config,
    host: Rc<MemoryHost>,
    spy: ScrollSpy<Rc<MemoryHost>>,
    events: EventLog,
    elements: HashMap<String, ElementId>,
    disposers: HashMap<String, Disposer>,
    // Named callbacks keep their identity across steps.
    spies: HashMap<String, SpyCallback>,
    states: HashMap<String, StateCallback>,
}

impl<'a> Replay<'a> {
    fn new(scenario: &Scenario, config: &'a Config) -> Self {
        let host = Rc::new(MemoryHost::new());
        host.set_page_offset_supported(scenario.document.page_offset);
        host.set_compat_mode(scenario.document.compat_mode);

        let elements = scenario
            .elements
            .iter()
            .map(|name| (name.clone(), host.create_element()))
            .collect();

        Self {
            config,
            spy: ScrollSpy::new(host.clone()),
            host,
            events: Rc::new(RefCell::new(Vec::new())),
            elements,
            disposers: HashMap::new(),
            spies: HashMap::new(),
            states: HashMap::new(),
        }
    }

    fn container(&self, name: &str) -> Result<Container<ElementId>, ScrollSpyError> {
        if name == DOCUMENT {
            return Ok(Container::Document);
        }
        self.elements
            .get(name)
            .map(|id| Container::Element(*id))
            .ok_or_else(|| ScrollSpyError::InvalidScenario(format!("unknown container '{}'", name)))
    }

    fn spy_callback(&mut self, name: &str) -> SpyCallback {
        let events = self.events.clone();
        self.spies
            .entry(name.to_string())
            .or_insert_with(|| {
                let name = name.to_string();
                SpyCallback::new(move |x, y| {
                    events.borrow_mut().push(ReplayEvent::Spy {
                        name: name.clone(),
                        x,
                        y,
                    })
                })
            })
            .clone()
    }

    fn state_callback(&mut self, name: &str) -> StateCallback {
        let events = self.events.clone();
        self.states
            .entry(name.to_string())
            .or_insert_with(|| {
                let name = name.to_string();
                StateCallback::new(move || {
                    events
                        .borrow_mut()
                        .push(ReplayEvent::State { name: name.clone() })
                })
            })
            .clone()
    }

    fn apply(&mut self, step: &Step) -> Result<(), ScrollSpyError> {
        debug!("replay step {:?}", step);
        match step {
            Step::Mount {
                container,
                label,
                throttle_ms,
                throttled,
            } => {
                let target = self.container(container)?;
                let throttle = match (throttle_ms, throttled) {
                    (Some(ms), _) => Some(Duration::from_millis(*ms)),
                    (None, true) => Some(self.config.throttle.default_interval()),
                    (None, false) => None,
                };
                let disposer = self.spy.mount(Some(target), throttle);
                // A reused label keeps the earlier mount registered but unreachable.
                if self.disposers.insert(label.clone(), disposer).is_some() {
                    debug!("label '{}' reused", label);
                }
            }
            Step::Dispose { label } => {
                let disposer = self.disposers.get(label).ok_or_else(|| {
                    ScrollSpyError::InvalidScenario(format!("unknown mount label '{}'", label))
                })?;
                disposer.dispose();
            }
            Step::Spy { container, name } => {
                let target = self.container(container)?;
                let callback = self.spy_callback(name);
                self.spy.add_spy_handler(&callback, &target)?;
            }
            Step::State { name } => {
                let callback = self.state_callback(name);
                self.spy.add_state_handler(&callback);
            }
            Step::Unmount { state, spy } => {
                let state_cb = match state {
                    Some(name) => Some(self.known_state(name)?),
                    None => None,
                };
                let spy_cb = match spy {
                    Some(name) => Some(self.known_spy(name)?),
                    None => None,
                };
                self.spy.unmount(state_cb.as_ref(), spy_cb.as_ref());
            }
            Step::Scroll { container, x, y } => {
                let target = self.container(container)?;
                self.host.scroll_to(&target, *x, *y);
            }
            Step::Advance { ms } => self.host.advance(Duration::from_millis(*ms)),
            Step::Tick => {
                self.spy.tick();
            }
            Step::Update => self.spy.update(),
            Step::UpdateStates => self.spy.update_states(),
            Step::Compat { mode } => {
                self.host.set_compat_mode(*mode);
                self.spy.refresh_document_offset();
            }
            Step::PageOffset { enabled } => {
                self.host.set_page_offset_supported(*enabled);
                self.spy.refresh_document_offset();
            }
        }
        Ok(())
    }

    fn known_spy(&self, name: &str) -> Result<SpyCallback, ScrollSpyError> {
        self.spies
            .get(name)
            .cloned()
            .ok_or_else(|| ScrollSpyError::InvalidScenario(format!("unknown spy '{}'", name)))
    }

    fn known_state(&self, name: &str) -> Result<StateCallback, ScrollSpyError> {
        self.states
            .get(name)
            .cloned()
            .ok_or_else(|| ScrollSpyError::InvalidScenario(format!("unknown state '{}'", name)))
    }
}

/// Runs every step of `scenario` and returns the callback invocations in order
pub fn run(scenario: &Scenario, config: &Config) -> Result<Vec<ReplayEvent>, ScrollSpyError> {
    let mut replay = Replay::new(scenario, config);
    for (index, step) in scenario.steps.iter().enumerate() {
        replay.apply(step).map_err(|e| match e {
            ScrollSpyError::InvalidScenario(msg) => {
                ScrollSpyError::InvalidScenario(format!("step {}: {}", index + 1, msg))
            }
            other => other,
        })?;
    }

    replay.spy.teardown();
    let events = replay.events.borrow().clone();
    Ok(events)
}

pub fn render_events(events: &[ReplayEvent], format: OutputFormat) -> Result<String, ScrollSpyError> {
    match format {
        OutputFormat::Text => Ok(events
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(events)?),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
