use std::cell::RefCell;
use std::rc::Rc;

use crate::sound::SoundEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Something the presentation layer should show or play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Notify { message: String, severity: Severity },
    Modal { title: String, lines: Vec<String> },
    Sound(SoundEvent),
}

impl UiEvent {
    pub fn notify<S: Into<String>>(message: S, severity: Severity) -> Self {
        UiEvent::Notify {
            message: message.into(),
            severity,
        }
    }
}

/// Receiver for the widget's outgoing events
pub trait UiSink {
    fn emit(&mut self, event: UiEvent);
}

impl UiSink for Vec<UiEvent> {
    fn emit(&mut self, event: UiEvent) {
        self.push(event);
    }
}

/// Queue shared between the widget and its host; clones see the same events
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    events: Rc<RefCell<Vec<UiEvent>>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything emitted so far
    pub fn drain(&self) -> Vec<UiEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl UiSink for SharedSink {
    fn emit(&mut self, event: UiEvent) {
        self.events.borrow_mut().push(event);
    }
}
