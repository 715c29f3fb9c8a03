//! StateBus - the observable session state
//!
//! Four guarded setters mutate [`SessionState`]. A setter whose value is
//! unchanged does nothing, which is what breaks observer cycles. Otherwise
//! the state is updated at once and the resulting [`StateChange`] events are
//! delivered, each to every observer in registration order, before the
//! setter returns.
//!
//! Observers receive `&mut StateBus` and may call setters. A nested setter
//! notifies synchronously as well, so its events reach the other observers
//! before it returns to the observer that called it. An observer that is
//! still running further up the stack is skipped for those nested events.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::messages::StateChange;
use crate::model::{ActiveView, SessionState};

/// Maximum number of events delivered for one outermost setter call
pub const MAX_CASCADE: usize = 256;

/// Receives every state transition
pub trait StateObserver {
    fn on_change(&mut self, change: &StateChange, bus: &mut StateBus);
}

impl<F> StateObserver for F
where
    F: FnMut(&StateChange, &mut StateBus),
{
    fn on_change(&mut self, change: &StateChange, bus: &mut StateBus) {
        self(change, bus)
    }
}

/// Handle returned by [`StateBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

type SharedObserver = Rc<RefCell<dyn StateObserver>>;

struct Subscriber {
    id: SubscriberId,
    observer: SharedObserver,
}

#[derive(Default)]
pub struct StateBus {
    state: SessionState,
    subscribers: Vec<Subscriber>,
    /// Nesting depth of event delivery (0 = idle)
    depth: usize,
    /// Events delivered since the outermost setter started
    cascade: usize,
    /// Set once the cascade limit has been hit in the current outer call
    truncated: bool,
    next_id: u64,
}

impl fmt::Debug for StateBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBus")
            .field("state", &self.state)
            .field("subscribers", &self.subscriber_count())
            .field("depth", &self.depth)
            .finish()
    }
}

impl StateBus {
    pub fn new() -> Self {
        Self::default()
    }

    // === Subscription ===

    /// Register an observer; it receives events after all earlier observers
    ///
    /// An observer added while an event is being delivered misses that event
    /// and sees everything emitted afterwards.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriberId
    where
        O: StateObserver + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            observer: Rc::new(RefCell::new(observer)),
        });
        tracing::trace!(id = id.0, "observer subscribed");
        id
    }

    /// Remove an observer, effective immediately. Returns false if `id` is
    /// not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(pos) => {
                self.subscribers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // === Accessors ===

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active_file(&self) -> Option<&Path> {
        self.state.active_file()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    pub fn active_view(&self) -> ActiveView {
        self.state.active_view
    }

    pub fn status_text(&self) -> &str {
        &self.state.status_text
    }

    pub fn window_title(&self) -> String {
        self.state.window_title()
    }

    /// Whether an event is currently being delivered
    pub fn is_delivering(&self) -> bool {
        self.depth > 0
    }

    // === Setters ===

    /// Change the open file
    ///
    /// Clearing it also forces `dirty = false` and the Blank view; opening a
    /// file switches to the Table view. The whole transition is applied
    /// before the first notification, and the file event goes out first.
    pub fn set_active_file(&mut self, file: Option<PathBuf>) -> bool {
        if self.state.active_file == file {
            return false;
        }

        let mut events = Vec::with_capacity(3);
        let old = mem::replace(&mut self.state.active_file, file.clone());
        let view = if file.is_some() {
            ActiveView::Table
        } else {
            ActiveView::Blank
        };
        let closing = file.is_none();
        events.push(StateChange::ActiveFile { old, new: file });

        if closing {
            events.extend(self.update_dirty(false));
        }
        events.extend(self.update_view(view));

        self.notify(events);
        true
    }

    /// Set the unsaved-changes flag
    ///
    /// Raising it with no active file is refused.
    pub fn set_dirty(&mut self, dirty: bool) -> bool {
        if dirty && self.state.active_file.is_none() {
            tracing::warn!("ignoring dirty=true with no active file");
            return false;
        }

        match self.update_dirty(dirty) {
            Some(event) => {
                self.notify(vec![event]);
                true
            }
            None => false,
        }
    }

    pub fn set_active_view(&mut self, view: ActiveView) -> bool {
        match self.update_view(view) {
            Some(event) => {
                self.notify(vec![event]);
                true
            }
            None => false,
        }
    }

    pub fn set_status_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.state.status_text == text {
            return false;
        }

        let old = mem::replace(&mut self.state.status_text, text.clone());
        self.notify(vec![StateChange::StatusText { old, new: text }]);
        true
    }

    /// Reset the status text to empty
    pub fn clear_status_text(&mut self) -> bool {
        self.set_status_text(String::new())
    }

    fn update_dirty(&mut self, dirty: bool) -> Option<StateChange> {
        if self.state.dirty == dirty {
            return None;
        }
        let old = mem::replace(&mut self.state.dirty, dirty);
        Some(StateChange::Dirty { old, new: dirty })
    }

    fn update_view(&mut self, view: ActiveView) -> Option<StateChange> {
        if self.state.active_view == view {
            return None;
        }
        let old = mem::replace(&mut self.state.active_view, view);
        Some(StateChange::ActiveView { old, new: view })
    }

    // === Delivery ===

    fn notify(&mut self, events: Vec<StateChange>) {
        if self.depth == 0 {
            self.cascade = 0;
            self.truncated = false;
        }

        self.depth += 1;
        for change in &events {
            if self.cascade == MAX_CASCADE {
                if !self.truncated {
                    self.truncated = true;
                    tracing::error!(
                        "state change cascade exceeded {} events, notifications dropped",
                        MAX_CASCADE
                    );
                }
                break;
            }
            self.cascade += 1;
            self.dispatch(change);
        }
        self.depth -= 1;
    }

    fn dispatch(&mut self, change: &StateChange) {
        // Snapshot, so observers may subscribe or unsubscribe while we iterate
        let current: Vec<(SubscriberId, SharedObserver)> = self
            .subscribers
            .iter()
            .map(|s| (s.id, Rc::clone(&s.observer)))
            .collect();

        for (id, observer) in current {
            if !self.subscribers.iter().any(|s| s.id == id) {
                continue;
            }
            // Busy means it is further up the stack, handling an earlier event
            let Ok(mut guard) = observer.try_borrow_mut() else {
                continue;
            };
            guard.on_change(change, self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &mut StateBus) -> Rc<RefCell<Vec<StateChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.subscribe(move |change: &StateChange, _bus: &mut StateBus| {
            sink.borrow_mut().push(change.clone());
        });
        log
    }

    #[test]
    fn test_unchanged_value_is_silent() {
        let mut bus = StateBus::new();
        let log = recorder(&mut bus);

        assert!(!bus.set_active_file(None));
        assert!(!bus.set_dirty(false));
        assert!(!bus.set_active_view(ActiveView::Blank));
        assert!(!bus.set_status_text(""));
        assert!(!bus.clear_status_text());

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_open_switches_to_table() {
        let mut bus = StateBus::new();
        let log = recorder(&mut bus);

        assert!(bus.set_active_file(Some(PathBuf::from("a.csv"))));
        assert_eq!(
            *log.borrow(),
            vec![
                StateChange::ActiveFile {
                    old: None,
                    new: Some(PathBuf::from("a.csv")),
                },
                StateChange::ActiveView {
                    old: ActiveView::Blank,
                    new: ActiveView::Table,
                },
            ]
        );
    }

    #[test]
    fn test_dirty_refused_without_file() {
        let mut bus = StateBus::new();
        let log = recorder(&mut bus);

        assert!(!bus.set_dirty(true));
        assert!(!bus.is_dirty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_observer_sees_updated_state() {
        let mut bus = StateBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |change: &StateChange, bus: &mut StateBus| {
            if let StateChange::ActiveFile { .. } = change {
                sink.borrow_mut().push((bus.is_dirty(), bus.active_view()));
            }
        });

        bus.set_active_file(Some(PathBuf::from("a.csv")));
        bus.set_dirty(true);
        bus.set_active_file(None);

        // The whole transition is applied before the first event goes out
        assert_eq!(
            *seen.borrow(),
            vec![(false, ActiveView::Table), (false, ActiveView::Blank)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = StateBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let id = bus.subscribe(move |change: &StateChange, _bus: &mut StateBus| {
            sink.borrow_mut().push(change.clone());
        });

        bus.set_status_text("one");
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.set_status_text("two");

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_observer_skips_its_own_nested_events() {
        let mut bus = StateBus::new();
        let count = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&count);
        bus.subscribe(move |change: &StateChange, bus: &mut StateBus| {
            if let StateChange::StatusText { new, .. } = change {
                *counter.borrow_mut() += 1;
                let next = if new == "ping" { "pong" } else { "ping" };
                bus.set_status_text(next);
            }
        });
        let log = recorder(&mut bus);

        bus.set_status_text("ping");

        // The toggling observer is busy while its own change goes out
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.status_text(), "pong");
        assert_eq!(log.borrow().len(), 2);
        assert!(!bus.is_delivering());
    }

    #[test]
    fn test_cascade_limit_stops_runaway_observers() {
        let mut bus = StateBus::new();
        let next_value = Rc::new(RefCell::new(0usize));

        // Three observers that each fan out into eight more changes
        for _ in 0..3 {
            let next_value = Rc::clone(&next_value);
            bus.subscribe(move |change: &StateChange, bus: &mut StateBus| {
                if let StateChange::StatusText { .. } = change {
                    for _ in 0..8 {
                        let value = {
                            let mut n = next_value.borrow_mut();
                            *n += 1;
                            *n
                        };
                        bus.set_status_text(value.to_string());
                    }
                }
            });
        }
        let log = recorder(&mut bus);

        bus.set_status_text("start");

        assert_eq!(log.borrow().len(), MAX_CASCADE);
        assert!(!bus.is_delivering());

        // The limit applies per outer call
        assert!(bus.set_active_view(ActiveView::Table));
        assert_eq!(log.borrow().len(), MAX_CASCADE + 1);
    }
}
