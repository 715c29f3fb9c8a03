//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use csvpad::{App, EditorConfig, StateBus, StateChange};
use csvpad::csv::LineEnding;
use tempfile::TempDir;

/// The 2-column, 3-row table used across scenarios
pub const SAMPLE: &str = "a,b\n1,2\n3,4\n5,6\n";

/// Temporary directory holding CSV fixtures
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `content` to `name` inside the fixture directory
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }
}

/// An app that saves with `\n` so written files can be compared literally
pub fn test_app() -> App {
    App::new(EditorConfig {
        line_ending: LineEnding::Lf,
        ..EditorConfig::default()
    })
}

/// Shared log of every change an observer received
pub type ChangeLog = Rc<RefCell<Vec<StateChange>>>;

/// Subscribe an observer that records every change into the returned log
pub fn record(bus: &mut StateBus) -> ChangeLog {
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(move |change: &StateChange, _bus: &mut StateBus| {
        sink.borrow_mut().push(change.clone());
    });
    log
}

/// Same as [`record`], for an app
pub fn record_app(app: &mut App) -> ChangeLog {
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    app.subscribe(move |change: &StateChange, _bus: &mut StateBus| {
        sink.borrow_mut().push(change.clone());
    });
    log
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
