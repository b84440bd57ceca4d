//! Scripted audio backend for tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::playback::engine::{AudioBackend, AudioEvent, AudioInstance};

#[derive(Default)]
struct FakeLog {
    loaded: Vec<String>,
    failing: HashSet<String>,
    halted: usize,
    latest_events: Option<Arc<Mutex<VecDeque<AudioEvent>>>>,
}

/// Records loads and halts; clips listed with [`FakeBackend::fail_url`] fail to load.
#[derive(Clone, Default)]
pub struct FakeBackend {
    log: Arc<Mutex<FakeLog>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_url(&self, url: &str) {
        self.log.lock().unwrap().failing.insert(url.to_string());
    }

    pub fn loaded(&self) -> Vec<String> {
        self.log.lock().unwrap().loaded.clone()
    }

    pub fn halted(&self) -> usize {
        self.log.lock().unwrap().halted
    }

    /// Queues an event on the most recently loaded instance.
    pub fn push_event(&self, event: AudioEvent) {
        if let Some(events) = &self.log.lock().unwrap().latest_events {
            events.lock().unwrap().push_back(event);
        }
    }
}

pub struct FakeInstance {
    log: Arc<Mutex<FakeLog>>,
    events: Arc<Mutex<VecDeque<AudioEvent>>>,
}

impl AudioInstance for FakeInstance {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn halt(&mut self) {
        self.log.lock().unwrap().halted += 1;
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        self.events.lock().unwrap().pop_front()
    }
}

impl AudioBackend for FakeBackend {
    type Instance = FakeInstance;

    fn load(&self, url: &str) -> Result<FakeInstance> {
        let mut log = self.log.lock().unwrap();
        if log.failing.contains(url) {
            return Err(Error::Playback(format!("cannot decode {}", url)));
        }
        log.loaded.push(url.to_string());
        let events = Arc::new(Mutex::new(VecDeque::new()));
        log.latest_events = Some(Arc::clone(&events));
        Ok(FakeInstance {
            log: Arc::clone(&self.log),
            events,
        })
    }
}
