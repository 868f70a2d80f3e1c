//! Host control signals and the frame driver
//!
//! Pause, resume and reset can arrive at any time from any thread. They are
//! queued on a channel and applied by the driver only between frames, so a
//! signal never lands in the middle of a step.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::sim::{Simulation, StepStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlEvent {
    /// Stop stepping
    Pause,
    /// Start stepping again from a fresh time baseline
    Resume,
    /// Re-randomize all particles
    Reset,
}

impl ControlEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlEvent::Pause => "pause",
            ControlEvent::Resume => "resume",
            ControlEvent::Reset => "reset",
        }
    }

    /// Parse a plain-text control message
    pub fn from_message(message: &str) -> Option<Self> {
        match message.trim().to_lowercase().as_str() {
            "pause" => Some(ControlEvent::Pause),
            "resume" | "play" => Some(ControlEvent::Resume),
            "reset" => Some(ControlEvent::Reset),
            _ => None,
        }
    }
}

/// Sending half of a control queue; cheap to clone, usable from any thread
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: Sender<ControlEvent>,
}

impl ControlSender {
    /// Queue an event. Returns false once the driver has gone away.
    pub fn send(&self, event: ControlEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Receiving half, owned by the frame driver
#[derive(Debug)]
pub struct ControlQueue {
    rx: Receiver<ControlEvent>,
}

/// A connected sender and queue
pub fn channel() -> (ControlSender, ControlQueue) {
    let (tx, rx) = mpsc::channel();
    (ControlSender { tx }, ControlQueue { rx })
}

impl ControlQueue {

    /// Everything queued so far, in arrival order
    pub fn drain(&self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

/// Drives a simulation one frame at a time, applying queued control events
/// at frame boundaries
pub struct FrameDriver {
    sim: Simulation,
    queue: ControlQueue,
}

impl FrameDriver {
    pub fn new(sim: Simulation) -> (Self, ControlSender) {
        let (sender, queue) = channel();
        (Self { sim, queue }, sender)
    }

    /// Apply pending control events, then step by the time elapsed since
    /// the previous frame. `now` is a monotonic timestamp. Returns `None` if
    /// the simulation is paused.
    pub fn frame(&mut self, now: f64) -> Option<StepStats> {
        for event in self.queue.drain() {
            self.apply(event, now);
        }
        self.sim.frame(now)
    }

    /// Apply one control event immediately
    pub fn apply(&mut self, event: ControlEvent, now: f64) {
        log::debug!("Control event: {}", event.as_str());
        match event {
            ControlEvent::Pause => self.sim.pause(),
            ControlEvent::Resume => self.sim.resume(now),
            ControlEvent::Reset => self.sim.reset(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn into_simulation(self) -> Simulation {
        self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn driver() -> (FrameDriver, ControlSender) {
        let sim = Simulation::new(Variant::NonInteracting.config().with_seed(21)).unwrap();
        FrameDriver::new(sim)
    }

    #[test]
    fn test_message_parsing() {
        assert_eq!(ControlEvent::from_message("pause"), Some(ControlEvent::Pause));
        assert_eq!(ControlEvent::from_message(" Resume\n"), Some(ControlEvent::Resume));
        assert_eq!(ControlEvent::from_message("reset"), Some(ControlEvent::Reset));
        assert_eq!(ControlEvent::from_message("stop"), None);
    }

    #[test]
    fn test_channel_drains_in_order() {
        let (sender, queue) = channel();
        let other = sender.clone();
        sender.send(ControlEvent::Pause);
        other.send(ControlEvent::Reset);
        assert_eq!(queue.drain(), vec![ControlEvent::Pause, ControlEvent::Reset]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_events_apply_between_frames() {
        let (mut driver, sender) = driver();
        assert!(driver.frame(0.0).is_some());
        assert!(driver.frame(16.0).is_some());

        assert!(sender.send(ControlEvent::Pause));
        assert!(driver.frame(32.0).is_none());
        assert!(!driver.simulation().is_playing());
        let paused_at = driver.simulation().time();
        assert!(driver.frame(10_000.0).is_none());
        assert_eq!(driver.simulation().time(), paused_at);

        // Resume baseline is the frame time, so no catch-up step
        sender.send(ControlEvent::Resume);
        assert_eq!(driver.frame(20_000.0).unwrap().elapsed, 0.0);
        assert_eq!(driver.frame(20_016.0).unwrap().elapsed, 16.0);
    }

    #[test]
    fn test_events_apply_in_arrival_order() {
        let (mut driver, sender) = driver();
        driver.frame(0.0);
        sender.send(ControlEvent::Pause);
        sender.send(ControlEvent::Resume);
        assert!(driver.frame(16.0).is_some());

        sender.send(ControlEvent::Resume);
        sender.send(ControlEvent::Pause);
        assert!(driver.frame(32.0).is_none());
    }

    #[test]
    fn test_reset_from_another_thread() {
        let (mut driver, sender) = driver();
        driver.frame(0.0);
        driver.frame(100.0);
        assert!(driver.simulation().time() > 0.0);

        std::thread::spawn(move || {
            sender.send(ControlEvent::Reset);
        })
        .join()
        .unwrap();

        driver.frame(116.0);
        // Reset zeroes the clock, then this frame adds its own 16
        assert_eq!(driver.simulation().time(), 16.0);
    }

    #[test]
    fn test_send_after_driver_dropped() {
        let (driver, sender) = driver();
        drop(driver);
        assert!(!sender.send(ControlEvent::Pause));
    }
}
