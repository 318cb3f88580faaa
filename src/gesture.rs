//! Wheel gesture classification.
//!
//! Trackpads and some mice keep emitting wheel events after the finger has left, with
//! slowly decaying deltas. [`InertiaFilter`] separates those from deliberate scrolling by
//! comparing the average of the older half of recent deltas with the newer half: a
//! gesture only counts as intentional while its deltas are growing.

use std::collections::VecDeque;

use instant::{Duration, Instant};
use winit::event::MouseScrollDelta;

/// Delta reported per wheel notch.
const LINE_DELTA: f64 = 120.0;
/// Scale applied to pixel deltas from trackpads.
const PIXEL_DELTA: f64 = 40.0;

/// One wheel event. Positive deltas scroll up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelSample {
    pub delta: f64,
    pub at: Instant,
}

impl WheelSample {
    pub fn new(delta: f64, at: Instant) -> Self {
        Self { delta, at }
    }

    pub fn from_scroll(delta: &MouseScrollDelta, at: Instant) -> Self {
        let delta = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y as f64 * LINE_DELTA,
            MouseScrollDelta::PixelDelta(position) => position.y * PIXEL_DELTA,
        };
        Self { delta, at }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Scene step an intentional gesture in this direction maps to.
    pub fn step(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelClass {
    Intentional(Direction),
    Inertia,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaSettings {
    /// Half the number of deltas compared per direction.
    pub stability: usize,
    /// Minimum average delta of an intentional gesture.
    pub sensitivity: f64,
    /// How much the newer half may shrink before it counts as decaying.
    pub tolerance: f64,
    /// Identical deltas within this window are treated as inertia.
    pub delay: Duration,
}

impl Default for InertiaSettings {
    fn default() -> Self {
        Self {
            stability: 8,
            sensitivity: 100.0,
            tolerance: 1.1,
            delay: Duration::from_millis(150),
        }
    }
}

/// Classifies wheel samples as intentional or inertial.
#[derive(Debug, Clone)]
pub struct InertiaFilter {
    settings: InertiaSettings,
    up: VecDeque<Option<f64>>,
    down: VecDeque<Option<f64>>,
    stamps: VecDeque<Option<Instant>>,
}

impl Default for InertiaFilter {
    fn default() -> Self {
        Self::new(InertiaSettings::default())
    }
}

impl InertiaFilter {
    pub fn new(settings: InertiaSettings) -> Self {
        let settings = InertiaSettings {
            stability: settings.stability.max(1),
            ..settings
        };
        let window = settings.stability * 2;
        Self {
            settings,
            up: VecDeque::from(vec![None; window]),
            down: VecDeque::from(vec![None; window]),
            stamps: VecDeque::from(vec![None; window]),
        }
    }

    pub fn settings(&self) -> &InertiaSettings {
        &self.settings
    }

    pub fn check(&mut self, sample: WheelSample) -> WheelClass {
        push_shift(&mut self.stamps, Some(sample.at));
        if sample.delta > 0.0 {
            push_shift(&mut self.up, Some(sample.delta));
            self.classify(Direction::Up, sample.at)
        } else {
            push_shift(&mut self.down, Some(sample.delta));
            self.classify(Direction::Down, sample.at)
        }
    }

    fn classify(&self, direction: Direction, now: Instant) -> WheelClass {
        let deltas = match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        };
        let stability = self.settings.stability;
        let window = stability * 2;

        if deltas[0].is_none() {
            return WheelClass::Intentional(direction);
        }

        let recent = self.stamps[window - 2].is_some_and(|at| at + self.settings.delay > now);
        if recent && deltas[0] == deltas[window - 1] {
            return WheelClass::Inertia;
        }

        let old = mean(deltas.range(..stability));
        let new = mean(deltas.range(stability..));

        if old.abs() < (new * self.settings.tolerance).abs()
            && self.settings.sensitivity < new.abs()
        {
            WheelClass::Intentional(direction)
        } else {
            WheelClass::Inertia
        }
    }
}

fn mean<'a>(half: impl ExactSizeIterator<Item = &'a Option<f64>>) -> f64 {
    let len = half.len() as f64;
    half.map(|d| d.unwrap_or(0.0)).sum::<f64>() / len
}

fn push_shift<T>(ring: &mut VecDeque<T>, value: T) {
    ring.push_back(value);
    ring.pop_front();
}
