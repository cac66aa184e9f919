// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub const ALL: [Self; 4] = [
        Self::Linear,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInCubic => "ease_in_cubic",
            Self::EaseOutCubic => "ease_out_cubic",
            Self::EaseInOutCubic => "ease_in_out_cubic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "linear" => Some(Self::Linear),
            "ease_in_cubic" => Some(Self::EaseInCubic),
            "ease_out_cubic" => Some(Self::EaseOutCubic),
            "ease_in_out_cubic" => Some(Self::EaseInOutCubic),
            _ => None,
        }
    }

    /// Maps linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// The two animated scalars a screen owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub offset: f32,
}

impl Pose {
    pub const ON_SCREEN: Self = Self {
        opacity: 1.0,
        offset: 0.0,
    };

    pub const fn off_screen(offset: f32) -> Self {
        Self {
            opacity: 0.0,
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub enter_duration: Duration,
    pub exit_duration: Duration,
    /// Distance a screen travels while entering or leaving.
    pub offset: f32,
    pub enter_easing: Easing,
    pub exit_easing: Easing,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            enter_duration: Duration::from_millis(280),
            exit_duration: Duration::from_millis(220),
            offset: 12.0,
            enter_easing: Easing::EaseOutCubic,
            exit_easing: Easing::EaseInCubic,
        }
    }
}

impl MotionConfig {
    pub fn off_screen(&self) -> Pose {
        Pose::off_screen(self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    fn sample(&self) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedValue {
    value: f32,
    tween: Option<Tween>,
}

impl AnimatedValue {
    pub const fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Jumps to `value` and drops any running tween.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.tween = None;
    }

    pub fn animate_to(&mut self, target: f32, duration: Duration, easing: Easing) {
        self.tween = Some(Tween {
            from: self.value,
            to: target,
            elapsed: Duration::ZERO,
            duration,
            easing,
        });
    }

    /// Advances by `dt`. Returns true once the value is at rest.
    pub fn step(&mut self, dt: Duration) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return true;
        };
        tween.elapsed = tween.elapsed.saturating_add(dt).min(tween.duration);
        if tween.finished() {
            self.value = tween.to;
            self.tween = None;
            return true;
        }
        self.value = tween.sample();
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Finished,
    /// The drive was superseded or its motion dropped before reaching the target.
    Interrupted,
}

/// Single-shot signal for one [`Motion::drive_to`] call.
#[derive(Debug)]
pub struct Completion {
    rx: Receiver<()>,
    resolved: Option<CompletionState>,
}

impl Completion {
    pub fn poll(&mut self) -> CompletionState {
        if let Some(state) = self.resolved {
            return state;
        }
        let state = match self.rx.try_recv() {
            Ok(()) => CompletionState::Finished,
            Err(TryRecvError::Empty) => return CompletionState::Pending,
            Err(TryRecvError::Disconnected) => CompletionState::Interrupted,
        };
        self.resolved = Some(state);
        state
    }
}

/// Opacity and offset driven together toward one target pose.
#[derive(Debug)]
pub struct Motion {
    opacity: AnimatedValue,
    offset: AnimatedValue,
    signal: Option<Sender<()>>,
}

impl Motion {
    pub fn new(pose: Pose) -> Self {
        Self {
            opacity: AnimatedValue::new(pose.opacity),
            offset: AnimatedValue::new(pose.offset),
            signal: None,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            opacity: self.opacity.value(),
            offset: self.offset.value(),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.opacity.is_animating() || self.offset.is_animating()
    }

    /// Snaps to `pose`, interrupting any drive in flight.
    pub fn jump_to(&mut self, pose: Pose) {
        self.signal = None;
        self.opacity.set(pose.opacity);
        self.offset.set(pose.offset);
    }

    /// Starts both values toward `pose`. The returned completion resolves
    /// on the first [`Self::step`] that lands them, even with zero duration.
    pub fn drive_to(&mut self, pose: Pose, duration: Duration, easing: Easing) -> Completion {
        let (tx, rx) = mpsc::channel();
        self.signal = Some(tx);
        self.opacity.animate_to(pose.opacity, duration, easing);
        self.offset.animate_to(pose.offset, duration, easing);
        Completion { rx, resolved: None }
    }

    pub fn step(&mut self, dt: Duration) {
        let opacity_done = self.opacity.step(dt);
        let offset_done = self.offset.step(dt);
        if opacity_done
            && offset_done
            && let Some(signal) = self.signal.take()
        {
            // The receiver may already be gone; nobody is waiting then.
            let _ = signal.send(());
        }
    }
}
