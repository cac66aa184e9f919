// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    Completion, CompletionState, Destination, Motion, MotionConfig, NavigationContext, Pose,
    Router,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Entering,
    Settled,
    Exiting,
    Exited,
}

impl TransitionPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Entering => "entering",
            Self::Settled => "settled",
            Self::Exiting => "exiting",
            Self::Exited => "exited",
        }
    }
}

/// What happened to an `enter`/`exit_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRequest {
    Started,
    Restarted,
    Ignored(TransitionPhase),
}

impl TransitionRequest {
    pub fn accepted(self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

type DestinationFn = Box<dyn FnOnce(&NavigationContext) -> Destination>;
type Callback = Box<dyn FnOnce()>;

/// Work deferred until the exit animation lands.
pub enum ExitAction {
    Navigate(DestinationFn),
    Invoke(Callback),
}

impl fmt::Debug for ExitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(_) => f.write_str("Navigate(..)"),
            Self::Invoke(_) => f.write_str("Invoke(..)"),
        }
    }
}

/// Reported by [`TransitionCoordinator::advance`] on the frame an exit fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitFired {
    Navigated(Destination),
    Invoked,
}

// The pending action lives inside `Exiting`, so it cannot outlive the exit
// or be queued twice.
#[derive(Debug)]
enum Stage {
    Idle,
    Entering(Completion),
    Settled,
    Exiting {
        completion: Completion,
        action: ExitAction,
    },
    Exited,
}

impl Stage {
    fn phase(&self) -> TransitionPhase {
        match self {
            Self::Idle => TransitionPhase::Idle,
            Self::Entering(_) => TransitionPhase::Entering,
            Self::Settled => TransitionPhase::Settled,
            Self::Exiting { .. } => TransitionPhase::Exiting,
            Self::Exited => TransitionPhase::Exited,
        }
    }
}

/// Per-mount sequencer for enter and exit animations.
///
/// Guarantees that an exit's navigation or callback runs exactly once, only
/// after the exit animation completes, and never twice for one instance.
/// Time only moves through [`Self::advance`], so tests drive it frame by
/// frame without a clock.
#[derive(Debug)]
pub struct TransitionCoordinator {
    label: String,
    config: MotionConfig,
    motion: Motion,
    stage: Stage,
}

impl TransitionCoordinator {
    pub fn new(label: impl Into<String>, config: MotionConfig) -> Self {
        Self {
            label: label.into(),
            motion: Motion::new(config.off_screen()),
            config,
            stage: Stage::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn phase(&self) -> TransitionPhase {
        self.stage.phase()
    }

    pub fn pose(&self) -> Pose {
        self.motion.pose()
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.stage, Stage::Entering(_) | Stage::Exiting { .. })
    }

    /// Plays the entry animation from the off-screen pose. Calling it again
    /// while entering or settled restarts from off-screen; it is ignored
    /// while an exit is in flight.
    pub fn enter(&mut self) -> TransitionRequest {
        let request = match self.stage {
            Stage::Idle | Stage::Exited => TransitionRequest::Started,
            Stage::Entering(_) | Stage::Settled => TransitionRequest::Restarted,
            Stage::Exiting { .. } => {
                debug!(screen = %self.label, "enter ignored during exit");
                return TransitionRequest::Ignored(TransitionPhase::Exiting);
            }
        };
        self.motion.jump_to(self.config.off_screen());
        let completion = self.motion.drive_to(
            Pose::ON_SCREEN,
            self.config.enter_duration,
            self.config.enter_easing,
        );
        self.stage = Stage::Entering(completion);
        debug!(screen = %self.label, ?request, "enter");
        request
    }

    /// Exits, then navigates to whatever `destination` returns. The closure
    /// runs at completion time so it sees the latest context.
    pub fn exit_then_navigate<F>(&mut self, destination: F) -> TransitionRequest
    where
        F: FnOnce(&NavigationContext) -> Destination + 'static,
    {
        self.begin_exit(ExitAction::Navigate(Box::new(destination)))
    }

    pub fn exit_then_invoke<F>(&mut self, callback: F) -> TransitionRequest
    where
        F: FnOnce() + 'static,
    {
        self.begin_exit(ExitAction::Invoke(Box::new(callback)))
    }

    fn begin_exit(&mut self, action: ExitAction) -> TransitionRequest {
        if !matches!(self.stage, Stage::Settled) {
            let phase = self.phase();
            debug!(screen = %self.label, phase = phase.as_str(), ?action, "exit ignored");
            return TransitionRequest::Ignored(phase);
        }
        let completion = self.motion.drive_to(
            self.config.off_screen(),
            self.config.exit_duration,
            self.config.exit_easing,
        );
        debug!(screen = %self.label, ?action, "exit started");
        self.stage = Stage::Exiting { completion, action };
        TransitionRequest::Started
    }

    /// Steps the animation by `dt` and fires a completed exit.
    pub fn advance(
        &mut self,
        dt: Duration,
        context: &NavigationContext,
        router: &mut dyn Router,
    ) -> Option<ExitFired> {
        self.motion.step(dt);
        match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Entering(mut completion) => {
                self.stage = match completion.poll() {
                    CompletionState::Pending => Stage::Entering(completion),
                    // `enter` replaces the completion whenever it snaps the
                    // motion, so an entry is only interrupted by its own drop.
                    CompletionState::Finished | CompletionState::Interrupted => Stage::Settled,
                };
                None
            }
            Stage::Exiting {
                mut completion,
                action,
            } => match completion.poll() {
                CompletionState::Pending => {
                    self.stage = Stage::Exiting { completion, action };
                    None
                }
                CompletionState::Finished => {
                    self.stage = Stage::Exited;
                    Some(self.fire(action, context, router))
                }
                CompletionState::Interrupted => {
                    debug!(screen = %self.label, ?action, "exit interrupted; action dropped");
                    self.stage = Stage::Exited;
                    None
                }
            },
            other => {
                self.stage = other;
                None
            }
        }
    }

    fn fire(
        &self,
        action: ExitAction,
        context: &NavigationContext,
        router: &mut dyn Router,
    ) -> ExitFired {
        match action {
            ExitAction::Navigate(destination) => {
                let destination = destination(context);
                debug!(screen = %self.label, %destination, "exit navigating");
                if let Err(error) = router.navigate(&destination) {
                    warn!(screen = %self.label, %destination, error = %error, "navigation failed");
                }
                ExitFired::Navigated(destination)
            }
            ExitAction::Invoke(callback) => {
                debug!(screen = %self.label, "exit invoking callback");
                callback();
                ExitFired::Invoked
            }
        }
    }

    /// The screen went away. A pending exit action is dropped unrun.
    pub fn unmount(&mut self) {
        if let Stage::Exiting { action, .. } = &self.stage {
            debug!(screen = %self.label, ?action, "unmounted mid-exit; action dropped");
        }
        self.motion.jump_to(self.config.off_screen());
        self.stage = Stage::Exited;
    }
}

#[cfg(test)]
mod tests {
    use super::{ExitFired, TransitionCoordinator, TransitionPhase, TransitionRequest};
    use crate::{Destination, MotionConfig, NavigationContext, Pose, Router};
    use anyhow::Result;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Debug, Default)]
    struct CountingRouter {
        navigations: Vec<Destination>,
    }

    impl Router for CountingRouter {
        fn navigate(&mut self, destination: &Destination) -> Result<()> {
            self.navigations.push(destination.clone());
            Ok(())
        }

        fn back(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn settle(
        coordinator: &mut TransitionCoordinator,
        context: &NavigationContext,
        router: &mut CountingRouter,
    ) -> Vec<ExitFired> {
        let mut fired = Vec::new();
        for _ in 0..200 {
            if !coordinator.is_animating() {
                break;
            }
            fired.extend(coordinator.advance(FRAME, context, router));
        }
        fired
    }

    fn settled_coordinator(
        context: &NavigationContext,
        router: &mut CountingRouter,
    ) -> TransitionCoordinator {
        let mut coordinator = TransitionCoordinator::new("test", MotionConfig::default());
        coordinator.enter();
        settle(&mut coordinator, context, router);
        coordinator
    }

    #[test]
    fn enter_runs_idle_to_settled() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = TransitionCoordinator::new("test", MotionConfig::default());
        assert_eq!(coordinator.phase(), TransitionPhase::Idle);

        assert_eq!(coordinator.enter(), TransitionRequest::Started);
        assert_eq!(coordinator.phase(), TransitionPhase::Entering);
        assert_eq!(coordinator.pose(), Pose::off_screen(12.0));

        settle(&mut coordinator, &context, &mut router);
        assert_eq!(coordinator.phase(), TransitionPhase::Settled);
        assert_eq!(coordinator.pose(), Pose::ON_SCREEN);
    }

    #[test]
    fn exit_is_ignored_until_settled() {
        let mut coordinator = TransitionCoordinator::new("test", MotionConfig::default());
        assert_eq!(
            coordinator.exit_then_invoke(|| {}),
            TransitionRequest::Ignored(TransitionPhase::Idle)
        );
        coordinator.enter();
        assert_eq!(
            coordinator.exit_then_invoke(|| {}),
            TransitionRequest::Ignored(TransitionPhase::Entering)
        );
    }

    #[test]
    fn navigation_waits_for_exit_to_finish() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);

        coordinator.exit_then_navigate(|_| Destination::settings());
        assert_eq!(coordinator.phase(), TransitionPhase::Exiting);

        assert_eq!(coordinator.advance(FRAME, &context, &mut router), None);
        assert!(router.navigations.is_empty());

        let fired = settle(&mut coordinator, &context, &mut router);
        assert_eq!(fired, vec![ExitFired::Navigated(Destination::settings())]);
        assert_eq!(router.navigations, vec![Destination::settings()]);
        assert_eq!(coordinator.phase(), TransitionPhase::Exited);
        assert_eq!(coordinator.pose(), Pose::off_screen(12.0));
    }

    #[test]
    fn double_exit_fires_once() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);

        assert_eq!(
            coordinator.exit_then_navigate(|_| Destination::portfolio()),
            TransitionRequest::Started
        );
        assert_eq!(
            coordinator.exit_then_navigate(|_| Destination::settings()),
            TransitionRequest::Ignored(TransitionPhase::Exiting)
        );
        settle(&mut coordinator, &context, &mut router);
        assert_eq!(
            coordinator.exit_then_navigate(|_| Destination::settings()),
            TransitionRequest::Ignored(TransitionPhase::Exited)
        );
        settle(&mut coordinator, &context, &mut router);

        assert_eq!(router.navigations, vec![Destination::portfolio()]);
    }

    #[test]
    fn callback_runs_exactly_once() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);
        let calls = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            coordinator.exit_then_invoke(move || calls.set(calls.get() + 1));
        }
        let fired = settle(&mut coordinator, &context, &mut router);

        assert_eq!(fired, vec![ExitFired::Invoked]);
        assert_eq!(calls.get(), 1);
        assert!(router.navigations.is_empty());
    }

    #[test]
    fn re_enter_restarts_from_off_screen() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = TransitionCoordinator::new("test", MotionConfig::default());

        coordinator.enter();
        coordinator.advance(FRAME * 4, &context, &mut router);
        assert!(coordinator.pose().opacity > 0.0);

        assert_eq!(coordinator.enter(), TransitionRequest::Restarted);
        assert_eq!(coordinator.pose(), Pose::off_screen(12.0));
        settle(&mut coordinator, &context, &mut router);
        assert_eq!(coordinator.pose(), Pose::ON_SCREEN);
    }

    #[test]
    fn restarted_entry_waits_for_the_new_drive() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = TransitionCoordinator::new("test", MotionConfig::default());

        coordinator.enter();
        coordinator.advance(FRAME, &context, &mut router);
        coordinator.enter();
        coordinator.advance(FRAME, &context, &mut router);

        assert_eq!(coordinator.phase(), TransitionPhase::Entering);
        assert!(coordinator.pose().opacity < 1.0);
        settle(&mut coordinator, &context, &mut router);
        assert_eq!(coordinator.phase(), TransitionPhase::Settled);
        assert_eq!(coordinator.pose(), Pose::ON_SCREEN);
    }

    #[test]
    fn enter_is_ignored_mid_exit() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);

        coordinator.exit_then_navigate(|_| Destination::portfolio());
        assert_eq!(
            coordinator.enter(),
            TransitionRequest::Ignored(TransitionPhase::Exiting)
        );
        settle(&mut coordinator, &context, &mut router);
        assert_eq!(router.navigations.len(), 1);
    }

    #[test]
    fn exited_instance_can_enter_again() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);
        coordinator.exit_then_invoke(|| {});
        settle(&mut coordinator, &context, &mut router);

        assert_eq!(coordinator.enter(), TransitionRequest::Started);
        settle(&mut coordinator, &context, &mut router);
        assert_eq!(coordinator.phase(), TransitionPhase::Settled);
    }

    #[test]
    fn unmount_mid_exit_drops_the_action() {
        let context = NavigationContext::default();
        let mut router = CountingRouter::default();
        let mut coordinator = settled_coordinator(&context, &mut router);
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        coordinator.exit_then_invoke(move || flag.set(true));
        coordinator.advance(FRAME, &context, &mut router);
        coordinator.unmount();
        settle(&mut coordinator, &context, &mut router);
        for _ in 0..20 {
            coordinator.advance(FRAME, &context, &mut router);
        }

        assert!(!ran.get());
        assert_eq!(coordinator.phase(), TransitionPhase::Exited);
    }
}
