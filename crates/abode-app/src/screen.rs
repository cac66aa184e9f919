// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;
use tracing::debug;

use crate::{
    ContextEvent, Destination, ExitFired, MotionConfig, NavigationContext, Pose, RouteId, RouteParams, Router,
    TransitionCoordinator, TransitionPhase, TransitionRequest, resolve_parent,
};

/// Outcome of [`ScreenNavigator::focus`]: the entry request plus whatever
/// the context store reported changing.
#[derive(Debug)]
pub struct Focus {
    pub request: TransitionRequest,
    pub events: Vec<ContextEvent>,
}

impl Focus {
    pub fn accepted(&self) -> bool {
        self.request.accepted()
    }
}

/// What a mounted screen uses to move around: its route, its params, and
/// the coordinator that owns its animation.
#[derive(Debug)]
pub struct ScreenNavigator {
    route: RouteId,
    params: RouteParams,
    coordinator: TransitionCoordinator,
}

impl ScreenNavigator {
    pub fn new(route: RouteId, params: RouteParams, motion: MotionConfig) -> Self {
        let label = route.path().to_owned();
        Self {
            route,
            params,
            coordinator: TransitionCoordinator::new(label, motion),
        }
    }

    pub fn mount(destination: &Destination, motion: MotionConfig) -> Self {
        Self::new(destination.path.clone(), destination.params.clone(), motion)
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn phase(&self) -> TransitionPhase {
        self.coordinator.phase()
    }

    pub fn pose(&self) -> Pose {
        self.coordinator.pose()
    }

    pub fn is_animating(&self) -> bool {
        self.coordinator.is_animating()
    }

    /// Focus handler: records this route's level, mode, and tab, then plays
    /// the entry animation. Ancestor facts are written by the caller once its
    /// data is loaded.
    pub fn focus(&mut self, context: &mut NavigationContext) -> Focus {
        let mut events = context.set_current_level(self.route.level());
        events.extend(context.set_navigation_mode(self.route.navigation_mode()));
        if let Some(tab) = self.route.tab() {
            events.extend(context.set_active_tab(tab));
        }
        debug!(
            route = %self.route,
            level = self.route.level().as_str(),
            changes = events.len(),
            "screen focused"
        );
        Focus {
            request: self.coordinator.enter(),
            events,
        }
    }

    /// Read-only preview of where back would go right now.
    pub fn parent_destination(&self, context: &NavigationContext) -> Destination {
        resolve_parent(&self.route, &self.params, context.context().ancestors())
    }

    /// Exit, then navigate to the logical parent resolved at completion time.
    pub fn animated_back(&mut self) -> TransitionRequest {
        let route = self.route.clone();
        let params = self.params.clone();
        self.coordinator.exit_then_navigate(move |context| {
            resolve_parent(&route, &params, context.context().ancestors())
        })
    }

    /// Exit, then run `callback`. For dismissals that are not a hierarchy pop.
    pub fn animated_exit<F>(&mut self, callback: F) -> TransitionRequest
    where
        F: FnOnce() + 'static,
    {
        self.coordinator.exit_then_invoke(callback)
    }

    pub fn advance(
        &mut self,
        dt: Duration,
        context: &NavigationContext,
        router: &mut dyn Router,
    ) -> Option<ExitFired> {
        self.coordinator.advance(dt, context, router)
    }

    pub fn unmount(&mut self) {
        self.coordinator.unmount();
    }
}
