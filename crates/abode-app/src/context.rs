// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    AncestorHints, HierarchyLevel, NavigationMode, PropertyId, PropertySummary, RoomId,
    RoomSummary, TabKind,
};

/// Ancestor facts for the node the user is browsing under. Every field is
/// optional: absent means not yet known or not applicable.
///
/// The same shape doubles as the patch passed to
/// [`NavigationContext::set_current_context`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchyContext {
    pub property_id: Option<PropertyId>,
    pub property_name: Option<String>,
    pub property_address: Option<String>,
    pub room_id: Option<RoomId>,
    pub room_name: Option<String>,
    pub room_item_count: Option<u32>,
}

impl HierarchyContext {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_property_id(mut self, id: impl Into<PropertyId>) -> Self {
        self.property_id = Some(id.into());
        self
    }

    pub fn with_property_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    pub fn with_property_address(mut self, address: impl Into<String>) -> Self {
        self.property_address = Some(address.into());
        self
    }

    pub fn with_room_id(mut self, id: impl Into<RoomId>) -> Self {
        self.room_id = Some(id.into());
        self
    }

    pub fn with_room_name(mut self, name: impl Into<String>) -> Self {
        self.room_name = Some(name.into());
        self
    }

    pub fn with_room_item_count(mut self, count: u32) -> Self {
        self.room_item_count = Some(count);
        self
    }

    /// Shallow merge: fields present in `patch` win, omitted fields survive.
    fn merge(&mut self, patch: Self) {
        let Self {
            property_id,
            property_name,
            property_address,
            room_id,
            room_name,
            room_item_count,
        } = patch;
        if property_id.is_some() {
            self.property_id = property_id;
        }
        if property_name.is_some() {
            self.property_name = property_name;
        }
        if property_address.is_some() {
            self.property_address = property_address;
        }
        if room_id.is_some() {
            self.room_id = room_id;
        }
        if room_name.is_some() {
            self.room_name = room_name;
        }
        if room_item_count.is_some() {
            self.room_item_count = room_item_count;
        }
    }

    /// The narrowed view the resolver reads. Blank ids are treated as unknown.
    pub fn ancestors(&self) -> AncestorHints<'_> {
        AncestorHints {
            property_id: self
                .property_id
                .as_ref()
                .filter(|id| !id.as_str().trim().is_empty()),
            room_id: self
                .room_id
                .as_ref()
                .filter(|id| !id.as_str().trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCommand {
    SetActiveTab(TabKind),
    SetCurrentLevel(HierarchyLevel),
    SetCurrentContext(HierarchyContext),
    SetNavigationMode(NavigationMode),
    SetProperties(Vec<PropertySummary>),
    SetRooms(Vec<RoomSummary>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    TabChanged(TabKind),
    LevelChanged(HierarchyLevel),
    ContextMerged,
    ContextReset,
    ModeChanged(NavigationMode),
    PropertiesReplaced(usize),
    RoomsReplaced(usize),
}

/// Session-lifetime navigation state. Owned by the shell and handed to
/// screens by reference; every write funnels through [`Self::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    active_tab: TabKind,
    current_level: HierarchyLevel,
    context: HierarchyContext,
    navigation_mode: NavigationMode,
    properties: Vec<PropertySummary>,
    rooms: Vec<RoomSummary>,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self {
            active_tab: TabKind::Portfolio,
            current_level: HierarchyLevel::Portfolio,
            context: HierarchyContext::default(),
            navigation_mode: NavigationMode::Shell,
            properties: Vec::new(),
            rooms: Vec::new(),
        }
    }
}

impl NavigationContext {
    pub fn active_tab(&self) -> TabKind {
        self.active_tab
    }

    pub fn current_level(&self) -> HierarchyLevel {
        self.current_level
    }

    pub fn context(&self) -> &HierarchyContext {
        &self.context
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        self.navigation_mode
    }

    pub fn chrome_visible(&self) -> bool {
        self.navigation_mode == NavigationMode::Shell
    }

    pub fn properties(&self) -> &[PropertySummary] {
        &self.properties
    }

    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    pub fn set_active_tab(&mut self, tab: TabKind) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetActiveTab(tab))
    }

    pub fn set_current_level(&mut self, level: HierarchyLevel) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetCurrentLevel(level))
    }

    /// Merges `patch` into the context. An empty patch resets to portfolio scope.
    pub fn set_current_context(&mut self, patch: HierarchyContext) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetCurrentContext(patch))
    }

    pub fn reset_context(&mut self) -> Vec<ContextEvent> {
        self.set_current_context(HierarchyContext::default())
    }

    pub fn set_navigation_mode(&mut self, mode: NavigationMode) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetNavigationMode(mode))
    }

    pub fn set_properties(&mut self, properties: Vec<PropertySummary>) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetProperties(properties))
    }

    pub fn set_rooms(&mut self, rooms: Vec<RoomSummary>) -> Vec<ContextEvent> {
        self.dispatch(ContextCommand::SetRooms(rooms))
    }

    pub fn dispatch(&mut self, command: ContextCommand) -> Vec<ContextEvent> {
        trace!(?command, "context command");
        match command {
            ContextCommand::SetActiveTab(tab) => {
                if self.active_tab == tab {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![ContextEvent::TabChanged(tab)]
            }
            ContextCommand::SetCurrentLevel(level) => {
                if self.current_level == level {
                    return Vec::new();
                }
                self.current_level = level;
                vec![ContextEvent::LevelChanged(level)]
            }
            ContextCommand::SetCurrentContext(patch) => {
                if patch.is_empty() {
                    if self.context.is_empty() {
                        return Vec::new();
                    }
                    self.context = HierarchyContext::default();
                    return vec![ContextEvent::ContextReset];
                }
                let before = self.context.clone();
                self.context.merge(patch);
                if self.context == before {
                    Vec::new()
                } else {
                    vec![ContextEvent::ContextMerged]
                }
            }
            ContextCommand::SetNavigationMode(mode) => {
                if self.navigation_mode == mode {
                    return Vec::new();
                }
                self.navigation_mode = mode;
                vec![ContextEvent::ModeChanged(mode)]
            }
            ContextCommand::SetProperties(properties) => {
                let count = properties.len();
                self.properties = properties;
                vec![ContextEvent::PropertiesReplaced(count)]
            }
            ContextCommand::SetRooms(rooms) => {
                let count = rooms.len();
                self.rooms = rooms;
                vec![ContextEvent::RoomsReplaced(count)]
            }
        }
    }
}
