// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{HierarchyLevel, ItemId, NavigationMode, PropertyId, RoomId, TabKind, UserId};

pub const PARAM_PROPERTY_ID: &str = "property_id";
pub const PARAM_ROOM_ID: &str = "room_id";
pub const PARAM_ITEM_ID: &str = "item_id";
pub const PARAM_USER_ID: &str = "user_id";

/// Every screen the router can show. Paths that match nothing land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteId {
    Portfolio,
    Inventory,
    Property,
    AddProperty,
    Room,
    AddRoom,
    EditRoom,
    Item,
    AddItem,
    EditItem,
    Settings,
    ChangePassword,
    EditProfile,
    ManageUsers,
    AddUser,
    Login,
    SignUp,
    Onboarding,
    Other(String),
}

impl RouteId {
    pub const KNOWN: [Self; 18] = [
        Self::Portfolio,
        Self::Inventory,
        Self::Property,
        Self::AddProperty,
        Self::Room,
        Self::AddRoom,
        Self::EditRoom,
        Self::Item,
        Self::AddItem,
        Self::EditItem,
        Self::Settings,
        Self::ChangePassword,
        Self::EditProfile,
        Self::ManageUsers,
        Self::AddUser,
        Self::Login,
        Self::SignUp,
        Self::Onboarding,
    ];

    pub fn path(&self) -> &str {
        match self {
            Self::Portfolio => "/portfolio",
            Self::Inventory => "/inventory",
            Self::Property => "/property",
            Self::AddProperty => "/property/add",
            Self::Room => "/room",
            Self::AddRoom => "/room/add",
            Self::EditRoom => "/room/edit",
            Self::Item => "/item",
            Self::AddItem => "/item/add",
            Self::EditItem => "/item/edit",
            Self::Settings => "/settings",
            Self::ChangePassword => "/settings/change-password",
            Self::EditProfile => "/settings/edit-profile",
            Self::ManageUsers => "/settings/users",
            Self::AddUser => "/settings/users/add",
            Self::Login => "/auth/login",
            Self::SignUp => "/auth/signup",
            Self::Onboarding => "/onboarding",
            Self::Other(path) => path,
        }
    }

    /// Never fails: unknown paths become `Other` so callers still get a route.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let normalized = trimmed.trim_end_matches('/');
        if normalized.is_empty() {
            return Self::Portfolio;
        }
        Self::KNOWN
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or_else(|| Self::Other(trimmed.to_owned()))
    }

    pub fn level(&self) -> HierarchyLevel {
        match self {
            Self::Portfolio | Self::Inventory | Self::Other(_) => HierarchyLevel::Portfolio,
            Self::Property => HierarchyLevel::Property,
            Self::Room => HierarchyLevel::Room,
            Self::Item => HierarchyLevel::Item,
            Self::Settings | Self::ManageUsers => HierarchyLevel::Settings,
            Self::AddProperty
            | Self::AddRoom
            | Self::EditRoom
            | Self::AddItem
            | Self::EditItem
            | Self::ChangePassword
            | Self::EditProfile
            | Self::AddUser
            | Self::Login
            | Self::SignUp
            | Self::Onboarding => HierarchyLevel::Form,
        }
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        match self.level() {
            HierarchyLevel::Form => NavigationMode::Form,
            _ => NavigationMode::Shell,
        }
    }

    /// Tab this screen belongs to; `None` leaves the active tab untouched.
    pub fn tab(&self) -> Option<TabKind> {
        match self {
            Self::Portfolio | Self::Property | Self::Room => Some(TabKind::Portfolio),
            Self::Inventory => Some(TabKind::Inventory),
            Self::Settings
            | Self::ChangePassword
            | Self::EditProfile
            | Self::ManageUsers
            | Self::AddUser => Some(TabKind::Settings),
            Self::Login | Self::SignUp | Self::Onboarding => Some(TabKind::None),
            Self::AddProperty
            | Self::AddRoom
            | Self::EditRoom
            | Self::Item
            | Self::AddItem
            | Self::EditItem
            | Self::Other(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Portfolio => "Portfolio",
            Self::Inventory => "Inventory",
            Self::Property => "Property",
            Self::AddProperty => "Add property",
            Self::Room => "Room",
            Self::AddRoom => "Add room",
            Self::EditRoom => "Edit room",
            Self::Item => "Item",
            Self::AddItem => "Add item",
            Self::EditItem => "Edit item",
            Self::Settings => "Settings",
            Self::ChangePassword => "Change password",
            Self::EditProfile => "Edit profile",
            Self::ManageUsers => "Manage users",
            Self::AddUser => "Add user",
            Self::Login => "Sign in",
            Self::SignUp => "Sign up",
            Self::Onboarding => "Welcome",
            Self::Other(path) => path,
        }
    }
}

impl From<String> for RouteId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RouteId> for String {
    fn from(value: RouteId) -> Self {
        value.path().to_owned()
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Raw string params attached to a navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_owned(), value.into());
    }

    /// Empty values count as missing, the same as an absent key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn property_id(&self) -> Option<PropertyId> {
        self.get(PARAM_PROPERTY_ID).map(PropertyId::from)
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.get(PARAM_ROOM_ID).map(RoomId::from)
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.get(PARAM_ITEM_ID).map(ItemId::from)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.get(PARAM_USER_ID).map(UserId::from)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Parses `key=value`, as typed on the command line.
    pub fn parse_pair(raw: &str) -> Result<(String, String)> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected key=value, got {raw:?}"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("missing key in {raw:?}; use key=value (for example room_id=5)");
        }
        Ok((key.to_owned(), value.trim().to_owned()))
    }
}

/// A route plus params: the unit the resolver produces and the router consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub path: RouteId,
    #[serde(default, skip_serializing_if = "RouteParams::is_empty")]
    pub params: RouteParams,
}

impl Destination {
    pub fn new(path: RouteId) -> Self {
        Self {
            path,
            params: RouteParams::new(),
        }
    }

    pub fn with_params(path: RouteId, params: RouteParams) -> Self {
        Self { path, params }
    }

    pub fn portfolio() -> Self {
        Self::new(RouteId::Portfolio)
    }

    pub fn settings() -> Self {
        Self::new(RouteId::Settings)
    }

    pub fn property(id: &PropertyId) -> Self {
        Self::with_params(
            RouteId::Property,
            RouteParams::new().with(PARAM_PROPERTY_ID, id.as_str()),
        )
    }

    pub fn room(id: &RoomId) -> Self {
        Self::with_params(
            RouteId::Room,
            RouteParams::new().with(PARAM_ROOM_ID, id.as_str()),
        )
    }

    pub fn href(&self) -> String {
        if self.params.is_empty() {
            return self.path.path().to_owned();
        }
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path.path())
    }

    /// Parses an href such as `/item?item_id=9&room_id=5`. Unknown paths
    /// become [`RouteId::Other`]; a malformed query pair is an error.
    pub fn parse_href(raw: &str) -> Result<Self> {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let mut params = RouteParams::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = RouteParams::parse_pair(pair)
                .with_context(|| format!("invalid query in {raw:?}"))?;
            params.insert(&key, value);
        }
        Ok(Self::with_params(RouteId::parse(path), params))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// The router primitives the navigation core drives. Implemented by the shell.
pub trait Router {
    fn navigate(&mut self, destination: &Destination) -> Result<()>;
    fn back(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::{Destination, RouteId, RouteParams};
    use crate::{HierarchyLevel, NavigationMode, RoomId, TabKind};
    use anyhow::Result;

    #[test]
    fn known_paths_parse_back_to_themselves() {
        for route in RouteId::KNOWN {
            assert_eq!(RouteId::parse(route.path()), route, "path {}", route.path());
        }
    }

    #[test]
    fn trailing_slash_and_root_normalize() {
        assert_eq!(RouteId::parse("/room/"), RouteId::Room);
        assert_eq!(RouteId::parse("/"), RouteId::Portfolio);
        assert_eq!(RouteId::parse(""), RouteId::Portfolio);
    }

    #[test]
    fn unknown_path_is_kept_verbatim() {
        let route = RouteId::parse("/capture/scan");
        assert_eq!(route, RouteId::Other("/capture/scan".to_owned()));
        assert_eq!(route.path(), "/capture/scan");
        assert_eq!(route.level(), HierarchyLevel::Portfolio);
    }

    #[test]
    fn forms_hide_chrome() {
        assert_eq!(RouteId::AddItem.navigation_mode(), NavigationMode::Form);
        assert_eq!(RouteId::ChangePassword.navigation_mode(), NavigationMode::Form);
        assert_eq!(RouteId::Room.navigation_mode(), NavigationMode::Shell);
        assert_eq!(RouteId::ManageUsers.navigation_mode(), NavigationMode::Shell);
    }

    #[test]
    fn tabs_follow_route_family() {
        assert_eq!(RouteId::Room.tab(), Some(TabKind::Portfolio));
        assert_eq!(RouteId::AddUser.tab(), Some(TabKind::Settings));
        assert_eq!(RouteId::Login.tab(), Some(TabKind::None));
        assert_eq!(RouteId::Item.tab(), None);
    }

    #[test]
    fn blank_params_count_as_missing() {
        let params = RouteParams::new().with("room_id", "  ");
        assert_eq!(params.room_id(), None);
        assert_eq!(params.get("room_id"), None);
    }

    #[test]
    fn parse_pair_requires_equals_and_key() {
        assert_eq!(
            RouteParams::parse_pair("room_id=5").expect("valid pair"),
            ("room_id".to_owned(), "5".to_owned())
        );
        assert!(RouteParams::parse_pair("room_id").is_err());
        assert!(RouteParams::parse_pair("=5").is_err());
    }

    #[test]
    fn parse_href_splits_path_and_query() -> Result<()> {
        assert_eq!(
            Destination::parse_href("/room?room_id=1")?,
            Destination::room(&RoomId::new("1"))
        );
        let item = Destination::parse_href("/item/?item_id=9&&room_id=5")?;
        assert_eq!(item.path, RouteId::Item);
        assert_eq!(item.href(), "/item?item_id=9&room_id=5");
        assert_eq!(Destination::parse_href("/settings?")?, Destination::settings());
        assert!(Destination::parse_href("/room?room_id").is_err());
        Ok(())
    }

    #[test]
    fn href_sorts_query_keys() {
        let destination = Destination::with_params(
            RouteId::Item,
            RouteParams::new().with("room_id", "5").with("item_id", "9"),
        );
        assert_eq!(destination.href(), "/item?item_id=9&room_id=5");
        assert_eq!(Destination::room(&RoomId::new("5")).to_string(), "/room?room_id=5");
        assert_eq!(Destination::portfolio().to_string(), "/portfolio");
    }
}
