// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

/// Conceptual depth of a screen, independent of the literal route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Portfolio,
    Property,
    Room,
    Item,
    Settings,
    Form,
}

impl HierarchyLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Property => "property",
            Self::Room => "room",
            Self::Item => "item",
            Self::Settings => "settings",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Portfolio,
    Inventory,
    Settings,
    None,
}

impl TabKind {
    pub const SELECTABLE: [Self; 3] = [Self::Portfolio, Self::Inventory, Self::Settings];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Inventory => "inventory",
            Self::Settings => "settings",
            Self::None => "",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "portfolio" => Some(Self::Portfolio),
            "inventory" => Some(Self::Inventory),
            "settings" => Some(Self::Settings),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Whether shell chrome (tabs, toolbar, add menu) is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    Shell,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub icon: Option<String>,
}

impl Property {
    pub fn summary(&self) -> PropertySummary {
        PropertySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub property_id: PropertyId,
    pub name: String,
    pub icon: Option<String>,
}

impl Room {
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub room_id: RoomId,
    pub name: String,
    pub quantity: u32,
    pub value_cents: Option<i64>,
    pub acquired_on: Option<Date>,
    pub notes: String,
}
