// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use abode_app::{Item, ItemId, Property, PropertyId, Room, RoomId};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::{date, format_description};
use tracing::{debug, info};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Catalog held entirely in memory, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCatalog {
    properties: Vec<Property>,
    rooms: Vec<Room>,
    items: Vec<Item>,
}

impl MemoryCatalog {
    pub fn new(properties: Vec<Property>, rooms: Vec<Room>, items: Vec<Item>) -> Result<Self> {
        ensure_unique("property", properties.iter().map(|p| p.id.as_str()))?;
        ensure_unique("room", rooms.iter().map(|r| r.id.as_str()))?;
        ensure_unique("item", items.iter().map(|i| i.id.as_str()))?;
        Ok(Self {
            properties,
            rooms,
            items,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read catalog file {}", path.display()))?;
        let catalog = Self::from_json(&raw)
            .with_context(|| format!("load catalog {}", path.display()))?;
        info!(
            path = %path.display(),
            properties = catalog.properties.len(),
            rooms = catalog.rooms.len(),
            items = catalog.items.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw).context("parse catalog JSON")?;
        let items = file
            .items
            .into_iter()
            .map(ItemRecord::into_item)
            .collect::<Result<Vec<_>>>()?;
        Self::new(file.properties, file.rooms, items)
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (self.properties.len(), self.rooms.len(), self.items.len())
    }
}

fn ensure_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            bail!("{kind} with an empty id");
        }
        if !seen.insert(id) {
            bail!("duplicate {kind} id {id:?}");
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    id: ItemId,
    room_id: RoomId,
    name: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    value_cents: Option<i64>,
    #[serde(default)]
    acquired_on: Option<String>,
    #[serde(default)]
    notes: String,
}

fn default_quantity() -> u32 {
    1
}

impl ItemRecord {
    fn into_item(self) -> Result<Item> {
        let acquired_on = match self.acquired_on.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Date::parse(raw, DATE_FORMAT).with_context(|| {
                format!(
                    "item {} has acquired_on {raw:?}; use YYYY-MM-DD",
                    self.id
                )
            })?),
        };
        Ok(Item {
            id: self.id,
            room_id: self.room_id,
            name: self.name,
            quantity: self.quantity,
            value_cents: self.value_cents,
            acquired_on,
            notes: self.notes,
        })
    }
}

impl abode_tui::Catalog for MemoryCatalog {
    fn load_properties(&mut self) -> Result<Vec<Property>> {
        Ok(self.properties.clone())
    }

    fn load_rooms(&mut self, property_id: &PropertyId) -> Result<Vec<Room>> {
        debug!(%property_id, "load rooms");
        Ok(self
            .rooms
            .iter()
            .filter(|room| &room.property_id == property_id)
            .cloned()
            .collect())
    }

    fn load_items(&mut self, room_id: &RoomId) -> Result<Vec<Item>> {
        debug!(%room_id, "load items");
        Ok(self
            .items
            .iter()
            .filter(|item| &item.room_id == room_id)
            .cloned()
            .collect())
    }

    fn load_all_items(&mut self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }

    fn find_property(&mut self, id: &PropertyId) -> Result<Option<Property>> {
        Ok(self.properties.iter().find(|p| &p.id == id).cloned())
    }

    fn find_room(&mut self, id: &RoomId) -> Result<Option<Room>> {
        Ok(self.rooms.iter().find(|r| &r.id == id).cloned())
    }

    fn find_item(&mut self, id: &ItemId) -> Result<Option<Item>> {
        Ok(self.items.iter().find(|i| &i.id == id).cloned())
    }
}

pub fn demo_catalog() -> MemoryCatalog {
    let property = |id: &str, name: &str, address: &str, icon: &str| Property {
        id: PropertyId::new(id),
        name: name.to_owned(),
        address: address.to_owned(),
        icon: Some(icon.to_owned()),
    };
    let room = |id: &str, property_id: &str, name: &str, icon: &str| Room {
        id: RoomId::new(id),
        property_id: PropertyId::new(property_id),
        name: name.to_owned(),
        icon: Some(icon.to_owned()),
    };
    let item = |id: &str, room_id: &str, name: &str, quantity: u32, cents: i64, acquired: Date| {
        Item {
            id: ItemId::new(id),
            room_id: RoomId::new(room_id),
            name: name.to_owned(),
            quantity,
            value_cents: Some(cents),
            acquired_on: Some(acquired),
            notes: String::new(),
        }
    };

    MemoryCatalog {
        properties: vec![
            property("1", "Maple house", "412 Maple St, Madison", "home"),
            property("2", "Lake cabin", "8 Shoreline Rd, Minocqua", "tree"),
        ],
        rooms: vec![
            room("1", "1", "Kitchen", "utensils"),
            room("2", "1", "Living room", "sofa"),
            room("3", "1", "Garage", "car"),
            room("4", "2", "Bunk room", "bed"),
            room("5", "2", "Boathouse", "anchor"),
        ],
        items: vec![
            item("1", "1", "Stand mixer", 1, 34_900, date!(2023 - 11 - 24)),
            item("2", "1", "Cast iron skillet", 2, 4_500, date!(2021 - 06 - 02)),
            item("3", "2", "Record player", 1, 21_999, date!(2022 - 02 - 14)),
            item("4", "2", "Floor lamp", 1, 8_900, date!(2024 - 09 - 30)),
            item("5", "3", "Cordless drill", 1, 12_900, date!(2020 - 04 - 11)),
            item("6", "3", "Bicycle", 2, 65_000, date!(2019 - 05 - 18)),
            item("7", "4", "Bunk bed", 2, 45_000, date!(2018 - 07 - 01)),
            item("8", "5", "Kayak", 2, 79_900, date!(2017 - 06 - 21)),
            item("9", "5", "Life jacket", 4, 5_999, date!(2017 - 06 - 21)),
        ],
    }
}
