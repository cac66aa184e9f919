// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use abode_app::{
    Destination, ExitFired, Item, ItemId, NavigationContext, Property, PropertyId, Room, RoomId,
    Router, ScreenNavigator, TransitionCoordinator,
};
use anyhow::{Result, bail};
use std::time::Duration;
use time::{Date, Duration as TimeDuration, Month};

/// One 60 Hz frame.
pub const FRAME: Duration = Duration::from_millis(16);

const MAX_SETTLE_FRAMES: usize = 1_000;

const STREET_NAMES: [&str; 12] = [
    "Elm", "Maple", "Oak", "Cedar", "Birch", "Willow", "Aspen", "Juniper", "Spruce", "Laurel",
    "Hawthorn", "Chestnut",
];

const CITIES: [&str; 8] = [
    "Austin", "Seattle", "Denver", "Madison", "Raleigh", "Portland", "Boise", "Tucson",
];

const PROPERTY_KINDS: [(&str, &str); 4] = [
    ("house", "home"),
    ("cabin", "tree"),
    ("apartment", "building"),
    ("studio", "palette"),
];

const ROOMS: [(&str, &str); 9] = [
    ("Kitchen", "utensils"),
    ("Living room", "sofa"),
    ("Bedroom", "bed"),
    ("Bathroom", "bath"),
    ("Garage", "car"),
    ("Office", "briefcase"),
    ("Basement", "box"),
    ("Attic", "archive"),
    ("Laundry", "shirt"),
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterCall {
    Navigate(Destination),
    Back,
}

/// Router double that records every call and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    pub calls: Vec<RouterCall>,
    pub fail_navigation: bool,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Vec::new(),
            fail_navigation: true,
        }
    }

    pub fn navigations(&self) -> Vec<Destination> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RouterCall::Navigate(destination) => Some(destination.clone()),
                RouterCall::Back => None,
            })
            .collect()
    }
}

impl Router for RecordingRouter {
    fn navigate(&mut self, destination: &Destination) -> Result<()> {
        self.calls.push(RouterCall::Navigate(destination.clone()));
        if self.fail_navigation {
            bail!("navigation to {destination} rejected");
        }
        Ok(())
    }

    fn back(&mut self) -> Result<()> {
        self.calls.push(RouterCall::Back);
        Ok(())
    }
}

/// Steps `frames` frames and collects anything that fired.
pub fn run_frames(
    coordinator: &mut TransitionCoordinator,
    context: &NavigationContext,
    router: &mut dyn Router,
    frames: usize,
) -> Vec<ExitFired> {
    let mut fired = Vec::new();
    for _ in 0..frames {
        fired.extend(coordinator.advance(FRAME, context, router));
    }
    fired
}

/// Steps until the coordinator stops animating.
pub fn settle(
    coordinator: &mut TransitionCoordinator,
    context: &NavigationContext,
    router: &mut dyn Router,
) -> Vec<ExitFired> {
    let mut fired = Vec::new();
    for _ in 0..MAX_SETTLE_FRAMES {
        if !coordinator.is_animating() {
            break;
        }
        fired.extend(coordinator.advance(FRAME, context, router));
    }
    fired
}

pub fn settle_screen(
    screen: &mut ScreenNavigator,
    context: &NavigationContext,
    router: &mut dyn Router,
) -> Vec<ExitFired> {
    let mut fired = Vec::new();
    for _ in 0..MAX_SETTLE_FRAMES {
        if !screen.is_animating() {
            break;
        }
        fired.extend(screen.advance(FRAME, context, router));
    }
    fired
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub properties: Vec<Property>,
    pub rooms: Vec<Room>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for properties, rooms, and items.
#[derive(Debug, Clone)]
pub struct InventoryFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl InventoryFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn property(&mut self) -> Property {
        let street = self.pick(&STREET_NAMES);
        let (kind, icon) = PROPERTY_KINDS[self.rng.int_n(PROPERTY_KINDS.len())];
        let number = 100 + self.rng.int_n(9_900);
        Property {
            id: PropertyId::new(self.id("p")),
            name: format!("{street} {kind}"),
            address: format!("{number} {street} St, {}", self.pick(&CITIES)),
            icon: Some(icon.to_owned()),
        }
    }

    pub fn room(&mut self, property_id: &PropertyId) -> Room {
        let (name, icon) = ROOMS[self.rng.int_n(ROOMS.len())];
        Room {
            id: RoomId::new(self.id("r")),
            property_id: property_id.clone(),
            name: name.to_owned(),
            icon: Some(icon.to_owned()),
        }
    }

    pub fn item(&mut self, room: &Room) -> Item {
        let names = item_names(&room.name);
        let name = names[self.rng.int_n(names.len())];
        Item {
            id: ItemId::new(self.id("i")),
            room_id: room.id.clone(),
            name: name.to_owned(),
            quantity: 1 + self.rng.int_n(3) as u32,
            value_cents: Some(500 + self.rng.int_n(250_000) as i64),
            acquired_on: Some(self.date_in_year(REFERENCE_YEAR - 1)),
            notes: String::new(),
        }
    }

    /// `properties` properties with 2-4 rooms each and 1-5 items per room.
    pub fn inventory(&mut self, properties: usize) -> Inventory {
        let mut inventory = Inventory::default();
        for _ in 0..properties {
            let property = self.property();
            for _ in 0..2 + self.rng.int_n(3) {
                let room = self.room(&property.id);
                for _ in 0..1 + self.rng.int_n(5) {
                    let item = self.item(&room);
                    inventory.items.push(item);
                }
                inventory.rooms.push(room);
            }
            inventory.properties.push(property);
        }
        inventory
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn date_in_year(&mut self, year: i32) -> Date {
        let start = Date::from_calendar_date(year, Month::January, 1).expect("valid calendar date");
        start + TimeDuration::days(self.rng.int_n(365) as i64)
    }
}

fn item_names(room_name: &str) -> &'static [&'static str] {
    match room_name {
        "Kitchen" => &["Stand mixer", "Espresso machine", "Cast iron skillet", "Knife block"],
        "Living room" => &["Sofa", "Floor lamp", "Record player", "Bookshelf"],
        "Bedroom" => &["Dresser", "Bed frame", "Nightstand"],
        "Bathroom" => &["Towel warmer", "Mirror cabinet"],
        "Garage" => &["Cordless drill", "Ladder", "Tool chest", "Bicycle"],
        "Office" => &["Standing desk", "Monitor", "Desk chair"],
        _ => &["Storage bin", "Shelving unit"],
    }
}
