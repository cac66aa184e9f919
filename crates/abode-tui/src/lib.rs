// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use abode_app::{
    ContextEvent, Destination, HierarchyContext, HierarchyLevel, Item, ItemId, MotionConfig,
    NavigationContext, NavigationMode, PARAM_ITEM_ID, PARAM_PROPERTY_ID, PARAM_ROOM_ID, Property,
    PropertyId, Room, RoomId, RouteId, RouteParams, Router, ScreenNavigator, TabKind,
    TransitionPhase,
};
use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Domain data the shell renders. Loading and caching live behind this seam.
pub trait Catalog {
    fn load_properties(&mut self) -> Result<Vec<Property>>;
    fn load_rooms(&mut self, property_id: &PropertyId) -> Result<Vec<Room>>;
    fn load_items(&mut self, room_id: &RoomId) -> Result<Vec<Item>>;
    fn load_all_items(&mut self) -> Result<Vec<Item>>;
    fn find_property(&mut self, id: &PropertyId) -> Result<Option<Property>>;
    fn find_room(&mut self, id: &RoomId) -> Result<Option<Room>>;
    fn find_item(&mut self, id: &ItemId) -> Result<Option<Item>>;
}

/// In-process router: a current entry plus the entries below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRouter {
    current: Destination,
    history: Vec<Destination>,
    generation: u64,
}

impl StackRouter {
    pub fn new(root: Destination) -> Self {
        Self {
            current: root,
            history: Vec::new(),
            generation: 0,
        }
    }

    pub fn current(&self) -> &Destination {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.history.len() + 1
    }

    /// Bumped on every change so the shell knows when to remount.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tab switch: drop the whole stack.
    pub fn reset(&mut self, root: Destination) {
        self.history.clear();
        self.current = root;
        self.generation += 1;
    }
}

/// Entries show the same screen when the path and the id the screen is
/// about agree. Ancestor params only steer back navigation.
fn same_screen(entry: &Destination, destination: &Destination) -> bool {
    if entry.path != destination.path {
        return false;
    }
    let own_param = match entry.path {
        RouteId::Property => PARAM_PROPERTY_ID,
        RouteId::Room => PARAM_ROOM_ID,
        RouteId::Item => PARAM_ITEM_ID,
        _ => return entry.params == destination.params,
    };
    entry.params.get(own_param) == destination.params.get(own_param)
}

impl Router for StackRouter {
    fn navigate(&mut self, destination: &Destination) -> Result<()> {
        if let Some(index) = self
            .history
            .iter()
            .rposition(|entry| same_screen(entry, destination))
        {
            self.history.truncate(index);
        } else if !same_screen(&self.current, destination) {
            let previous = std::mem::replace(&mut self.current, destination.clone());
            self.history.push(previous);
            self.generation += 1;
            return Ok(());
        }
        self.current = destination.clone();
        self.generation += 1;
        Ok(())
    }

    fn back(&mut self) -> Result<()> {
        let Some(previous) = self.history.pop() else {
            bail!("nothing to go back to from {}", self.current);
        };
        self.current = previous;
        self.generation += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    SignedIn,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    pub motion: MotionConfig,
    pub frame_interval: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScreenRow {
    label: String,
    detail: String,
    target: Option<Destination>,
}

impl ScreenRow {
    fn link(label: impl Into<String>, detail: impl Into<String>, target: Destination) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            target: Some(target),
        }
    }

    fn field(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ScreenView {
    title: String,
    rows: Vec<ScreenRow>,
    selected: usize,
    note: Option<String>,
}

impl ScreenView {
    fn new(title: impl Into<String>, rows: Vec<ScreenRow>) -> Self {
        Self {
            title: title.into(),
            rows,
            selected: 0,
            note: None,
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn missing(title: impl Into<String>, note: impl Into<String>) -> Self {
        Self::new(title, Vec::new()).with_note(note)
    }

    fn selected_target(&self) -> Option<&Destination> {
        self.rows
            .get(self.selected)
            .and_then(|row| row.target.as_ref())
    }
}

/// Everything the terminal shell owns: the navigation context, the router,
/// and the single mounted screen.
#[derive(Debug)]
pub struct Shell {
    context: NavigationContext,
    router: StackRouter,
    screen: ScreenNavigator,
    view: ScreenView,
    breadcrumb: String,
    motion: MotionConfig,
    mounted_generation: u64,
    status: Option<String>,
    show_parent: bool,
    internal_tx: Sender<InternalEvent>,
    internal_rx: Receiver<InternalEvent>,
}

impl Shell {
    pub fn new<C: Catalog>(start: Destination, motion: MotionConfig, catalog: &mut C) -> Self {
        let (internal_tx, internal_rx) = mpsc::channel();
        let router = StackRouter::new(start);
        let screen = ScreenNavigator::mount(router.current(), motion);
        let context = NavigationContext::default();
        let mut shell = Self {
            breadcrumb: render_breadcrumb_text(&context),
            context,
            mounted_generation: router.generation(),
            router,
            screen,
            view: ScreenView::default(),
            motion,
            status: None,
            show_parent: false,
            internal_tx,
            internal_rx,
        };
        shell.focus_current(catalog);
        shell
    }

    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    pub fn router(&self) -> &StackRouter {
        &self.router
    }

    pub fn screen(&self) -> &ScreenNavigator {
        &self.screen
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn breadcrumb(&self) -> &str {
        &self.breadcrumb
    }

    /// Returns true when the shell should stop.
    pub fn handle_key<C: Catalog>(&mut self, catalog: &mut C, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match key.code {
            KeyCode::Char('q') => {
                if self.request_quit() {
                    return true;
                }
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.back(),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.activate(),
            KeyCode::Char('a') => self.open_add(),
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('p') => self.show_parent = !self.show_parent,
            KeyCode::Char('1') => self.switch_tab(TabKind::Portfolio),
            KeyCode::Char('2') => self.switch_tab(TabKind::Inventory),
            KeyCode::Char('3') => self.switch_tab(TabKind::Settings),
            _ => {}
        }
        self.sync_with_router(catalog);
        false
    }

    /// One frame: advance the mounted screen, drain internal events, and
    /// remount if the router moved. Returns true when the shell should stop.
    pub fn tick<C: Catalog>(&mut self, catalog: &mut C, dt: Duration) -> bool {
        if let Some(fired) = self.screen.advance(dt, &self.context, &mut self.router) {
            debug!(?fired, "screen exit fired");
        }
        let quit = self.process_internal_events();
        self.sync_with_router(catalog);
        quit
    }

    fn process_internal_events(&mut self) -> bool {
        let mut quit = false;
        while let Ok(event) = self.internal_rx.try_recv() {
            match event {
                InternalEvent::Quit => quit = true,
                InternalEvent::SignedIn => {
                    info!("signed in; resetting to portfolio");
                    self.router.reset(Destination::portfolio());
                    self.status = Some("signed in".to_owned());
                }
            }
        }
        quit
    }

    fn sync_with_router<C: Catalog>(&mut self, catalog: &mut C) {
        if self.router.generation() == self.mounted_generation {
            return;
        }
        self.mounted_generation = self.router.generation();
        self.screen.unmount();
        self.screen = ScreenNavigator::mount(self.router.current(), self.motion);
        debug!(destination = %self.router.current(), depth = self.router.depth(), "screen mounted");
        self.focus_current(catalog);
    }

    fn focus_current<C: Catalog>(&mut self, catalog: &mut C) {
        let mut events = self.screen.focus(&mut self.context).events;
        let route = self.screen.route().clone();
        let params = self.screen.params().clone();
        self.view = match load_view(&route, &params, &mut self.context, catalog, &mut events) {
            Ok(view) => view,
            Err(error) => {
                let message = format!("{error:#}");
                warn!(route = %route, error = %message, "screen load failed");
                self.status = Some(format!("load failed: {message}"));
                ScreenView::missing(route.title(), "could not load this screen")
            }
        };
        if should_refresh_breadcrumb(&events) {
            self.breadcrumb = render_breadcrumb_text(&self.context);
            debug!(route = %route, breadcrumb = %self.breadcrumb, "breadcrumb refreshed");
        }
    }

    fn request_quit(&mut self) -> bool {
        let tx = self.internal_tx.clone();
        let request = self.screen.animated_exit(move || {
            let _ = tx.send(InternalEvent::Quit);
        });
        // Nothing to fade out (already leaving or still entering): stop now.
        !request.accepted()
    }

    fn back(&mut self) {
        let is_form = self.context.navigation_mode() == NavigationMode::Form;
        if self.screen.animated_back().accepted() && is_form {
            self.status = Some("cancelled".to_owned());
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.rows.len();
        if len == 0 {
            return;
        }
        let next = (self.view.selected as isize + delta).clamp(0, len as isize - 1);
        self.view.selected = next as usize;
    }

    fn activate(&mut self) {
        if !matches!(
            self.screen.phase(),
            TransitionPhase::Entering | TransitionPhase::Settled
        ) {
            return;
        }
        let route = self.screen.route().clone();
        match route {
            RouteId::Login | RouteId::SignUp | RouteId::Onboarding => {
                let tx = self.internal_tx.clone();
                self.screen.animated_exit(move || {
                    let _ = tx.send(InternalEvent::SignedIn);
                });
            }
            _ if route.navigation_mode() == NavigationMode::Form => {
                if self.screen.animated_back().accepted() {
                    self.status = Some(format!("saved: {}", route.title().to_lowercase()));
                }
            }
            _ => {
                if let Some(target) = self.view.selected_target().cloned() {
                    self.navigate(&target);
                }
            }
        }
    }

    fn navigate(&mut self, target: &Destination) {
        if let Err(error) = self.router.navigate(target) {
            self.status = Some(format!("navigation failed: {error:#}"));
        }
    }

    fn open_add(&mut self) {
        if !self.context.chrome_visible() {
            return;
        }
        let ancestors = self.context.context().ancestors();
        let target = match self.screen.route() {
            RouteId::Portfolio => Destination::new(RouteId::AddProperty),
            RouteId::Property => Destination::with_params(
                RouteId::AddRoom,
                params_with(PARAM_PROPERTY_ID, ancestors.property_id.map(PropertyId::as_str)),
            ),
            RouteId::Room => Destination::with_params(
                RouteId::AddItem,
                params_with(PARAM_ROOM_ID, ancestors.room_id.map(RoomId::as_str)),
            ),
            RouteId::ManageUsers => Destination::new(RouteId::AddUser),
            _ => {
                self.status = Some("nothing to add here".to_owned());
                return;
            }
        };
        self.navigate(&target);
    }

    fn open_edit(&mut self) {
        if !self.context.chrome_visible() {
            return;
        }
        let ancestors = self.context.context().ancestors();
        let target = match self.screen.route() {
            RouteId::Room => Destination::with_params(
                RouteId::EditRoom,
                params_with(PARAM_ROOM_ID, ancestors.room_id.map(RoomId::as_str))
                    .merged(PARAM_PROPERTY_ID, ancestors.property_id.map(PropertyId::as_str)),
            ),
            RouteId::Item => Destination::with_params(
                RouteId::EditItem,
                params_with(PARAM_ITEM_ID, self.screen.params().get(PARAM_ITEM_ID))
                    .merged(PARAM_ROOM_ID, ancestors.room_id.map(RoomId::as_str)),
            ),
            _ => {
                self.status = Some("nothing to edit here".to_owned());
                return;
            }
        };
        self.navigate(&target);
    }

    fn switch_tab(&mut self, tab: TabKind) {
        if !self.context.chrome_visible() {
            return;
        }
        let root = match tab {
            TabKind::Portfolio | TabKind::None => RouteId::Portfolio,
            TabKind::Inventory => RouteId::Inventory,
            TabKind::Settings => RouteId::Settings,
        };
        self.router.reset(Destination::new(root));
    }
}

trait ParamsExt {
    fn merged(self, key: &str, value: Option<&str>) -> Self;
}

impl ParamsExt for RouteParams {
    fn merged(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }
}

fn params_with(key: &str, value: Option<&str>) -> RouteParams {
    RouteParams::new().merged(key, value)
}

fn should_refresh_breadcrumb(events: &[ContextEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            ContextEvent::TabChanged(_)
                | ContextEvent::LevelChanged(_)
                | ContextEvent::ContextMerged
                | ContextEvent::ContextReset
                | ContextEvent::ModeChanged(_)
        )
    })
}

/// Loads the body for `route`, appending every context change to `events`.
fn load_view<C: Catalog>(
    route: &RouteId,
    params: &RouteParams,
    context: &mut NavigationContext,
    catalog: &mut C,
    events: &mut Vec<ContextEvent>,
) -> Result<ScreenView> {
    match route {
        RouteId::Portfolio => portfolio_view(context, catalog, events),
        RouteId::Inventory => inventory_view(catalog),
        RouteId::Property => property_view(params, context, catalog, events),
        RouteId::Room => room_view(params, context, catalog, events),
        RouteId::Item => item_view(params, context, catalog, events),
        RouteId::Settings => Ok(settings_view()),
        RouteId::ManageUsers => Ok(users_view()),
        RouteId::AddProperty
        | RouteId::AddRoom
        | RouteId::EditRoom
        | RouteId::AddItem
        | RouteId::EditItem
        | RouteId::ChangePassword
        | RouteId::EditProfile
        | RouteId::AddUser
        | RouteId::Login
        | RouteId::SignUp
        | RouteId::Onboarding => Ok(form_view(route)),
        RouteId::Other(path) => Ok(ScreenView::missing(
            "Not found",
            format!("nothing lives at {path}; esc returns to the portfolio"),
        )),
    }
}

fn portfolio_view<C: Catalog>(
    context: &mut NavigationContext,
    catalog: &mut C,
    events: &mut Vec<ContextEvent>,
) -> Result<ScreenView> {
    events.extend(context.reset_context());
    let properties = catalog.load_properties().context("load properties")?;
    events.extend(context.set_properties(properties.iter().map(Property::summary).collect()));

    let rows = properties
        .iter()
        .map(|property| {
            ScreenRow::link(
                &property.name,
                &property.address,
                Destination::property(&property.id),
            )
        })
        .collect::<Vec<_>>();
    let view = ScreenView::new("Portfolio", rows);
    if view.rows.is_empty() {
        return Ok(view.with_note("no properties yet; press a to add one"));
    }
    Ok(view)
}

fn inventory_view<C: Catalog>(catalog: &mut C) -> Result<ScreenView> {
    let items = catalog.load_all_items().context("load inventory")?;
    // Inventory links only name the item; the item screen fills in its room.
    let rows = items
        .iter()
        .map(|item| {
            ScreenRow::link(
                &item.name,
                item_summary(item),
                Destination::with_params(
                    RouteId::Item,
                    RouteParams::new().with(PARAM_ITEM_ID, item.id.as_str()),
                ),
            )
        })
        .collect();
    Ok(ScreenView::new("Inventory", rows))
}

fn property_view<C: Catalog>(
    params: &RouteParams,
    context: &mut NavigationContext,
    catalog: &mut C,
    events: &mut Vec<ContextEvent>,
) -> Result<ScreenView> {
    let Some(id) = params
        .property_id()
        .or_else(|| context.context().ancestors().property_id.cloned())
    else {
        return Ok(ScreenView::missing("Property", "no property selected"));
    };
    let Some(property) = catalog
        .find_property(&id)
        .with_context(|| format!("load property {id}"))?
    else {
        return Ok(ScreenView::missing("Property", format!("property {id} not found")));
    };

    events.extend(
        context.set_current_context(
            HierarchyContext::default()
                .with_property_id(property.id.clone())
                .with_property_name(&property.name)
                .with_property_address(&property.address),
        ),
    );
    let rooms = catalog
        .load_rooms(&property.id)
        .with_context(|| format!("load rooms for property {id}"))?;
    events.extend(context.set_rooms(rooms.iter().map(Room::summary).collect()));

    let mut rows = Vec::with_capacity(rooms.len());
    for room in &rooms {
        let count = catalog
            .load_items(&room.id)
            .with_context(|| format!("load items for room {}", room.id))?
            .len();
        rows.push(ScreenRow::link(
            &room.name,
            format!("{count} items"),
            Destination::with_params(
                RouteId::Room,
                RouteParams::new()
                    .with(PARAM_ROOM_ID, room.id.as_str())
                    .with(PARAM_PROPERTY_ID, property.id.as_str()),
            ),
        ));
    }
    let view = ScreenView::new(property.name.clone(), rows).with_note(property.address.clone());
    Ok(view)
}

fn room_view<C: Catalog>(
    params: &RouteParams,
    context: &mut NavigationContext,
    catalog: &mut C,
    events: &mut Vec<ContextEvent>,
) -> Result<ScreenView> {
    let Some(id) = params
        .room_id()
        .or_else(|| context.context().ancestors().room_id.cloned())
    else {
        return Ok(ScreenView::missing("Room", "no room selected"));
    };
    let Some(room) = catalog
        .find_room(&id)
        .with_context(|| format!("load room {id}"))?
    else {
        return Ok(ScreenView::missing("Room", format!("room {id} not found")));
    };
    let items = catalog
        .load_items(&room.id)
        .with_context(|| format!("load items for room {id}"))?;
    let patch = room_scope(&room, items.len(), catalog)?;
    events.extend(context.set_current_context(patch));

    let rows = items
        .iter()
        .map(|item| {
            ScreenRow::link(
                &item.name,
                item_summary(item),
                Destination::with_params(
                    RouteId::Item,
                    RouteParams::new()
                        .with(PARAM_ITEM_ID, item.id.as_str())
                        .with(PARAM_ROOM_ID, room.id.as_str()),
                ),
            )
        })
        .collect::<Vec<_>>();
    let view = ScreenView::new(room.name.clone(), rows);
    if view.rows.is_empty() {
        return Ok(view.with_note("empty room; press a to add an item"));
    }
    Ok(view)
}

/// Context facts for a room and the property that owns it.
fn room_scope<C: Catalog>(
    room: &Room,
    item_count: usize,
    catalog: &mut C,
) -> Result<HierarchyContext> {
    let mut patch = HierarchyContext::default()
        .with_room_id(room.id.clone())
        .with_room_name(&room.name)
        .with_room_item_count(u32::try_from(item_count).unwrap_or(u32::MAX))
        .with_property_id(room.property_id.clone());
    if let Some(property) = catalog
        .find_property(&room.property_id)
        .with_context(|| format!("load property {}", room.property_id))?
    {
        patch = patch
            .with_property_name(property.name)
            .with_property_address(property.address);
    }
    Ok(patch)
}

fn item_view<C: Catalog>(
    params: &RouteParams,
    context: &mut NavigationContext,
    catalog: &mut C,
    events: &mut Vec<ContextEvent>,
) -> Result<ScreenView> {
    let Some(id) = params.item_id() else {
        return Ok(ScreenView::missing("Item", "no item selected"));
    };
    let Some(item) = catalog
        .find_item(&id)
        .with_context(|| format!("load item {id}"))?
    else {
        return Ok(ScreenView::missing("Item", format!("item {id} not found")));
    };
    let room = catalog
        .find_room(&item.room_id)
        .with_context(|| format!("load room {}", item.room_id))?;
    match room {
        Some(room) => {
            let count = catalog
                .load_items(&room.id)
                .with_context(|| format!("load items for room {}", room.id))?
                .len();
            let patch = room_scope(&room, count, catalog)?;
            events.extend(context.set_current_context(patch));
        }
        None => {
            // Orphaned item: keep only its room id so names from an
            // earlier room do not linger.
            events.extend(context.reset_context());
            events.extend(context.set_current_context(
                HierarchyContext::default().with_room_id(item.room_id.clone()),
            ));
        }
    }

    let rows = vec![
        ScreenRow::field("quantity", item.quantity.to_string()),
        ScreenRow::field(
            "value",
            item.value_cents.map(format_money).unwrap_or_default(),
        ),
        ScreenRow::field(
            "acquired",
            item.acquired_on.map(|date| date.to_string()).unwrap_or_default(),
        ),
        ScreenRow::field("notes", item.notes.clone()),
    ];
    Ok(ScreenView::new(item.name, rows))
}

fn settings_view() -> ScreenView {
    let rows = [RouteId::ChangePassword, RouteId::EditProfile, RouteId::ManageUsers]
        .into_iter()
        .map(|route| ScreenRow::link(route.title(), "", Destination::new(route.clone())))
        .collect();
    ScreenView::new("Settings", rows)
}

fn users_view() -> ScreenView {
    ScreenView::new(
        "Manage users",
        vec![
            ScreenRow::field("you", "owner"),
            ScreenRow::link("Add user", "invite by email", Destination::new(RouteId::AddUser)),
        ],
    )
}

fn form_view(route: &RouteId) -> ScreenView {
    let fields: &[&str] = match route {
        RouteId::AddProperty => &["name", "address", "icon"],
        RouteId::AddRoom | RouteId::EditRoom => &["name", "icon"],
        RouteId::AddItem | RouteId::EditItem => {
            &["name", "quantity", "value", "acquired on", "notes"]
        }
        RouteId::ChangePassword => &["current password", "new password", "confirm"],
        RouteId::EditProfile => &["display name", "email"],
        RouteId::AddUser => &["email", "role"],
        RouteId::Login => &["email", "password"],
        RouteId::SignUp => &["name", "email", "password"],
        _ => &[],
    };
    let note = match route {
        RouteId::Login | RouteId::SignUp | RouteId::Onboarding => "enter continues",
        _ => "enter saves, esc cancels",
    };
    let rows = fields
        .iter()
        .map(|field| ScreenRow::field(*field, ""))
        .collect();
    ScreenView::new(route.title(), rows).with_note(note)
}

fn item_summary(item: &Item) -> String {
    match item.value_cents {
        Some(cents) => format!("x{}  {}", item.quantity, format_money(cents)),
        None => format!("x{}", item.quantity),
    }
}

fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = absolute / 100;
    let cents_component = absolute % 100;
    format!("{sign}${dollars}.{cents_component:02}")
}

pub fn run_app<C: Catalog>(start: Destination, options: ShellOptions, catalog: &mut C) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut shell = Shell::new(start, options.motion, catalog);
    let mut last_frame = Instant::now();

    let mut result: Result<()> = Ok(());
    loop {
        if let Err(error) = terminal.draw(|frame| render(frame, &shell)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::poll(options.frame_interval).context("poll event") {
            Ok(true) => match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if shell.handle_key(catalog, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            },
            Ok(false) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;
        if shell.tick(catalog, dt) {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn render(frame: &mut ratatui::Frame<'_>, shell: &Shell) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    if shell.context.chrome_visible() {
        let selected = TabKind::SELECTABLE
            .iter()
            .position(|tab| *tab == shell.context.active_tab())
            .unwrap_or(0);
        let tabs = Tabs::new(TabKind::SELECTABLE.iter().map(|tab| tab.label()))
            .block(Block::default().title("abode").borders(Borders::ALL))
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .select(selected);
        frame.render_widget(tabs, layout[0]);
    } else {
        let title = Paragraph::new(shell.view.title.clone())
            .block(Block::default().title("abode").borders(Borders::ALL));
        frame.render_widget(title, layout[0]);
    }

    let breadcrumb = Paragraph::new(shell.breadcrumb.clone())
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(breadcrumb, layout[1]);

    let pose = shell.screen.pose();
    let body = Paragraph::new(render_body_text(&shell.view))
        .style(fade_style(pose.opacity))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(shell.view.title.clone()),
        );
    frame.render_widget(body, shifted(layout[2], pose.offset));

    let footer = Paragraph::new(footer_text(shell))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[3]);
}

fn shifted(area: Rect, offset: f32) -> Rect {
    let shift = (offset.max(0.0).round() as u16).min(area.width.saturating_sub(1));
    Rect {
        x: area.x + shift,
        width: area.width - shift,
        ..area
    }
}

fn fade_style(opacity: f32) -> Style {
    let color = if opacity >= 0.85 {
        Color::White
    } else if opacity >= 0.45 {
        Color::Gray
    } else {
        Color::DarkGray
    };
    Style::default().fg(color)
}

fn render_breadcrumb_text(context: &NavigationContext) -> String {
    if !context.chrome_visible() {
        return String::new();
    }
    let mut parts = vec![context.active_tab().label().to_owned()];
    let scope = context.context();
    let level = context.current_level();
    // Only ancestors of the screen on display; tab roots and settings own none.
    let in_property = matches!(
        level,
        HierarchyLevel::Property | HierarchyLevel::Room | HierarchyLevel::Item
    );
    let in_room = matches!(level, HierarchyLevel::Room | HierarchyLevel::Item);
    if in_property && let Some(name) = &scope.property_name {
        parts.push(name.clone());
    }
    if in_room && let Some(name) = &scope.room_name {
        match scope.room_item_count {
            Some(count) => parts.push(format!("{name} ({count})")),
            None => parts.push(name.clone()),
        }
    }
    parts.join(" > ")
}

fn render_body_text(view: &ScreenView) -> String {
    let mut lines = Vec::with_capacity(view.rows.len() + 2);
    if let Some(note) = &view.note {
        lines.push(note.clone());
        lines.push(String::new());
    }
    for (index, row) in view.rows.iter().enumerate() {
        let marker = if index == view.selected { ">" } else { " " };
        if row.detail.is_empty() {
            lines.push(format!("{marker} {}", row.label));
        } else {
            lines.push(format!("{marker} {:<24} {}", row.label, row.detail));
        }
    }
    lines.join("\n")
}

fn footer_text(shell: &Shell) -> String {
    let mode = match shell.context.navigation_mode() {
        NavigationMode::Shell => "NAV",
        NavigationMode::Form => "FORM",
    };
    let hints = if shell.context.chrome_visible() {
        "j/k enter | esc back | a add e edit | 1/2/3 tabs | p parent | q"
    } else {
        "enter save | esc cancel | q"
    };
    let mut parts = vec![mode.to_owned()];
    if let Some(status) = &shell.status {
        parts.push(status.clone());
    }
    parts.push(hints.to_owned());
    if shell.show_parent {
        parts.push(format!(
            "back -> {}",
            shell.screen.parent_destination(&shell.context)
        ));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::{
        Catalog, Shell, StackRouter, footer_text, format_money, render_body_text,
        render_breadcrumb_text, shifted, should_refresh_breadcrumb,
    };
    use abode_app::{
        ContextEvent, Destination, HierarchyContext, HierarchyLevel, Item, ItemId, MotionConfig,
        NavigationContext, NavigationMode, Property, PropertyId, Room, RoomId, RouteId,
        RouteParams, Router, TabKind, TransitionPhase,
    };
    use abode_testkit::{FRAME, Inventory, InventoryFaker};
    use anyhow::{Result, bail};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;

    #[derive(Debug, Default)]
    struct TestCatalog {
        inventory: Inventory,
        fail_rooms: bool,
    }

    impl TestCatalog {
        fn seeded() -> Self {
            Self {
                inventory: InventoryFaker::new(3).inventory(2),
                fail_rooms: false,
            }
        }

        fn first_property(&self) -> &Property {
            &self.inventory.properties[0]
        }

        fn first_room_of(&self, property_id: &PropertyId) -> &Room {
            self.inventory
                .rooms
                .iter()
                .find(|room| &room.property_id == property_id)
                .expect("faker gives every property a room")
        }
    }

    impl Catalog for TestCatalog {
        fn load_properties(&mut self) -> Result<Vec<Property>> {
            Ok(self.inventory.properties.clone())
        }

        fn load_rooms(&mut self, property_id: &PropertyId) -> Result<Vec<Room>> {
            if self.fail_rooms {
                bail!("rooms unavailable");
            }
            Ok(self
                .inventory
                .rooms
                .iter()
                .filter(|room| &room.property_id == property_id)
                .cloned()
                .collect())
        }

        fn load_items(&mut self, room_id: &RoomId) -> Result<Vec<Item>> {
            Ok(self
                .inventory
                .items
                .iter()
                .filter(|item| &item.room_id == room_id)
                .cloned()
                .collect())
        }

        fn load_all_items(&mut self) -> Result<Vec<Item>> {
            Ok(self.inventory.items.clone())
        }

        fn find_property(&mut self, id: &PropertyId) -> Result<Option<Property>> {
            Ok(self.inventory.properties.iter().find(|p| &p.id == id).cloned())
        }

        fn find_room(&mut self, id: &RoomId) -> Result<Option<Room>> {
            Ok(self.inventory.rooms.iter().find(|r| &r.id == id).cloned())
        }

        fn find_item(&mut self, id: &ItemId) -> Result<Option<Item>> {
            Ok(self.inventory.items.iter().find(|i| &i.id == id).cloned())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(shell: &mut Shell, catalog: &mut TestCatalog, code: KeyCode) -> bool {
        shell.handle_key(catalog, key(code))
    }

    /// Ticks until the mounted screen stops animating. Returns the quit flag.
    fn settle(shell: &mut Shell, catalog: &mut TestCatalog) -> bool {
        for _ in 0..500 {
            if shell.tick(catalog, FRAME) {
                return true;
            }
            if !shell.screen().is_animating() {
                return false;
            }
        }
        false
    }

    fn started_at(destination: Destination, catalog: &mut TestCatalog) -> Shell {
        let mut shell = Shell::new(destination, MotionConfig::default(), catalog);
        settle(&mut shell, catalog);
        shell
    }

    #[test]
    fn portfolio_focus_resets_context_and_fills_picker() {
        let mut catalog = TestCatalog::seeded();
        let shell = started_at(Destination::portfolio(), &mut catalog);

        assert!(shell.context().context().is_empty());
        assert_eq!(shell.context().properties().len(), 2);
        assert_eq!(shell.context().current_level(), HierarchyLevel::Portfolio);
        assert_eq!(shell.screen().phase(), TransitionPhase::Settled);
    }

    #[test]
    fn drilling_down_records_ancestors() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let room = catalog.first_room_of(&property.id).clone();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);

        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current(), &Destination::property(&property.id));
        assert_eq!(shell.context().context().property_id, Some(property.id.clone()));
        assert_eq!(
            shell.context().context().property_name.as_deref(),
            Some(property.name.as_str())
        );
        assert!(!shell.context().rooms().is_empty());

        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current().path, RouteId::Room);
        assert_eq!(shell.context().context().room_id, Some(room.id.clone()));
        assert_eq!(shell.context().current_level(), HierarchyLevel::Room);
    }

    #[test]
    fn back_from_item_without_room_param_uses_context() {
        let mut catalog = TestCatalog::seeded();
        let item = catalog.inventory.items[0].clone();
        let deep_link = Destination::with_params(
            RouteId::Item,
            RouteParams::new().with("item_id", item.id.as_str()),
        );
        let mut shell = started_at(deep_link, &mut catalog);
        assert_eq!(shell.router().depth(), 1);

        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);

        assert_eq!(shell.router().current(), &Destination::room(&item.room_id));
        assert_eq!(shell.context().current_level(), HierarchyLevel::Room);
    }

    #[test]
    fn repeated_back_presses_move_up_one_level() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let mut shell = started_at(Destination::property(&property.id), &mut catalog);

        for _ in 0..3 {
            press(&mut shell, &mut catalog, KeyCode::Esc);
        }
        settle(&mut shell, &mut catalog);

        assert_eq!(shell.router().current(), &Destination::portfolio());
        assert_eq!(shell.router().depth(), 2);
    }

    #[test]
    fn back_is_ignored_while_entering() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let mut shell = Shell::new(
            Destination::property(&property.id),
            MotionConfig::default(),
            &mut catalog,
        );
        assert_eq!(shell.screen().phase(), TransitionPhase::Entering);

        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current(), &Destination::property(&property.id));
    }

    #[test]
    fn settings_children_return_to_settings() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);

        press(&mut shell, &mut catalog, KeyCode::Char('3'));
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.context().active_tab(), TabKind::Settings);
        assert_eq!(shell.router().depth(), 1);

        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current().path, RouteId::ChangePassword);
        assert_eq!(shell.context().navigation_mode(), NavigationMode::Form);

        press(&mut shell, &mut catalog, KeyCode::Char('1'));
        assert_eq!(
            shell.router().current().path,
            RouteId::ChangePassword,
            "tabs are hidden in form mode"
        );

        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current(), &Destination::settings());
        assert_eq!(shell.status(), Some("cancelled"));
    }

    #[test]
    fn add_item_from_room_carries_room_and_returns_there() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let room = catalog.first_room_of(&property.id).clone();
        let mut shell = started_at(Destination::room(&room.id), &mut catalog);

        press(&mut shell, &mut catalog, KeyCode::Char('a'));
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current().path, RouteId::AddItem);
        assert_eq!(shell.router().current().params.room_id(), Some(room.id.clone()));

        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current(), &Destination::room(&room.id));
        assert_eq!(shell.status(), Some("saved: add item"));
    }

    #[test]
    fn sign_in_resets_to_portfolio() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::new(RouteId::Login), &mut catalog);
        assert_eq!(shell.context().active_tab(), TabKind::None);

        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);

        assert_eq!(shell.router().current(), &Destination::portfolio());
        assert_eq!(shell.context().active_tab(), TabKind::Portfolio);
        assert_eq!(shell.status(), Some("signed in"));
    }

    #[test]
    fn quit_fades_out_before_stopping() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);

        assert!(!press(&mut shell, &mut catalog, KeyCode::Char('q')));
        assert_eq!(shell.screen().phase(), TransitionPhase::Exiting);
        assert!(settle(&mut shell, &mut catalog));
    }

    #[test]
    fn ctrl_c_stops_immediately() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);
        assert!(shell.handle_key(
            &mut catalog,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
    }

    #[test]
    fn load_failures_surface_in_status() {
        let mut catalog = TestCatalog::seeded();
        catalog.fail_rooms = true;
        let property = catalog.first_property().clone();
        let shell = started_at(Destination::property(&property.id), &mut catalog);

        let status = shell.status().expect("failure recorded");
        assert!(status.contains("load failed"), "status {status}");
        assert!(status.contains("rooms unavailable"), "status {status}");
    }

    #[test]
    fn unknown_deep_link_falls_back_to_portfolio() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(
            Destination::new(RouteId::parse("/capture/scan")),
            &mut catalog,
        );
        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current(), &Destination::portfolio());
    }

    #[test]
    fn parent_preview_shows_in_footer() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let mut shell = started_at(Destination::property(&property.id), &mut catalog);

        assert!(!footer_text(&shell).contains("back ->"));
        press(&mut shell, &mut catalog, KeyCode::Char('p'));
        assert!(footer_text(&shell).ends_with("back -> /portfolio"));
    }

    #[test]
    fn stack_router_pops_to_existing_entry() -> Result<()> {
        let mut router = StackRouter::new(Destination::portfolio());
        let room = Destination::room(&RoomId::new("5"));
        router.navigate(&Destination::property(&PropertyId::new("1")))?;
        router.navigate(&room)?;
        assert_eq!(router.depth(), 3);

        router.navigate(&Destination::portfolio())?;
        assert_eq!(router.depth(), 1);
        assert_eq!(router.current(), &Destination::portfolio());
        assert!(router.back().is_err());
        Ok(())
    }

    #[test]
    fn stack_router_matches_entries_by_screen_id() -> Result<()> {
        let mut router = StackRouter::new(Destination::portfolio());
        router.navigate(&Destination::property(&PropertyId::new("1")))?;
        router.navigate(&Destination::with_params(
            RouteId::Room,
            RouteParams::new().with("room_id", "1").with("property_id", "1"),
        ))?;
        router.navigate(&Destination::with_params(
            RouteId::Item,
            RouteParams::new().with("item_id", "1").with("room_id", "1"),
        ))?;
        assert_eq!(router.depth(), 4);

        router.navigate(&Destination::room(&RoomId::new("1")))?;
        assert_eq!(router.depth(), 3);
        assert_eq!(router.current(), &Destination::room(&RoomId::new("1")));

        router.navigate(&Destination::room(&RoomId::new("2")))?;
        assert_eq!(router.depth(), 4, "a different room is a new screen");
        Ok(())
    }

    #[test]
    fn back_from_item_pops_to_the_room_it_came_from() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);
        for _ in 0..3 {
            press(&mut shell, &mut catalog, KeyCode::Enter);
            settle(&mut shell, &mut catalog);
        }
        assert_eq!(shell.router().current().path, RouteId::Item);
        assert_eq!(shell.router().depth(), 4);

        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current().path, RouteId::Room);
        assert_eq!(shell.router().depth(), 3);

        press(&mut shell, &mut catalog, KeyCode::Esc);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.router().current().path, RouteId::Property);
        assert_eq!(shell.router().depth(), 2);
    }

    #[test]
    fn stack_router_bumps_generation_on_every_change() -> Result<()> {
        let mut router = StackRouter::new(Destination::portfolio());
        let start = router.generation();
        router.navigate(&Destination::settings())?;
        router.back()?;
        router.reset(Destination::settings());
        assert_eq!(router.generation(), start + 3);
        Ok(())
    }

    #[test]
    fn breadcrumb_follows_context() {
        let mut context = NavigationContext::default();
        assert_eq!(render_breadcrumb_text(&context), "portfolio");

        context.set_current_level(HierarchyLevel::Room);
        context.set_current_context(
            HierarchyContext::default()
                .with_property_name("Elm house")
                .with_room_name("Kitchen")
                .with_room_item_count(4),
        );
        assert_eq!(
            render_breadcrumb_text(&context),
            "portfolio > Elm house > Kitchen (4)"
        );

        context.set_current_level(HierarchyLevel::Property);
        assert_eq!(render_breadcrumb_text(&context), "portfolio > Elm house");

        context.set_navigation_mode(NavigationMode::Form);
        assert_eq!(render_breadcrumb_text(&context), "");
    }

    #[test]
    fn breadcrumb_drops_ancestors_when_switching_tabs() {
        let mut catalog = TestCatalog::seeded();
        let property = catalog.first_property().clone();
        let mut shell = started_at(Destination::property(&property.id), &mut catalog);
        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert!(shell.breadcrumb().starts_with(&format!("portfolio > {}", property.name)));

        press(&mut shell, &mut catalog, KeyCode::Char('3'));
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.breadcrumb(), "settings");

        press(&mut shell, &mut catalog, KeyCode::Char('2'));
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.breadcrumb(), "inventory");
    }

    #[test]
    fn inventory_item_breadcrumb_names_its_own_room() {
        let mut catalog = TestCatalog::seeded();
        let item = catalog.inventory.items.last().expect("faker makes items").clone();
        let room = catalog
            .inventory
            .rooms
            .iter()
            .find(|room| room.id == item.room_id)
            .expect("faker items live in rooms")
            .clone();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);
        press(&mut shell, &mut catalog, KeyCode::Enter);
        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);

        press(&mut shell, &mut catalog, KeyCode::Char('2'));
        settle(&mut shell, &mut catalog);
        for _ in 1..catalog.inventory.items.len() {
            press(&mut shell, &mut catalog, KeyCode::Down);
        }
        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);

        assert_eq!(shell.router().current().params.item_id(), Some(item.id.clone()));
        assert!(
            shell.breadcrumb().contains(&room.name),
            "breadcrumb {}",
            shell.breadcrumb()
        );
        assert_eq!(shell.context().context().room_id, Some(room.id));
    }

    #[test]
    fn breadcrumb_refreshes_only_on_scope_changes() {
        assert!(!should_refresh_breadcrumb(&[
            ContextEvent::PropertiesReplaced(2),
            ContextEvent::RoomsReplaced(1),
        ]));
        assert!(should_refresh_breadcrumb(&[
            ContextEvent::RoomsReplaced(1),
            ContextEvent::ContextMerged,
        ]));
        assert!(should_refresh_breadcrumb(&[ContextEvent::TabChanged(TabKind::Settings)]));

        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::portfolio(), &mut catalog);
        assert_eq!(shell.breadcrumb(), "portfolio");
        press(&mut shell, &mut catalog, KeyCode::Enter);
        settle(&mut shell, &mut catalog);
        assert_eq!(shell.breadcrumb(), render_breadcrumb_text(shell.context()));
        assert_ne!(shell.breadcrumb(), "portfolio");
    }

    #[test]
    fn body_marks_selected_row() {
        let mut catalog = TestCatalog::seeded();
        let mut shell = started_at(Destination::settings(), &mut catalog);
        press(&mut shell, &mut catalog, KeyCode::Down);

        let body = render_body_text(&shell.view);
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "  Change password");
        assert_eq!(lines[1], "> Edit profile");
    }

    #[test]
    fn shifted_clamps_to_area() {
        let area = Rect::new(0, 0, 10, 5);
        assert_eq!(shifted(area, 3.4), Rect::new(3, 0, 7, 5));
        assert_eq!(shifted(area, 40.0), Rect::new(9, 0, 1, 5));
        assert_eq!(shifted(area, -2.0), area);
    }

    #[test]
    fn money_formats_cents() {
        assert_eq!(format_money(34_900), "$349.00");
        assert_eq!(format_money(-5), "-$0.05");
    }
}
