// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Destination, PropertyId, RoomId, RouteId, RouteParams};

/// The only context fields parent resolution looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AncestorHints<'a> {
    pub property_id: Option<&'a PropertyId>,
    pub room_id: Option<&'a RoomId>,
}

/// Logical parent of `route`. Total: every input yields a destination.
///
/// Explicit params outrank context, since params describe the link the user
/// actually followed. When neither names the ancestor the portfolio root is
/// returned.
pub fn resolve_parent(
    route: &RouteId,
    params: &RouteParams,
    ancestors: AncestorHints<'_>,
) -> Destination {
    match route {
        RouteId::Item | RouteId::AddItem | RouteId::EditItem => params
            .room_id()
            .or_else(|| ancestors.room_id.cloned())
            .map(|room_id| Destination::room(&room_id))
            .unwrap_or_else(Destination::portfolio),
        RouteId::Room | RouteId::AddRoom | RouteId::EditRoom => params
            .property_id()
            .or_else(|| ancestors.property_id.cloned())
            .map(|property_id| Destination::property(&property_id))
            .unwrap_or_else(Destination::portfolio),
        RouteId::Property | RouteId::AddProperty => Destination::portfolio(),
        RouteId::ChangePassword
        | RouteId::EditProfile
        | RouteId::ManageUsers
        | RouteId::AddUser => Destination::settings(),
        RouteId::Portfolio
        | RouteId::Inventory
        | RouteId::Settings
        | RouteId::Login
        | RouteId::SignUp
        | RouteId::Onboarding
        | RouteId::Other(_) => Destination::portfolio(),
    }
}

/// [`resolve_parent`] for a raw path, as it arrives from a deep link.
pub fn resolve_parent_path(
    path: &str,
    params: &RouteParams,
    ancestors: AncestorHints<'_>,
) -> Destination {
    resolve_parent(&RouteId::parse(path), params, ancestors)
}
