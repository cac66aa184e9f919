// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod context;
pub mod ids;
pub mod model;
pub mod motion;
pub mod resolver;
pub mod route;
pub mod screen;
pub mod transition;

pub use context::*;
pub use ids::*;
pub use model::*;
pub use motion::*;
pub use resolver::*;
pub use route::*;
pub use screen::*;
pub use transition::*;
