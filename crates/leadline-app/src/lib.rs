// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod convert;
pub mod edit;
pub mod ids;
pub mod model;
pub mod session;
pub mod store;
pub mod view;

pub use convert::*;
pub use edit::*;
pub use ids::*;
pub use model::*;
pub use session::*;
pub use store::*;
pub use view::*;
