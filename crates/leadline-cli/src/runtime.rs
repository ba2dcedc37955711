// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use leadline_app::Opportunity;
use leadline_db::{KeyValueStore, save_opportunities};
use leadline_tui::AppRuntime;

pub struct StorageRuntime {
    store: Box<dyn KeyValueStore>,
}

impl StorageRuntime {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl AppRuntime for StorageRuntime {
    fn persist_opportunities(&mut self, opportunities: &[Opportunity]) -> Result<()> {
        save_opportunities(self.store.as_mut(), opportunities)
    }
}
