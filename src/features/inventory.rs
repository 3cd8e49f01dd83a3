use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bevy::prelude::*;

use crate::runtime::{Feature, FeatureContext, SubscriptionId};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MODEL
// ═══════════════════════════════════════════════════════════════════════

/// Item id → count. An id with a count of zero is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryModel {
    items: HashMap<ItemId, u32>,
}

impl InventoryModel {
    pub fn items(&self) -> &HashMap<ItemId, u32> {
        &self.items
    }

    pub fn amount(&self, id: &str) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn add(&mut self, id: &str, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.items.entry(id.to_string()).or_insert(0);
        *count = count.saturating_add(amount);
    }

    pub fn has(&self, id: &str, amount: u32) -> bool {
        self.items.get(id).is_some_and(|&count| count >= amount)
    }

    /// Fails without touching the model when fewer than `amount` are held.
    pub fn remove(&mut self, id: &str, amount: u32) -> bool {
        let Some(count) = self.items.get_mut(id) else {
            return false;
        };
        if *count < amount {
            return false;
        }
        *count -= amount;
        if *count == 0 {
            self.items.remove(id);
        }
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the contents. Zero counts in `items` are dropped.
    pub fn load(&mut self, items: &HashMap<ItemId, u32>) {
        self.items = items
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, &count)| (id.clone(), count))
            .collect();
    }

    pub fn snapshot(&self) -> HashMap<ItemId, u32> {
        self.items.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries sorted by id.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self
            .items
            .iter()
            .map(|(id, &count)| (id.as_str(), count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FEATURE
// ═══════════════════════════════════════════════════════════════════════

/// Collects `ResourceCollected` events into an `InventoryModel` and persists
/// it through the save record.
#[derive(Default)]
pub struct InventoryFeature {
    model: Rc<RefCell<InventoryModel>>,
    subscription: Option<SubscriptionId>,
}

impl InventoryFeature {
    pub fn amount(&self, id: &str) -> u32 {
        self.model.borrow().amount(id)
    }

    pub fn has_item(&self, id: &str, amount: u32) -> bool {
        self.model.borrow().has(id, amount)
    }

    pub fn remove_item(&mut self, id: &str, amount: u32) -> bool {
        let removed = self.model.borrow_mut().remove(id, amount);
        if removed {
            info!("[Inventory] -{} {}  ->  total: {}", amount, id, self.amount(id));
        }
        removed
    }

    /// Adds directly, without going through the bus.
    pub fn add_item(&mut self, id: &str, amount: u32) {
        self.model.borrow_mut().add(id, amount);
        info!("[Inventory] +{} {}  ->  total: {}", amount, id, self.amount(id));
    }

    pub fn model(&self) -> InventoryModel {
        self.model.borrow().clone()
    }

    /// One line per item, sorted by id; "empty" when there is nothing.
    pub fn summary(&self) -> String {
        let model = self.model.borrow();
        if model.is_empty() {
            return "empty".to_string();
        }
        model
            .sorted()
            .iter()
            .enumerate()
            .map(|(i, (id, count))| format!("{}. {}  x{}", i + 1, id, count))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn log_contents(&self) {
        info!("[Inventory] Contents:\n{}", self.summary());
    }
}

impl Feature for InventoryFeature {
    fn start(&mut self, ctx: &mut FeatureContext<'_>) {
        if let Some(id) = self.subscription.take() {
            ctx.bus.unsubscribe(id);
        }
        let model = self.model.clone();
        self.subscription = Some(ctx.bus.subscribe(move |e: &ResourceCollected| {
            let mut model = model.borrow_mut();
            model.add(&e.item_id, e.amount);
            info!(
                "[Inventory] +{} {}  ->  total: {}",
                e.amount,
                e.item_id,
                model.amount(&e.item_id)
            );
        }));

        if let Some(items) = &ctx.data.inventory {
            self.model.borrow_mut().load(items);
            info!("[Inventory] Loaded {} stacks", items.len());
        }
    }

    fn on_save(&mut self, data: &mut GameData) -> Result<(), String> {
        data.inventory = Some(self.model.borrow().snapshot());
        Ok(())
    }
}
