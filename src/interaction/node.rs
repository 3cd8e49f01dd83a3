use bevy::prelude::*;

use super::Interactable;
use crate::runtime::EventBus;
use crate::shared::*;

/// A gatherable pile in the world. Collecting it publishes
/// `ResourceCollected` once; afterwards it reports itself spent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    pub item_id: ItemId,
    pub name: String,
    pub amount: u32,
    pub position: Vec3,
    pub destroy_on_collect: bool,
    collected: bool,
    highlighted: bool,
}

impl ResourceNode {
    pub fn new(item_id: impl Into<ItemId>, name: impl Into<String>, amount: u32, position: Vec3) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            amount,
            position,
            destroy_on_collect: true,
            collected: false,
            highlighted: false,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// The host removes the node once this turns true.
    pub fn should_despawn(&self) -> bool {
        self.collected && self.destroy_on_collect
    }
}

impl Interactable for ResourceNode {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn can_interact(&self) -> bool {
        !self.collected && self.amount > 0
    }

    fn interact(&mut self, bus: &EventBus) {
        if !self.can_interact() {
            return;
        }
        self.collected = true;
        bus.publish(ResourceCollected {
            item_id: self.item_id.clone(),
            amount: self.amount,
        });
        info!("[ResourceNode] Collected: {} x{}", self.name, self.amount);
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    fn item_id(&self) -> Option<&str> {
        Some(&self.item_id)
    }

    fn amount(&self) -> u32 {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_collect_publishes_once() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        bus.subscribe(move |e: &ResourceCollected| log.borrow_mut().push(e.clone()));

        let mut node = ResourceNode::new("stone", "Stone", 2, Vec3::ZERO);
        node.interact(&bus);
        node.interact(&bus);

        assert_eq!(
            *seen.borrow(),
            vec![ResourceCollected {
                item_id: "stone".into(),
                amount: 2
            }]
        );
        assert!(!node.can_interact());
        assert!(node.should_despawn());
    }

    #[test]
    fn test_empty_node_is_not_interactable() {
        let node = ResourceNode::new("wood", "Wood", 0, Vec3::ZERO);
        assert!(!node.can_interact());
    }

    #[test]
    fn test_persistent_node_is_not_despawned() {
        let mut node = ResourceNode::new("fiber", "Plant Fiber", 1, Vec3::ZERO);
        node.destroy_on_collect = false;
        node.interact(&EventBus::new());
        assert!(node.is_collected());
        assert!(!node.should_despawn());
    }
}
