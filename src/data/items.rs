use crate::shared::*;

/// Populate the ItemRegistry with everything a resource node can drop.
pub fn populate_items(registry: &mut ItemRegistry) {
    let items: Vec<ItemDef> = vec![
        // ── Gathered resources ───────────────────────────────────────────

        ItemDef {
            id: "wood".into(),
            name: "Wood".into(),
            description: "Chopped from trees. Burns, builds, barricades.".into(),
            kind: ItemKind::Resource,
            stackable: true,
            max_stack: 99,
            hits_to_harvest: 3,
        },

        ItemDef {
            id: "stone".into(),
            name: "Stone".into(),
            description: "Heavy and plentiful.".into(),
            kind: ItemKind::Resource,
            stackable: true,
            max_stack: 99,
            hits_to_harvest: 4,
        },

        ItemDef {
            id: "fiber".into(),
            name: "Plant Fiber".into(),
            description: "Pulled from tall grass. Twisted into rope.".into(),
            kind: ItemKind::Material,
            stackable: true,
            max_stack: 99,
            hits_to_harvest: 0,
        },

        // ── Food ─────────────────────────────────────────────────────────

        ItemDef {
            id: "berry".into(),
            name: "Wild Berry".into(),
            description: "Sweet, a little sour. Safe to eat.".into(),
            kind: ItemKind::Consumable,
            stackable: true,
            max_stack: 20,
            hits_to_harvest: 0,
        },
    ];

    for item in items {
        registry.items.insert(item.id.clone(), item);
    }
}
