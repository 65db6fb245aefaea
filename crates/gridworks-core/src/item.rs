//! Items travelling across the factory floor.

use crate::fixed::Fixed64;
use crate::grid::GridPos;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

/// The closed set of item kinds.
///
/// The production chain is `RawMaterial -> CutMaterial -> PaintedMaterial ->
/// PackagedProduct`. `Trash` exists for completeness; no machine produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    RawMaterial,
    CutMaterial,
    PaintedMaterial,
    PackagedProduct,
    Trash,
}

impl ItemKind {
    /// Every item kind, in declaration order.
    pub const ALL: [ItemKind; 5] = [
        ItemKind::RawMaterial,
        ItemKind::CutMaterial,
        ItemKind::PaintedMaterial,
        ItemKind::PackagedProduct,
        ItemKind::Trash,
    ];

    /// Canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::RawMaterial => "raw_material",
            ItemKind::CutMaterial => "cut_material",
            ItemKind::PaintedMaterial => "painted_material",
            ItemKind::PackagedProduct => "packaged_product",
            ItemKind::Trash => "trash",
        }
    }

    /// Stable numeric tag used by the state hash.
    pub(crate) fn tag(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item kind name that is not one of the five known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item kind '{0}'")]
pub struct UnknownItemKind(pub String);

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownItemKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A single item on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub pos: GridPos,
    /// Sub-tile animation fraction in [0, 1]. Not read by the transition rules.
    pub progress: Fixed64,
}

impl Item {
    /// A freshly spawned item at rest on `pos`.
    pub fn new(id: ItemId, kind: ItemKind, pos: GridPos) -> Self {
        Self {
            id,
            kind,
            pos,
            progress: Fixed64::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ItemKind::ALL {
            assert_eq!(kind.as_str().parse::<ItemKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "widget".parse::<ItemKind>().unwrap_err();
        assert_eq!(err, UnknownItemKind("widget".to_string()));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ItemKind::PackagedProduct).unwrap();
        assert_eq!(json, "\"packaged_product\"");
        let back: ItemKind = serde_json::from_str("\"cut_material\"").unwrap();
        assert_eq!(back, ItemKind::CutMaterial);
    }

    #[test]
    fn new_item_starts_at_rest() {
        let item = Item::new(ItemId(3), ItemKind::RawMaterial, GridPos::new(1, 2));
        assert_eq!(item.progress, Fixed64::ZERO);
        assert_eq!(item.pos, GridPos::new(1, 2));
    }
}
