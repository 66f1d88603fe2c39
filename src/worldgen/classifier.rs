//! Semantic tile classification and the adjacency compatibility graph.
//!
//! Classification is a pure function of an asset's name and category: name
//! keywords win over the category, so `Terrains/Wall.png` is a wall even
//! though it lives among terrains.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Semantic type of a tile asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileType {
    Grass,
    Sand,
    Dirt,
    Water,
    Pavement,
    Road,
    Wall,
    Fence,
    Building,
    Structure,
    Vehicle,
    Prop,
    Decoration,
    Unknown,
}

impl TileType {
    /// Ground types an interior cell can be filled with.
    pub fn is_terrain(self) -> bool {
        matches!(
            self,
            TileType::Grass
                | TileType::Sand
                | TileType::Dirt
                | TileType::Water
                | TileType::Pavement
                | TileType::Road
        )
    }

    /// Types that may ring the map edge.
    pub fn is_boundary(self) -> bool {
        matches!(self, TileType::Wall | TileType::Fence)
    }

    /// Types placed by the structure pass.
    pub fn is_structure(self) -> bool {
        matches!(
            self,
            TileType::Building
                | TileType::Structure
                | TileType::Vehicle
                | TileType::Prop
                | TileType::Decoration
        )
    }

    /// Terrain types used when a cell has no resolved neighbors.
    pub const BASE_TERRAIN: [TileType; 3] = [TileType::Grass, TileType::Sand, TileType::Pavement];
}

const NAME_RULES: &[(&[&str], TileType)] = &[
    (&["wall"], TileType::Wall),
    (&["fence", "railing"], TileType::Fence),
    (&["water", "sea", "lake", "river", "pond"], TileType::Water),
    (&["sand", "beach", "desert"], TileType::Sand),
    (&["grass", "lawn", "meadow"], TileType::Grass),
    (&["dirt", "soil", "mud"], TileType::Dirt),
    (&["road", "street", "asphalt"], TileType::Road),
    (&["pavement", "sidewalk", "floor", "cobble", "brick", "stone"], TileType::Pavement),
    (&["car", "truck", "bus", "vehicle", "bike"], TileType::Vehicle),
    (&["house", "building", "shop", "tower"], TileType::Building),
];

const CATEGORY_RULES: &[(&[&str], TileType)] = &[
    (&["building", "house"], TileType::Building),
    (&["vehicle", "car"], TileType::Vehicle),
    (&["structure"], TileType::Structure),
    (&["decor", "plant", "flower", "tree", "nature"], TileType::Decoration),
    (&["prop", "furniture", "object", "item"], TileType::Prop),
    (&["terrain", "ground", "tile"], TileType::Dirt),
];

fn match_rules(text: &str, rules: &[(&[&str], TileType)]) -> Option<TileType> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, t)| *t)
}

/// Classify an asset by name, then by category.
pub fn classify(name: &str, category: &str) -> TileType {
    let name = name.to_ascii_lowercase();
    let category = category.to_ascii_lowercase();
    match_rules(&name, NAME_RULES)
        .or_else(|| match_rules(&category, CATEGORY_RULES))
        .unwrap_or(TileType::Unknown)
}

/// Which tile types may sit next to which during generation.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    edges: FxHashMap<TileType, SmallVec<[TileType; 6]>>,
}

impl Default for CompatibilityGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl CompatibilityGraph {
    /// The built-in rule set. Every type is compatible with itself.
    pub fn standard() -> Self {
        use TileType::*;
        let rules: &[(TileType, &[TileType])] = &[
            (Grass, &[Grass, Dirt, Sand, Pavement]),
            (Sand, &[Sand, Grass, Water]),
            (Dirt, &[Dirt, Grass, Road]),
            (Water, &[Water, Sand]),
            (Pavement, &[Pavement, Road, Grass]),
            (Road, &[Road, Pavement, Dirt]),
            (Wall, &[Wall, Fence]),
            (Fence, &[Fence, Wall, Grass]),
            (Building, &[Building]),
            (Structure, &[Structure]),
            (Vehicle, &[Vehicle]),
            (Prop, &[Prop]),
            (Decoration, &[Decoration]),
            (Unknown, &[Unknown]),
        ];
        let edges = rules
            .iter()
            .map(|(t, allowed)| (*t, allowed.iter().copied().collect()))
            .collect();
        Self { edges }
    }

    /// Ordered neighbors allowed next to `tile_type`.
    pub fn compatible(&self, tile_type: TileType) -> &[TileType] {
        self.edges
            .get(&tile_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn allows(&self, a: TileType, b: TileType) -> bool {
        self.compatible(a).contains(&b)
    }
}

/// Structure types allowed on top of a terrain type.
pub fn structure_types_for(terrain: Option<TileType>) -> &'static [TileType] {
    use TileType::*;
    match terrain {
        Some(Grass) => &[Building, Structure, Prop, Decoration],
        Some(Pavement) | Some(Road) => &[Building, Structure, Vehicle, Prop, Decoration],
        Some(Sand) => &[Prop, Decoration],
        _ => &[Prop, Decoration],
    }
}
