use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terrain {
    Alps,
    AridHills,
    AridTundra,
    BrushFlat,
    BrushHills,
    ConiferHills,
    Deciduous,
    DeciduousHills,
    Desert,
    GrassyHills,
    GrassyHillsPlateau,
    HighSnowyMountains,
    Jungle,
    JungleHills,
    Lake,
    LowAridMountains,
    LowConiferMountains,
    LowJungleMountains,
    LowSnowyMountains,
    LowVolcanicMountains,
    Ocean,
    PolarIce,
    PrairiePlateau,
    Prairie,
    RockyHills,
    SnowyHills,
    Swamp,
    Tundra,
}

const TERRAINS: [(Terrain, &str, &str); 28] = [
    (Terrain::Alps, "ALPS", "ALPS"),
    (Terrain::AridHills, "AH", "ARID HILLS"),
    (Terrain::AridTundra, "AR", "ARID TUNDRA"),
    (Terrain::BrushFlat, "BF", "BRUSH FLAT"),
    (Terrain::BrushHills, "BH", "BRUSH HILLS"),
    (Terrain::ConiferHills, "CH", "CONIFER HILLS"),
    (Terrain::Deciduous, "D", "DECIDUOUS"),
    (Terrain::DeciduousHills, "DH", "DECIDUOUS HILLS"),
    (Terrain::Desert, "DE", "DESERT"),
    (Terrain::GrassyHills, "GH", "GRASSY HILLS"),
    (Terrain::GrassyHillsPlateau, "GHP", "GRASSY HILLS PLATEAU"),
    (Terrain::HighSnowyMountains, "Hsm", "HIGH SNOWY MOUNTAINS"),
    (Terrain::Jungle, "JG", "JUNGLE"),
    (Terrain::JungleHills, "JH", "JUNGLE HILLS"),
    (Terrain::Lake, "L", "LAKE"),
    (Terrain::LowAridMountains, "Lam", "LOW ARID MOUNTAINS"),
    (Terrain::LowConiferMountains, "Lcm", "LOW CONIFER MOUNTAINS"),
    (Terrain::LowJungleMountains, "Ljm", "LOW JUNGLE MOUNTAINS"),
    (Terrain::LowSnowyMountains, "Lsm", "LOW SNOWY MOUNTAINS"),
    (Terrain::LowVolcanicMountains, "Lvm", "LOW VOLCANIC MOUNTAINS"),
    (Terrain::Ocean, "O", "OCEAN"),
    (Terrain::PolarIce, "PI", "POLAR ICE"),
    (Terrain::PrairiePlateau, "PPR", "PRAIRIE PLATEAU"),
    (Terrain::Prairie, "PR", "PRAIRIE"),
    (Terrain::RockyHills, "RH", "ROCKY HILLS"),
    (Terrain::SnowyHills, "SH", "SNOWY HILLS"),
    (Terrain::Swamp, "SW", "SWAMP"),
    (Terrain::Tundra, "TU", "TUNDRA"),
];

/// Resource names that appear in step and status results, e.g. `Find Coal`.
pub const RESOURCES: [&str; 20] = [
    "Coal",
    "Copper Ore",
    "Diamond",
    "Frankincense",
    "Gold",
    "Iron Ore",
    "Jade",
    "Kaolin",
    "Lead Ore",
    "Limestone",
    "Nickel Ore",
    "Pearls",
    "Pyrite",
    "Rubies",
    "Salt",
    "Silver",
    "Sulphur",
    "Tin Ore",
    "Vanadium Ore",
    "Zinc Ore",
];

impl Terrain {
    pub fn from_code(code: &str) -> Option<Self> {
        TERRAINS
            .iter()
            .find(|(_, candidate, _)| *candidate == code)
            .map(|(terrain, _, _)| *terrain)
    }

    /// Reports spell codes inconsistently (`LJm`, `LCM`), so step and
    /// neighbor positions match without regard to case.
    pub fn from_code_ignore_case(code: &str) -> Option<Self> {
        TERRAINS
            .iter()
            .find(|(_, candidate, _)| candidate.eq_ignore_ascii_case(code))
            .map(|(terrain, _, _)| *terrain)
    }

    pub fn code(self) -> &'static str {
        self.entry().1
    }

    pub fn long_name(self) -> &'static str {
        self.entry().2
    }

    /// Long names ordered so that a name is tried before any of its prefixes.
    pub fn by_long_name_length() -> Vec<Terrain> {
        let mut terrains: Vec<Terrain> = TERRAINS.iter().map(|(terrain, _, _)| *terrain).collect();
        terrains.sort_by_key(|terrain| std::cmp::Reverse(terrain.long_name().len()));
        terrains
    }

    fn entry(self) -> &'static (Terrain, &'static str, &'static str) {
        &TERRAINS[self as usize]
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Terrain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}
