//! Domain model for a lot on the subdivision map.
use chrono::{DateTime, Utc};

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotStatus {
    Vacant,
    Occupied,
    ForSale,
    UnderConstruction,
}

text_enum!(LotStatus {
    Vacant => "vacant",
    Occupied => "occupied",
    ForSale => "for_sale",
    UnderConstruction => "under_construction",
});

/// Rectangle occupied by a lot on the map, in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MapGeometry {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub id: String,
    pub block: String,
    pub lot_number: String,
    pub area_sqm: f64,
    pub status: LotStatus,
    pub geometry: MapGeometry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lot {
    /// Human label such as `Block 3 Lot 12`
    pub fn label(&self) -> String {
        format!("Block {} Lot {}", self.block, self.lot_number)
    }
}
