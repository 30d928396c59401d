//! Placement regions and the per-region grid of logic sites.

use crate::ident::BlockKey;
use crate::signature::ControlSignature;
use sdplace_common::Bel;
use sdplace_config::{Band, GridConfig, SITE_CAPACITY};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One of the two disjoint placement regions next to the IO banks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Rows below the top IO bank; search offsets are mirrored vertically.
    Top,
    /// Rows above the bottom IO bank.
    Bottom,
}

impl Region {
    /// Both regions in placement order.
    pub const ALL: [Region; 2] = [Region::Top, Region::Bottom];

    /// Returns the rows of this region.
    pub fn rows(self, grid: &GridConfig) -> Band {
        match self {
            Region::Top => grid.top_rows,
            Region::Bottom => grid.bottom_rows,
        }
    }

    /// Orients a preference `dy` (written for the bottom region) for this region.
    ///
    /// Returns `None` if the mirrored value does not fit in an `i32`.
    pub fn orient_dy(self, dy: i32) -> Option<i32> {
        match self {
            Region::Top => dy.checked_neg(),
            Region::Bottom => Some(dy),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Top => "top",
            Region::Bottom => "bottom",
        })
    }
}

/// A logic tile holding up to [`SITE_CAPACITY`] cells of one control domain.
#[derive(Clone, Debug)]
pub struct Site {
    /// Tile coordinate (`z` is always 0).
    pub pos: Bel,
    /// Number of unused logic cells.
    pub free: u8,
    /// Signature shared by all blocks on the site, unset while empty.
    pub signature: Option<ControlSignature>,
    /// Blocks placed here, in placement order.
    pub blocks: Vec<BlockKey>,
}

impl Site {
    /// Creates an empty site.
    pub fn new(pos: Bel) -> Self {
        Self {
            pos: pos.tile(),
            free: SITE_CAPACITY,
            signature: None,
            blocks: Vec::new(),
        }
    }

    /// Returns `true` if a block of `len` cells with `signature` fits.
    pub fn accepts(&self, len: u8, signature: &ControlSignature) -> bool {
        self.free >= len && self.signature.map_or(true, |s| s == *signature)
    }

    /// Adds a block and returns its slot offset inside the site.
    ///
    /// The caller must have checked [`Site::accepts`].
    pub fn add(&mut self, key: BlockKey, len: u8, signature: ControlSignature) -> u8 {
        debug_assert!(self.accepts(len, &signature));
        let offset = SITE_CAPACITY - self.free;
        self.signature = Some(signature);
        self.free -= len;
        self.blocks.push(key);
        offset
    }

    /// Number of occupied logic cells.
    pub fn used(&self) -> u8 {
        SITE_CAPACITY - self.free
    }
}

/// All usable sites of one region, addressed by `(x, y)`.
#[derive(Clone, Debug)]
pub struct SiteGrid {
    region: Region,
    sites: BTreeMap<(i32, i32), Site>,
}

impl SiteGrid {
    /// Builds the empty grid of `region`, skipping reserved columns.
    pub fn new(region: Region, grid: &GridConfig) -> Self {
        let mut sites = BTreeMap::new();
        for y in region.rows(grid).iter() {
            for x in grid.columns.iter() {
                if grid.reserved_columns.contains(&x) {
                    continue;
                }
                sites.insert((x, y), Site::new(Bel::new(x, y, 0)));
            }
        }
        Self { region, sites }
    }

    /// The region this grid covers.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns the site at `(x, y)`, if it exists.
    pub fn get(&self, x: i32, y: i32) -> Option<&Site> {
        self.sites.get(&(x, y))
    }

    /// Returns the site at `(x, y)` mutably, if it exists.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Site> {
        self.sites.get_mut(&(x, y))
    }

    /// Iterates over sites in `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` if the region has no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
