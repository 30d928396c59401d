//! Configuration types deserialized from `sdplace.toml`.
//!
//! Every section is optional; missing sections and fields fall back to the
//! tables for the iCE40 UP5K SerDes macros.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Number of logic cells in one site.
pub const SITE_CAPACITY: u8 = 8;

/// The top-level placer configuration parsed from `sdplace.toml`.
///
/// Immutable once loaded; the placer for each region borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    /// Place the top and bottom regions on separate worker threads.
    pub parallel_regions: bool,
    /// Ordered `(dx, dy)` search offsets around a block's target, written
    /// for the bottom region (`dy` is negated in the top region).
    pub preferences: Vec<Offset>,
    /// Site grid geometry.
    pub grid: GridConfig,
    /// Names of the cell attributes read and written by the placer.
    pub attributes: AttributeNames,
    /// How IO cells are recognized while tracing connectivity.
    pub io: IoConfig,
    /// Port and parameter names forming the control-domain signature.
    pub control: ControlPorts,
    /// Known block types.
    pub block_types: Vec<BlockTypeDef>,
    /// Placement priority rules, highest priority first.
    pub priority: Vec<PriorityRule>,
}

impl PlacerConfig {
    /// Returns the definition of block type `id`, if declared.
    pub fn block_type(&self, id: u8) -> Option<&BlockTypeDef> {
        self.block_types.iter().find(|t| t.id == id)
    }

    /// Returns the display name of block type `id`.
    pub fn type_name(&self, id: u8) -> &str {
        self.block_type(id).map_or("unknown", |t| t.name.as_str())
    }

    /// Returns the expected occupied length of block type `id`, if fixed.
    pub fn expected_length(&self, id: u8) -> Option<u8> {
        self.block_type(id).and_then(|t| t.length)
    }

    /// Returns the priority rule placing block type `id`, if any.
    pub fn rule_for(&self, id: u8) -> Option<&PriorityRule> {
        self.priority.iter().find(|r| r.block_type == id)
    }
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            parallel_regions: false,
            preferences: default_preferences(),
            grid: GridConfig::default(),
            attributes: AttributeNames::default(),
            io: IoConfig::default(),
            control: ControlPorts::default(),
            block_types: default_block_types(),
            priority: default_priority(),
        }
    }
}

/// A `(dx, dy)` search offset, written as `[dx, dy]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset(pub i32, pub i32);

impl Offset {
    /// Horizontal displacement.
    pub fn dx(self) -> i32 {
        self.0
    }

    /// Vertical displacement as written (bottom-region orientation).
    pub fn dy(self) -> i32 {
        self.1
    }
}

/// An inclusive range of grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// First coordinate (inclusive).
    pub first: i32,
    /// Last coordinate (inclusive).
    pub last: i32,
}

impl Band {
    /// Creates a new band.
    pub const fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    /// Returns `true` if `v` lies inside the band.
    pub fn contains(self, v: i32) -> bool {
        (self.first..=self.last).contains(&v)
    }

    /// Iterates over every coordinate of the band.
    pub fn iter(self) -> RangeInclusive<i32> {
        self.first..=self.last
    }

    /// Returns `true` if the two bands share a coordinate.
    pub fn overlaps(self, other: Band) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// Site grid geometry for both regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns holding logic sites.
    pub columns: Band,
    /// Columns inside `columns` without usable logic sites (SPRAM on the UP5K).
    pub reserved_columns: Vec<i32>,
    /// Rows of the bottom region.
    pub bottom_rows: Band,
    /// Rows of the top region.
    pub top_rows: Band,
    /// Row of the bottom IO bank; groups anchored there use the bottom region.
    pub bottom_io_row: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: Band::new(1, 24),
            reserved_columns: vec![6, 19],
            bottom_rows: Band::new(1, 5),
            top_rows: Band::new(26, 30),
            bottom_io_row: 0,
        }
    }
}

/// Names of the cell attributes the placer consumes and produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeNames {
    /// Packed group identifier (binary string).
    pub group: String,
    /// Packed vertical sub-offset, cleared on emission.
    pub sub_offset: String,
    /// Packed local slot index, cleared on emission.
    pub slot: String,
    /// Placement coordinate, read on IO cells and written on placed cells.
    pub placement: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            group: "SERDES_GRP".into(),
            sub_offset: "SERDES_YOFS".into(),
            slot: "SERDES_Z".into(),
            placement: "BEL".into(),
        }
    }
}

/// How IO cells are found from a block's connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Cell type of IO buffers.
    pub cell_type: String,
    /// Ports of a block cell whose nets are traced.
    pub trace_ports: Vec<String>,
    /// Nets whose name starts with this prefix are never traced.
    pub ignore_net_prefix: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            cell_type: "SB_IO".into(),
            trace_ports: ["I0", "I1", "I2", "I3", "O"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignore_net_prefix: "$PACKER_".into(),
        }
    }
}

/// Port and parameter names forming the control-domain signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPorts {
    /// Clock input port.
    pub clock: String,
    /// Set/reset input port.
    pub reset: String,
    /// Clock enable input port.
    pub enable: String,
    /// Parameter that is `"1"` on negative-edge cells.
    pub negedge_param: String,
}

impl Default for ControlPorts {
    fn default() -> Self {
        Self {
            clock: "CLK".into(),
            reset: "SR".into(),
            enable: "CEN".into(),
            negedge_param: "NEG_CLK".into(),
        }
    }
}

/// A block type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// 4-bit type id as packed in the group identifier.
    pub id: u8,
    /// Human-readable name used in diagnostics.
    pub name: String,
    /// Expected number of occupied slots. When absent, the number of
    /// populated slots is used and must still start at slot 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u8>,
}

/// One entry of the placement priority list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRule {
    /// Block type placed by this rule.
    pub block_type: u8,
    /// Where blocks of this type aim.
    pub anchor: Anchor,
}

/// Placement anchor of a priority rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anchor {
    /// The group's IO site.
    Io,
    /// The rounded centroid of already-placed blocks of the same group.
    Centroid {
        /// Referenced blocks.
        of: Vec<BlockRef>,
    },
}

impl Anchor {
    /// Returns the block references of a centroid anchor (empty for `Io`).
    pub fn references(&self) -> &[BlockRef] {
        match self {
            Anchor::Io => &[],
            Anchor::Centroid { of } => of,
        }
    }
}

/// Reference to another block of the same group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// How the referenced subgroup is derived from the placed block's.
    pub subgroup: SubgroupSel,
    /// Referenced block type.
    pub block_type: u8,
    /// Skip the reference when the group has no such block.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// Selects a subgroup as `base | (subgroup & keep)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgroupSel {
    /// Bits always set.
    #[serde(default)]
    pub base: u8,
    /// Bits copied from the placed block's subgroup.
    #[serde(default)]
    pub keep: u8,
}

impl SubgroupSel {
    /// The placed block's own subgroup.
    pub const fn same() -> Self {
        Self { base: 0, keep: 0xf }
    }

    /// A fixed subgroup.
    pub const fn fixed(subgroup: u8) -> Self {
        Self {
            base: subgroup,
            keep: 0,
        }
    }

    /// Resolves the referenced subgroup for a block in `subgroup`.
    pub fn resolve(self, subgroup: u8) -> u8 {
        self.base | (subgroup & self.keep)
    }
}

fn default_preferences() -> Vec<Offset> {
    [
        (0, 1),
        (-1, 1),
        (1, 1),
        (-1, 0),
        (1, 0),
        (0, -1),
        (-1, -1),
        (1, -1),
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (-1, 1),
        (1, 1),
        (-1, 2),
        (1, 2),
        (-1, 3),
        (1, 3),
        (-1, 4),
        (1, 4),
    ]
    .into_iter()
    .map(|(dx, dy)| Offset(dx, dy))
    .collect()
}

fn default_block_types() -> Vec<BlockTypeDef> {
    [
        (0x0, "OSERDES Capture"),
        (0x1, "OSERDES Shift"),
        (0x2, "OSERDES NegEdge Delay"),
        (0x8, "ISERDES Slow Capture"),
        (0x9, "ISERDES Fast Capture"),
        (0xa, "ISERDES Shift"),
        (0xb, "ISERDES PreMux"),
    ]
    .into_iter()
    .map(|(id, name)| BlockTypeDef {
        id,
        name: name.into(),
        length: None,
    })
    .collect()
}

fn default_priority() -> Vec<PriorityRule> {
    let centroid = |refs: &[(SubgroupSel, u8, bool)]| Anchor::Centroid {
        of: refs
            .iter()
            .map(|&(subgroup, block_type, optional)| BlockRef {
                subgroup,
                block_type,
                optional,
            })
            .collect(),
    };

    vec![
        // Output negedge delay, input pre-mux and input shift sit next to the pad
        PriorityRule {
            block_type: 0x2,
            anchor: Anchor::Io,
        },
        PriorityRule {
            block_type: 0xb,
            anchor: Anchor::Io,
        },
        PriorityRule {
            block_type: 0xa,
            anchor: Anchor::Io,
        },
        // Fast capture follows the shift register of its data path
        PriorityRule {
            block_type: 0x9,
            anchor: centroid(&[(SubgroupSel { base: 4, keep: 1 }, 0xa, false)]),
        },
        PriorityRule {
            block_type: 0x1,
            anchor: Anchor::Io,
        },
        PriorityRule {
            block_type: 0x0,
            anchor: centroid(&[(SubgroupSel::same(), 0x1, false)]),
        },
        // Slow capture sits between both input paths
        PriorityRule {
            block_type: 0x8,
            anchor: centroid(&[
                (SubgroupSel::fixed(4), 0xa, false),
                (SubgroupSel::fixed(5), 0xa, true),
            ]),
        },
    ]
}
