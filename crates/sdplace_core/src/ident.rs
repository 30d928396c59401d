//! Decoding of the packed group identifier and block keys.
//!
//! The packer tags every SerDes logic cell with a 16-bit identifier:
//!
//! ```text
//! [15:12] group   [11:8] subgroup   [7:4] type   [3] unused   [2:0] slot
//! ```
//!
//! The all-ones value marks cells that belong to no group.

use sdplace_config::PlacerConfig;
use serde::Serialize;
use std::fmt;

/// Identifier value of cells that are tagged but not part of any group.
pub const UNGROUPED: u64 = 0xffff_ffff;

/// A decoded group identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FullCellId {
    /// Group number.
    pub group: u32,
    /// Subgroup (data path) number.
    pub subgroup: u8,
    /// Block type.
    pub block_type: u8,
    /// Slot of the cell inside its block.
    pub slot: u8,
}

impl FullCellId {
    /// Decodes a packed identifier, returning `None` for [`UNGROUPED`].
    ///
    /// Values wider than 32 bits cannot come from the packer and also
    /// decode to `None`; callers report them as malformed.
    pub fn decode(value: u64) -> Option<Self> {
        if value >= UNGROUPED {
            return None;
        }
        Some(Self {
            group: (value >> 12) as u32,
            subgroup: ((value >> 8) & 0xf) as u8,
            block_type: ((value >> 4) & 0xf) as u8,
            slot: (value & 0x7) as u8,
        })
    }

    /// Packs the identifier back into its attribute value.
    pub fn encode(self) -> u64 {
        (u64::from(self.group) << 12)
            | (u64::from(self.subgroup & 0xf) << 8)
            | (u64::from(self.block_type & 0xf) << 4)
            | u64::from(self.slot & 0x7)
    }

    /// Returns the key of the block this cell belongs to.
    pub fn block(self) -> BlockKey {
        BlockKey {
            group: self.group,
            subgroup: self.subgroup,
            block_type: self.block_type,
        }
    }
}

/// Identifies a block: one `(subgroup, type)` pair inside a group.
///
/// Ordering is by group, then subgroup, then type, which is the order blocks
/// of one type are placed in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct BlockKey {
    /// Group number.
    pub group: u32,
    /// Subgroup number.
    pub subgroup: u8,
    /// Block type.
    pub block_type: u8,
}

impl BlockKey {
    /// Creates a new block key.
    pub fn new(group: u32, subgroup: u8, block_type: u8) -> Self {
        Self {
            group,
            subgroup,
            block_type,
        }
    }

    /// Returns a human-readable description using the configured type names,
    /// e.g. `SerDesBlock(1/4/a ISERDES Shift)`.
    pub fn describe(self, config: &PlacerConfig) -> String {
        format!("SerDesBlock({self} {})", config.type_name(self.block_type))
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:x}/{:x}", self.group, self.subgroup, self.block_type)
    }
}
