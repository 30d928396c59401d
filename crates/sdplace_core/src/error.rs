//! Placement error types and their diagnostic codes.

use crate::ident::BlockKey;
use crate::site::Region;
use sdplace_common::Bel;
use sdplace_config::ConfigError;
use sdplace_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// A fatal placement failure. Nothing is written to the netlist when a run fails.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// Two cells claim the same slot of a block.
    #[error("cells '{existing}' and '{cell}' both occupy slot {slot} of block {block}")]
    DuplicateSlot {
        /// The block whose slot is contested.
        block: BlockKey,
        /// The contested slot.
        slot: u8,
        /// The cell already holding the slot.
        existing: String,
        /// The cell claiming it a second time.
        cell: String,
    },

    /// A block does not fill slots `[0, length)` exactly.
    #[error("invalid slot occupancy in {block}: expected slots 0..{length}, found {populated:?}")]
    InvalidBlockOccupancy {
        /// Description of the block.
        block: String,
        /// Expected occupied length.
        length: u8,
        /// Populated slots.
        populated: Vec<u8>,
    },

    /// Blocks of one group are wired to different IO sites.
    #[error("incompatible IO sites found in SerDes group {group}: {first} vs {second}")]
    InconsistentGroupIo {
        /// The group number.
        group: u32,
        /// IO site found first.
        first: Bel,
        /// The conflicting IO site.
        second: Bel,
    },

    /// No block of a group is connected to a placed IO cell.
    #[error("SerDes group {group} is not connected to any placed IO cell")]
    MissingGroupIo {
        /// The group number.
        group: u32,
    },

    /// Every preferred position around a block's target was full or incompatible.
    #[error("unable to place {block} in the {region} region")]
    UnplaceableBlock {
        /// Description of the block.
        block: String,
        /// Region the block was placed in.
        region: Region,
        /// The tile the search was centered on.
        target: Bel,
        /// Number of positions tried.
        tried: usize,
    },

    /// A block's anchor references a block that is absent or was not placed.
    #[error("{block} depends on block {dependency}, which is missing from its group")]
    MissingDependency {
        /// Description of the dependent block.
        block: String,
        /// Key of the missing block.
        dependency: BlockKey,
    },

    /// A cell attribute could not be decoded.
    #[error("cell '{cell}' has malformed attribute {attribute} = '{value}'")]
    MalformedAttribute {
        /// The cell carrying the attribute.
        cell: String,
        /// Attribute name.
        attribute: String,
        /// The offending value.
        value: String,
    },

    /// The placer configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PlacementError {
    /// Returns the diagnostic code identifying this error kind.
    pub fn code(&self) -> DiagnosticCode {
        let (category, number) = match self {
            PlacementError::MalformedAttribute { .. } => (Category::Netlist, 101),
            PlacementError::DuplicateSlot { .. } => (Category::Analysis, 201),
            PlacementError::InvalidBlockOccupancy { .. } => (Category::Analysis, 202),
            PlacementError::InconsistentGroupIo { .. } => (Category::Analysis, 203),
            PlacementError::MissingGroupIo { .. } => (Category::Analysis, 204),
            PlacementError::UnplaceableBlock { .. } => (Category::Placement, 301),
            PlacementError::MissingDependency { .. } => (Category::Placement, 302),
            PlacementError::Config(_) => (Category::Config, 1),
        };
        DiagnosticCode::new(category, number)
    }

    /// Converts the error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            PlacementError::UnplaceableBlock {
                target, tried, ..
            } => diag.with_note(format!(
                "all {tried} preferred positions around X{}/Y{} were full or incompatible",
                target.x, target.y
            )),
            PlacementError::InvalidBlockOccupancy { .. } => {
                diag.with_help("a block must fill its slots from 0 without gaps")
            }
            PlacementError::MissingGroupIo { .. } => {
                diag.with_help("make sure the group's IO buffer carries a fixed BEL")
            }
            PlacementError::DuplicateSlot { block, .. } => {
                diag.with_subject(format!("block {block}"))
            }
            PlacementError::MalformedAttribute { cell, .. } => diag.with_subject(cell.clone()),
            _ => diag,
        }
    }
}
