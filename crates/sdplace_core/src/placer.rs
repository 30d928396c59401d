//! Priority-ordered greedy placer for one region.
//!
//! Block types are placed in the order of the configured priority rules.
//! Within a type, blocks go in `(group, subgroup)` order. Each block searches
//! the preference offsets around its target and takes the first site that
//! has room and a matching control signature. There is no backtracking: the
//! first block that finds no site fails the whole region.

use crate::block::Block;
use crate::error::PlacementError;
use crate::group::Group;
use crate::ident::BlockKey;
use crate::site::{Region, SiteGrid};
use crate::target::Target;
use sdplace_common::Bel;
use sdplace_config::PlacerConfig;
use sdplace_diagnostics::{Category, Diagnostic, DiagnosticCode};
use serde::Serialize;
use std::collections::BTreeMap;

const UNRULED_BLOCK: DiagnosticCode = DiagnosticCode::new(Category::Placement, 401);
const GROUP_PLACED: DiagnosticCode = DiagnosticCode::new(Category::Placement, 501);
const BLOCK_PLACED: DiagnosticCode = DiagnosticCode::new(Category::Placement, 502);

/// Where a block landed: a site tile and the slot offset of its first cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Placement {
    /// Site tile (`z` is 0).
    pub site: Bel,
    /// Slot of the block's first cell inside the site.
    pub offset: u8,
}

impl Placement {
    /// Returns the BEL of the cell in `slot` of the block.
    pub fn bel(&self, slot: usize) -> Bel {
        Bel::new(
            self.site.x,
            self.site.y,
            self.site.z + i32::from(self.offset) + slot as i32,
        )
    }
}

/// The outcome of placing one region.
#[derive(Clone, Debug)]
pub struct RegionPlan {
    /// The placed region.
    pub region: Region,
    /// Placement of every placed block.
    pub placements: BTreeMap<BlockKey, Placement>,
    /// Blocks left unplaced because their type has no priority rule.
    pub unplaced: Vec<BlockKey>,
    /// Final state of the region's sites.
    pub grid: SiteGrid,
}

/// Places the groups of one region.
pub struct Placer<'a> {
    config: &'a PlacerConfig,
    groups: BTreeMap<u32, &'a Group>,
    grid: SiteGrid,
    placed: BTreeMap<BlockKey, Placement>,
}

impl<'a> Placer<'a> {
    /// Creates a placer over an empty grid for `region`.
    ///
    /// Groups belonging to the other region are ignored.
    pub fn new(
        region: Region,
        groups: impl IntoIterator<Item = &'a Group>,
        config: &'a PlacerConfig,
    ) -> Self {
        Self {
            config,
            groups: groups
                .into_iter()
                .filter(|g| g.region == region)
                .map(|g| (g.id, g))
                .collect(),
            grid: SiteGrid::new(region, &config.grid),
            placed: BTreeMap::new(),
        }
    }

    /// Runs the priority placement, pushing notes and warnings to `diags`.
    pub fn place(mut self, diags: &mut Vec<Diagnostic>) -> Result<RegionPlan, PlacementError> {
        let config = self.config;

        for rule in &config.priority {
            for block in self.blocks_of_type(rule.block_type) {
                let group = self.groups[&block.key.group];
                let target = Target::for_block(&rule.anchor, group, block.key, config)?
                    .resolve(&self.placed, block.key, config)?;
                self.place_block(block, target)?;
            }
        }

        let mut unplaced = Vec::new();
        for group in self.groups.values() {
            for block in group.blocks.values() {
                if config.rule_for(block.key.block_type).is_none() {
                    diags.push(
                        Diagnostic::warning(
                            UNRULED_BLOCK,
                            format!(
                                "block type {:#x} has no placement rule",
                                block.key.block_type
                            ),
                        )
                        .with_subject(block.key.describe(config))
                        .with_note(format!("its {} cells are left unplaced", block.len())),
                    );
                    unplaced.push(block.key);
                }
            }
        }

        self.report(diags);

        Ok(RegionPlan {
            region: self.grid.region(),
            placements: self.placed,
            unplaced,
            grid: self.grid,
        })
    }

    fn blocks_of_type(&self, block_type: u8) -> Vec<&'a Block> {
        let mut blocks: Vec<&'a Block> = self
            .groups
            .values()
            .flat_map(|g| g.blocks.values())
            .filter(|b| b.key.block_type == block_type)
            .collect();
        blocks.sort_by_key(|b| (b.key.group, b.key.subgroup));
        blocks
    }

    fn place_block(&mut self, block: &Block, target: Bel) -> Result<(), PlacementError> {
        let config = self.config;
        let region = self.grid.region();
        let len = block.len();

        for off in &config.preferences {
            let Some(pos) = region
                .orient_dy(off.dy())
                .and_then(|dy| target.offset(off.dx(), dy))
            else {
                continue;
            };
            let Some(site) = self.grid.get_mut(pos.x, pos.y) else {
                continue;
            };
            if !site.accepts(len, &block.signature) {
                continue;
            }
            let offset = site.add(block.key, len, block.signature);
            self.placed.insert(
                block.key,
                Placement {
                    site: site.pos,
                    offset,
                },
            );
            return Ok(());
        }

        Err(PlacementError::UnplaceableBlock {
            block: block.key.describe(config),
            region,
            target,
            tried: config.preferences.len(),
        })
    }

    fn report(&self, diags: &mut Vec<Diagnostic>) {
        for group in self.groups.values() {
            let io = group.io;
            diags.push(
                Diagnostic::note(
                    GROUP_PLACED,
                    format!("group {} for IO X{}/Y{}/io{}", group.id, io.x, io.y, io.z),
                )
                .with_note(format!("{} region", self.grid.region())),
            );
            for block in group.blocks.values() {
                if let Some(p) = self.placed.get(&block.key) {
                    diags.push(Diagnostic::note(
                        BLOCK_PLACED,
                        format!(
                            "{} : {} LCs placed @ {}",
                            block.key.describe(self.config),
                            block.len(),
                            p.bel(0)
                        ),
                    ));
                }
            }
        }
    }
}
