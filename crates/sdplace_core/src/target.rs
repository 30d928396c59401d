//! Target positions for the site search.

use crate::error::PlacementError;
use crate::group::Group;
use crate::ident::BlockKey;
use crate::placer::Placement;
use sdplace_common::Bel;
use sdplace_config::{Anchor, ConfigError, PlacerConfig};
use std::collections::BTreeMap;

/// Where the site search for a block is centered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A fixed tile, the group's IO site.
    Fixed(Bel),
    /// The rounded centroid of already-placed blocks.
    CentroidOf(Vec<BlockKey>),
}

impl Target {
    /// Builds the target of `key` from its anchor.
    ///
    /// Optional references to blocks absent from the group are dropped. A
    /// missing required reference, or none left at all, is an error.
    pub fn for_block(
        anchor: &Anchor,
        group: &Group,
        key: BlockKey,
        config: &PlacerConfig,
    ) -> Result<Self, PlacementError> {
        let refs = match anchor {
            Anchor::Io => return Ok(Target::Fixed(group.io.tile())),
            Anchor::Centroid { of } if of.is_empty() => {
                return Err(ConfigError::ValidationError(format!(
                    "centroid anchor of block type {:#x} references no blocks",
                    key.block_type
                ))
                .into())
            }
            Anchor::Centroid { of } => of,
        };

        let missing = |dependency| PlacementError::MissingDependency {
            block: key.describe(config),
            dependency,
        };

        let mut keys = Vec::with_capacity(refs.len());
        let mut first_absent = None;
        for r in refs {
            let subgroup = r.subgroup.resolve(key.subgroup);
            let dep = BlockKey::new(group.id, subgroup, r.block_type);
            if group.block(subgroup, r.block_type).is_some() {
                keys.push(dep);
            } else if !r.optional {
                return Err(missing(dep));
            } else {
                first_absent.get_or_insert(dep);
            }
        }

        match (keys.is_empty(), first_absent) {
            (true, Some(dep)) => Err(missing(dep)),
            _ => Ok(Target::CentroidOf(keys)),
        }
    }

    /// Resolves the target tile from the placements made so far.
    pub fn resolve(
        &self,
        placed: &BTreeMap<BlockKey, Placement>,
        dependent: BlockKey,
        config: &PlacerConfig,
    ) -> Result<Bel, PlacementError> {
        match self {
            Target::Fixed(bel) => Ok(*bel),
            Target::CentroidOf(keys) => {
                let mut points = Vec::with_capacity(keys.len());
                for key in keys {
                    let p = placed
                        .get(key)
                        .ok_or_else(|| PlacementError::MissingDependency {
                            block: dependent.describe(config),
                            dependency: *key,
                        })?;
                    points.push(p.site);
                }
                Ok(centroid(&points))
            }
        }
    }
}

/// Mean of `points`, each axis rounded half to even. `points` must not be empty.
pub fn centroid(points: &[Bel]) -> Bel {
    let n = points.len() as f64;
    let mean = |sum: i64| (sum as f64 / n).round_ties_even() as i32;
    Bel::new(
        mean(points.iter().map(|p| i64::from(p.x)).sum()),
        mean(points.iter().map(|p| i64::from(p.y)).sum()),
        0,
    )
}
