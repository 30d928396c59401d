//! Priority-ordered placement of packed SerDes blocks onto the logic grid.
//!
//! The packer tags every logic cell of a SerDes macro with a packed group
//! identifier. This crate turns those tags into concrete BELs next to the
//! macro's IO pad.
//!
//! # Pipeline
//!
//! 1. **Collect**: decode the group attribute and bucket cells into groups and blocks
//! 2. **Analyze**: validate slot occupancy, derive control signatures, trace IO sites
//! 3. **Place**: per region, run the priority placer over a fresh site grid
//! 4. **Emit**: write BELs and clear the packer's grouping attributes
//!
//! Nothing is written to the netlist unless every region placed successfully.
//!
//! # Usage
//!
//! ```ignore
//! use sdplace_core::place;
//!
//! let summary = place(&mut netlist, &config, &sink)?;
//! println!("{} cells placed", summary.cells_placed);
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod collect;
pub mod design;
pub mod emit;
pub mod error;
pub mod group;
pub mod ident;
pub mod placer;
pub mod signature;
pub mod site;
pub mod target;

#[cfg(test)]
pub(crate) mod testutil;

pub use block::{Block, RawBlock};
pub use design::Design;
pub use error::PlacementError;
pub use group::{Group, RawGroup};
pub use ident::{BlockKey, FullCellId, UNGROUPED};
pub use placer::{Placement, Placer, RegionPlan};
pub use signature::ControlSignature;
pub use site::{Region, Site, SiteGrid};
pub use target::Target;

use sdplace_config::{validate_config, PlacerConfig};
use sdplace_diagnostics::{Diagnostic, DiagnosticSink};
use sdplace_netlist::Netlist;
use serde::Serialize;

/// Counts describing a successful placement run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlacementSummary {
    /// Groups found in the netlist.
    pub groups: usize,
    /// Blocks that received a placement.
    pub blocks_placed: usize,
    /// Blocks left unplaced for lack of a priority rule.
    pub blocks_unplaced: usize,
    /// Logic cells that received a BEL.
    pub cells_placed: usize,
    /// Sites holding at least one block.
    pub sites_used: usize,
    /// Hex XXH3 fingerprint of every placement attribute after the run.
    pub fingerprint: String,
}

/// Collects and analyzes the SerDes groups of `netlist` without placing them.
pub fn analyze(netlist: &Netlist, config: &PlacerConfig) -> Result<Design, PlacementError> {
    validate_config(config)?;
    Design::analyze(netlist, config)
}

/// Places every SerDes block of `netlist` and writes the resulting BELs.
///
/// The top region is placed before the bottom one, or concurrently when
/// `config.parallel_regions` is set; the outcome and the order of reported
/// diagnostics are the same either way. On error the netlist is untouched.
pub fn place(
    netlist: &mut Netlist,
    config: &PlacerConfig,
    sink: &DiagnosticSink,
) -> Result<PlacementSummary, PlacementError> {
    let design = analyze(netlist, config)?;
    let plans = place_regions(&design, config, sink)?;

    let mut diags = Vec::new();
    let cells_placed = emit::emit(netlist, &design, &plans, config, &mut diags);
    sink.extend(diags);

    Ok(PlacementSummary {
        groups: design.groups.len(),
        blocks_placed: plans.iter().map(|p| p.placements.len()).sum(),
        blocks_unplaced: plans.iter().map(|p| p.unplaced.len()).sum(),
        cells_placed,
        sites_used: plans
            .iter()
            .flat_map(|p| p.grid.iter())
            .filter(|s| !s.blocks.is_empty())
            .count(),
        fingerprint: netlist
            .placement_fingerprint(&config.attributes.placement)
            .to_string(),
    })
}

type RegionOutcome = (Result<Option<RegionPlan>, PlacementError>, Vec<Diagnostic>);

fn place_regions(
    design: &Design,
    config: &PlacerConfig,
    sink: &DiagnosticSink,
) -> Result<Vec<RegionPlan>, PlacementError> {
    let run = |region: Region| -> RegionOutcome {
        let mut diags = Vec::new();
        if design.groups_in(region).next().is_none() {
            return (Ok(None), diags);
        }
        let result = Placer::new(region, design.groups.values(), config)
            .place(&mut diags)
            .map(Some);
        (result, diags)
    };

    let (top, bottom) = if config.parallel_regions {
        rayon::join(|| run(Region::Top), || run(Region::Bottom))
    } else {
        let top = run(Region::Top);
        let bottom = match top.0 {
            Ok(_) => run(Region::Bottom),
            Err(_) => (Ok(None), Vec::new()),
        };
        (top, bottom)
    };

    let mut plans = Vec::new();
    for (result, diags) in [top, bottom] {
        sink.extend(diags);
        if let Some(plan) = result? {
            plans.push(plan);
        }
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::NetlistBuilder;
    use sdplace_common::Bel;
    use sdplace_config::{Band, BlockTypeDef, ConfigError};
    use sdplace_diagnostics::Severity;
    use sdplace_netlist::CellId;
    use std::collections::HashMap;

    fn bel_of(nl: &Netlist, cell: CellId) -> Bel {
        nl.cell(cell).attrs["BEL"].parse().unwrap()
    }

    fn run(nl: &mut Netlist, config: &PlacerConfig) -> Result<PlacementSummary, PlacementError> {
        place(nl, config, &DiagnosticSink::new())
    }

    /// One group per region exercising every default priority rule.
    fn full_design() -> NetlistBuilder {
        let mut b = NetlistBuilder::new();
        let clk = b.net("clk");
        let fast = b.net("clk_fast");

        let out_pad = b.io_pad("dq_out", Bel::new(10, 0, 0));
        b.block(0, 0, 0x2, 2, Some(out_pad), Some(fast));
        b.block(0, 0, 0x1, 4, Some(out_pad), Some(fast));
        b.block(0, 1, 0x1, 4, Some(out_pad), Some(fast));
        b.block(0, 0, 0x0, 4, None, Some(clk));
        b.block(0, 1, 0x0, 4, None, Some(clk));

        let in_pad = b.io_pad("dq_in", Bel::new(16, 31, 1));
        b.block(1, 6, 0xb, 2, Some(in_pad), Some(fast));
        b.block(1, 4, 0xa, 4, Some(in_pad), Some(fast));
        b.block(1, 5, 0xa, 4, Some(in_pad), Some(fast));
        b.block(1, 0, 0x9, 4, None, Some(fast));
        b.block(1, 1, 0x9, 4, None, Some(fast));
        b.block(1, 0, 0x8, 8, None, Some(clk));
        b
    }

    #[test]
    fn scenario_single_block_bottom() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        let cells = b.block(0, 0, 0x2, 1, Some(pad), None);
        let mut nl = b.build();

        let summary = run(&mut nl, &PlacerConfig::default()).unwrap();
        assert_eq!(bel_of(&nl, cells[0]), Bel::new(4, 1, 0));
        assert_eq!(summary.blocks_placed, 1);
        assert_eq!(summary.cells_placed, 1);
        assert_eq!(summary.sites_used, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["blocks_placed"], 1);
        assert_eq!(
            json["fingerprint"],
            nl.placement_fingerprint("BEL").to_string().as_str()
        );
    }

    #[test]
    fn scenario_single_block_top_is_mirrored() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 31, 0));
        let cells = b.block(0, 0, 0x2, 1, Some(pad), None);
        let mut nl = b.build();

        run(&mut nl, &PlacerConfig::default()).unwrap();
        assert_eq!(bel_of(&nl, cells[0]), Bel::new(4, 30, 0));
    }

    #[test]
    fn scenario_shared_site() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        let clk = b.net("clk");
        let first = b.block(0, 0, 0x1, 4, Some(pad), Some(clk));
        let second = b.block(0, 1, 0x1, 4, None, Some(clk));
        let mut nl = b.build();

        run(&mut nl, &PlacerConfig::default()).unwrap();
        assert_eq!(bel_of(&nl, first[0]), Bel::new(4, 1, 0));
        assert_eq!(bel_of(&nl, first[3]), Bel::new(4, 1, 3));
        assert_eq!(bel_of(&nl, second[0]), Bel::new(4, 1, 4));
        assert_eq!(bel_of(&nl, second[3]), Bel::new(4, 1, 7));
    }

    #[test]
    fn scenario_signature_conflict() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        let clk_a = b.net("clk_a");
        let clk_b = b.net("clk_b");
        let first = b.block(0, 0, 0x1, 5, Some(pad), Some(clk_a));
        let second = b.block(0, 1, 0x1, 5, None, Some(clk_b));
        let mut nl = b.build();

        run(&mut nl, &PlacerConfig::default()).unwrap();
        assert_eq!(bel_of(&nl, first[0]), Bel::new(4, 1, 0));
        let second = bel_of(&nl, second[0]);
        assert_ne!(second.tile(), Bel::new(4, 1, 0));
        assert_eq!(second, Bel::new(3, 1, 0));
    }

    #[test]
    fn scenario_invalid_occupancy() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        let cells = b.block(0, 0, 0x1, 4, Some(pad), None);
        let mut nl = b.build();
        nl.unset_attr(cells[2], "SERDES_GRP");

        let mut config = PlacerConfig::default();
        config.block_types.retain(|t| t.id != 0x1);
        config.block_types.push(BlockTypeDef {
            id: 0x1,
            name: "OSERDES Shift".into(),
            length: Some(4),
        });

        let before = nl.placement_fingerprint("BEL");
        let err = run(&mut nl, &config).unwrap_err();
        match &err {
            PlacementError::InvalidBlockOccupancy {
                length, populated, ..
            } => {
                assert_eq!(*length, 4);
                assert_eq!(populated, &vec![0, 1, 3]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.code().to_string(), "A202");
        assert_eq!(nl.placement_fingerprint("BEL"), before);
    }

    #[test]
    fn scenario_inconsistent_io() {
        let mut b = NetlistBuilder::new();
        let p0 = b.io_pad("p0", Bel::new(4, 0, 0));
        let p1 = b.io_pad("p1", Bel::new(8, 0, 0));
        b.block(0, 0, 0x1, 2, Some(p0), None);
        b.block(0, 1, 0x1, 2, Some(p1), None);
        let mut nl = b.build();

        assert!(matches!(
            run(&mut nl, &PlacerConfig::default()),
            Err(PlacementError::InconsistentGroupIo { group: 0, .. })
        ));
    }

    #[test]
    fn scenario_saturated_region() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(1, 0, 0));
        let cells = b.block(0, 0, 0x2, 8, Some(pad), None);
        b.block(0, 1, 0x2, 8, None, None);
        b.block(0, 2, 0x2, 8, None, None);
        let mut nl = b.build();

        let mut config = PlacerConfig::default();
        config.grid.columns = Band::new(1, 2);
        config.grid.reserved_columns.clear();
        config.grid.bottom_rows = Band::new(1, 1);
        config.grid.top_rows = Band::new(26, 26);

        let sink = DiagnosticSink::new();
        let err = place(&mut nl, &config, &sink).unwrap_err();
        match &err {
            PlacementError::UnplaceableBlock { block, region, .. } => {
                assert_eq!(block, "SerDesBlock(0/2/2 OSERDES NegEdge Delay)");
                assert_eq!(*region, Region::Bottom);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // nothing committed
        assert!(!nl.cell(cells[0]).attrs.contains_key("BEL"));
        assert!(nl.cell(cells[0]).attrs.contains_key("SERDES_GRP"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn io_at_coordinate_limit_is_unplaceable() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(i32::MAX, 0, 0));
        b.block(0, 0, 0x2, 1, Some(pad), None);
        let mut nl = b.build();

        match run(&mut nl, &PlacerConfig::default()) {
            Err(PlacementError::UnplaceableBlock {
                target, region, tried, ..
            }) => {
                assert_eq!(target, Bel::new(i32::MAX, 0, 0));
                assert_eq!(region, Region::Bottom);
                assert_eq!(tried, 20);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn full_design_places_every_block() {
        let mut nl = full_design().build();
        let sink = DiagnosticSink::new();
        let summary = place(&mut nl, &PlacerConfig::default(), &sink).unwrap();

        assert_eq!(summary.groups, 2);
        assert_eq!(summary.blocks_placed, 11);
        assert_eq!(summary.blocks_unplaced, 0);
        assert_eq!(summary.cells_placed, 44);
        assert!(!sink.has_errors());

        // every logic cell has a distinct BEL inside its region
        let mut seen = HashMap::new();
        for cell in &nl.cells {
            if cell.cell_type != "ICESTORM_LC" {
                continue;
            }
            assert!(!cell.attrs.contains_key("SERDES_GRP"));
            let bel: Bel = cell.attrs["BEL"].parse().unwrap();
            assert!((0..8).contains(&bel.z));
            assert!(bel.y <= 5 || bel.y >= 26, "{} at {bel}", cell.name);
            assert!(bel.x != 6 && bel.x != 19);
            assert!(seen.insert(bel, cell.name.clone()).is_none(), "{bel} reused");
        }
    }

    #[test]
    fn dependent_types_follow_their_anchor() {
        let mut nl = full_design().build();
        run(&mut nl, &PlacerConfig::default()).unwrap();
        let at = |name: &str| bel_of(&nl, nl.find_cell(name).unwrap());

        // output path: delay and shifts next to the pad, captures above their shift
        assert_eq!(at("g0_s0_t2_0"), Bel::new(10, 1, 0));
        assert_eq!(at("g0_s0_t1_0"), Bel::new(10, 1, 2));
        assert_eq!(at("g0_s1_t1_0"), Bel::new(9, 1, 0));
        assert_eq!(at("g0_s0_t0_0"), Bel::new(10, 2, 0));
        assert_eq!(at("g0_s1_t0_0"), Bel::new(9, 2, 0));

        // input path in the top region grows downwards
        assert_eq!(at("g1_s6_tb_0"), Bel::new(16, 30, 0));
        assert_eq!(at("g1_s4_ta_0"), Bel::new(16, 30, 2));
        assert_eq!(at("g1_s5_ta_0"), Bel::new(15, 30, 0));
        assert_eq!(at("g1_s0_t9_0"), Bel::new(16, 29, 0));
        assert_eq!(at("g1_s1_t9_0"), Bel::new(15, 29, 0));
        // slow capture aims at X16/Y30 (mean 15.5 rounds to 16) but only
        // finds a site of its own clock domain at X17/Y29
        assert_eq!(at("g1_s0_t8_0"), Bel::new(17, 29, 0));
    }

    #[test]
    fn centroid_rounds_half_to_even() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(11, 0, 0));
        b.block(0, 4, 0xa, 8, Some(pad), None);
        b.block(0, 5, 0xa, 8, None, None);
        let slow = b.block(0, 0, 0x8, 2, None, None);
        let mut nl = b.build();

        run(&mut nl, &PlacerConfig::default()).unwrap();
        // shifts land on X11 and X10; the mean 10.5 rounds to 10
        assert_eq!(bel_of(&nl, slow[0]), Bel::new(10, 2, 0));
    }

    #[test]
    fn missing_required_dependency() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        b.block(0, 0, 0x9, 2, Some(pad), None);
        let mut nl = b.build();
        match run(&mut nl, &PlacerConfig::default()) {
            Err(PlacementError::MissingDependency { dependency, .. }) => {
                assert_eq!(dependency, BlockKey::new(0, 4, 0xa))
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn group_without_io() {
        let mut b = NetlistBuilder::new();
        b.block(3, 0, 0x1, 2, None, None);
        let mut nl = b.build();
        assert!(matches!(
            run(&mut nl, &PlacerConfig::default()),
            Err(PlacementError::MissingGroupIo { group: 3 })
        ));
    }

    #[test]
    fn duplicate_slot_is_fatal() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        b.block(0, 0, 0x1, 2, Some(pad), None);
        b.serdes("extra", crate::testutil::pack(0, 0, 0x1, 1), None, None);
        let mut nl = b.build();
        let err = run(&mut nl, &PlacerConfig::default()).unwrap_err();
        assert_eq!(err.code().to_string(), "A201");
    }

    #[test]
    fn negedge_blocks_do_not_share() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        b.block(0, 0, 0x2, 2, Some(pad), None);
        let neg = b.block(0, 1, 0x2, 2, None, None);
        b.set_param("g0_s1_t2_0", "NEG_CLK", "1");
        let mut nl = b.build();
        run(&mut nl, &PlacerConfig::default()).unwrap();
        assert_eq!(bel_of(&nl, neg[0]), Bel::new(3, 1, 0));
    }

    #[test]
    fn unruled_blocks_warned() {
        let mut b = NetlistBuilder::new();
        let pad = b.io_pad("pad", Bel::new(4, 0, 0));
        b.block(0, 0, 0x2, 1, Some(pad), None);
        let odd = b.block(0, 0, 0x3, 2, None, None);
        let mut nl = b.build();

        let sink = DiagnosticSink::new();
        let summary = place(&mut nl, &PlacerConfig::default(), &sink).unwrap();
        assert_eq!(summary.blocks_unplaced, 1);
        assert_eq!(sink.warning_count(), 1);
        assert!(!nl.cell(odd[0]).attrs.contains_key("BEL"));
        assert!(!nl.cell(odd[0]).attrs.contains_key("SERDES_GRP"));
    }

    #[test]
    fn notes_reported_top_region_first() {
        let mut nl = full_design().build();
        let sink = DiagnosticSink::new();
        place(&mut nl, &PlacerConfig::default(), &sink).unwrap();
        let notes: Vec<_> = sink
            .take_all()
            .into_iter()
            .filter(|d| d.severity == Severity::Note)
            .collect();
        assert_eq!(notes.len(), 2 + 11);
        assert_eq!(notes[0].message, "group 1 for IO X16/Y31/io1");
        assert!(notes.iter().any(|d| d.message == "group 0 for IO X10/Y0/io0"));
    }

    #[test]
    fn placement_is_deterministic() {
        let mut one = full_design().build();
        let mut two = full_design().build();
        run(&mut one, &PlacerConfig::default()).unwrap();
        run(&mut two, &PlacerConfig::default()).unwrap();
        assert_eq!(one.placement_fingerprint("BEL"), two.placement_fingerprint("BEL"));
    }

    #[test]
    fn parallel_regions_match_sequential() {
        let mut sequential = full_design().build();
        let mut parallel = full_design().build();
        let seq_sink = DiagnosticSink::new();
        let par_sink = DiagnosticSink::new();

        let mut config = PlacerConfig::default();
        place(&mut sequential, &config, &seq_sink).unwrap();
        config.parallel_regions = true;
        place(&mut parallel, &config, &par_sink).unwrap();

        assert_eq!(
            sequential.placement_fingerprint("BEL"),
            parallel.placement_fingerprint("BEL")
        );
        let messages = |sink: &DiagnosticSink| {
            sink.take_all()
                .into_iter()
                .map(|d| d.message)
                .collect::<Vec<_>>()
        };
        assert_eq!(messages(&seq_sink), messages(&par_sink));
    }

    #[test]
    fn invalid_config_rejected_before_analysis() {
        let mut nl = full_design().build();
        let mut config = PlacerConfig::default();
        config.preferences.clear();
        assert!(matches!(
            run(&mut nl, &config),
            Err(PlacementError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[test]
    fn analyze_only_reads() {
        let nl = full_design().build();
        let design = analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(design.block_count(), 11);
        assert_eq!(design.groups[&1].region, Region::Top);
        assert_eq!(design.groups[&0].io, Bel::new(10, 0, 0));
    }
}
