//! `sdplace analyze`: reports SerDes groups without placing them.

use std::fmt::Write;
use std::path::Path;

use sdplace_config::PlacerConfig;
use sdplace_core::Design;
use sdplace_diagnostics::DiagnosticSink;
use sdplace_netlist::load_netlist;

use crate::pipeline::{load_placer_config, report_diagnostics};
use crate::{AnalyzeArgs, GlobalArgs, ReportFormat};

/// Runs the `sdplace analyze` command.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_placer_config(global)?;
    let netlist = load_netlist(Path::new(&args.netlist))?;

    let design = match sdplace_core::analyze(&netlist, &config) {
        Ok(design) => design,
        Err(e) => {
            let sink = DiagnosticSink::new();
            sink.emit(e.to_diagnostic());
            report_diagnostics(&sink, global);
            return Ok(1);
        }
    };

    let report = match global.format {
        ReportFormat::Text => text_report(&design, &config),
        ReportFormat::Json => {
            let value = json_report(&design, &config);
            format!("{}\n", serde_json::to_string_pretty(&value)?)
        }
    };
    print!("{report}");
    Ok(0)
}

fn text_report(design: &Design, config: &PlacerConfig) -> String {
    let mut out = String::new();
    for group in design.groups.values() {
        let io = group.io;
        let _ = writeln!(
            out,
            "Group {} for IO X{}/Y{}/io{} ({} region, {} LCs)",
            group.id,
            io.x,
            io.y,
            io.z,
            group.region,
            group.cell_count()
        );
        for block in group.blocks.values() {
            let rule = if config.rule_for(block.key.block_type).is_some() {
                ""
            } else {
                " [no placement rule]"
            };
            let _ = writeln!(
                out,
                "\t{:40}: {} LCs{rule}",
                block.key.describe(config),
                block.len()
            );
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} groups, {} blocks, {} LCs",
        design.groups.len(),
        design.block_count(),
        design.cell_count()
    );
    out
}

fn json_report(design: &Design, config: &PlacerConfig) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = design
        .groups
        .values()
        .map(|g| {
            let blocks: Vec<serde_json::Value> = g
                .blocks
                .values()
                .map(|b| {
                    serde_json::json!({
                        "subgroup": b.key.subgroup,
                        "type": b.key.block_type,
                        "name": config.type_name(b.key.block_type),
                        "length": b.len(),
                        "placeable": config.rule_for(b.key.block_type).is_some(),
                    })
                })
                .collect();
            serde_json::json!({
                "group": g.id,
                "io": { "x": g.io.x, "y": g.io.y, "z": g.io.z },
                "region": g.region,
                "blocks": blocks,
            })
        })
        .collect();
    serde_json::json!({ "groups": groups })
}
