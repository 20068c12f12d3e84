//! Aggregate capacity report.

use anyhow::Result;

use super::CliContext;
use crate::style::{self, colors::SemanticStyle};

pub fn run(ctx: &CliContext) -> Result<()> {
    let (management, clusters) = ctx.management()?;
    let metrics = clusters.metrics()?;

    println!("{}", management.metacluster_name().header());
    style::print_info_table(&[
        ("Data clusters", metrics.num_data_clusters.to_string().as_str()),
        (
            "Tenant group capacity",
            metrics
                .tenant_group_capacity
                .num_tenant_groups
                .to_string()
                .as_str(),
        ),
        (
            "Tenant groups allocated",
            metrics
                .tenant_groups_allocated
                .num_tenant_groups
                .to_string()
                .as_str(),
        ),
    ]);

    let available = clusters.clusters_with_capacity()?;
    if available.is_empty() {
        style::print_warn("No data cluster can accept new tenant groups");
        return Ok(());
    }

    println!();
    println!("Clusters with capacity (least allocated first):");
    for (allocated, name) in available {
        style::print_labeled(name.as_str(), &allocated.to_string());
    }
    Ok(())
}
