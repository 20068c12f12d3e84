//! Data cluster management commands.

use anyhow::{Context, Result};
use metacluster_metadata::{
    DataClusterEntry, DataClusterMetadata, DataClusterState, DefaultTransitionPolicy, FileStore,
    ManagementClusterMetadata, check_transition,
};
use metacluster_types::{ClusterId, ClusterName, ClusterUsage};

use super::CliContext;
use crate::style::{self, colors::SemanticStyle};

/// Register a data cluster with the management cluster.
pub fn add(
    ctx: &CliContext,
    name: ClusterName,
    connection_string: String,
    capacity: Option<u64>,
    id: Option<ClusterId>,
) -> Result<()> {
    let (management, clusters) = ctx.management()?;

    if name == *management.metacluster_name() {
        anyhow::bail!("Data cluster name {name} is the metacluster name");
    }
    if id == Some(management.metacluster_id()) {
        anyhow::bail!("Data cluster id is the metacluster id");
    }

    let existing = clusters.list_clusters()?;
    if existing.contains_key(&name) {
        anyhow::bail!("Data cluster {name} already exists");
    }
    let max = ctx.config.management.max_data_clusters;
    if existing.len() >= max {
        anyhow::bail!("Metacluster already has the maximum of {max} data clusters");
    }

    let capacity =
        ClusterUsage::new(capacity.unwrap_or(ctx.config.management.default_capacity));
    let entry = match id {
        Some(id) => DataClusterEntry::with_usage(id, capacity, ClusterUsage::ZERO),
        None => DataClusterEntry::new(capacity),
    };
    clusters.set_cluster(&name, &DataClusterMetadata::new(entry, connection_string))?;

    style::print_success(&format!(
        "Added data cluster {} with capacity {}",
        name.code(),
        capacity.num_tenant_groups
    ));
    Ok(())
}

/// List data clusters as a table.
pub fn list(ctx: &CliContext) -> Result<()> {
    let (_, clusters) = ctx.management()?;
    let clusters = clusters.list_clusters()?;
    if clusters.is_empty() {
        println!("{}", "No data clusters.".muted());
        return Ok(());
    }
    style::print_cluster_table(&clusters);
    Ok(())
}

/// Print one data cluster as JSON.
pub fn show(ctx: &CliContext, name: &ClusterName) -> Result<()> {
    let (_, clusters) = ctx.management()?;
    let metadata = load(&clusters, name)?;
    let mut json = metadata.to_json();
    json["name"] = serde_json::Value::from(name.as_str());
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Change capacity. Only allowed while the cluster is ready.
pub fn configure(ctx: &CliContext, name: &ClusterName, capacity: u64) -> Result<()> {
    let (_, clusters) = ctx.management()?;
    let mut metadata = load(&clusters, name)?;

    if !metadata.entry.state.allows_configuration_change() {
        anyhow::bail!(
            "Data cluster {name} is {}; configuration changes need a ready cluster",
            metadata.entry.state
        );
    }

    let before = metadata.entry;
    metadata.entry.capacity = ClusterUsage::new(capacity);
    if metadata.entry.matches_configuration(&before) {
        style::print_hint("Capacity unchanged");
        return Ok(());
    }
    clusters.set_cluster(name, &metadata)?;

    style::print_success(&format!(
        "Data cluster {} capacity {} -> {}",
        name.code(),
        before.capacity.num_tenant_groups,
        capacity
    ));
    if !metadata.entry.has_capacity() {
        style::print_warn("Allocation meets or exceeds the new capacity");
    }
    Ok(())
}

/// Move a cluster through its lifecycle.
pub fn set_state(ctx: &CliContext, name: &ClusterName, state: DataClusterState) -> Result<()> {
    let (_, clusters) = ctx.management()?;
    let mut metadata = load(&clusters, name)?;

    let from = metadata.entry.state;
    check_transition(&DefaultTransitionPolicy, from, state)?;
    metadata.entry.state = state;
    clusters.set_cluster(name, &metadata)?;

    style::print_success(&format!("Data cluster {} {from} -> {state}", name.code()));
    Ok(())
}

/// Delete a cluster. It must be in the removing state.
pub fn remove(ctx: &CliContext, name: &ClusterName) -> Result<()> {
    let (_, clusters) = ctx.management()?;
    let metadata = load(&clusters, name)?;

    if metadata.entry.state != DataClusterState::Removing {
        anyhow::bail!(
            "Data cluster {name} is {}. Run 'mcctl cluster set-state {name} removing' first.",
            metadata.entry.state
        );
    }
    clusters.remove_cluster(name)?;

    style::print_success(&format!("Removed data cluster {}", name.code()));
    Ok(())
}

fn load(
    clusters: &ManagementClusterMetadata<FileStore>,
    name: &ClusterName,
) -> Result<DataClusterMetadata> {
    clusters
        .get_cluster(name)?
        .with_context(|| format!("Unknown data cluster {name}"))
}
