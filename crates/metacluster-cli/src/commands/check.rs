//! Consistency check across management and data cluster metadata.

use std::path::PathBuf;

use anyhow::{Context, Result};
use metacluster_metadata::{
    FileStore, ManagementClusterMetadata, MetaclusterDirectory, validate_data_cluster_registration,
    validate_management_cluster,
};
use metacluster_types::ClusterName;

use super::CliContext;
use crate::style;

/// Parses a `NAME=DIR` argument.
fn parse_data_cluster(arg: &str) -> Result<(ClusterName, PathBuf)> {
    let (name, dir) = arg
        .split_once('=')
        .with_context(|| format!("Expected NAME=DIR, got {arg:?}"))?;
    let name = ClusterName::new(name).with_context(|| format!("Invalid cluster name in {arg:?}"))?;
    Ok((name, PathBuf::from(dir)))
}

pub fn run(ctx: &CliContext, data_clusters: &[String]) -> Result<()> {
    let targets = data_clusters
        .iter()
        .map(|arg| parse_data_cluster(arg))
        .collect::<Result<Vec<_>>>()?;

    let store = ctx.open_store()?;
    let local = MetaclusterDirectory::new(store.clone()).get()?;
    let clusters = ManagementClusterMetadata::new(store).list_clusters()?;

    let management = validate_management_cluster(
        local.as_ref(),
        &clusters,
        ctx.config.management.max_data_clusters,
    )
    .context("Management cluster check failed")?;
    style::print_success(&format!(
        "Management registration valid, {} data clusters",
        clusters.len()
    ));

    for (name, dir) in targets {
        let metadata = clusters
            .get(&name)
            .with_context(|| format!("Data cluster {name} is not in the cluster map"))?;
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open store at {}", dir.display()))?;
        let data_registration = MetaclusterDirectory::new(store).get()?;

        validate_data_cluster_registration(
            management,
            &name,
            &metadata.entry,
            data_registration.as_ref(),
        )
        .with_context(|| format!("Data cluster {name} check failed"))?;
        style::print_success(&format!("Data cluster {name} registration valid"));
    }
    Ok(())
}
