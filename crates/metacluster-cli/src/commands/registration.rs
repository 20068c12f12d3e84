//! Registration commands.

use anyhow::{Context, Result};
use metacluster_metadata::{MetaclusterRegistration, MetadataError};
use metacluster_types::{ClusterId, ClusterName, cluster_type_to_string};

use super::{CliContext, decode_registration, encode_registration};
use crate::style::{self, colors::SemanticStyle};

/// Print the local registration.
pub fn show(ctx: &CliContext) -> Result<()> {
    let registration = ctx
        .directory()?
        .get()
        .context("Failed to read local registration")?;

    let Some(registration) = registration else {
        println!("{}", cluster_type_to_string(None));
        return Ok(());
    };

    println!("{}", registration.cluster_type().header());
    println!("{registration}");
    println!("{}", serde_json::to_string_pretty(&registration.to_json())?);
    Ok(())
}

/// Create the management registration of a new metacluster.
pub fn init_management(ctx: &CliContext, metacluster_name: ClusterName) -> Result<()> {
    let directory = ctx.directory()?;
    if let Some(existing) = directory.get()? {
        anyhow::bail!("Cluster is already registered ({existing})");
    }

    let registration = MetaclusterRegistration::management(metacluster_name, ClusterId::generate());
    directory.set(&registration)?;

    style::print_success(&format!(
        "Created metacluster {}",
        registration.metacluster_name().code()
    ));
    style::print_labeled("id", &registration.metacluster_id().to_string());
    Ok(())
}

/// Stamp out the registration for a data cluster in the map.
///
/// A cluster added without an id gets one here, either `id` or a fresh one,
/// and the map is updated to match.
pub fn export_data(ctx: &CliContext, name: &ClusterName, id: Option<ClusterId>) -> Result<()> {
    let (management, clusters) = ctx.management()?;
    let mut metadata = clusters
        .get_cluster(name)?
        .with_context(|| format!("Unknown data cluster {name}. Run 'mcctl cluster add' first."))?;

    if metadata.entry.id.is_nil() {
        metadata.entry.id = id.unwrap_or_else(ClusterId::generate);
        clusters.set_cluster(name, &metadata)?;
    } else if let Some(id) = id
        && id != metadata.entry.id
    {
        anyhow::bail!(
            "Data cluster {name} already has id {}",
            metadata.entry.id
        );
    }

    let data = management
        .try_to_data_registration(name.clone(), metadata.entry.id)
        .with_context(|| format!("Cannot register data cluster {name}"))?;
    println!("{}", encode_registration(&data.into()));
    Ok(())
}

/// Store an exported data registration locally.
pub fn import(ctx: &CliContext, encoded: &str) -> Result<()> {
    let incoming = decode_registration(encoded)?;
    if !matches!(incoming, MetaclusterRegistration::Data(_)) {
        anyhow::bail!("Only data cluster registrations can be imported");
    }

    let directory = ctx.directory()?;
    match directory.get()? {
        Some(local) if local == incoming => {
            style::print_hint("Registration already present");
            return Ok(());
        }
        Some(local) => anyhow::bail!("Cluster is already registered ({local})"),
        None => directory.set(&incoming)?,
    }

    style::print_success(&format!("Registered: {incoming}"));
    Ok(())
}

/// Check a registration against the local slot.
pub fn verify(ctx: &CliContext, encoded: &str) -> Result<()> {
    let incoming = decode_registration(encoded)?;
    match ctx.directory()?.verify(&incoming) {
        Ok(local) => {
            style::print_success(&format!("Matches local registration ({local})"));
            Ok(())
        }
        Err(MetadataError::NotRegistered) => {
            anyhow::bail!("Cluster is standalone; nothing to verify against")
        }
        Err(e) => Err(e.into()),
    }
}

/// Return the cluster to standalone.
pub fn clear(ctx: &CliContext) -> Result<()> {
    let directory = ctx.directory()?;
    if directory.get()?.is_none() {
        style::print_hint("Cluster is already standalone");
        return Ok(());
    }
    directory.clear()?;
    style::print_success("Cleared metacluster registration");
    Ok(())
}
