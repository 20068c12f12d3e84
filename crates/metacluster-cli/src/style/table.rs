//! Table formatting using comfy-table.

use std::collections::BTreeMap;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use metacluster_metadata::{DataClusterMetadata, DataClusterState};
use metacluster_types::ClusterName;

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

fn state_cell(state: DataClusterState) -> Cell {
    let cell = Cell::new(state);
    if super::no_color() {
        return cell;
    }
    match state {
        DataClusterState::Ready => cell.fg(Color::Green),
        DataClusterState::Removing => cell.fg(Color::Red),
        DataClusterState::Restoring => cell.fg(Color::Yellow),
    }
}

/// Creates a table with one row per data cluster.
pub fn cluster_table(clusters: &BTreeMap<ClusterName, DataClusterMetadata>) -> Table {
    let mut table = base_table();
    table.set_header(
        ["Name", "ID", "Capacity", "Allocated", "State", "Connection"].map(header_cell),
    );

    for (name, metadata) in clusters {
        let entry = &metadata.entry;
        let id = if entry.id.is_nil() {
            "-".to_string()
        } else {
            entry.id.short_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(id),
            Cell::new(entry.capacity.num_tenant_groups),
            Cell::new(entry.allocated.num_tenant_groups),
            state_cell(entry.state),
            Cell::new(&metadata.connection_string),
        ]);
    }

    table
}

/// Prints the data cluster table with a count footer.
pub fn print_cluster_table(clusters: &BTreeMap<ClusterName, DataClusterMetadata>) {
    println!("{}", cluster_table(clusters));
    let count = clusters.len();
    let word = if count == 1 { "cluster" } else { "clusters" };
    println!("({count} {word})");
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, &str)]) -> Table {
    let mut table = base_table();

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }

    table
}

/// Prints a key-value info table.
pub fn print_info_table(entries: &[(&str, &str)]) {
    println!("{}", info_table(entries));
}
