//! Read-only lookups of platform reference data
//!
//! A data source takes a partially filled model as its query and returns the
//! first matching platform object with every attribute filled in.

mod location;
mod network;
mod os_base_image;

pub use location::{LocationDataSource, LocationModel};
pub use network::NetworkDataSource;
pub use os_base_image::{OsBaseImageDataSource, OsBaseImageModel, OsBaseImageVersionModel};

/// Render the optional boolean constraints of a query, e.g. `Default true, Preferred false`
fn describe_constraints(constraints: &[(&str, Option<bool>)]) -> String {
    constraints
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("{} {}", label, v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filter description suffixed with its constraints in parentheses
fn describe_filter(filter: String, constraints: &str) -> String {
    if constraints.is_empty() {
        filter
    } else {
        format!("{} ({})", filter, constraints)
    }
}
