//! Text-level machinery behind every structural edit.

pub mod comma_separated;
pub mod errors;
pub mod reconcile;
pub mod splice;

pub use comma_separated::{
    insert_into_comma_separated_nodes, list_layout, list_start, remove_comma_separated_node,
    ListLayout,
};
pub use errors::ManipulationError;
pub use reconcile::{get_nodes_to_return, verify_sibling_count};
pub use splice::{insert_into_parent_text_range, Splice};
