//! Resolved styles: the per-element accumulator and the document style map.

mod node_data;
mod style_map;

pub use node_data::NodeData;
pub use style_map::{ElementStyle, StyleMap};
