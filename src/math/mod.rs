//! Mathematical utilities for block grids

pub mod grid;

pub use grid::{
    checked_num_elements, index_to_position, num_elements, position_to_index, texel_offset,
};
