//! Grid sizing from a memory budget

use glam::UVec3;

use crate::core::error::{Error, Result};

/// Bytes per megabyte
const MB: u64 = 1024 * 1024;

/// Find a grid size (in blocks) whose texture fits in `max_memory_mb`
///
/// The texture is kept roughly cubic: the budget is turned into an element
/// count, its cube root gives a side length in voxels, and each axis holds as
/// many whole blocks as fit along that side. Anisotropic block sizes give a
/// non-cubic grid with a roughly cubic footprint.
///
/// A budget smaller than one block gives a zero axis. That is left for the
/// cache constructor to reject. Zero `bytes_per_element` or a zero block axis
/// is an error.
pub fn find_suitable_grid_size(
    block_size: UVec3,
    bytes_per_element: u32,
    max_memory_mb: u32,
) -> Result<UVec3> {
    if bytes_per_element == 0 {
        return Err(Error::InvalidArgument("bytes per element must be positive".into()));
    }
    if block_size.cmpeq(UVec3::ZERO).any() {
        return Err(Error::InvalidArgument(format!(
            "block size {} has a zero axis",
            block_size
        )));
    }

    let max_elements = max_memory_mb as u64 * MB / bytes_per_element as u64;
    let side_length = (max_elements as f64).cbrt();

    let axis = |block: u32| (side_length / block as f64) as u32;
    Ok(UVec3::new(axis(block_size.x), axis(block_size.y), axis(block_size.z)))
}
