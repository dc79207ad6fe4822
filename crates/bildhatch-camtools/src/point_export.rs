//! Plain-text point export
//!
//! One line per toolpath point: `x y z flag`, coordinates with three
//! decimals and `flag` 1 for positioning moves, 0 for laser moves. A queue
//! of process blocks becomes one file per block plus an index file.

use bildhatch_core::{HatchData, ProcessBlock};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HatchResult;

/// Points of `data` in traversal order
pub fn txt_lines(data: &HatchData) -> String {
    let mut out = String::with_capacity(data.point_count() * 32);
    for point in data.collections().flat_map(|c| c.points()) {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:.3} {:.3} {:.3} {}",
            point.x,
            point.y,
            point.z,
            point.move_type.jump_flag()
        );
    }
    out
}

/// File name of block `n` (1-based)
pub fn block_file_name(prefix: &str, n: usize) -> String {
    format!("{prefix}_block-{n}.txt")
}

/// Write `blocks` to `dir`
///
/// Returns the paths written, the index file last.
pub fn write_block_files(
    dir: &Path,
    prefix: &str,
    blocks: &[ProcessBlock],
) -> HatchResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(blocks.len() + 1);
    let mut index = String::new();

    for (i, block) in blocks.iter().enumerate() {
        let n = i + 1;
        let name = block_file_name(prefix, n);
        let path = dir.join(&name);
        fs::write(&path, txt_lines(&block.data))?;
        tracing::debug!("Wrote block {} ({}) to {}", n, block.label(), path.display());
        let _ = writeln!(index, "0 0 0 {name} {n}");
        written.push(path);
    }

    let index_path = dir.join(format!("{prefix}_INDEX.txt"));
    fs::write(&index_path, index)?;
    tracing::info!(
        "Exported {} block(s) to {}",
        blocks.len(),
        index_path.display()
    );
    written.push(index_path);
    Ok(written)
}
