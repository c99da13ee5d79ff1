//! Character map of the leaf layout, one glyph per cell keyed by depth.

use glam::DVec2;
use tessera_lod::LodLeaf;

const DEPTH_GLYPHS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Render `leaves` of a `root_size` square onto a `width` x `width` grid.
///
/// Each cell shows the depth of the leaf covering its center (`0` is the
/// root); the cell holding `viewpoint` is drawn as `@`. Rows run along +z.
pub(crate) fn render(leaves: &[LodLeaf], root_size: u32, width: u32, viewpoint: DVec2) -> String {
    let width = width.max(1) as usize;
    let cell = f64::from(root_size) / width as f64;
    let mut grid = vec![vec![b'?'; width]; width];

    for leaf in leaves {
        let depth = (root_size / leaf.size.max(1)).trailing_zeros() as usize;
        let glyph = DEPTH_GLYPHS[depth.min(DEPTH_GLYPHS.len() - 1)];
        let min = leaf.origin.as_dvec2();
        let max = min + leaf.extent();
        for (row, line) in grid.iter_mut().enumerate() {
            let z = (row as f64 + 0.5) * cell;
            if z < min.y || z >= max.y {
                continue;
            }
            for (col, slot) in line.iter_mut().enumerate() {
                let x = (col as f64 + 0.5) * cell;
                if x >= min.x && x < max.x {
                    *slot = glyph;
                }
            }
        }
    }

    let marker = (viewpoint / cell).floor();
    if marker.min_element() >= 0.0 && marker.max_element() < width as f64 {
        grid[marker.y as usize][marker.x as usize] = b'@';
    }

    let mut out = String::with_capacity(width * (width + 1));
    for line in grid {
        out.extend(line.into_iter().map(char::from));
        out.push('\n');
    }
    out
}
