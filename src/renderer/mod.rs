//! Renderer — the deterministic rasterizer.
//!
//! Takes one `ResolvedScene` per frame and produces the minimal set of
//! terminal cell updates: the first frame after creation (or a resize)
//! repaints everything, every later frame is a diff against the previous
//! raster. The renderer knows nothing about time, animation, or grid
//! semantics.

use crate::types::{CellChange, ResolvedScene, ScreenCell};

pub struct Renderer {
    width: u16,
    height: u16,
    prev: Option<Vec<Vec<ScreenCell>>>,
}

impl Renderer {
    pub fn new(width: u16, height: u16) -> Self {
        Renderer {
            width,
            height,
            prev: None,
        }
    }

    /// Forget the previous raster, e.g. after a terminal resize or any
    /// out-of-band screen damage. The next `frame` call repaints fully.
    pub fn invalidate(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.prev = None;
    }

    /// Rasterize a scene and return the cells that changed since the last
    /// frame (all of them when there is no last frame).
    pub fn frame(&mut self, scene: &ResolvedScene) -> Vec<CellChange> {
        let grid = self.rasterize(scene);
        let changes = match &self.prev {
            None => Self::full(&grid),
            Some(prev) => Self::diff(prev, &grid),
        };
        self.prev = Some(grid);
        changes
    }

    /// Paint draw operations onto a fixed-size cell grid. Operations are
    /// sorted by z-order so higher z values paint over lower ones; anything
    /// outside the canvas is clipped.
    fn rasterize(&self, scene: &ResolvedScene) -> Vec<Vec<ScreenCell>> {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut grid = vec![vec![ScreenCell::default(); w]; h];

        let mut ops: Vec<_> = scene.ops.iter().collect();
        ops.sort_by_key(|op| op.z_order);

        for op in ops {
            let x = op.x as usize;
            let y = op.y as usize;
            if x < w && y < h {
                grid[y][x] = ScreenCell {
                    ch: op.ch,
                    style: op.style.clone(),
                };
            }
        }

        grid
    }

    fn full(grid: &[Vec<ScreenCell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: cell.clone(),
                });
            }
        }
        changes
    }

    fn diff(prev: &[Vec<ScreenCell>], next: &[Vec<ScreenCell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DrawOp, Style};

    fn letter_op(x: u16, y: u16, ch: char, z: i32) -> DrawOp {
        DrawOp {
            x,
            y,
            ch,
            style: Style::default(),
            z_order: z,
        }
    }

    fn scene(ops: Vec<DrawOp>) -> ResolvedScene {
        ResolvedScene {
            width: 8,
            height: 4,
            ops,
        }
    }

    #[test]
    fn first_frame_repaints_everything() {
        let mut renderer = Renderer::new(8, 4);
        let changes = renderer.frame(&scene(vec![letter_op(1, 1, 'A', 0)]));
        assert_eq!(changes.len(), 8 * 4);
    }

    #[test]
    fn identical_frame_diffs_to_nothing() {
        let mut renderer = Renderer::new(8, 4);
        renderer.frame(&scene(vec![letter_op(1, 1, 'A', 0)]));
        let changes = renderer.frame(&scene(vec![letter_op(1, 1, 'A', 0)]));
        assert!(changes.is_empty());
    }

    #[test]
    fn movement_diffs_to_source_and_destination() {
        let mut renderer = Renderer::new(8, 4);
        renderer.frame(&scene(vec![letter_op(1, 1, 'A', 0)]));
        let changes = renderer.frame(&scene(vec![letter_op(2, 1, 'A', 0)]));

        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| (c.x, c.y) == (1, 1) && c.cell.ch == ' '));
        assert!(changes.iter().any(|c| (c.x, c.y) == (2, 1) && c.cell.ch == 'A'));
    }

    #[test]
    fn higher_z_paints_over_lower() {
        let mut renderer = Renderer::new(8, 4);
        let changes = renderer.frame(&scene(vec![
            letter_op(3, 2, 'x', 10),
            letter_op(3, 2, 'o', 0),
        ]));
        let cell = changes.iter().find(|c| (c.x, c.y) == (3, 2)).unwrap();
        assert_eq!(cell.cell.ch, 'x');
    }

    #[test]
    fn out_of_bounds_ops_are_clipped() {
        let mut renderer = Renderer::new(8, 4);
        renderer.frame(&scene(vec![letter_op(100, 100, 'A', 0)]));
        let changes = renderer.frame(&scene(vec![]));
        assert!(changes.is_empty());
    }

    #[test]
    fn invalidate_forces_a_full_repaint() {
        let mut renderer = Renderer::new(8, 4);
        renderer.frame(&scene(vec![]));
        renderer.invalidate(8, 4);
        let changes = renderer.frame(&scene(vec![]));
        assert_eq!(changes.len(), 8 * 4);
    }
}
