//! Scene resolution — turning grid state into concrete draw operations.
//!
//! Every frame the current `LetterGrid` state (static cells plus any moving
//! clones) is resolved into a flat list of `DrawOp`s. The scene layer knows
//! what things look like; it knows nothing about terminals or diffing.

use crate::config::AppConfig;
use crate::grid::LetterGrid;
use crate::grid::cell::LetterCell;
use crate::grid::clone::MovingClone;
use crate::grid::layout::Point;
use crate::types::{DrawOp, ResolvedScene, Style};

/// Clones paint strictly above cells so a glide across an occupied slot
/// never flickers underneath it.
const CELL_Z: i32 = 0;
const CLONE_Z: i32 = 10;

/// Styles shared by everything in the scene.
#[derive(Debug, Clone)]
pub struct Palette {
    pub letter: Style,
    pub frame: Style,
    pub clone: Style,
}

impl Palette {
    pub fn from_config(config: &AppConfig) -> Self {
        Palette {
            letter: config.letter_style.clone(),
            frame: config.frame_style.clone(),
            clone: config.clone_style.clone(),
        }
    }
}

/// Resolve an object into concrete `DrawOp`s for the current frame.
pub trait Resolve {
    fn resolve(&self, palette: &Palette, ops: &mut Vec<DrawOp>);
}

impl Resolve for LetterCell {
    fn resolve(&self, palette: &Palette, ops: &mut Vec<DrawOp>) {
        if self.is_hidden() {
            return;
        }
        let rect = self.rect();
        draw_letter_box(
            ops,
            self.ch(),
            rect.pos,
            rect.size,
            &palette.letter,
            &palette.frame,
            CELL_Z,
        );
    }
}

impl Resolve for MovingClone {
    fn resolve(&self, palette: &Palette, ops: &mut Vec<DrawOp>) {
        draw_letter_box(
            ops,
            self.ch(),
            self.pos(),
            self.size(),
            &palette.clone,
            &palette.clone,
            CLONE_Z,
        );
    }
}

/// Resolve the whole grid into a scene sized to the terminal canvas.
pub fn compose(grid: &LetterGrid, palette: &Palette, width: u16, height: u16) -> ResolvedScene {
    let mut ops = Vec::new();
    for letter_cell in grid.cells() {
        letter_cell.resolve(palette, &mut ops);
    }
    for moving in grid.clones() {
        moving.resolve(palette, &mut ops);
    }
    ResolvedScene { width, height, ops }
}

/// A letter centered inside a square box. Boxes smaller than 3 cells have no
/// room for a border and degrade to the bare letter.
fn draw_letter_box(
    ops: &mut Vec<DrawOp>,
    ch: char,
    pos: Point,
    size: f32,
    letter_style: &Style,
    frame_style: &Style,
    z: i32,
) {
    let x = pos.x.round().max(0.0) as u16;
    let y = pos.y.round().max(0.0) as u16;
    let s = size.round().max(1.0) as u16;

    if s >= 3 {
        draw_box(ops, x, y, s, frame_style, z);
    }
    ops.push(DrawOp {
        x: x + s / 2,
        y: y + s / 2,
        ch,
        style: letter_style.clone(),
        z_order: z + 1,
    });
}

fn draw_box(ops: &mut Vec<DrawOp>, x: u16, y: u16, size: u16, style: &Style, z: i32) {
    let far = size - 1;

    ops.push(DrawOp { x, y, ch: '┌', style: style.clone(), z_order: z });
    ops.push(DrawOp { x: x + far, y, ch: '┐', style: style.clone(), z_order: z });
    ops.push(DrawOp { x, y: y + far, ch: '└', style: style.clone(), z_order: z });
    ops.push(DrawOp { x: x + far, y: y + far, ch: '┘', style: style.clone(), z_order: z });
    for i in 1..far {
        ops.push(DrawOp { x: x + i, y, ch: '─', style: style.clone(), z_order: z });
        ops.push(DrawOp { x: x + i, y: y + far, ch: '─', style: style.clone(), z_order: z });
        ops.push(DrawOp { x, y: y + i, ch: '│', style: style.clone(), z_order: z });
        ops.push(DrawOp { x: x + far, y: y + i, ch: '│', style: style.clone(), z_order: z });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout::CellRect;

    fn palette() -> Palette {
        Palette::from_config(&AppConfig::default())
    }

    #[test]
    fn visible_cell_resolves_frame_and_centered_letter() {
        let cell = LetterCell::new(
            'K',
            CellRect {
                pos: Point::new(2.0, 2.0),
                size: 5.0,
            },
        );
        let mut ops = Vec::new();
        cell.resolve(&palette(), &mut ops);

        let letter = ops.iter().find(|op| op.ch == 'K').expect("letter op");
        assert_eq!((letter.x, letter.y), (4, 4));
        assert!(ops.iter().any(|op| op.ch == '┌' && op.x == 2 && op.y == 2));
        assert!(ops.iter().any(|op| op.ch == '┘' && op.x == 6 && op.y == 6));
    }

    #[test]
    fn hidden_cell_resolves_to_nothing() {
        let mut cell = LetterCell::new(
            'K',
            CellRect {
                pos: Point::new(0.0, 0.0),
                size: 5.0,
            },
        );
        cell.hide();
        let mut ops = Vec::new();
        cell.resolve(&palette(), &mut ops);
        assert!(ops.is_empty());
    }

    #[test]
    fn tiny_cell_skips_the_frame() {
        let cell = LetterCell::new(
            'K',
            CellRect {
                pos: Point::new(1.0, 1.0),
                size: 1.0,
            },
        );
        let mut ops = Vec::new();
        cell.resolve(&palette(), &mut ops);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].ch, 'K');
    }

    #[test]
    fn clones_paint_above_cells() {
        let cell = LetterCell::new(
            'A',
            CellRect {
                pos: Point::new(0.0, 0.0),
                size: 3.0,
            },
        );
        let moving = MovingClone::new('B', Point::new(0.0, 0.0), 3.0, 2.0);

        let mut cell_ops = Vec::new();
        cell.resolve(&palette(), &mut cell_ops);
        let mut clone_ops = Vec::new();
        moving.resolve(&palette(), &mut clone_ops);

        let max_cell_z = cell_ops.iter().map(|op| op.z_order).max().unwrap();
        let min_clone_z = clone_ops.iter().map(|op| op.z_order).min().unwrap();
        assert!(min_clone_z > max_cell_z);
    }

    #[test]
    fn fractional_clone_position_rounds_to_cells() {
        let moving = MovingClone::new('C', Point::new(3.6, 1.2), 1.0, 2.0);
        let mut ops = Vec::new();
        moving.resolve(&palette(), &mut ops);
        assert_eq!((ops[0].x, ops[0].y), (4, 1));
    }
}
