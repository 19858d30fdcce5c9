//! The letter grid — generation and the animated shuffle.
//!
//! `LetterGrid` owns the row-major matrix of `LetterCell`s and the single
//! in-flight shuffle, if any. It understands grid data and animation state;
//! it never deals with terminals, key events, or draw operations.

pub mod cell;
pub mod clone;
pub mod layout;

use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AppConfig;

use cell::LetterCell;
use clone::MovingClone;
use layout::{GridLayout, Viewport};

/// Draw a uniform random permutation of `0..n` by sampling without
/// replacement: pick a uniformly random element of the shrinking pool of
/// unused indices until the pool is empty. Every ordering is equally likely.
pub fn draw_permutation(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    let mut result = Vec::with_capacity(n);
    while !pool.is_empty() {
        let pick = rng.gen_range(0..pool.len());
        result.push(pool.swap_remove(pick));
    }
    result
}

/// Everything owned by one running shuffle animation. Dropping this is the
/// busy-flag reset: clones cannot outlive the shuffle they belong to.
#[derive(Debug)]
pub struct ShuffleInFlight {
    clones: Vec<MovingClone>,
    permutation: Vec<usize>,
    deadline: Instant,
}

impl ShuffleInFlight {
    pub fn clones(&self) -> &[MovingClone] {
        &self.clones
    }

    /// Old linear index `i` moved its letter to `permutation()[i]`.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }
}

pub struct LetterGrid {
    alphabet: Vec<char>,
    padding: f32,
    spacing: f32,
    travel_secs: f32,
    cols: u16,
    rows: u16,
    cells: Vec<LetterCell>,
    shuffle: Option<ShuffleInFlight>,
    rng: StdRng,
}

impl LetterGrid {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Construct with an explicit RNG; deterministic tests seed this.
    pub fn with_rng(config: &AppConfig, rng: StdRng) -> Self {
        LetterGrid {
            alphabet: config.alphabet_chars(),
            padding: config.padding,
            spacing: config.spacing,
            travel_secs: config.travel_secs,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            shuffle: None,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Tear down the current matrix and build a fresh `width × height` one
    /// filled with random letters, sized to fit `viewport`.
    ///
    /// Zero dimensions and calls during a running shuffle are ignored.
    pub fn generate(&mut self, width: u16, height: u16, viewport: Viewport) {
        if width == 0 || height == 0 || self.shuffle.is_some() {
            debug!("generate({width}x{height}) ignored (invalid size or shuffle in flight)");
            return;
        }

        let grid_layout =
            GridLayout::compute(viewport, width, height, self.padding, self.spacing);

        self.cells.clear();
        self.cols = width;
        self.rows = height;
        for row in 0..height {
            for col in 0..width {
                let ch = self.random_char();
                self.cells.push(LetterCell::new(ch, grid_layout.cell_rect(row, col)));
            }
        }
        debug!(
            "generated {width}x{height} grid, cell size {}",
            grid_layout.cell_size()
        );
    }

    /// Uniform draw over the whole configured alphabet.
    fn random_char(&mut self) -> char {
        let i = self.rng.gen_range(0..self.alphabet.len());
        self.alphabet[i]
    }

    /// Re-place the existing cells after the canvas changed size. Characters
    /// are untouched. Skipped while a shuffle is running, because the clones'
    /// targets were computed against the old placement.
    pub fn relayout(&mut self, viewport: Viewport) {
        if self.cells.is_empty() || self.shuffle.is_some() {
            return;
        }
        let grid_layout =
            GridLayout::compute(viewport, self.cols, self.rows, self.padding, self.spacing);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = row as usize * self.cols as usize + col as usize;
                self.cells[idx].set_rect(grid_layout.cell_rect(row, col));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Shuffle
    // -----------------------------------------------------------------------

    /// Redistribute the letters with an animated move.
    ///
    /// The matrix is fully permuted by the time this returns; the visual
    /// catches up over `travel_secs` while the cells hide behind their
    /// moving clones. Ignored on an empty grid or while already shuffling.
    pub fn shuffle(&mut self, now: Instant) {
        if self.cells.is_empty() || self.shuffle.is_some() {
            debug!("shuffle ignored (empty grid or shuffle in flight)");
            return;
        }

        let permutation = draw_permutation(self.cells.len(), &mut self.rng);
        let old: Vec<char> = self.cells.iter().map(|c| c.ch()).collect();

        // One clone per cell, parked on its source slot with the old letter.
        let mut clones: Vec<MovingClone> = self
            .cells
            .iter()
            .map(|cell| {
                MovingClone::new(cell.ch(), cell.rect().pos, cell.rect().size, self.travel_secs)
            })
            .collect();

        // Commit the data model immediately: old letter at i lands in the
        // cell at permutation[i]. Only the presentation lags behind.
        for (i, &dst) in permutation.iter().enumerate() {
            self.cells[dst].set_char(old[i]);
        }

        for letter_cell in &mut self.cells {
            letter_cell.hide();
        }
        for (i, moving) in clones.iter_mut().enumerate() {
            moving.start_moving(self.cells[permutation[i]].rect().pos);
        }

        debug!("shuffle started: {} clones in flight", clones.len());
        self.shuffle = Some(ShuffleInFlight {
            clones,
            permutation,
            deadline: now + Duration::from_secs_f32(self.travel_secs),
        });
    }

    /// Advance the animation by `dt` seconds. When the wall-clock deadline
    /// passes, the cells reappear (already holding their new letters) and the
    /// clones are dropped.
    pub fn tick(&mut self, dt: f32, now: Instant) {
        let Some(shuffle) = self.shuffle.as_mut() else {
            return;
        };
        for moving in &mut shuffle.clones {
            moving.tick(dt);
        }
        if now >= shuffle.deadline {
            self.shuffle = None;
            for letter_cell in &mut self.cells {
                letter_cell.show();
            }
            debug!("shuffle finished");
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cells(&self) -> &[LetterCell] {
        &self.cells
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffle.is_some()
    }

    pub fn active_shuffle(&self) -> Option<&ShuffleInFlight> {
        self.shuffle.as_ref()
    }

    pub fn clones(&self) -> &[MovingClone] {
        self.shuffle.as_ref().map_or(&[], |s| s.clones.as_slice())
    }

    /// Row-major snapshot of the current characters.
    pub fn chars(&self) -> Vec<char> {
        self.cells.iter().map(|c| c.ch()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn viewport() -> Viewport {
        Viewport {
            x: 0,
            y: 0,
            width: 40,
            height: 40,
        }
    }

    fn seeded_grid(seed: u64) -> LetterGrid {
        LetterGrid::with_rng(&AppConfig::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn generate_fills_the_matrix_from_the_alphabet() {
        let config = AppConfig::default();
        let mut grid = seeded_grid(1);
        grid.generate(5, 3, viewport());

        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cells().len(), 15);
        for cell in grid.cells() {
            assert!(config.alphabet.contains(cell.ch()));
        }
    }

    #[test]
    fn whole_alphabet_is_reachable() {
        // Guards the draw range: the final symbol must show up too.
        let mut grid = LetterGrid::with_rng(
            &AppConfig {
                alphabet: "AZ".into(),
                ..Default::default()
            },
            StdRng::seed_from_u64(2),
        );
        grid.generate(10, 10, viewport());
        let chars = grid.chars();
        assert!(chars.contains(&'A'));
        assert!(chars.contains(&'Z'));
    }

    #[test]
    fn generate_with_zero_dimension_is_a_noop() {
        let mut grid = seeded_grid(3);
        grid.generate(4, 4, viewport());
        let before = grid.chars();

        grid.generate(0, 4, viewport());
        grid.generate(4, 0, viewport());

        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.chars(), before);
    }

    #[test]
    fn regenerating_replaces_content() {
        let mut grid = seeded_grid(4);
        grid.generate(6, 6, viewport());
        let first = grid.chars();
        grid.generate(6, 6, viewport());
        let second = grid.chars();

        assert_eq!(first.len(), second.len());
        // 36 independent draws from a 26-letter alphabet; a collision of the
        // full sequence would be astronomically unlikely.
        assert_ne!(first, second);
    }

    #[test]
    fn permutation_is_a_bijection() {
        let mut rng = StdRng::seed_from_u64(5);
        for n in [0usize, 1, 2, 6, 25, 100] {
            let perm = draw_permutation(n, &mut rng);
            assert_eq!(perm.len(), n);
            let mut seen = vec![false; n];
            for &v in &perm {
                assert!(v < n);
                assert!(!seen[v], "index {v} repeated");
                seen[v] = true;
            }
        }
    }

    #[test]
    fn permutation_destinations_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(6);
        let n = 5;
        let trials = 5000;
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for _ in 0..trials {
            let perm = draw_permutation(n, &mut rng);
            *counts.entry(perm[0]).or_default() += 1;
        }
        let expected = trials as f64 / n as f64;
        for dst in 0..n {
            let got = *counts.get(&dst).unwrap_or(&0) as f64;
            assert!(
                (got - expected).abs() < expected * 0.25,
                "destination {dst} hit {got} times, expected ~{expected}"
            );
        }
    }

    #[test]
    fn shuffle_permutes_values_not_content() {
        let mut grid = seeded_grid(7);
        grid.generate(4, 3, viewport());
        let mut before = grid.chars();

        grid.shuffle(Instant::now());

        let mut after = grid.chars();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_places_old_letters_at_permuted_indexes() {
        let mut grid = seeded_grid(8);
        grid.generate(3, 2, viewport());
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        let before = grid.chars();
        assert_eq!(before.len(), 6);

        grid.shuffle(Instant::now());

        let perm: Vec<usize> = grid.active_shuffle().unwrap().permutation().to_vec();
        let after = grid.chars();
        for (i, &dst) in perm.iter().enumerate() {
            assert_eq!(after[dst], before[i]);
        }
    }

    #[test]
    fn shuffle_on_empty_grid_is_a_noop() {
        let mut grid = seeded_grid(9);
        grid.shuffle(Instant::now());
        assert!(!grid.is_shuffling());
    }

    #[test]
    fn second_shuffle_while_busy_is_a_noop() {
        let mut grid = seeded_grid(10);
        grid.generate(3, 3, viewport());
        let t0 = Instant::now();
        grid.shuffle(t0);

        let chars = grid.chars();
        let perm: Vec<usize> = grid.active_shuffle().unwrap().permutation().to_vec();

        grid.shuffle(t0);

        assert_eq!(grid.clones().len(), 9, "no duplicate clones");
        assert_eq!(grid.chars(), chars);
        assert_eq!(grid.active_shuffle().unwrap().permutation(), perm.as_slice());
    }

    #[test]
    fn generate_while_busy_is_a_noop() {
        let mut grid = seeded_grid(11);
        grid.generate(3, 3, viewport());
        grid.shuffle(Instant::now());
        let before = grid.chars();

        grid.generate(5, 5, viewport());

        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.chars(), before);
    }

    #[test]
    fn cells_hide_during_shuffle_and_reappear_after_deadline() {
        let mut grid = seeded_grid(12);
        grid.generate(3, 3, viewport());
        let t0 = Instant::now();
        grid.shuffle(t0);

        assert!(grid.is_shuffling());
        assert!(grid.cells().iter().all(|c| c.is_hidden()));

        // Just before the deadline nothing is restored yet.
        grid.tick(1.0 / 30.0, t0 + Duration::from_millis(100));
        assert!(grid.is_shuffling());
        assert!(grid.cells().iter().all(|c| c.is_hidden()));

        // Past the deadline the shuffle cleans up.
        grid.tick(1.0 / 30.0, t0 + Duration::from_secs_f32(2.5));
        assert!(!grid.is_shuffling());
        assert!(grid.clones().is_empty());
        assert!(grid.cells().iter().all(|c| !c.is_hidden()));
    }

    #[test]
    fn clones_spawn_on_their_source_cells() {
        let mut grid = seeded_grid(13);
        grid.generate(2, 2, viewport());
        let positions: Vec<_> = grid.cells().iter().map(|c| c.rect().pos).collect();
        let before = grid.chars();

        grid.shuffle(Instant::now());

        let clones = grid.clones();
        assert_eq!(clones.len(), 4);
        for (i, moving) in clones.iter().enumerate() {
            assert_eq!(moving.pos(), positions[i]);
            assert_eq!(moving.ch(), before[i]);
        }
    }

    #[test]
    fn relayout_moves_rects_but_keeps_letters() {
        let mut grid = seeded_grid(14);
        grid.generate(3, 3, viewport());
        let before = grid.chars();
        let old_rect = grid.cells()[0].rect();

        grid.relayout(Viewport {
            x: 0,
            y: 0,
            width: 80,
            height: 80,
        });

        assert_eq!(grid.chars(), before);
        assert_ne!(grid.cells()[0].rect().size, old_rect.size);
    }
}
