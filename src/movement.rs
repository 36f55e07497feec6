//! Cell-to-cell movement for ghosts: pick the non-reversing neighbour closest
//! to a target, with tunnel wraparound.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Dir, Pos};
use crate::level::Grid;

/// Legal neighbours of `from` in tie-break order, wrapped onto the grid,
/// with the cell in `previous` dropped unless it is the only way out.
fn candidates(
    grid: &Grid,
    from: Pos,
    previous: Option<Pos>,
    legal: impl Fn(Pos) -> bool,
) -> Vec<(Pos, Dir)> {
    let mut options = Vec::with_capacity(4);
    for dir in Dir::ORDER {
        let next = from.step(dir);
        if !legal(next) {
            continue;
        }
        options.push((grid.wrap(next), dir));
    }
    if options.len() > 1 {
        if let Some(prev) = previous {
            if options.iter().any(|(pos, _)| *pos != prev) {
                options.retain(|(pos, _)| *pos != prev);
            }
        }
    }
    options
}

fn closest(options: &[(Pos, Dir)], target: Pos) -> Option<(Pos, Dir)> {
    let mut best: Option<(Pos, Dir)> = None;
    let mut best_dist = i32::MAX;
    for &(pos, dir) in options {
        let d = pos.manhattan(target);
        if d < best_dist {
            best_dist = d;
            best = Some((pos, dir));
        }
    }
    best
}

/// Next cell and heading towards `target`, or `None` when boxed in.
pub fn resolve(grid: &Grid, from: Pos, target: Pos, previous: Option<Pos>) -> Option<(Pos, Dir)> {
    let options = candidates(grid, from, previous, |p| grid.is_legal_move(p));
    closest(&options, target)
}

/// [`resolve`] for a ghost that is allowed to walk through the pen.
pub fn resolve_in_pen(
    grid: &Grid,
    from: Pos,
    target: Pos,
    previous: Option<Pos>,
) -> Option<(Pos, Dir)> {
    let options = candidates(grid, from, previous, |p| grid.is_legal_for_ghost_in_pen(p));
    closest(&options, target)
}

/// Uniform choice among the same candidates [`resolve`] would consider.
pub fn random_move(
    grid: &Grid,
    from: Pos,
    previous: Option<Pos>,
    rng: &mut impl Rng,
) -> Option<(Pos, Dir)> {
    let options = candidates(grid, from, previous, |p| grid.is_legal_move(p));
    options.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Maze;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_room() -> Grid {
        Maze::parse(
            "#######\n\
             #     #\n\
             #     #\n\
             #  P  #\n\
             #     #\n\
             #     #\n\
             #######",
        )
        .unwrap()
        .grid
    }

    #[test]
    fn moves_towards_the_target() {
        let grid = open_room();
        let from = Pos::new(3, 3);
        assert_eq!(
            resolve(&grid, from, Pos::new(3, 1), None),
            Some((Pos::new(3, 2), Dir::Up))
        );
        assert_eq!(
            resolve(&grid, from, Pos::new(5, 3), None),
            Some((Pos::new(4, 3), Dir::Right))
        );
    }

    #[test]
    fn ties_break_left_right_up_down() {
        let grid = open_room();
        let from = Pos::new(3, 3);
        // Target on the cell itself: every neighbour is one step away.
        assert_eq!(
            resolve(&grid, from, from, None),
            Some((Pos::new(2, 3), Dir::Left))
        );
        // Left excluded by the no-reversal rule, so right wins.
        assert_eq!(
            resolve(&grid, from, from, Some(Pos::new(2, 3))),
            Some((Pos::new(4, 3), Dir::Right))
        );
    }

    #[test]
    fn never_reverses_when_another_move_exists() {
        let grid = open_room();
        let from = Pos::new(3, 3);
        let previous = Pos::new(3, 4);
        // The target lies straight behind, but reversing is not allowed.
        let (pos, _) = resolve(&grid, from, Pos::new(3, 5), Some(previous)).unwrap();
        assert_ne!(pos, previous);
    }

    #[test]
    fn reverses_out_of_a_dead_end() {
        let grid = Maze::parse("#####\n#P  #\n#####").unwrap().grid;
        let from = Pos::new(3, 1);
        assert_eq!(
            resolve(&grid, from, Pos::new(3, 1), Some(Pos::new(2, 1))),
            Some((Pos::new(2, 1), Dir::Left))
        );
    }

    #[test]
    fn stays_put_when_boxed_in() {
        let grid = Maze::parse("###\n#P#\n###").unwrap().grid;
        assert_eq!(resolve(&grid, Pos::new(1, 1), Pos::new(0, 0), None), None);
    }

    #[test]
    fn wraps_through_the_tunnel() {
        let grid = Maze::reference().grid;
        let from = Pos::new(0, 14);
        let target = Pos::new(26, 14);
        assert_eq!(
            resolve(&grid, from, target, Some(Pos::new(1, 14))),
            Some((Pos::new(27, 14), Dir::Left))
        );
    }

    #[test]
    fn pen_walkers_find_the_door() {
        let maze = Maze::reference();
        let exit = maze.pen_exit.unwrap();
        let mut pos = Pos::new(11, 12);
        let mut previous = None;
        for _ in 0..10 {
            if pos == exit {
                break;
            }
            let (next, _) = resolve_in_pen(&maze.grid, pos, exit, previous).unwrap();
            previous = Some(pos);
            pos = next;
        }
        assert_eq!(pos, exit);
    }

    #[test]
    fn random_moves_respect_legality_and_reversal() {
        let grid = Maze::reference().grid;
        let mut rng = StdRng::seed_from_u64(7);
        // Corridor cell with exactly one forward option.
        let from = Pos::new(2, 1);
        for _ in 0..50 {
            let (pos, dir) = random_move(&grid, from, Some(Pos::new(1, 1)), &mut rng).unwrap();
            assert_eq!((pos, dir), (Pos::new(3, 1), Dir::Right));
        }
    }
}
