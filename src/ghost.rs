//! Ghost targeting. Each personality is a plain function from the current
//! board to a target cell; the movement resolver does the rest.

use rand::Rng;

use crate::components::{Dir, Ghost, GhostMode, Personality, Player, Pos};
use crate::level::Grid;
use crate::movement;

/// Distance beyond which the shy ghost keeps chasing.
pub const SHY_RADIUS: f32 = 8.0;
pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const FLANK_LOOKAHEAD: i32 = 2;

/// Read-only view a targeting strategy works from.
pub struct TargetContext<'a> {
    pub grid: &'a Grid,
    pub player: &'a Player,
    pub ghosts: &'a [Ghost],
    pub ghost: &'a Ghost,
}

pub type TargetFn = fn(&TargetContext) -> Pos;

const STRATEGIES: [TargetFn; 4] = [aggressive, ambusher, flanker, shy];

pub fn strategy(personality: Personality) -> TargetFn {
    STRATEGIES[personality.index()]
}

fn aggressive(ctx: &TargetContext) -> Pos {
    ctx.player.pos
}

fn ambusher(ctx: &TargetContext) -> Pos {
    ctx.grid
        .clamp(ctx.player.pos.offset(ctx.player.dir, AMBUSH_LOOKAHEAD))
}

fn flanker(ctx: &TargetContext) -> Pos {
    let pivot = ctx.player.pos.offset(ctx.player.dir, FLANK_LOOKAHEAD);
    match ctx
        .ghosts
        .iter()
        .find(|g| g.personality == Personality::Aggressive)
    {
        Some(anchor) => Pos::new(
            anchor.pos.x + 2 * (pivot.x - anchor.pos.x),
            anchor.pos.y + 2 * (pivot.y - anchor.pos.y),
        ),
        None => pivot,
    }
}

fn shy(ctx: &TargetContext) -> Pos {
    if ctx.ghost.pos.euclidean(ctx.player.pos) > SHY_RADIUS {
        ctx.player.pos
    } else {
        ctx.grid.home_corner(ctx.ghost.personality)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steering {
    Toward(Pos),
    Wander,
}

/// How the ghost in `ctx` wants to move this step.
pub fn steering(ctx: &TargetContext, pen_exit: Option<Pos>) -> Steering {
    let ghost = ctx.ghost;
    if ghost.eaten {
        return Steering::Toward(pen_exit.unwrap_or(ghost.respawn));
    }
    match ghost.mode {
        GhostMode::Frightened => Steering::Wander,
        GhostMode::Scatter => Steering::Toward(ctx.grid.home_corner(ghost.personality)),
        GhostMode::Chase => Steering::Toward(strategy(ghost.personality)(ctx)),
    }
}

/// Next cell for the ghost in `ctx`, or `None` if it cannot move.
pub fn plan_move(
    ctx: &TargetContext,
    pen_exit: Option<Pos>,
    rng: &mut impl Rng,
) -> Option<(Pos, Dir)> {
    let ghost = ctx.ghost;
    if ctx.grid.is_pen(ghost.pos) {
        let exit = pen_exit?;
        return movement::resolve_in_pen(ctx.grid, ghost.pos, exit, ghost.previous);
    }
    match steering(ctx, pen_exit) {
        Steering::Toward(target) => movement::resolve(ctx.grid, ghost.pos, target, ghost.previous),
        Steering::Wander => movement::random_move(ctx.grid, ghost.pos, ghost.previous, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Maze;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ghost_at(personality: Personality, pos: Pos, mode: GhostMode) -> Ghost {
        let mut g = Ghost::new(personality, pos, Dir::Left, pos);
        g.mode = mode;
        g
    }

    fn target_of(grid: &Grid, player: &Player, ghosts: &[Ghost], idx: usize) -> Steering {
        let ctx = TargetContext {
            grid,
            player,
            ghosts,
            ghost: &ghosts[idx],
        };
        steering(&ctx, Some(Pos::new(13, 10)))
    }

    #[test]
    fn aggressive_targets_the_player() {
        let grid = Maze::reference().grid;
        let player = Player {
            pos: Pos::new(6, 5),
            dir: Dir::Right,
        };
        let ghosts = [ghost_at(Personality::Aggressive, Pos::new(20, 20), GhostMode::Chase)];
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Toward(Pos::new(6, 5)));
    }

    #[test]
    fn ambusher_looks_four_ahead_and_clamps() {
        let grid = Maze::reference().grid;
        let ghosts = [ghost_at(Personality::Ambusher, Pos::new(20, 20), GhostMode::Chase)];
        let player = Player {
            pos: Pos::new(6, 5),
            dir: Dir::Right,
        };
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Toward(Pos::new(10, 5)));
        let player = Player {
            pos: Pos::new(1, 2),
            dir: Dir::Up,
        };
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Toward(Pos::new(1, 0)));
    }

    #[test]
    fn flanker_reflects_through_the_aggressive_ghost() {
        let grid = Maze::reference().grid;
        let player = Player {
            pos: Pos::new(10, 10),
            dir: Dir::Down,
        };
        let ghosts = [
            ghost_at(Personality::Aggressive, Pos::new(8, 8), GhostMode::Chase),
            ghost_at(Personality::Flanker, Pos::new(20, 20), GhostMode::Chase),
        ];
        // Two ahead is (10, 12); doubled from (8, 8) gives (12, 16).
        assert_eq!(target_of(&grid, &player, &ghosts, 1), Steering::Toward(Pos::new(12, 16)));
    }

    #[test]
    fn flanker_without_anchor_uses_two_ahead() {
        let grid = Maze::reference().grid;
        let player = Player {
            pos: Pos::new(10, 10),
            dir: Dir::Left,
        };
        let ghosts = [ghost_at(Personality::Flanker, Pos::new(20, 20), GhostMode::Chase)];
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Toward(Pos::new(8, 10)));
    }

    #[test]
    fn shy_chases_from_afar_and_retreats_up_close() {
        let grid = Maze::reference().grid;
        let player = Player {
            pos: Pos::new(1, 1),
            dir: Dir::Left,
        };
        let far = [ghost_at(Personality::Shy, Pos::new(20, 20), GhostMode::Chase)];
        assert_eq!(target_of(&grid, &player, &far, 0), Steering::Toward(Pos::new(1, 1)));
        let near = [ghost_at(Personality::Shy, Pos::new(5, 5), GhostMode::Chase)];
        assert_eq!(
            target_of(&grid, &player, &near, 0),
            Steering::Toward(grid.home_corner(Personality::Shy))
        );
    }

    #[test]
    fn scatter_overrides_personality() {
        let grid = Maze::reference().grid;
        let player = Player {
            pos: Pos::new(6, 5),
            dir: Dir::Right,
        };
        for personality in Personality::ALL {
            let ghosts = [ghost_at(personality, Pos::new(20, 20), GhostMode::Scatter)];
            assert_eq!(
                target_of(&grid, &player, &ghosts, 0),
                Steering::Toward(grid.home_corner(personality))
            );
        }
    }

    #[test]
    fn frightened_wanders_and_eaten_heads_home() {
        let grid = Maze::reference().grid;
        let player = Player::new(Pos::new(6, 5));
        let mut ghosts = [ghost_at(Personality::Ambusher, Pos::new(6, 8), GhostMode::Frightened)];
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Wander);
        ghosts[0].eaten = true;
        assert_eq!(target_of(&grid, &player, &ghosts, 0), Steering::Toward(Pos::new(13, 10)));
    }

    #[test]
    fn ghosts_in_the_pen_walk_to_the_exit() {
        let maze = Maze::reference();
        let player = Player::new(maze.player_start);
        let ghosts = [ghost_at(Personality::Ambusher, Pos::new(13, 12), GhostMode::Frightened)];
        let ctx = TargetContext {
            grid: &maze.grid,
            player: &player,
            ghosts: &ghosts,
            ghost: &ghosts[0],
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            plan_move(&ctx, maze.pen_exit, &mut rng),
            Some((Pos::new(13, 11), Dir::Up))
        );
    }
}
