//! Spatial helpers for recipient determination.

use std::collections::{HashSet, VecDeque};

use crate::common::types::{BlockPos, Location, PlayerId, Vec3, EYE_HEIGHT};
use crate::host::WorldView;

/// Player hitbox width.
pub const PLAYER_WIDTH: f64 = 0.6;
/// Player hitbox height.
pub const PLAYER_HEIGHT: f64 = 1.8;

/// Whether `candidate` is strictly within `range` blocks (Manhattan) of `origin`.
pub fn in_range(origin: &BlockPos, candidate: &BlockPos, range: u32) -> bool {
    origin.manhattan(candidate) < range
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Hitbox of a player standing at `location`.
    pub fn player(location: &Location) -> Self {
        let half = PLAYER_WIDTH / 2.0;
        let feet = location.eye.y - EYE_HEIGHT;
        Self {
            min: Vec3::new(location.eye.x - half, feet, location.eye.z - half),
            max: Vec3::new(location.eye.x + half, feet + PLAYER_HEIGHT, location.eye.z + half),
        }
    }

    /// Distance along a unit ray at which it enters the box, if it does.
    ///
    /// A ray starting inside the box enters at zero.
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3) -> Option<f64> {
        let o = components(origin);
        let d = components(dir);
        let min = components(self.min);
        let max = components(self.max);

        let mut t_near = 0.0_f64;
        let mut t_far = f64::INFINITY;
        for axis in 0..3 {
            if d[axis].abs() < 1e-12 {
                if o[axis] < min[axis] || o[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d[axis];
            let mut t1 = (min[axis] - o[axis]) * inv;
            let mut t2 = (max[axis] - o[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }
}

fn components(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// First solid block a unit ray enters within `max_distance`, with the entry distance.
///
/// Walks the voxel grid (Amanatides & Woo). The block containing `origin` is skipped.
pub fn first_solid_block(
    world: &dyn WorldView,
    world_name: &str,
    origin: Vec3,
    dir: Vec3,
    max_distance: f64,
) -> Option<(BlockPos, f64)> {
    let o = components(origin);
    let d = components(dir);
    let start = origin.block();
    let mut cell = [start.x, start.y, start.z];

    let mut step = [0i32; 3];
    let mut t_max = [f64::INFINITY; 3];
    let mut t_delta = [f64::INFINITY; 3];
    for axis in 0..3 {
        if d[axis] > 0.0 {
            step[axis] = 1;
            t_max[axis] = (o[axis].floor() + 1.0 - o[axis]) / d[axis];
            t_delta[axis] = 1.0 / d[axis];
        } else if d[axis] < 0.0 {
            step[axis] = -1;
            t_max[axis] = (o[axis] - o[axis].floor()) / -d[axis];
            t_delta[axis] = -1.0 / d[axis];
        }
    }
    if step == [0, 0, 0] {
        return None;
    }

    loop {
        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };
        let t = t_max[axis];
        if t > max_distance {
            return None;
        }
        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        let pos = BlockPos::new(cell[0], cell[1], cell[2]);
        if world.is_solid(world_name, pos) {
            return Some((pos, t));
        }
    }
}

/// Whether the ray from `from`'s eye to `target`'s eye reaches `target` first.
///
/// Fails when a solid block or another player's hitbox is hit before the target's
/// hitbox. `others` should not contain the speaker.
pub fn line_of_sight(
    world: &dyn WorldView,
    from: &Location,
    target_id: PlayerId,
    target: &Location,
    others: &[(PlayerId, Location)],
) -> bool {
    if from.world != target.world {
        return false;
    }

    let delta = target.eye.sub(&from.eye);
    let length = delta.length();
    if length < 1e-9 {
        return true;
    }
    let dir = Vec3::new(delta.x / length, delta.y / length, delta.z / length);

    let target_hit = Aabb::player(target)
        .ray_entry(from.eye, dir)
        .unwrap_or(length);

    if let Some((_, t)) = first_solid_block(world, &from.world, from.eye, dir, target_hit) {
        if t < target_hit {
            return false;
        }
    }

    !others.iter().any(|(id, loc)| {
        *id != target_id
            && loc.world == from.world
            && Aabb::player(loc)
                .ray_entry(from.eye, dir)
                .is_some_and(|t| t < target_hit)
    })
}

/// Length of the shortest walk from `from` to `to` through passable blocks.
///
/// 6-connected BFS that gives up past `max_steps`. `None` means unreachable
/// within the limit.
pub fn walkable_distance(
    world: &dyn WorldView,
    world_name: &str,
    from: BlockPos,
    to: BlockPos,
    max_steps: u32,
) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    if from.manhattan(&to) > max_steps {
        return None;
    }

    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([(from, 0u32)]);
    while let Some((pos, steps)) = queue.pop_front() {
        if steps >= max_steps {
            continue;
        }
        for next in pos.neighbours() {
            if next == to {
                return Some(steps + 1);
            }
            // Cells that cannot bring us back in time are not worth expanding.
            if steps + 1 + next.manhattan(&to) > max_steps {
                continue;
            }
            if world.is_passable(world_name, next) && visited.insert(next) {
                queue.push_back((next, steps + 1));
            }
        }
    }
    None
}
