use engine::GridPos;

use super::tuning::AgentTuning;
use super::types::{Body, Intent};
use super::AgentWorld;

/// Where an agent's two cells currently sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AgentPose {
    pub body: GridPos,
    pub head: Option<GridPos>,
}

/// One collision-aware body step. When the body would step into its own
/// head, the head moves first and is put back if the body then fails.
pub(crate) fn step_body(world: &mut AgentWorld, pose: &mut AgentPose, dx: i32, dy: i32) -> bool {
    let target = pose.body.offset(dx, dy);
    if let Some(head) = pose.head.filter(|head| *head == target) {
        let Some(lifted) = world.try_step(head, dx, dy) else {
            return false;
        };
        match world.try_step(pose.body, dx, dy) {
            Some(moved) => {
                pose.body = moved;
                pose.head = Some(lifted);
                true
            }
            None => {
                world.reposition(lifted, head);
                false
            }
        }
    } else {
        match world.try_step(pose.body, dx, dy) {
            Some(moved) => {
                pose.body = moved;
                true
            }
            None => false,
        }
    }
}

/// Walking, jumping and gravity for one tick. Returns whether the agent
/// moved under its own power.
pub(crate) fn apply_intent(
    world: &mut AgentWorld,
    tuning: &AgentTuning,
    body: &mut Body,
    pose: &mut AgentPose,
    intent: &Intent,
) -> bool {
    let mut moved = false;
    body.jump_cooldown = body.jump_cooldown.saturating_sub(1);

    if intent.move_dir != 0 {
        let dir = intent.move_dir.signum();
        body.facing = dir;
        let (attempts, cost) = if intent.sprint {
            (2, tuning.sprint_stamina_cost)
        } else {
            (1, tuning.walk_stamina_cost)
        };
        for _ in 0..attempts {
            if body.stamina < cost {
                break;
            }
            let stepped = step_body(world, pose, dir, 0) || step_body(world, pose, dir, -1);
            if !stepped {
                break;
            }
            body.spend_stamina(cost);
            moved = true;
        }
    }

    if intent.jump && body.jump_cooldown == 0 && body.stamina >= tuning.jump_stamina_cost {
        let facing = body.facing;
        let jumped = step_body(world, pose, facing, -1)
            || step_body(world, pose, 0, -1)
            || step_body(world, pose, facing, 0);
        if jumped {
            body.jump_cooldown = tuning.jump_cooldown_ticks;
            body.hang_ticks = tuning.jump_hang_ticks;
            body.spend_stamina(tuning.jump_stamina_cost);
            moved = true;
        }
    }

    apply_gravity(world, body, pose);
    moved
}

pub(crate) fn apply_gravity(world: &mut AgentWorld, body: &mut Body, pose: &mut AgentPose) {
    if body.hang_ticks > 0 {
        body.hang_ticks -= 1;
        return;
    }
    step_body(world, pose, 0, 1);
}

/// Keeps the head directly above the body: snap when the slot is free,
/// otherwise drag it one collision-aware step per tick.
pub(crate) fn bind_head(world: &mut AgentWorld, pose: &mut AgentPose) {
    let Some(head) = pose.head else {
        return;
    };
    let target = pose.body.above();
    if head == target {
        return;
    }
    if world.grid().is_empty(target) {
        if world.reposition(head, target) {
            pose.head = Some(target);
        }
        return;
    }

    let dx = (target.x - head.x).signum();
    let dy = (target.y - head.y).signum();
    let mut candidates = vec![(dx, dy)];
    if dx != 0 && dy != 0 {
        candidates.push((dx, 0));
        candidates.push((0, dy));
    }
    for (step_x, step_y) in candidates {
        if let Some(moved) = world.try_step(head, step_x, step_y) {
            pose.head = Some(moved);
            return;
        }
    }
}
