use engine::{GridPos, InputAction};
use rand::Rng;
use tracing::{debug, info, trace};

use super::context::AgentContext;
use super::intent::{autonomous_intent, blend, manual_intent, BlendInput};
use super::interaction::run_interactions;
use super::lifecycle::{bleed, decay_due, decay_to_remains};
use super::link::{body_at, body_at_mut, find_body, find_head, head_at, head_at_mut};
use super::perception::perceive;
use super::physics::{apply_intent, bind_head, AgentPose};
use super::survival::{apply_passive, TickFacts};
use super::tuning::AgentTuning;
use super::types::{AgentKinds, Intent};
use super::AgentWorld;

/// Full per-tick update for one body cell: intent, motion, head binding,
/// interactions, passive survival and the death transition. The body payload
/// is worked on as a copy and written back wherever the body ends up.
pub(crate) fn tick_body(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    ctx: &mut AgentContext,
    pos: GridPos,
) {
    let tick = world.tick();
    let Some(mut body) = body_at(world, pos).cloned() else {
        return;
    };
    if body.vitality.is_dead() {
        if decay_due(body.vitality, tick, tuning) {
            decay_to_remains(world, kinds, pos);
        }
        return;
    }

    let head_pos = find_head(world, pos, body.id, tuning.link_search_radius)
        .filter(|head_pos| head_at(world, *head_pos).is_some_and(|head| !head.vitality.is_dead()));
    let mut head = head_pos.and_then(|head_pos| head_at(world, head_pos).cloned());
    let mut pose = AgentPose {
        body: pos,
        head: head_pos,
    };

    let is_active = ctx.registry.is_active(body.id);
    if is_active && ctx.input.is_edge(InputAction::CycleMode) {
        body.mode = body.mode.next();
        info!(agent = body.id.0, mode = body.mode.as_token(), "control_mode_changed");
    }

    let perception = perceive(
        world,
        kinds,
        tuning,
        head_pos.unwrap_or(pos),
        body.id,
        body.hunger > tuning.hunger_seek_threshold,
    );
    let manual = if is_active {
        manual_intent(&ctx.input)
    } else {
        Intent::IDLE
    };
    let autonomous = autonomous_intent(&mut body, &perception, tuning, &mut ctx.rng);
    let intent = blend(
        body.mode,
        &BlendInput {
            is_active,
            manual,
            autonomous,
            hazard_near: perception.hazard_within(tuning.hazard_near_radius),
            hunger: body.hunger,
            panic: body.panic,
        },
        tuning,
    );
    trace!(agent = body.id.0, ?intent, "intent_resolved");

    let moved = apply_intent(world, tuning, &mut body, &mut pose, &intent);
    bind_head(world, &mut pose);

    if pose.head.is_none() {
        body.health -= tuning.headless_damage;
        let blood_chance = tuning.headless_blood_chance.clamp(0.0, 1.0);
        if ctx.rng.gen_bool(blood_chance) {
            bleed(world, kinds, pose.body);
        }
    }

    if is_active {
        let outcomes = run_interactions(world, kinds, tuning, &ctx.input, &mut body, pose.body);
        if !outcomes.is_empty() {
            debug!(agent = body.id.0, ?outcomes, "interactions_applied");
        }
    }

    world.apply_default_effects(pose.body);
    if let Some(head_pos) = pose.head {
        world.apply_default_effects(head_pos);
    }
    apply_passive(
        world,
        kinds,
        tuning,
        &mut body,
        head.as_mut(),
        &pose,
        TickFacts {
            tick,
            moved,
            idle: intent.is_idle(),
        },
    );

    if body.health <= 0.0 && body.vitality.mark_dead(tick) {
        info!(agent = body.id.0, tick, "agent_died");
        if let Some(head) = head.as_mut() {
            if head.vitality.mark_dead(tick) {
                debug!(agent = head.id.0, tick, "head_died_with_body");
            }
        }
    }

    let body_id = body.id;
    if let Some(slot) = body_at_mut(world, pose.body).filter(|slot| slot.id == body_id) {
        *slot = body;
    }
    if let (Some(head), Some(head_pos)) = (head, pose.head) {
        if let Some(slot) = head_at_mut(world, head_pos).filter(|slot| slot.id == body_id) {
            *slot = head;
        }
    }
}

/// Heads only act on their own when no body claims them: they fall, bleed
/// and eventually die. Dead heads decay on the same clock as bodies.
pub(crate) fn tick_head(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    ctx: &mut AgentContext,
    pos: GridPos,
) {
    let tick = world.tick();
    let Some(mut head) = head_at(world, pos).cloned() else {
        return;
    };
    if head.vitality.is_dead() {
        if decay_due(head.vitality, tick, tuning) {
            decay_to_remains(world, kinds, pos);
        }
        return;
    }
    let linked = find_body(world, pos, head.id, tuning.link_search_radius)
        .and_then(|body_pos| body_at(world, body_pos))
        .is_some_and(|body| !body.vitality.is_dead());
    if linked {
        return;
    }

    let at = world.descend(pos).unwrap_or(pos);
    world.apply_default_effects(at);
    if ctx
        .rng
        .gen_bool(tuning.detached_head_blood_chance.clamp(0.0, 1.0))
    {
        bleed(world, kinds, at);
    }
    if ctx
        .rng
        .gen_bool(tuning.detached_head_death_chance.clamp(0.0, 1.0))
        && head.vitality.mark_dead(tick)
    {
        info!(agent = head.id.0, tick, "detached_head_died");
    }
    if let Some(slot) = head_at_mut(world, at) {
        *slot = head;
    }
}
