use engine::{InputAction, KeyInputTracker};
use rand::Rng;

use super::perception::Perception;
use super::tuning::AgentTuning;
use super::types::{Body, ControlMode, Intent};

pub(crate) fn manual_intent(input: &KeyInputTracker) -> Intent {
    let left = input.is_down(InputAction::MoveLeft);
    let right = input.is_down(InputAction::MoveRight);
    Intent {
        move_dir: i32::from(right) - i32::from(left),
        jump: input.is_edge(InputAction::Jump),
        crouch: input.is_down(InputAction::Crouch),
        sprint: input.is_down(InputAction::Sprint),
    }
}

/// Hazard avoidance beats food seeking beats wandering. Advances the body's
/// wander timer as a side effect.
pub(crate) fn autonomous_intent(
    body: &mut Body,
    perception: &Perception,
    tuning: &AgentTuning,
    rng: &mut impl Rng,
) -> Intent {
    let mut intent = Intent::IDLE;
    let hazard_near = perception.hazard_within(tuning.hazard_near_radius);

    if perception.hazard_score != 0.0 {
        intent.move_dir = sign(perception.hazard_score);
    } else if hazard_near {
        intent.move_dir = body.facing;
    } else if body.hunger > tuning.hunger_seek_threshold && perception.food_score != 0.0 {
        intent.move_dir = sign(perception.food_score);
    } else {
        intent.move_dir = wander(body, tuning, rng);
        intent.jump = rng.gen_bool(tuning.random_jump_chance.clamp(0.0, 1.0));
    }

    if perception.hazard_within(tuning.hazard_jump_radius) {
        intent.jump = true;
    }
    if perception.hazard_within(tuning.hazard_sprint_radius) {
        intent.sprint = true;
    }
    intent
}

fn wander(body: &mut Body, tuning: &AgentTuning, rng: &mut impl Rng) -> i32 {
    body.wander_timer = body.wander_timer.saturating_sub(1);
    if body.wander_timer == 0 {
        body.wander_dir = if rng.gen_bool(tuning.wander_idle_chance.clamp(0.0, 1.0)) {
            0
        } else if rng.gen_bool(0.5) {
            1
        } else {
            -1
        };
        let min = tuning.wander_min_ticks.max(1);
        let max = tuning.wander_max_ticks.max(min);
        body.wander_timer = rng.gen_range(min..=max);
    }
    body.wander_dir
}

fn sign(value: f32) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Everything the per-mode blend functions read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlendInput {
    pub is_active: bool,
    pub manual: Intent,
    pub autonomous: Intent,
    pub hazard_near: bool,
    pub hunger: f32,
    pub panic: f32,
}

pub(crate) fn blend(mode: ControlMode, input: &BlendInput, tuning: &AgentTuning) -> Intent {
    let mut intent = match mode {
        ControlMode::Manual => blend_manual(input, tuning),
        ControlMode::Assist => blend_assist(input, tuning),
        ControlMode::Autonomous => input.autonomous,
    };
    if intent.crouch {
        intent.sprint = false;
        intent.jump = false;
    }
    intent
}

fn blend_manual(input: &BlendInput, tuning: &AgentTuning) -> Intent {
    if input.is_active {
        input.manual
    } else if input.panic > tuning.panic_autonomy_threshold {
        input.autonomous
    } else {
        Intent::IDLE
    }
}

fn blend_assist(input: &BlendInput, tuning: &AgentTuning) -> Intent {
    let manual = if input.is_active {
        input.manual
    } else {
        Intent::IDLE
    };
    if !input.hazard_near && input.hunger < tuning.assist_hunger_threshold {
        return manual;
    }
    Intent {
        move_dir: if manual.move_dir != 0 {
            manual.move_dir
        } else {
            input.autonomous.move_dir
        },
        jump: manual.jump || input.autonomous.jump,
        crouch: manual.crouch,
        sprint: manual.sprint || input.autonomous.sprint,
    }
}
