use serde::Deserialize;

/// Every constant the agent pipeline reads. Partial JSON overrides the rest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AgentTuning {
    pub validation_interval_ticks: u64,
    pub link_search_radius: i32,

    pub scan_half_width: i32,
    pub scan_up: i32,
    pub scan_down: i32,
    pub hazard_temperature: f32,
    pub hazard_jump_radius: i32,
    pub hazard_near_radius: i32,
    pub hazard_sprint_radius: i32,
    pub hunger_seek_threshold: f32,
    pub assist_hunger_threshold: f32,
    pub panic_autonomy_threshold: f32,
    pub wander_min_ticks: u32,
    pub wander_max_ticks: u32,
    pub wander_idle_chance: f64,
    pub random_jump_chance: f64,

    pub walk_stamina_cost: f32,
    pub sprint_stamina_cost: f32,
    pub jump_stamina_cost: f32,
    pub jump_cooldown_ticks: u32,
    pub jump_hang_ticks: u32,
    pub headless_damage: f32,
    pub headless_blood_chance: f64,
    pub detached_head_blood_chance: f64,
    pub detached_head_death_chance: f64,

    pub hazard_damage: f32,
    pub hazard_panic: f32,
    pub panic_decay: f32,
    pub thermal_high: f32,
    pub thermal_low: f32,
    pub thermal_damage: f32,
    pub drown_liquid_neighbors: usize,
    pub breath_drain: f32,
    pub oxygen_drain: f32,
    pub breath_regen: f32,
    pub oxygen_regen: f32,
    pub suffocation_damage: f32,
    pub suffocation_interval_ticks: u64,
    pub hunger_rate: f32,
    pub starvation_damage: f32,
    pub eat_threshold: f32,
    pub eat_relief: f32,
    pub eat_health: f32,
    pub eat_stamina: f32,
    pub stamina_regen_still: f32,
    pub stamina_regen_idle: f32,
    pub decay_ticks: u64,

    pub pickup_stamina_cost: f32,
    pub place_stamina_cost: f32,
    pub throw_stamina_cost: f32,
    pub punch_stamina_cost: f32,
    pub punch_damage: f32,
    pub punch_hazard_damage: f32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            validation_interval_ticks: 15,
            link_search_radius: 3,

            scan_half_width: 5,
            scan_up: 4,
            scan_down: 3,
            hazard_temperature: 150.0,
            hazard_jump_radius: 2,
            hazard_near_radius: 3,
            hazard_sprint_radius: 3,
            hunger_seek_threshold: 40.0,
            assist_hunger_threshold: 70.0,
            panic_autonomy_threshold: 10.0,
            wander_min_ticks: 20,
            wander_max_ticks: 60,
            wander_idle_chance: 0.2,
            random_jump_chance: 0.01,

            walk_stamina_cost: 0.4,
            sprint_stamina_cost: 0.3,
            jump_stamina_cost: 6.0,
            jump_cooldown_ticks: 8,
            jump_hang_ticks: 2,
            headless_damage: 0.2,
            headless_blood_chance: 0.02,
            detached_head_blood_chance: 0.05,
            detached_head_death_chance: 0.01,

            hazard_damage: 2.0,
            hazard_panic: 2.0,
            panic_decay: 0.1,
            thermal_high: 60.0,
            thermal_low: -10.0,
            thermal_damage: 1.0,
            drown_liquid_neighbors: 3,
            breath_drain: 1.5,
            oxygen_drain: 1.0,
            breath_regen: 2.0,
            oxygen_regen: 1.0,
            suffocation_damage: 4.0,
            suffocation_interval_ticks: 5,
            hunger_rate: 0.02,
            starvation_damage: 0.05,
            eat_threshold: 30.0,
            eat_relief: 35.0,
            eat_health: 5.0,
            eat_stamina: 10.0,
            stamina_regen_still: 0.3,
            stamina_regen_idle: 0.8,
            decay_ticks: 260,

            pickup_stamina_cost: 1.0,
            place_stamina_cost: 1.0,
            throw_stamina_cost: 4.0,
            punch_stamina_cost: 3.0,
            punch_damage: 10.0,
            punch_hazard_damage: 5.0,
        }
    }
}
