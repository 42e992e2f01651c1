use serde::Deserialize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Crouch,
    Sprint,
    PickupDrop,
    Place,
    Throw,
    Punch,
    CycleAgent,
    CycleMode,
}

const ACTION_COUNT: usize = 11;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Crouch,
        InputAction::Sprint,
        InputAction::PickupDrop,
        InputAction::Place,
        InputAction::Throw,
        InputAction::Punch,
        InputAction::CycleAgent,
        InputAction::CycleMode,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Crouch => 3,
            InputAction::Sprint => 4,
            InputAction::PickupDrop => 5,
            InputAction::Place => 6,
            InputAction::Throw => 7,
            InputAction::Punch => 8,
            InputAction::CycleAgent => 9,
            InputAction::CycleMode => 10,
        }
    }

    pub fn from_physical_key(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
            KeyCode::KeyW | KeyCode::ArrowUp | KeyCode::Space => Some(InputAction::Jump),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::Crouch),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(InputAction::Sprint),
            KeyCode::KeyE => Some(InputAction::PickupDrop),
            KeyCode::KeyR => Some(InputAction::Place),
            KeyCode::KeyT => Some(InputAction::Throw),
            KeyCode::KeyF => Some(InputAction::Punch),
            KeyCode::Tab => Some(InputAction::CycleAgent),
            KeyCode::KeyM => Some(InputAction::CycleMode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// Where a key event came from. Text-entry events never reach gameplay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrigin {
    #[default]
    Game,
    TextEntry,
}

/// Raw key state plus a once-per-tick edge snapshot.
///
/// Events mutate `current` at any time; `begin_tick` freezes the edges the
/// tick will see and rolls `current` into `previous`.
#[derive(Debug, Clone, Default)]
pub struct KeyInputTracker {
    current: ActionStates,
    previous: ActionStates,
    edges: ActionStates,
    shift_modifier: bool,
}

impl KeyInputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: PhysicalKey, state: ElementState, origin: EventOrigin) {
        if origin == EventOrigin::TextEntry {
            return;
        }
        if let Some(action) = InputAction::from_physical_key(key) {
            self.current.set(action, state == ElementState::Pressed);
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, origin: EventOrigin) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event.physical_key, event.state, origin);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_modifier = modifiers.state().shift_key();
            }
            WindowEvent::Focused(false) => self.clear(),
            _ => {}
        }
    }

    /// Direct state injection for scripted or test input.
    pub fn set_action(&mut self, action: InputAction, is_down: bool) {
        self.current.set(action, is_down);
    }

    pub fn set_shift_modifier(&mut self, is_down: bool) {
        self.shift_modifier = is_down;
    }

    pub fn begin_tick(&mut self) {
        let mut effective = self.current;
        if self.shift_modifier {
            effective.set(InputAction::Sprint, true);
        }
        let mut edges = ActionStates::default();
        for action in InputAction::ALL {
            edges.set(
                action,
                effective.is_down(action) && !self.previous.is_down(action),
            );
        }
        self.edges = edges;
        self.previous = effective;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.current.is_down(action) || (action == InputAction::Sprint && self.shift_modifier)
    }

    pub fn is_edge(&self, action: InputAction) -> bool {
        self.edges.is_down(action)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(tracker: &mut KeyInputTracker, code: KeyCode) {
        tracker.handle_key(
            PhysicalKey::Code(code),
            ElementState::Pressed,
            EventOrigin::Game,
        );
    }

    fn release(tracker: &mut KeyInputTracker, code: KeyCode) {
        tracker.handle_key(
            PhysicalKey::Code(code),
            ElementState::Released,
            EventOrigin::Game,
        );
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut tracker = KeyInputTracker::new();
        press(&mut tracker, KeyCode::KeyA);
        press(&mut tracker, KeyCode::ArrowRight);
        press(&mut tracker, KeyCode::Space);

        assert!(tracker.is_down(InputAction::MoveLeft));
        assert!(tracker.is_down(InputAction::MoveRight));
        assert!(tracker.is_down(InputAction::Jump));
        assert!(!tracker.is_down(InputAction::Crouch));
    }

    #[test]
    fn press_is_edge_for_single_tick() {
        let mut tracker = KeyInputTracker::new();
        press(&mut tracker, KeyCode::KeyF);

        tracker.begin_tick();
        assert!(tracker.is_edge(InputAction::Punch));
        tracker.begin_tick();
        assert!(!tracker.is_edge(InputAction::Punch));
        assert!(tracker.is_down(InputAction::Punch));
    }

    #[test]
    fn release_and_repress_retriggers_edge() {
        let mut tracker = KeyInputTracker::new();
        press(&mut tracker, KeyCode::Tab);
        tracker.begin_tick();
        release(&mut tracker, KeyCode::Tab);
        tracker.begin_tick();
        assert!(!tracker.is_edge(InputAction::CycleAgent));

        press(&mut tracker, KeyCode::Tab);
        tracker.begin_tick();
        assert!(tracker.is_edge(InputAction::CycleAgent));
    }

    #[test]
    fn text_entry_events_are_ignored() {
        let mut tracker = KeyInputTracker::new();
        tracker.handle_key(
            PhysicalKey::Code(KeyCode::KeyE),
            ElementState::Pressed,
            EventOrigin::TextEntry,
        );
        tracker.begin_tick();
        assert!(!tracker.is_down(InputAction::PickupDrop));
        assert!(!tracker.is_edge(InputAction::PickupDrop));
    }

    #[test]
    fn focus_loss_clears_all_state() {
        let mut tracker = KeyInputTracker::new();
        press(&mut tracker, KeyCode::KeyD);
        tracker.set_shift_modifier(true);
        tracker.begin_tick();

        tracker.handle_window_event(&WindowEvent::Focused(false), EventOrigin::Game);
        assert!(!tracker.is_down(InputAction::MoveRight));
        assert!(!tracker.is_down(InputAction::Sprint));
        assert!(!tracker.is_edge(InputAction::MoveRight));
    }

    #[test]
    fn shift_modifier_counts_as_sprint() {
        let mut tracker = KeyInputTracker::new();
        tracker.set_shift_modifier(true);
        tracker.begin_tick();
        assert!(tracker.is_down(InputAction::Sprint));
        assert!(tracker.is_edge(InputAction::Sprint));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut tracker = KeyInputTracker::new();
        press(&mut tracker, KeyCode::KeyZ);
        tracker.begin_tick();
        let untouched = InputAction::ALL
            .iter()
            .all(|action| !tracker.is_down(*action) && !tracker.is_edge(*action));
        assert!(untouched);
    }
}
