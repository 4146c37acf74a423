//! Input events, held-key state and listener routing.
//!
//! Platform code turns window events into [`InputEvent`]s and hands them to
//! an [`InputRouter`]. Consumers subscribe one listener per event kind, drain
//! their queues once per frame and unsubscribe each listener on teardown.

/// Pointer buttons, numbered the way browsers number them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

impl PointerButton {
    /// Only the primary and middle buttons drag the view
    pub fn starts_drag(&self) -> bool {
        matches!(self, PointerButton::Primary | PointerButton::Middle)
    }
}

/// Keys the camera controller responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    /// W
    Forward,
    /// S
    Backward,
    /// A
    Left,
    /// D
    Right,
    /// Q
    TurnLeft,
    /// E
    TurnRight,
    /// Space
    Up,
    /// Left shift
    Down,
}

/// A platform-independent input event. Pointer coordinates are window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: PointerButton },
    /// Browser convention: positive is scrolling down, away from the scene
    Wheel { delta_y: f32 },
    KeyDown(MoveKey),
    KeyUp(MoveKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    KeyDown,
    KeyUp,
}

impl InputKind {
    pub const ALL: [InputKind; 6] = [
        InputKind::PointerDown,
        InputKind::PointerMove,
        InputKind::PointerUp,
        InputKind::Wheel,
        InputKind::KeyDown,
        InputKind::KeyUp,
    ];
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerDown { .. } => InputKind::PointerDown,
            InputEvent::PointerMove { .. } => InputKind::PointerMove,
            InputEvent::PointerUp { .. } => InputKind::PointerUp,
            InputEvent::Wheel { .. } => InputKind::Wheel,
            InputEvent::KeyDown(_) => InputKind::KeyDown,
            InputEvent::KeyUp(_) => InputKind::KeyUp,
        }
    }
}

/// Keys currently held
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    pub fn set(&mut self, key: MoveKey, pressed: bool) {
        *self.slot(key) = pressed;
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Forward => self.forward,
            MoveKey::Backward => self.backward,
            MoveKey::Left => self.left,
            MoveKey::Right => self.right,
            MoveKey::TurnLeft => self.turn_left,
            MoveKey::TurnRight => self.turn_right,
            MoveKey::Up => self.up,
            MoveKey::Down => self.down,
        }
    }

    fn slot(&mut self, key: MoveKey) -> &mut bool {
        match key {
            MoveKey::Forward => &mut self.forward,
            MoveKey::Backward => &mut self.backward,
            MoveKey::Left => &mut self.left,
            MoveKey::Right => &mut self.right,
            MoveKey::TurnLeft => &mut self.turn_left,
            MoveKey::TurnRight => &mut self.turn_right,
            MoveKey::Up => &mut self.up,
            MoveKey::Down => &mut self.down,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Handle returned by [`InputRouter::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
struct Listener {
    id: ListenerId,
    kind: InputKind,
    queue: Vec<(u64, InputEvent)>,
}

/// Fans input events out to subscribed listeners
#[derive(Debug, Default)]
pub struct InputRouter {
    next_id: u64,
    sequence: u64,
    listeners: Vec<Listener>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of event
    pub fn subscribe(&mut self, kind: InputKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            queue: Vec::new(),
        });
        id
    }

    /// Remove a listener and drop its queued events. Returns false for an unknown id.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Queue `event` for every listener of its kind. Returns the number of listeners reached.
    pub fn dispatch(&mut self, event: InputEvent) -> usize {
        let kind = event.kind();
        let sequence = self.sequence;
        self.sequence += 1;

        let mut delivered = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            listener.queue.push((sequence, event));
            delivered += 1;
        }
        delivered
    }

    /// Take the queued events of several listeners, merged in dispatch order
    pub fn drain(&mut self, ids: &[ListenerId]) -> Vec<InputEvent> {
        let mut events: Vec<(u64, InputEvent)> = self
            .listeners
            .iter_mut()
            .filter(|l| ids.contains(&l.id))
            .flat_map(|l| std::mem::take(&mut l.queue))
            .collect();
        events.sort_by_key(|(sequence, _)| *sequence);
        events.into_iter().map(|(_, event)| event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut state = InputState::default();
        state.set(MoveKey::Forward, true);
        state.set(MoveKey::Up, true);
        assert!(state.is_pressed(MoveKey::Forward));
        assert!(state.up);

        state.set(MoveKey::Forward, false);
        assert!(!state.forward);

        state.clear();
        assert_eq!(state, InputState::default());
    }

    #[test]
    fn test_only_primary_and_middle_drag() {
        assert!(PointerButton::Primary.starts_drag());
        assert!(PointerButton::Middle.starts_drag());
        assert!(!PointerButton::Secondary.starts_drag());
        assert!(!PointerButton::Other(4).starts_drag());
    }

    #[test]
    fn test_events_reach_matching_listeners() {
        let mut router = InputRouter::new();
        let wheel = router.subscribe(InputKind::Wheel);
        let keys = router.subscribe(InputKind::KeyDown);

        assert_eq!(router.dispatch(InputEvent::Wheel { delta_y: 1.0 }), 1);
        assert_eq!(router.dispatch(InputEvent::PointerMove { x: 0.0, y: 0.0 }), 0);

        assert_eq!(router.drain(&[wheel]), vec![InputEvent::Wheel { delta_y: 1.0 }]);
        assert!(router.drain(&[keys]).is_empty());
        assert!(router.drain(&[wheel]).is_empty());
    }

    #[test]
    fn test_drain_preserves_dispatch_order() {
        let mut router = InputRouter::new();
        let ids: Vec<ListenerId> = InputKind::ALL.iter().map(|&k| router.subscribe(k)).collect();

        let events = vec![
            InputEvent::PointerMove { x: 1.0, y: 1.0 },
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                x: 1.0,
                y: 1.0,
            },
            InputEvent::PointerMove { x: 5.0, y: 1.0 },
            InputEvent::PointerUp {
                button: PointerButton::Primary,
            },
            InputEvent::PointerMove { x: 9.0, y: 1.0 },
        ];
        for event in &events {
            router.dispatch(*event);
        }

        assert_eq!(router.drain(&ids), events);
    }

    #[test]
    fn test_unsubscribe_is_per_listener() {
        let mut router = InputRouter::new();
        let a = router.subscribe(InputKind::KeyDown);
        let b = router.subscribe(InputKind::KeyDown);

        assert!(router.unsubscribe(a));
        assert!(!router.unsubscribe(a));
        assert!(router.is_subscribed(b));
        assert_eq!(router.dispatch(InputEvent::KeyDown(MoveKey::Left)), 1);
    }
}
