use std::collections::HashMap;
use std::fmt;

/// Something that happened while a learner works through an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// An answer was submitted for a question in `time_slot`.
    QuestionFinished { time_slot: u32 },
    /// The learner moved past the last question asked at `time_slot`.
    TimeSlotFinished { time_slot: u32 },
    /// No unanswered questions remain.
    ExerciseFinished { questions: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    QuestionFinished,
    TimeSlotFinished,
    ExerciseFinished,
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::QuestionFinished { .. } => EventKind::QuestionFinished,
            SessionEvent::TimeSlotFinished { .. } => EventKind::TimeSlotFinished,
            SessionEvent::ExerciseFinished { .. } => EventKind::ExerciseFinished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&SessionEvent)>;

/// Listeners registered per event kind, called in registration order.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unregisters `id` from `kind`. Returns `true` if it was registered.
    pub fn remove_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(&kind) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners.remove(&kind);
        }
        removed
    }

    /// Unregisters `id` from every kind it was added to.
    pub fn remove_listener_everywhere(&mut self, id: ListenerId) -> bool {
        let kinds: Vec<EventKind> = self.listeners.keys().copied().collect();
        kinds
            .into_iter()
            .fold(false, |removed, kind| self.remove_listener(kind, id) || removed)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn emit(&mut self, event: &SessionEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let counts: HashMap<&EventKind, usize> =
            self.listeners.iter().map(|(kind, l)| (kind, l.len())).collect();
        f.debug_struct("EventManager")
            .field("listeners", &counts)
            .finish()
    }
}
