use uuid::Uuid;

/// IdSource abstracts id generation so stores stay deterministic in
/// tests while production keeps random v4 identifiers.
pub trait IdSource {
    /// Returns a fresh unique id.
    fn next_id(&mut self) -> Uuid;
}

/// Production id source backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic source handing out sequential ids, for tests and
/// reproducible seed data.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdSource {
    next: u64,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u64_pair(0, self.next)
    }
}
