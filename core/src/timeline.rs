use crate::TimelineError;
use async_trait::async_trait;
use cloud_incr_protocol::Instant;

/// Source of completed instants.
#[async_trait]
pub trait Timeline: Send + Sync {
    /// Instants whose commits are complete and still on the active
    /// timeline. Archived instants are not included.
    async fn completed_instants(&self) -> Result<CompletedTimeline, TimelineError>;
}

/// Snapshot of the active timeline's completed instants, ascending.
///
/// All stepping between instants happens here so the resolver never needs
/// to know how instants are encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedTimeline {
    instants: Vec<Instant>,
}

impl CompletedTimeline {
    pub fn new(mut instants: Vec<Instant>) -> Self {
        instants.sort();
        instants.dedup();
        Self { instants }
    }

    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn first_instant(&self) -> Option<&Instant> {
        self.instants.first()
    }

    pub fn last_instant(&self) -> Option<&Instant> {
        self.instants.last()
    }

    /// Up to `count` instants strictly after `instant`.
    pub fn instants_after(&self, instant: &Instant, count: usize) -> &[Instant] {
        let start = self.instants.partition_point(|candidate| candidate <= instant);
        let end = start.saturating_add(count).min(self.instants.len());
        &self.instants[start..end]
    }

    /// Latest instant strictly before `instant`.
    pub fn find_instant_before(&self, instant: &Instant) -> Option<&Instant> {
        let idx = self.instants.partition_point(|candidate| candidate < instant);
        idx.checked_sub(1).and_then(|idx| self.instants.get(idx))
    }

    /// Whether `instant` precedes everything still retained. An empty
    /// timeline has no start, so nothing is before it.
    pub fn is_before_timeline_starts(&self, instant: &Instant) -> bool {
        self.first_instant().is_some_and(|first| instant < first)
    }
}
