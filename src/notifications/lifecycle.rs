/// Where a notification is in its display lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Appended, waiting for the entry transition.
    Pending,
    Visible,
    /// Exit transition running; removed once the grace window elapses.
    Dismissing,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    EntryDelayElapsed,
    /// The display duration ran out.
    Expired,
    /// The user closed it.
    DismissRequested,
    GraceElapsed,
}

/// Pure lifecycle step. Events that make no sense in the current phase leave
/// it unchanged.
pub fn transition(phase: Phase, event: LifecycleEvent) -> Phase {
    use LifecycleEvent as E;
    use Phase as P;

    match (phase, event) {
        (P::Pending, E::EntryDelayElapsed) => P::Visible,
        (P::Pending | P::Visible, E::Expired | E::DismissRequested) => P::Dismissing,
        (P::Dismissing, E::GraceElapsed) => P::Removed,
        (phase, _) => phase,
    }
}
