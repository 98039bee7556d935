use async_trait::async_trait;

/// A named external precondition a source waits on before it starts
/// emitting (spec §3, §4.2). Implementations must be idempotent and
/// side-effect-free — the supervisor loop polls them repeatedly and treats
/// an `Err` the same as `Ok(false)`.
#[async_trait]
pub trait Dependency: Send + Sync {
    fn name(&self) -> &str;

    async fn is_dependency_available(&self) -> Result<bool, String>;
}

/// States a dependency-aware source cycles through (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    Unknown,
    Probing,
    Available,
    Unavailable,
    Stopped,
}

impl DependencyState {
    pub fn on_probe_result(self, available: bool) -> Self {
        match (self, available) {
            (DependencyState::Stopped, _) => DependencyState::Stopped,
            (_, true) => DependencyState::Available,
            (_, false) => DependencyState::Unavailable,
        }
    }

    pub fn on_cancel(self) -> Self {
        DependencyState::Stopped
    }

    pub fn is_available(self) -> bool {
        matches!(self, DependencyState::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_terminal() {
        let state = DependencyState::Unknown.on_cancel();
        assert_eq!(state.on_probe_result(true), DependencyState::Stopped);
    }

    #[test]
    fn probe_transitions_between_available_and_unavailable() {
        let state = DependencyState::Unknown.on_probe_result(false);
        assert_eq!(state, DependencyState::Unavailable);
        let state = state.on_probe_result(true);
        assert_eq!(state, DependencyState::Available);
    }
}
