//! Tracks bound draw state to elide redundant rebinds.

/// Number of bind group slots tracked.
const BIND_GROUP_SLOTS: usize = 4;

/// Remembers what is currently bound on the render pass so repeated binds of
/// the same pipeline or bind group can be skipped.
///
/// Identifiers are engine-assigned (cache entry ids for pipelines, node or
/// texture identities for bind groups); wgpu itself never sees them.
#[derive(Debug, Default)]
pub(crate) struct RenderState {
    pipeline: Option<u64>,
    bind_groups: [Option<u64>; BIND_GROUP_SLOTS],
}

impl RenderState {
    /// Creates a tracker with nothing bound.
    pub fn new() -> RenderState {
        RenderState::default()
    }

    /// Forgets all bindings. Call at the start of every render pass.
    pub fn reset(&mut self) {
        *self = RenderState::default();
    }

    /// Records `id` as the bound pipeline. Returns `true` if the caller must
    /// actually issue the bind.
    pub fn use_pipeline(&mut self, id: u64) -> bool {
        if self.pipeline == Some(id) {
            false
        } else {
            self.pipeline = Some(id);
            true
        }
    }

    /// Records `id` as the bind group in `slot`. Returns `true` if the caller
    /// must actually issue the bind.
    pub fn use_bind_group(&mut self, slot: usize, id: u64) -> bool {
        if self.bind_groups[slot] == Some(id) {
            false
        } else {
            self.bind_groups[slot] = Some(id);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pipeline_binds_are_elided() {
        let mut state = RenderState::new();
        assert!(state.use_pipeline(1));
        assert!(!state.use_pipeline(1));
        assert!(state.use_pipeline(2));
        assert!(state.use_pipeline(1));
    }

    #[test]
    fn bind_group_slots_are_tracked_independently() {
        let mut state = RenderState::new();
        assert!(state.use_bind_group(0, 7));
        assert!(state.use_bind_group(1, 7));
        assert!(!state.use_bind_group(0, 7));
        assert!(state.use_bind_group(0, 8));
    }

    #[test]
    fn reset_forgets_everything() {
        let mut state = RenderState::new();
        assert!(state.use_pipeline(1));
        assert!(state.use_bind_group(2, 3));
        state.reset();
        assert!(state.use_pipeline(1));
        assert!(state.use_bind_group(2, 3));
    }
}
