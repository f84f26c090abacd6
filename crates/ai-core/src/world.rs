use core::fmt::Debug;

/// Stable identifier for an agent.
///
/// Controllers are per-agent and never share state, but logs and traces still
/// need a stable numeric handle (`stable_id`) and a deterministic ordering.
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        u64::from(self)
    }
}

impl AgentId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

/// Read-only world access.
///
/// The kernel does not prescribe which queries a world exposes. Subsystems
/// (movement, perception) define extension traits on top of this one.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink for action hooks.
pub trait WorldMut: WorldView {}
