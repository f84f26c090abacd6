use core::fmt;

use crate::{Beliefs, TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey(pub &'static str);

impl ActionKey {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Lifecycle contract for a pluggable behavior instance.
///
/// Instances are created per agent by an [`ActionTemplate`] and are bound to
/// that agent for their whole life. The runtime drives them strictly as
/// `on_start → on_update* → on_stop`, with `on_complete` after `on_stop` only
/// when the action finished on its own. Only the action itself decides when it
/// is complete; internal phases (search, move, act) stay private to it.
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey;

    /// Pre-flight gate evaluated once, right before `on_start`.
    fn can_perform(&self, _ctx: &TickContext, _world: &W, _beliefs: &Beliefs) -> bool {
        true
    }

    fn is_complete(&self) -> bool;

    fn on_start(&mut self, _ctx: &TickContext, _world: &mut W, _beliefs: &mut Beliefs) {}

    fn on_update(&mut self, ctx: &TickContext, world: &mut W, beliefs: &mut Beliefs);

    fn on_stop(&mut self, _ctx: &TickContext, _world: &mut W, _beliefs: &mut Beliefs) {}

    fn on_complete(&mut self, _ctx: &TickContext, _world: &mut W, _beliefs: &mut Beliefs) {}
}

/// Stateless prototype for an action.
///
/// Templates are shared between plans (and agents), so they carry no mutable
/// state; `create` produces the per-agent instance.
pub trait ActionTemplate<W>: Send + Sync + 'static
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey;

    fn create(&self, agent: W::Agent) -> Box<dyn Action<W>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum StartOutcome {
    Started,
    /// `can_perform` returned false. The action was dropped without any hook.
    Rejected,
}

struct RunningAction<W>
where
    W: WorldMut + 'static,
{
    key: ActionKey,
    action: Box<dyn Action<W>>,
}

/// Holds at most one running action and enforces its hook ordering.
pub struct ActionRuntime<W>
where
    W: WorldMut + 'static,
{
    current: Option<RunningAction<W>>,
}

impl<W> ActionRuntime<W>
where
    W: WorldMut + 'static,
{
    pub fn current_key(&self) -> Option<ActionKey> {
        self.current.as_ref().map(|a| a.key)
    }

    pub fn is_running(&self, key: ActionKey) -> bool {
        self.current_key() == Some(key)
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Gate and start `action`. Any action already running is stopped first.
    pub fn start(
        &mut self,
        action: Box<dyn Action<W>>,
        ctx: &TickContext,
        world: &mut W,
        beliefs: &mut Beliefs,
    ) -> StartOutcome {
        let _ = self.abort(ctx, world, beliefs);

        if !action.can_perform(ctx, &*world, &*beliefs) {
            return StartOutcome::Rejected;
        }

        let key = action.key();
        let mut running = RunningAction { key, action };
        running.action.on_start(ctx, world, beliefs);
        self.current = Some(running);
        StartOutcome::Started
    }

    /// Update the running action. Returns its key if it completed this call,
    /// after `on_stop` and `on_complete` ran and the slot was cleared.
    pub fn update(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        beliefs: &mut Beliefs,
    ) -> Option<ActionKey> {
        let current = self.current.as_mut()?;
        current.action.on_update(ctx, world, beliefs);
        if !current.action.is_complete() {
            return None;
        }

        let mut finished = self.current.take()?;
        finished.action.on_stop(ctx, world, beliefs);
        finished.action.on_complete(ctx, world, beliefs);
        Some(finished.key)
    }

    /// Stop the running action without completing it.
    pub fn abort(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        beliefs: &mut Beliefs,
    ) -> Option<ActionKey> {
        let mut stopped = self.current.take()?;
        stopped.action.on_stop(ctx, world, beliefs);
        Some(stopped.key)
    }
}

impl<W> Default for ActionRuntime<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self { current: None }
    }
}
