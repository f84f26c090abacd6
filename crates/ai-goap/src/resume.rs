use ai_core::{Beliefs, Plan, TickContext, WorldMut};

/// Short-circuits fresh planning with a previously interrupted plan.
///
/// The controller hands over a plan it set aside (already rewound to its
/// first unfinished step) and, whenever it needs a new plan, asks for one
/// back before consulting the planner.
pub trait PlanResume<W>: 'static
where
    W: WorldMut + 'static,
{
    fn on_interrupted(&mut self, plan: Plan<W>);

    fn resume(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        beliefs: &Beliefs,
    ) -> Option<Plan<W>>;

    fn clear(&mut self);

    fn pending(&self) -> usize;
}

/// Interrupted plans are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResume;

impl<W> PlanResume<W> for NoResume
where
    W: WorldMut + 'static,
{
    fn on_interrupted(&mut self, _plan: Plan<W>) {}

    fn resume(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _beliefs: &Beliefs,
    ) -> Option<Plan<W>> {
        None
    }

    fn clear(&mut self) {}

    fn pending(&self) -> usize {
        0
    }
}

/// Bounded LIFO of interrupted plans. The most recent interruption resumes
/// first; when full, the oldest entry is dropped.
pub struct InterruptStack<W>
where
    W: WorldMut + 'static,
{
    plans: Vec<Plan<W>>,
    max_depth: usize,
}

impl<W> InterruptStack<W>
where
    W: WorldMut + 'static,
{
    pub fn new(max_depth: usize) -> Self {
        Self {
            plans: Vec::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn peek(&self) -> Option<&Plan<W>> {
        self.plans.last()
    }
}

impl<W> PlanResume<W> for InterruptStack<W>
where
    W: WorldMut + 'static,
{
    fn on_interrupted(&mut self, plan: Plan<W>) {
        if self.max_depth == 0 {
            return;
        }
        if self.plans.len() == self.max_depth {
            self.plans.remove(0);
        }
        self.plans.push(plan);
    }

    fn resume(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _beliefs: &Beliefs,
    ) -> Option<Plan<W>> {
        self.plans.pop()
    }

    fn clear(&mut self) {
        self.plans.clear();
    }

    fn pending(&self) -> usize {
        self.plans.len()
    }
}
