use std::collections::BTreeMap;

use crate::{TickContext, WorldView};

/// Named boolean facts an agent currently holds about the world.
///
/// Beliefs are written by [`Perception`] collaborators once per tick and read
/// by preconditions, goal templates and planners. Ordering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Beliefs {
    values: BTreeMap<&'static str, bool>,
}

impl Beliefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: bool) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Unknown beliefs evaluate to `false`.
    pub fn holds(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    pub fn remove(&mut self, name: &str) -> Option<bool> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

/// Sensor/memory collaborator refreshed once per controller tick.
///
/// Failures inside a perception collaborator are its own concern; the
/// controller only hands it the belief store to update.
pub trait Perception<W>: 'static
where
    W: WorldView,
{
    fn refresh(&mut self, ctx: &TickContext, agent: W::Agent, world: &W, beliefs: &mut Beliefs);
}
