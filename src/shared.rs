//! Thread-safe handle to a knowledge base.
//!
//! Mutations take the write lock; queries take the read lock, so any number
//! of queries run concurrently between updates.

use std::sync::{Arc, RwLock};

use crate::error::KbResult;
use crate::infer::ResolutionStats;
use crate::kb::KnowledgeBase;
use crate::logic::{Fact, Rule};
use crate::packs::{KnowledgePack, PackReport};
use crate::substitution::Substitution;

/// Cloneable, shared [`KnowledgeBase`].
#[derive(Debug, Clone, Default)]
pub struct SharedKnowledgeBase {
    inner: Arc<RwLock<KnowledgeBase>>,
}

impl SharedKnowledgeBase {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            inner: Arc::new(RwLock::new(kb)),
        }
    }

    pub fn add_fact(&self, fact: Fact) -> KbResult<bool> {
        self.inner
            .write()
            .expect("knowledge base lock poisoned")
            .add_fact(fact)
    }

    pub fn add_rule(&self, rule: Rule) {
        self.inner
            .write()
            .expect("knowledge base lock poisoned")
            .add_rule(rule);
    }

    pub fn remove_fact(&self, fact: &Fact) -> bool {
        self.inner
            .write()
            .expect("knowledge base lock poisoned")
            .remove_fact(fact)
    }

    pub fn apply_pack(&self, pack: &KnowledgePack) -> KbResult<PackReport> {
        let mut kb = self.inner.write().expect("knowledge base lock poisoned");
        pack.apply(&mut kb)
    }

    pub fn query(&self, goal: &Fact) -> bool {
        self.inner
            .read()
            .expect("knowledge base lock poisoned")
            .query(goal)
    }

    pub fn solve(&self, goal: &Fact) -> Option<Substitution> {
        self.inner
            .read()
            .expect("knowledge base lock poisoned")
            .solve(goal)
    }

    pub fn answers(&self, goal: &Fact, limit: usize) -> Vec<Substitution> {
        self.inner
            .read()
            .expect("knowledge base lock poisoned")
            .answers(goal, limit)
    }

    pub fn resolve_with_stats(&self, goal: &Fact) -> (Option<Substitution>, ResolutionStats) {
        self.inner
            .read()
            .expect("knowledge base lock poisoned")
            .resolve_with_stats(goal)
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&KnowledgeBase) -> R) -> R {
        f(&self.inner.read().expect("knowledge base lock poisoned"))
    }

    /// Run `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut KnowledgeBase) -> R) -> R {
        f(&mut self.inner.write().expect("knowledge base lock poisoned"))
    }

    /// A point-in-time copy.
    pub fn snapshot(&self) -> KnowledgeBase {
        self.read(KnowledgeBase::clone)
    }
}

impl From<KnowledgeBase> for SharedKnowledgeBase {
    fn from(kb: KnowledgeBase) -> Self {
        Self::new(kb)
    }
}
