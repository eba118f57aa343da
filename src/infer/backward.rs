//! Backward chaining: reason from a goal back to stored facts.
//!
//! The search runs over an explicit stack of choice points instead of native
//! recursion. Each [`Node`] carries the goals still to prove and the bindings
//! made so far. Expanding a node's next goal pushes one child per stored fact
//! that unifies with it and one per rule whose (renamed) head unifies with
//! it, so exhausting a child falls back to the next alternative.
//!
//! Every goal remembers the variant keys of the goals it was spawned to
//! prove. A goal identical to one of those in-progress ancestors is not
//! expanded by rules again, which makes cyclic rules such as `p(X) :- p(X)`
//! terminate. Ground facts proven through rules are kept as lemmas; when a
//! pass cut goals this way and also proved something new, the search is
//! re-run with the lemmas available, so left-recursive rules still reach
//! every consequence.
//!
//! Passes deepen iteratively: the first pass expands goals down to depth 1,
//! and each pass that had to cut goals at its limit is followed by one with
//! twice the limit, up to `max_depth`. A shallow proof through a late rule
//! is therefore found before an early rule's deep subtree can spend the
//! step budget, and the lemmas of shallow passes shorten the deeper ones.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::kb::KnowledgeBase;
use crate::logic::{Fact, Predicate, VariantKey, Variable};
use crate::substitution::Substitution;
use crate::unify::unify_with;

use super::{ResolutionStats, ResolverConfig};

/// A link in the chain of goals currently being proven above a goal.
#[derive(Debug)]
struct Ancestry {
    key: VariantKey,
    parent: Option<Rc<Ancestry>>,
}

fn in_progress(chain: Option<&Rc<Ancestry>>, key: &VariantKey) -> bool {
    let mut link = chain;
    while let Some(node) = link {
        if node.key == *key {
            return true;
        }
        link = node.parent.as_ref();
    }
    false
}

#[derive(Debug, Clone)]
enum Pending {
    Goal {
        fact: Fact,
        ancestry: Option<Rc<Ancestry>>,
        depth: usize,
    },
    /// Reached once a rule body is fully proven; the instantiated head is
    /// then a derived fact.
    Proven(Fact),
}

/// A choice point. `pending` is a stack: the last entry is proven next.
#[derive(Debug, Clone)]
struct Node {
    pending: Vec<Pending>,
    subst: Substitution,
}

impl Node {
    fn root(goal: &Fact) -> Self {
        Self {
            pending: vec![Pending::Goal {
                fact: goal.clone(),
                ancestry: None,
                depth: 0,
            }],
            subst: Substitution::new(),
        }
    }
}

/// Lazy iterator over the distinct answers to a goal.
///
/// Each answer is a substitution restricted to the goal's own variables; a
/// ground goal yields at most one (empty) answer. Created by
/// [`KnowledgeBase::solutions`].
pub struct Solutions<'kb> {
    kb: &'kb KnowledgeBase,
    config: ResolverConfig,
    goal: Fact,
    query_vars: Vec<Variable>,
    stack: Vec<Node>,
    lemmas: HashSet<Fact>,
    lemmas_by_predicate: HashMap<Predicate, Vec<Fact>>,
    depth_limit: usize,
    pass_lemmas: usize,
    pass_loop_prunes: usize,
    pass_depth_prunes: usize,
    seen: HashSet<Substitution>,
    next_scope: u64,
    stats: ResolutionStats,
    done: bool,
}

impl<'kb> Solutions<'kb> {
    pub(crate) fn new(kb: &'kb KnowledgeBase, goal: &Fact) -> Self {
        let mut solutions = Self {
            kb,
            config: kb.config().clone(),
            goal: goal.clone(),
            query_vars: goal.variables().into_iter().cloned().collect(),
            stack: Vec::new(),
            lemmas: HashSet::new(),
            lemmas_by_predicate: HashMap::new(),
            depth_limit: kb.config().max_depth.min(1),
            pass_lemmas: 0,
            pass_loop_prunes: 0,
            pass_depth_prunes: 0,
            seen: HashSet::new(),
            next_scope: 0,
            stats: ResolutionStats::default(),
            done: false,
        };
        solutions.start_pass();
        solutions
    }

    /// Counters for the search so far.
    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    pub fn into_stats(self) -> ResolutionStats {
        self.stats
    }

    fn start_pass(&mut self) {
        self.stats.passes += 1;
        self.pass_lemmas = 0;
        self.pass_loop_prunes = 0;
        self.pass_depth_prunes = 0;
        tracing::trace!(goal = %self.goal, depth_limit = self.depth_limit, "starting pass");
        self.stack.push(Node::root(&self.goal));
    }

    /// Decide whether a finished pass is followed by another one.
    fn next_pass(&mut self) -> bool {
        if self.pass_depth_prunes > 0 && self.depth_limit < self.config.max_depth {
            self.depth_limit = self
                .depth_limit
                .saturating_mul(2)
                .clamp(1, self.config.max_depth);
            return true;
        }
        // Lemmas can only help goals that were cut.
        (self.pass_loop_prunes > 0 || self.pass_depth_prunes > 0) && self.pass_lemmas > 0
    }

    /// Work through `node` until it yields an answer or branches.
    fn step(&mut self, node: Node) -> Option<Substitution> {
        let Node {
            mut pending,
            subst,
        } = node;
        loop {
            match pending.pop() {
                None => return Some(subst),
                Some(Pending::Proven(head)) => self.record_lemma(subst.apply(&head)),
                Some(Pending::Goal {
                    fact,
                    ancestry,
                    depth,
                }) => {
                    self.expand(&fact, ancestry, depth, pending, subst);
                    return None;
                }
            }
        }
    }

    fn expand(
        &mut self,
        fact: &Fact,
        ancestry: Option<Rc<Ancestry>>,
        depth: usize,
        rest: Vec<Pending>,
        subst: Substitution,
    ) {
        if self.stats.steps >= self.config.max_steps {
            self.stats.budget_exhausted = true;
            tracing::warn!(
                goal = %self.goal,
                max_steps = self.config.max_steps,
                "resolution step budget exhausted"
            );
            self.stack.clear();
            self.done = true;
            return;
        }
        self.stats.steps += 1;

        let current = subst.apply(fact);
        if depth > self.depth_limit {
            self.stats.depth_prunes += 1;
            self.pass_depth_prunes += 1;
            tracing::trace!(goal = %current, depth, "goal exceeds max depth");
            return;
        }
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);
        tracing::trace!(goal = %current, depth, "expanding goal");

        let kb = self.kb;
        let mut children = Vec::new();

        // Direct facts first: stored facts, then lemmas from this search.
        let ground = current.is_ground();
        let mut proven_directly = false;
        if ground {
            if kb.contains_fact(&current) || self.lemmas.contains(&current) {
                proven_directly = true;
                children.push(Node {
                    pending: rest.clone(),
                    subst: subst.clone(),
                });
            }
        } else {
            let derived = self
                .lemmas_by_predicate
                .get(current.predicate())
                .into_iter()
                .flatten();
            for candidate in kb.facts_for(current.predicate()).iter().chain(derived) {
                if let Ok(extended) = unify_with(&current, candidate, &subst) {
                    children.push(Node {
                        pending: rest.clone(),
                        subst: extended,
                    });
                }
            }
        }

        // A ground goal found directly gains nothing from rules: any rule
        // proof would bind nothing new.
        let key = current.variant_key();
        if in_progress(ancestry.as_ref(), &key) {
            self.stats.loop_prunes += 1;
            self.pass_loop_prunes += 1;
            tracing::trace!(goal = %current, "goal already in progress; rules skipped");
        } else if !proven_directly {
            let ancestry = Some(Rc::new(Ancestry {
                key,
                parent: ancestry,
            }));
            for rule in kb.rules_for(current.predicate()) {
                // Scope 0 belongs to caller variables.
                self.next_scope += 1;
                let renamed = rule.rename_apart(self.next_scope);
                let Ok(extended) = unify_with(&current, renamed.head(), &subst) else {
                    continue;
                };
                let mut pending = rest.clone();
                pending.push(Pending::Proven(renamed.head().clone()));
                for literal in renamed.body().iter().rev() {
                    pending.push(Pending::Goal {
                        fact: literal.clone(),
                        ancestry: ancestry.clone(),
                        depth: depth + 1,
                    });
                }
                children.push(Node {
                    pending,
                    subst: extended,
                });
            }
        }

        // Reverse so the first alternative is popped first.
        self.stack.extend(children.into_iter().rev());
    }

    fn record_lemma(&mut self, fact: Fact) {
        if !fact.is_ground() || self.kb.contains_fact(&fact) || self.lemmas.contains(&fact) {
            return;
        }
        self.lemmas_by_predicate
            .entry(fact.predicate().clone())
            .or_default()
            .push(fact.clone());
        self.lemmas.insert(fact);
        self.pass_lemmas += 1;
        self.stats.lemmas += 1;
    }
}

impl Iterator for Solutions<'_> {
    type Item = Substitution;

    fn next(&mut self) -> Option<Substitution> {
        while !self.done {
            let Some(node) = self.stack.pop() else {
                if self.next_pass() {
                    self.start_pass();
                    continue;
                }
                self.done = true;
                break;
            };
            if let Some(subst) = self.step(node) {
                let answer = subst.restrict(self.query_vars.iter());
                if self.seen.insert(answer.clone()) {
                    return Some(answer);
                }
            }
        }
        None
    }
}
