use crate::candidate::{CandidateId, TypeMatchCandidate, TypeMatchResult};
use crate::rules::{default_rules, MatchContext, MatchRule};
use itertools::Itertools;
use parking_lot::RwLock;
use reflekt_core::collections::{ConcurrentMap, SubscriptionId, Subscribers};
use reflekt_core::config::MatcherConfig;
use reflekt_core::registry::TypeSystem;
use reflekt_core::Ty;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type MatchResults = Arc<[TypeMatchResult]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherEvent {
    CandidateRegistered(CandidateId),
    CandidateUnregistered(CandidateId),
    RuleAdded(&'static str),
    RuleRemoved(&'static str),
}

#[derive(Default)]
struct MatcherState {
    rules: Vec<Arc<dyn MatchRule>>,
    candidates: Vec<Arc<TypeMatchCandidate>>,
}

#[derive(Clone)]
struct CachedMatches {
    epoch: u64,
    results: MatchResults,
}

/// Keyed by the addresses of the merged arrays; the inputs are kept so the
/// addresses stay unique while the entry lives.
#[derive(Clone)]
struct CachedMerge {
    epoch: u64,
    inputs: Vec<MatchResults>,
    merged: MatchResults,
}

/// Candidate registry plus rule engine. Results for a target tuple are
/// cached until the next candidate or rule change.
pub struct TypeMatcher {
    types: Arc<dyn TypeSystem>,
    config: MatcherConfig,
    state: RwLock<MatcherState>,
    next_id: AtomicU64,
    epoch: AtomicU64,
    matches: ConcurrentMap<Vec<Ty>, CachedMatches>,
    merges: ConcurrentMap<Vec<usize>, CachedMerge>,
    subscribers: Subscribers<MatcherEvent>,
}

impl TypeMatcher {
    /// A matcher with the exact, generic-constraint and nested-decomposition
    /// rules, in that order.
    pub fn new(types: Arc<dyn TypeSystem>) -> Self {
        Self::with_config(types, MatcherConfig::default())
    }

    pub fn with_config(types: Arc<dyn TypeSystem>, config: MatcherConfig) -> Self {
        let matcher = Self::without_rules(types, config);
        matcher.state.write().rules = default_rules();
        matcher
    }

    pub fn without_rules(types: Arc<dyn TypeSystem>, config: MatcherConfig) -> Self {
        Self {
            types,
            config,
            state: RwLock::new(MatcherState::default()),
            next_id: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            matches: ConcurrentMap::new(),
            merges: ConcurrentMap::new(),
            subscribers: Subscribers::new(),
        }
    }

    pub fn types(&self) -> &dyn TypeSystem {
        self.types.as_ref()
    }

    pub fn register(&self, source: Ty, constraints: Vec<Ty>, priority: i32) -> CandidateId {
        let id = CandidateId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let candidate = Arc::new(TypeMatchCandidate {
            id,
            source,
            constraints,
            priority,
        });
        reflekt_core::debug!("registering {} as {}", candidate, id);
        self.mutate(MatcherEvent::CandidateRegistered(id), |state| {
            state.candidates.push(candidate);
            true
        });
        id
    }

    pub fn unregister(&self, id: CandidateId) -> bool {
        self.mutate(MatcherEvent::CandidateUnregistered(id), |state| {
            let before = state.candidates.len();
            state.candidates.retain(|candidate| candidate.id != id);
            state.candidates.len() != before
        })
    }

    /// Rules are tried in the order they were added.
    pub fn add_rule(&self, rule: Arc<dyn MatchRule>) {
        let name = rule.name();
        self.mutate(MatcherEvent::RuleAdded(name), |state| {
            state.rules.push(rule);
            true
        });
    }

    pub fn remove_rule(&self, name: &str) -> bool {
        let Some(removed) = self
            .state
            .read()
            .rules
            .iter()
            .find(|rule| rule.name() == name)
            .map(|rule| rule.name())
        else {
            return false;
        };
        self.mutate(MatcherEvent::RuleRemoved(removed), |state| {
            let before = state.rules.len();
            state.rules.retain(|rule| rule.name() != name);
            state.rules.len() != before
        })
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.state.read().rules.iter().map(|rule| rule.name()).collect()
    }

    /// Registered candidates in registration order.
    pub fn candidates(&self) -> Vec<Arc<TypeMatchCandidate>> {
        self.state.read().candidates.clone()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&MatcherEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Every (candidate, rule) pair that matches `targets`, highest priority
    /// first; equal priorities keep rule order, then registration order.
    pub fn get_matches(&self, targets: &[Ty]) -> MatchResults {
        if !self.config.cache {
            return self.compute(targets).1;
        }
        let current = self.epoch.load(Ordering::Acquire);
        if let Some(hit) = self.matches.get_cloned(&targets.to_vec()) {
            if hit.epoch == current {
                return hit.results;
            }
        }
        let (epoch, results) = self.compute(targets);
        if epoch == self.epoch.load(Ordering::Acquire) {
            self.matches.insert(
                targets.to_vec(),
                CachedMatches {
                    epoch,
                    results: results.clone(),
                },
            );
        }
        results
    }

    pub fn best_match(&self, targets: &[Ty]) -> Option<TypeMatchResult> {
        self.get_matches(targets).first().cloned()
    }

    /// Concatenates `results`, orders by priority and drops repeated
    /// (candidate, resolved type) pairs, keeping the first.
    pub fn merge(&self, results: &[MatchResults]) -> MatchResults {
        if !self.config.cache {
            return merge_results(results);
        }
        let key = results
            .iter()
            .map(|arr| Arc::as_ptr(arr) as *const TypeMatchResult as usize)
            .collect_vec();
        let current = self.epoch.load(Ordering::Acquire);
        if let Some(hit) = self.merges.get_cloned(&key) {
            let same_inputs = hit.inputs.len() == results.len()
                && hit.inputs.iter().zip(results).all(|(a, b)| Arc::ptr_eq(a, b));
            if hit.epoch == current && same_inputs {
                return hit.merged;
            }
        }
        let merged = merge_results(results);
        if current == self.epoch.load(Ordering::Acquire) {
            self.merges.insert(
                key,
                CachedMerge {
                    epoch: current,
                    inputs: results.to_vec(),
                    merged: merged.clone(),
                },
            );
        }
        merged
    }

    pub fn cached_tuples(&self) -> usize {
        self.matches.len()
    }

    fn compute(&self, targets: &[Ty]) -> (u64, MatchResults) {
        let state = self.state.read();
        let epoch = self.epoch.load(Ordering::Acquire);
        let ctx = MatchContext {
            types: self.types.as_ref(),
        };
        let mut results = Vec::new();
        for rule in &state.rules {
            for candidate in state
                .candidates
                .iter()
                .filter(|candidate| candidate.arity() == targets.len())
            {
                if !rule.can_match(&ctx, candidate, targets) {
                    continue;
                }
                match rule.do_match(&ctx, candidate, targets) {
                    Ok(resolved) => results.push(TypeMatchResult {
                        candidate: candidate.clone(),
                        resolved,
                        targets: targets.to_vec(),
                        rule: rule.name(),
                    }),
                    Err(err) => reflekt_core::debug!(
                        "rule `{}` rejected {}: {}",
                        rule.name(),
                        candidate,
                        err
                    ),
                }
            }
        }
        results.sort_by_key(|result| Reverse(result.priority()));
        reflekt_core::trace!(
            "({}) matched {} result(s)",
            targets.iter().join(", "),
            results.len()
        );
        (epoch, results.into())
    }

    /// Applies a state change under the write lock, then invalidates caches
    /// and notifies subscribers if anything changed.
    fn mutate(&self, event: MatcherEvent, change: impl FnOnce(&mut MatcherState) -> bool) -> bool {
        let changed = {
            let mut state = self.state.write();
            let changed = change(&mut state);
            if changed {
                self.epoch.fetch_add(1, Ordering::AcqRel);
                self.matches.clear();
                self.merges.clear();
            }
            changed
        };
        if changed {
            reflekt_core::debug!("match caches invalidated by {:?}", event);
            self.subscribers.notify(&event);
        }
        changed
    }
}

fn merge_results(results: &[MatchResults]) -> MatchResults {
    results
        .iter()
        .flat_map(|arr| arr.iter().cloned())
        .sorted_by_key(|result| Reverse(result.priority()))
        .unique_by(|result| (result.candidate.id, result.resolved.clone()))
        .collect()
}
