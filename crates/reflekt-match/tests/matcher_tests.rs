mod common;

use common::{definition, param, registry};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use reflekt_core::config::MatcherConfig;
use reflekt_core::error::Result;
use reflekt_core::Ty;
use reflekt_match::{MatchContext, MatchRule, MatcherEvent, TypeMatchCandidate, TypeMatcher};
use std::sync::Arc;

const CACHED: MatcherConfig = MatcherConfig { cache: true };

fn sprite() -> Ty {
    Ty::named("Sprite")
}

fn matcher() -> TypeMatcher {
    TypeMatcher::with_config(registry(), CACHED)
}

fn resolved(matcher: &TypeMatcher, targets: &[Ty]) -> Vec<String> {
    matcher
        .get_matches(targets)
        .iter()
        .map(|result| result.resolved.to_string())
        .collect()
}

/// Accepts any closed candidate; used to produce a second result per candidate.
struct AnyClosedRule;

impl MatchRule for AnyClosedRule {
    fn name(&self) -> &'static str {
        "any-closed"
    }

    fn can_match(
        &self,
        _ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        _targets: &[Ty],
    ) -> bool {
        !candidate.is_open()
    }

    fn do_match(
        &self,
        _ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        _targets: &[Ty],
    ) -> Result<Ty> {
        Ok(candidate.source.clone())
    }
}

#[test]
fn higher_priority_comes_first_and_results_are_stable() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 1);
    matcher.register(Ty::named("FallbackRenderer"), vec![sprite()], 5);

    let first = matcher.get_matches(&[sprite()]);
    assert_eq!(
        resolved(&matcher, &[sprite()]),
        vec!["FallbackRenderer", "SpriteRenderer"]
    );
    let again = matcher.get_matches(&[sprite()]);
    assert!(Arc::ptr_eq(&first, &again));
    let rules = first.iter().map(|r| r.rule).collect::<Vec<_>>();
    assert_eq!(rules, vec!["exact", "exact"]);
    assert_eq!(
        matcher.best_match(&[sprite()]).map(|r| r.resolved),
        Some(Ty::named("FallbackRenderer"))
    );
}

#[test]
fn equal_priorities_keep_registration_order() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    matcher.register(Ty::named("FallbackRenderer"), vec![sprite()], 0);
    assert_eq!(
        resolved(&matcher, &[sprite()]),
        vec!["SpriteRenderer", "FallbackRenderer"]
    );
}

#[test]
fn arity_must_match_the_targets() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    assert!(matcher.get_matches(&[sprite(), sprite()]).is_empty());
    assert!(matcher.get_matches(&[Ty::int()]).is_empty());
}

#[test]
fn infers_the_element_type_of_an_enumerable_parameter() {
    let registry = registry();
    let matcher = TypeMatcher::with_config(registry.clone(), CACHED);
    let wrapper = definition(&registry, "Wrapper");
    matcher.register(wrapper, vec![param("Wrapper", 0, "T1")], 0);

    let results = matcher.get_matches(&[Ty::list(Ty::string())]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule, "generic-constraint");
    assert_eq!(
        results[0].resolved,
        Ty::generic("Wrapper", [Ty::list(Ty::string()), Ty::string()])
    );
    assert_eq!(results[0].targets, vec![Ty::list(Ty::string())]);

    assert!(matcher.get_matches(&[Ty::int()]).is_empty());
}

#[test]
fn concrete_slots_must_equal_their_targets() {
    let registry = registry();
    let matcher = TypeMatcher::with_config(registry.clone(), CACHED);
    let wrapper = definition(&registry, "Wrapper");
    matcher.register(wrapper, vec![param("Wrapper", 0, "T1"), sprite()], 0);
    assert_eq!(
        resolved(&matcher, &[Ty::array(Ty::int()), sprite()]),
        vec!["Wrapper<int[], int>"]
    );
    assert!(matcher.get_matches(&[Ty::array(Ty::int()), Ty::int()]).is_empty());
}

#[test]
fn decomposes_nested_shapes_through_supertypes() {
    let registry = registry();
    let matcher = TypeMatcher::with_config(registry.clone(), CACHED);
    let boxed = definition(&registry, "Box");
    let t = param("Box", 0, "T");
    matcher.register(boxed.clone(), vec![Ty::list(t.clone())], 0);
    matcher.register(boxed, vec![Ty::array(t)], 0);

    let bag = matcher.get_matches(&[Ty::generic("Bag", [Ty::int()])]);
    assert_eq!(bag.len(), 1);
    assert_eq!(bag[0].rule, "nested-decomposition");
    assert_eq!(bag[0].resolved, Ty::generic("Box", [Ty::int()]));

    assert_eq!(
        resolved(&matcher, &[Ty::array(Ty::string())]),
        vec!["Box<string>"]
    );
    assert!(matcher.get_matches(&[Ty::string()]).is_empty());
}

#[test]
fn cyclic_candidates_never_match() {
    let registry = registry();
    let matcher = TypeMatcher::with_config(registry.clone(), CACHED);
    let cycle = definition(&registry, "Cycle");
    matcher.register(cycle, vec![param("Cycle", 0, "A")], 0);
    assert!(matcher.get_matches(&[Ty::list(Ty::int())]).is_empty());
}

#[test]
fn registering_invalidates_cached_matches() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    let before = matcher.get_matches(&[sprite()]);
    assert_eq!(before.len(), 1);
    assert_eq!(matcher.cached_tuples(), 1);

    let late = matcher.register(Ty::named("FallbackRenderer"), vec![sprite()], 9);
    assert_eq!(matcher.cached_tuples(), 0);
    let after = matcher.get_matches(&[sprite()]);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].candidate.id, late);

    assert!(matcher.unregister(late));
    assert!(!matcher.unregister(late));
    assert_eq!(matcher.get_matches(&[sprite()]).len(), 1);
    assert_eq!(matcher.candidates().len(), 1);
}

#[test]
fn rules_can_be_added_and_removed() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    matcher.add_rule(Arc::new(AnyClosedRule));
    assert_eq!(
        matcher.rule_names(),
        vec!["exact", "generic-constraint", "nested-decomposition", "any-closed"]
    );

    let both = matcher.get_matches(&[sprite()]);
    assert_eq!(
        both.iter().map(|r| r.rule).collect::<Vec<_>>(),
        vec!["exact", "any-closed"]
    );
    let merged = matcher.merge(&[both.clone()]);
    assert_eq!(merged.len(), 1);

    assert!(matcher.remove_rule("exact"));
    assert!(!matcher.remove_rule("exact"));
    assert_eq!(
        matcher
            .get_matches(&[sprite()])
            .iter()
            .map(|r| r.rule)
            .collect::<Vec<_>>(),
        vec!["any-closed"]
    );
}

#[test]
fn merge_orders_dedups_and_caches() {
    let matcher = matcher();
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 1);
    matcher.register(Ty::named("FallbackRenderer"), vec![Ty::int()], 4);
    let sprites = matcher.get_matches(&[sprite()]);
    let ints = matcher.get_matches(&[Ty::int()]);

    let merged = matcher.merge(&[sprites.clone(), ints.clone(), sprites.clone()]);
    assert_eq!(
        merged
            .iter()
            .map(|r| r.resolved.to_string())
            .collect::<Vec<_>>(),
        vec!["FallbackRenderer", "SpriteRenderer"]
    );
    let again = matcher.merge(&[sprites.clone(), ints.clone(), sprites.clone()]);
    assert!(Arc::ptr_eq(&merged, &again));

    matcher.register(Ty::named("SpriteRenderer"), vec![Ty::bool()], 0);
    let fresh = matcher.merge(&[sprites.clone(), ints, sprites]);
    assert!(!Arc::ptr_eq(&merged, &fresh));
    assert_eq!(fresh.len(), 2);
}

#[test]
fn subscribers_observe_changes() {
    let matcher = matcher();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = matcher.subscribe(move |event| sink.lock().push(event.clone()));

    let id = matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    matcher.unregister(id);
    assert!(matcher.unsubscribe(subscription));
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);

    assert_eq!(
        *seen.lock(),
        vec![
            MatcherEvent::CandidateRegistered(id),
            MatcherEvent::CandidateUnregistered(id),
        ]
    );
}

#[test]
fn caching_can_be_disabled() {
    let matcher = TypeMatcher::with_config(registry(), MatcherConfig { cache: false });
    matcher.register(Ty::named("SpriteRenderer"), vec![sprite()], 0);
    assert_eq!(matcher.get_matches(&[sprite()]).len(), 1);
    assert_eq!(matcher.cached_tuples(), 0);
}
