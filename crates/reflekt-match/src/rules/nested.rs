use crate::candidate::TypeMatchCandidate;
use crate::open_generic::OpenGenericTypeAnalyzer;
use crate::rules::{own_param_position, solve, MatchContext, MatchRule};
use reflekt_core::error::{Error, Result};
use reflekt_core::unify::{Bindings, Unifier};
use reflekt_core::Ty;

/// A single open slot shaped like `Shape<.., T, ..>` or `T[]`, decomposed
/// against a concrete target (or one of its supertypes) to bind the
/// parameters nested inside.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedDecompositionRule;

impl MatchRule for NestedDecompositionRule {
    fn name(&self) -> &'static str {
        "nested-decomposition"
    }

    fn can_match(
        &self,
        _ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> bool {
        let ([slot], [target]) = (candidate.constraints.as_slice(), targets) else {
            return false;
        };
        candidate.is_open()
            && slot.is_open()
            && own_param_position(&candidate.source, slot).is_none()
            && !matches!(slot, Ty::Param(_))
            && !target.is_open()
    }

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> Result<Ty> {
        let ([slot], [target]) = (candidate.constraints.as_slice(), targets) else {
            return Err(Error::Generic(format!(
                "{} decomposes exactly one target",
                self.name()
            )));
        };
        let mut bindings = Bindings::new();
        if !Unifier::new(ctx.types).unify_assignable(slot, target, &mut bindings) {
            return Err(Error::type_mismatch(slot, target));
        }

        let mut analyzer = OpenGenericTypeAnalyzer::new(ctx.types, &candidate.source)?;
        let owner = analyzer.definition().name.clone();
        for (param, ty) in bindings {
            let open = analyzer
                .arguments()
                .get(param.index)
                .is_some_and(Option::is_none);
            if param.owner == owner && open {
                analyzer = analyzer.with_argument(param.index, ty)?;
            }
        }
        solve(&analyzer)
    }
}
