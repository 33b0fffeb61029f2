use crate::candidate::TypeMatchCandidate;
use crate::open_generic::OpenGenericTypeAnalyzer;
use crate::rules::{own_param_position, solve, MatchContext, MatchRule};
use reflekt_core::error::{Error, Result};
use reflekt_core::Ty;

/// Open candidates whose slots are either concrete types, compared exactly,
/// or bare generic parameters of the candidate, bound to their targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericConstraintRule;

impl MatchRule for GenericConstraintRule {
    fn name(&self) -> &'static str {
        "generic-constraint"
    }

    fn can_match(
        &self,
        _ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> bool {
        candidate.is_open()
            && candidate
                .constraints
                .iter()
                .zip(targets)
                .all(|(slot, target)| {
                    own_param_position(&candidate.source, slot).is_some()
                        || (!slot.is_open() && slot == target)
                })
    }

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> Result<Ty> {
        let mut analyzer = OpenGenericTypeAnalyzer::new(ctx.types, &candidate.source)?;
        for (slot, target) in candidate.constraints.iter().zip(targets) {
            let Some(position) = own_param_position(&candidate.source, slot) else {
                continue;
            };
            let bound = analyzer.arguments().get(position).cloned().flatten();
            match bound {
                Some(bound) if &bound == target => {}
                Some(bound) => return Err(Error::type_mismatch(bound, target)),
                None => analyzer = analyzer.with_argument(position, target.clone())?,
            }
        }
        solve(&analyzer)
    }
}
