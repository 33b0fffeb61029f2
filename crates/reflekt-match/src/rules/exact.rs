use crate::candidate::TypeMatchCandidate;
use crate::rules::{MatchContext, MatchRule};
use reflekt_core::error::Result;
use reflekt_core::Ty;

/// Closed candidates whose constraints equal the targets one for one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchRule;

impl MatchRule for ExactMatchRule {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn can_match(
        &self,
        _ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> bool {
        !candidate.is_open() && candidate.constraints == targets
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
