//! Pluggable matching rules. Each rule decides cheaply whether it applies to
//! a candidate and then constructs the concrete type.

mod exact;
mod generic;
mod nested;

pub use exact::ExactMatchRule;
pub use generic::GenericConstraintRule;
pub use nested::NestedDecompositionRule;

use crate::candidate::TypeMatchCandidate;
use crate::open_generic::OpenGenericTypeAnalyzer;
use reflekt_core::error::Result;
use reflekt_core::registry::TypeSystem;
use reflekt_core::Ty;
use std::sync::Arc;

pub struct MatchContext<'a> {
    pub types: &'a dyn TypeSystem,
}

pub trait MatchRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_match(
        &self,
        ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> bool;

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        candidate: &TypeMatchCandidate,
        targets: &[Ty],
    ) -> Result<Ty>;
}

pub fn default_rules() -> Vec<Arc<dyn MatchRule>> {
    vec![
        Arc::new(ExactMatchRule),
        Arc::new(GenericConstraintRule),
        Arc::new(NestedDecompositionRule),
    ]
}

/// Position of `slot` when it is a bare parameter of the candidate's own
/// definition.
fn own_param_position(source: &Ty, slot: &Ty) -> Option<usize> {
    let owner = source.definition_name()?;
    slot.as_param()
        .filter(|param| param.owner == owner)
        .map(|param| param.index)
}

/// Infers whatever the substituted arguments imply, then closes and verifies.
fn solve(analyzer: &OpenGenericTypeAnalyzer<'_>) -> Result<Ty> {
    let outcome = analyzer.try_infer_type_arguments();
    let resolved = analyzer.close(&outcome.arguments)?;
    let arguments: Vec<Ty> = outcome.arguments.into_iter().flatten().collect();
    analyzer.verify(&arguments)?;
    Ok(resolved)
}
