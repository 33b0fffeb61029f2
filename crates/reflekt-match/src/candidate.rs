use derive_more::Display;
use itertools::Itertools;
use reflekt_core::Ty;
use std::fmt::{self, Formatter};
use std::sync::Arc;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("candidate#{_0}")]
pub struct CandidateId(pub(crate) u64);

/// A type offered for matching. `constraints` has one slot per target and may
/// mention the generic parameters of `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMatchCandidate {
    pub id: CandidateId,
    pub source: Ty,
    pub constraints: Vec<Ty>,
    pub priority: i32,
}

impl TypeMatchCandidate {
    pub fn arity(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_open(&self) -> bool {
        self.source.is_open()
    }
}

impl fmt::Display for TypeMatchCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for ({}) @{}",
            self.source,
            self.constraints.iter().join(", "),
            self.priority
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMatchResult {
    pub candidate: Arc<TypeMatchCandidate>,
    pub resolved: Ty,
    pub targets: Vec<Ty>,
    pub rule: &'static str,
}

impl TypeMatchResult {
    pub fn priority(&self) -> i32 {
        self.candidate.priority
    }
}
