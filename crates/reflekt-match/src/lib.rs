pub mod candidate;
pub mod graph;
pub mod matcher;
pub mod open_generic;
pub mod param;
pub mod rules;

pub use candidate::{CandidateId, TypeMatchCandidate, TypeMatchResult};
pub use matcher::{MatchResults, MatcherEvent, TypeMatcher};
pub use open_generic::{InferenceOutcome, OpenGenericTypeAnalyzer};
pub use param::{GenericParameterAnalyzer, GenericParameterInfo};
pub use rules::{MatchContext, MatchRule};
