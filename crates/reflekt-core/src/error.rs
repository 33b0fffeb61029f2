use miette::Diagnostic;
use std::result;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parse error in `{path}`: {message}")]
    #[diagnostic(code(reflekt::parse))]
    Parse { path: String, message: String },

    #[error("member `{member}` not found on `{ty}`")]
    #[diagnostic(code(reflekt::member_not_found))]
    MemberNotFound { ty: String, member: String },

    #[error("`{path}` is not writable: {reason}")]
    #[diagnostic(code(reflekt::not_writable))]
    NotWritable { path: String, reason: String },

    #[error("no overload of `{method}` accepts the supplied arguments: {reason}")]
    #[diagnostic(code(reflekt::overload_mismatch))]
    OverloadMismatch {
        method: String,
        /// First argument position that no overload of the right arity accepts.
        index: Option<usize>,
        reason: String,
    },

    #[error("cannot resolve type `{name}`: {reason}")]
    #[diagnostic(code(reflekt::type_resolution))]
    TypeResolution { name: String, reason: String },

    #[error("`{ty}` does not satisfy the constraints of `{param}`: {reason}")]
    #[diagnostic(code(reflekt::constraint_unsatisfied))]
    ConstraintUnsatisfied {
        param: String,
        ty: String,
        reason: String,
    },

    #[error("cannot infer {} for `{ty}`", .missing.join(", "))]
    #[diagnostic(code(reflekt::inference_incomplete))]
    InferenceIncomplete { ty: String, missing: Vec<String> },

    #[error("generic parameters of `{ty}` depend on each other cyclically: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(reflekt::cyclic_dependency),
        help("break the cycle by removing one of the constraints")
    )]
    CyclicDependency { ty: String, cycle: Vec<String> },

    #[error("null reference while reading `{segment}`")]
    #[diagnostic(code(reflekt::null_reference))]
    NullReference { segment: String },

    #[error("index {index} is out of range for length {len}")]
    #[diagnostic(code(reflekt::index_out_of_range))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(reflekt::type_mismatch))]
    TypeMismatch { expected: String, found: String },

    #[error("invalid expression `{source_text}`: {message}")]
    #[diagnostic(code(reflekt::invalid_expression))]
    InvalidExpression {
        source_text: String,
        message: String,
    },

    #[error("Generic error: {0}")]
    #[diagnostic(code(reflekt::generic))]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn member_not_found(ty: impl ToString, member: impl Into<String>) -> Self {
        Error::MemberNotFound {
            ty: ty.to_string(),
            member: member.into(),
        }
    }

    pub fn not_writable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::NotWritable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn type_resolution(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::TypeResolution {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// Convert from eyre::Report so host accessors written against eyre can use `?`
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
