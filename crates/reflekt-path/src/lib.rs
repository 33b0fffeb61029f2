pub mod compiler;
pub mod directive;
pub mod expression;
pub mod literal;
mod overload;
pub mod parser;
pub mod step;

pub use compiler::{Getter, Invoker, PathCompiler, Setter};
pub use directive::Directive;
pub use expression::{Expression, ExpressionMode};
pub use overload::select_overload;
pub use step::{CompiledPath, MemberRef, PathStep};
