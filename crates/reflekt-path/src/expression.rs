//! Text that is either shown as-is or resolved against a context value.
//!
//! Dynamic expressions are resolved lazily on the first `evaluate` or error
//! query; the outcome, including a failure message, is kept for later calls.

use crate::compiler::{Getter, Invoker, PathCompiler};
use crate::directive::Directive;
use crate::parser::{parse_segment, split_segments};
use reflekt_core::config::ExpressionConfig;
use reflekt_core::error::{Error, Result};
use reflekt_core::{Ty, Value};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

pub const DYNAMIC_SENTINEL: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionMode {
    Literal,
    Dynamic,
}

enum Resolved {
    Getter(Getter),
    Call { invoker: Invoker, args: Vec<Value> },
    /// No root type was known; compiled per context type on evaluation.
    Deferred { path: String },
}

pub struct Expression {
    text: String,
    mode: ExpressionMode,
    source: String,
    root: Option<Ty>,
    compiler: Option<Arc<PathCompiler>>,
    resolved: OnceLock<std::result::Result<Resolved, String>>,
}

impl Expression {
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            source: text.clone(),
            text,
            mode: ExpressionMode::Literal,
            root: None,
            compiler: None,
            resolved: OnceLock::new(),
        }
    }

    /// With flag gating on, only text starting with `@` is dynamic. Without
    /// it every expression is dynamic and a leading `@` is dropped.
    pub fn new(
        compiler: Arc<PathCompiler>,
        text: impl Into<String>,
        root: Option<Ty>,
        config: ExpressionConfig,
    ) -> Self {
        let text = text.into();
        let stripped = text.trim_start().strip_prefix(DYNAMIC_SENTINEL);
        let (mode, source) = match (config.flag_gating, stripped) {
            (true, None) => (ExpressionMode::Literal, text.clone()),
            (_, Some(rest)) => (ExpressionMode::Dynamic, rest.to_string()),
            (false, None) => (ExpressionMode::Dynamic, text.clone()),
        };
        Self {
            text,
            mode,
            source,
            root,
            compiler: Some(compiler),
            resolved: OnceLock::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> ExpressionMode {
        self.mode
    }

    pub fn is_literal(&self) -> bool {
        self.mode == ExpressionMode::Literal
    }

    pub fn evaluate(&self, context: &Value) -> Result<Value> {
        let Some(compiler) = self.dynamic_compiler() else {
            return Ok(Value::String(self.text.clone()));
        };
        let resolved = self
            .resolution(compiler)
            .as_ref()
            .map_err(|message| Error::InvalidExpression {
                source_text: self.text.clone(),
                message: message.clone(),
            })?;
        match resolved {
            Resolved::Getter(getter) => getter.get(context),
            Resolved::Call { invoker, args } => invoker.invoke(context, args),
            Resolved::Deferred { path } => {
                let root = context.type_of();
                match resolve_path(compiler, &root, path, false)? {
                    Resolved::Getter(getter) => getter.get(context),
                    Resolved::Call { invoker, args } => invoker.invoke(context, &args),
                    Resolved::Deferred { .. } => Err(Error::InvalidExpression {
                        source_text: self.text.clone(),
                        message: "expression could not be resolved".into(),
                    }),
                }
            }
        }
    }

    /// The cached resolution failure, resolving first if needed.
    pub fn try_get_error(&self) -> Option<&str> {
        let compiler = self.dynamic_compiler()?;
        self.resolution(compiler).as_ref().err().map(String::as_str)
    }

    pub fn has_error(&self) -> bool {
        self.try_get_error().is_some()
    }

    fn dynamic_compiler(&self) -> Option<&PathCompiler> {
        match self.mode {
            ExpressionMode::Literal => None,
            ExpressionMode::Dynamic => self.compiler.as_deref(),
        }
    }

    fn resolution(&self, compiler: &PathCompiler) -> &std::result::Result<Resolved, String> {
        self.resolved.get_or_init(|| {
            self.resolve(compiler).map_err(|err| {
                reflekt_core::debug!("expression `{}` is invalid: {}", self.text, err);
                err.to_string()
            })
        })
    }

    fn resolve(&self, compiler: &PathCompiler) -> Result<Resolved> {
        match Directive::parse(&self.source)? {
            Directive::Static { type_name, path } => {
                let root = compiler.types().resolve_type_name(&type_name)?;
                resolve_path(compiler, &root, &path, true)
            }
            Directive::Instance { path } => match &self.root {
                Some(root) => resolve_path(compiler, root, &path, false),
                None => {
                    for raw in split_segments(&path)? {
                        parse_segment(&path, raw)?;
                    }
                    Ok(Resolved::Deferred { path })
                }
            },
        }
    }
}

/// A trailing segment with an argument list becomes a call through an
/// invoker; anything else is read through a getter.
fn resolve_path(
    compiler: &PathCompiler,
    root: &Ty,
    path: &str,
    is_static: bool,
) -> Result<Resolved> {
    let segments = split_segments(path)?;
    let Some(last_raw) = segments.last() else {
        return Err(Error::parse(path, "path is empty"));
    };
    let last = parse_segment(path, last_raw)?;
    match last.args {
        Some(args) if last.indices.is_empty() => {
            let prefix = &path[..path.len() - last_raw.len()];
            let target = format!("{}{}", prefix, last.name);
            let arg_types: Vec<Ty> = args.iter().map(Value::type_of).collect();
            let invoker = if is_static {
                compiler.static_invoker(root, &target, &arg_types)?
            } else {
                compiler.invoker(root, &target, &arg_types)?
            };
            Ok(Resolved::Call { invoker, args })
        }
        _ => {
            let getter = if is_static {
                compiler.static_getter(root, path)?
            } else {
                compiler.getter(root, path)?
            };
            Ok(Resolved::Getter(getter))
        }
    }
}

impl Debug for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expression")
            .field("text", &self.text)
            .field("mode", &self.mode)
            .field("root", &self.root)
            .field("resolved", &self.resolved.get().map(|r| r.is_ok()))
            .finish()
    }
}
