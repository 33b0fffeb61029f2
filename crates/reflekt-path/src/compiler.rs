use crate::overload::select_overload;
use crate::parser::{parse_segment, split_segments, PathParser};
use crate::step::CompiledPath;
use reflekt_core::collections::ConcurrentMap;
use reflekt_core::config::ParserConfig;
use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{MemberScope, MethodInfo, TypeSystem};
use reflekt_core::{Ty, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    root: Ty,
    text: String,
    is_static: bool,
}

/// Compiles path text into getters, setters and invokers, caching each
/// compiled path by root type, text and static flag.
pub struct PathCompiler {
    types: Arc<dyn TypeSystem>,
    config: ParserConfig,
    cache: ConcurrentMap<PathKey, Arc<CompiledPath>>,
}

impl PathCompiler {
    pub fn new(types: Arc<dyn TypeSystem>) -> Self {
        Self::with_config(types, ParserConfig::default())
    }

    pub fn with_config(types: Arc<dyn TypeSystem>, config: ParserConfig) -> Self {
        Self {
            types,
            config,
            cache: ConcurrentMap::new(),
        }
    }

    pub fn types(&self) -> &dyn TypeSystem {
        self.types.as_ref()
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn compile(&self, root: &Ty, text: &str) -> Result<Arc<CompiledPath>> {
        self.compile_with(root, text, false)
    }

    /// Compiles a path whose first segment is a static member of `root`.
    pub fn compile_static(&self, root: &Ty, text: &str) -> Result<Arc<CompiledPath>> {
        self.compile_with(root, text, true)
    }

    fn compile_with(&self, root: &Ty, text: &str, is_static: bool) -> Result<Arc<CompiledPath>> {
        let key = PathKey {
            root: root.clone(),
            text: text.to_string(),
            is_static,
        };
        self.cache.get_or_try_insert_with(key, || {
            reflekt_core::debug!("compiling `{}` against `{}`", text, root);
            PathParser::new(self.types.as_ref(), self.config)
                .parse(root, text, is_static)
                .map(Arc::new)
        })
    }

    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn getter(&self, root: &Ty, text: &str) -> Result<Getter> {
        Ok(Getter::new(self.compile(root, text)?))
    }

    pub fn static_getter(&self, root: &Ty, text: &str) -> Result<Getter> {
        Ok(Getter::new(self.compile_static(root, text)?))
    }

    pub fn setter(&self, root: &Ty, text: &str) -> Result<Setter> {
        Setter::new(self.types.clone(), self.compile(root, text)?)
    }

    pub fn static_setter(&self, root: &Ty, text: &str) -> Result<Setter> {
        Setter::new(self.types.clone(), self.compile_static(root, text)?)
    }

    /// `text` names the method in its last segment; anything before it is
    /// compiled as the path to the receiver.
    pub fn invoker(&self, root: &Ty, text: &str, arg_types: &[Ty]) -> Result<Invoker> {
        self.build_invoker(root, text, arg_types, false)
    }

    pub fn static_invoker(&self, root: &Ty, text: &str, arg_types: &[Ty]) -> Result<Invoker> {
        self.build_invoker(root, text, arg_types, true)
    }

    fn build_invoker(
        &self,
        root: &Ty,
        text: &str,
        arg_types: &[Ty],
        is_static: bool,
    ) -> Result<Invoker> {
        let segments = split_segments(text)?;
        let Some((last, prefix)) = segments.split_last() else {
            return Err(Error::parse(text, "path is empty"));
        };
        let segment = parse_segment(text, last)?;
        if segment.args.is_some() || !segment.indices.is_empty() {
            return Err(Error::parse(
                text,
                format!("invoker target `{}` must be a bare method name", last.trim()),
            ));
        }

        let (target, owner, method_is_static) = if prefix.is_empty() {
            (None, root.clone(), is_static)
        } else {
            let prefix_text = text[..text.len() - last.len() - 1].to_string();
            let path = self.compile_with(root, &prefix_text, is_static)?;
            let owner = path.result_ty();
            (Some(Getter::new(path)), owner, false)
        };

        let scope = if method_is_static {
            MemberScope::STATIC
        } else {
            MemberScope::INSTANCE
        };
        let members = self.types.find_members(&owner, segment.name, scope);
        let method = select_overload(
            self.types.as_ref(),
            &owner,
            segment.name,
            &members,
            arg_types,
        )?;
        Ok(Invoker {
            target,
            method,
            is_static: method_is_static,
            is_static_root: is_static,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Getter {
    path: Arc<CompiledPath>,
}

impl Getter {
    pub fn new(path: Arc<CompiledPath>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    pub fn result_ty(&self) -> Ty {
        self.path.result_ty()
    }

    pub fn get(&self, root: &Value) -> Result<Value> {
        let start = if self.path.is_static {
            Value::Null
        } else {
            root.clone()
        };
        self.path
            .steps
            .iter()
            .try_fold(start, |current, step| step.read(&current))
    }

    pub fn get_static(&self) -> Result<Value> {
        self.get(&Value::Null)
    }
}

pub struct Setter {
    types: Arc<dyn TypeSystem>,
    path: Arc<CompiledPath>,
}

impl Setter {
    pub fn new(types: Arc<dyn TypeSystem>, path: Arc<CompiledPath>) -> Result<Self> {
        let Some((last, ancestors)) = path.steps.split_last() else {
            return Err(Error::not_writable(path.text.clone(), "path has no steps"));
        };
        if !last.is_writable() {
            return Err(Error::not_writable(path.text.clone(), last.read_only_reason()));
        }
        for step in ancestors {
            if types.is_value_type(&step.result_ty()) && !step.propagates_writes() {
                return Err(Error::not_writable(
                    path.text.clone(),
                    format!(
                        "`{}` returns a copy of value type `{}` that cannot be stored back ({})",
                        step,
                        step.result_ty(),
                        step.read_only_reason()
                    ),
                ));
            }
        }
        Ok(Self { types, path })
    }

    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    /// Writes `value` through the path. Value-type owners along the way are
    /// rewritten into their parents in reverse order, up to and including
    /// `root` when the whole chain has value semantics.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<()> {
        self.check_value(&value)?;

        let steps = &self.path.steps;
        let mut owners = Vec::with_capacity(steps.len());
        let mut current = if self.path.is_static {
            Value::Null
        } else {
            root.clone()
        };
        for step in &steps[..steps.len() - 1] {
            let next = step.read(&current)?;
            owners.push(current);
            current = next;
        }
        owners.push(current);

        let mut written = value;
        for (step, owner) in steps.iter().zip(owners).rev() {
            let copied = owner.has_value_semantics();
            written = step.write(owner, written)?;
            if !copied {
                return Ok(());
            }
        }
        if !self.path.is_static {
            *root = written;
        }
        Ok(())
    }

    pub fn set_static(&self, value: Value) -> Result<()> {
        let mut root = Value::Null;
        self.set(&mut root, value)
    }

    fn check_value(&self, value: &Value) -> Result<()> {
        let target = self.path.result_ty();
        let fits = if value.is_null() {
            !self.types.is_value_type(&target)
        } else {
            self.types.is_assignable(&target, &value.type_of())
        };
        if fits {
            Ok(())
        } else {
            Err(Error::type_mismatch(target, value.type_of()))
        }
    }
}

pub struct Invoker {
    target: Option<Getter>,
    method: Arc<MethodInfo>,
    is_static: bool,
    is_static_root: bool,
}

impl Invoker {
    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    pub fn result_ty(&self) -> Ty {
        self.method.ret.clone()
    }

    pub fn invoke(&self, root: &Value, args: &[Value]) -> Result<Value> {
        if args.len() != self.method.arity() {
            return Err(Error::OverloadMismatch {
                method: self.method.signature(),
                index: None,
                reason: format!(
                    "expected {} argument(s), got {}",
                    self.method.arity(),
                    args.len()
                ),
            });
        }
        let receiver = match &self.target {
            Some(target) => target.get(root)?,
            None if self.is_static_root => Value::Null,
            None => root.clone(),
        };
        if !self.is_static && receiver.is_null() {
            return Err(Error::NullReference {
                segment: self.method.name.clone(),
            });
        }
        (self.method.invoke)(&receiver, args)
    }

    pub fn invoke_static(&self, args: &[Value]) -> Result<Value> {
        self.invoke(&Value::Null, args)
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("target", &self.target.as_ref().map(|t| t.path().text.clone()))
            .field("method", &self.method.signature())
            .field("is_static", &self.is_static)
            .finish()
    }
}

impl std::fmt::Debug for Setter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setter").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflekt_core::registry::{TypeDef, TypeRegistry};

    fn compiler() -> PathCompiler {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDef::structure("Point")
                .field("x", Ty::int())
                .field("y", Ty::int()),
        );
        registry.register(TypeDef::structure("Line").field("start", Ty::named("Point")));
        PathCompiler::new(Arc::new(registry))
    }

    #[test]
    fn setter_writes_value_type_root_back() {
        let compiler = compiler();
        let line_ty = Ty::named("Line");
        let mut line = Value::structure(
            line_ty.clone(),
            [(
                "start",
                Value::structure(
                    Ty::named("Point"),
                    [("x", Value::Int(1)), ("y", Value::Int(2))],
                ),
            )],
        );
        let setter = compiler.setter(&line_ty, "start.x").unwrap();
        setter.set(&mut line, Value::Int(7)).unwrap();
        let getter = compiler.getter(&line_ty, "start.x").unwrap();
        assert_eq!(getter.get(&line).unwrap(), Value::Int(7));
        let other = compiler.getter(&line_ty, "start.y").unwrap();
        assert_eq!(other.get(&line).unwrap(), Value::Int(2));
    }

    #[test]
    fn compiled_paths_are_shared() {
        let compiler = compiler();
        let line_ty = Ty::named("Line");
        let first = compiler.compile(&line_ty, "start.x").unwrap();
        let second = compiler.compile(&line_ty, "start.x").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        compiler.compile_static(&Ty::int(), "MaxValue").unwrap_err();
        assert_eq!(compiler.cached_paths(), 1);
    }
}

