use crate::graph::DependencyGraph;
use crate::param::GenericParameterAnalyzer;
use itertools::Itertools;
use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{TypeDef, TypeSystem};
use reflekt_core::unify::Bindings;
use reflekt_core::Ty;
use std::sync::Arc;

/// Best-effort result of [`OpenGenericTypeAnalyzer::try_infer_type_arguments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOutcome {
    pub arguments: Vec<Option<Ty>>,
    /// True when at least one argument was resolved by inference.
    pub inferred_any: bool,
}

impl InferenceOutcome {
    pub fn is_complete(&self) -> bool {
        self.arguments.iter().all(Option::is_some)
    }
}

/// The parameters of one generic type, split into those already substituted
/// and those still open.
pub struct OpenGenericTypeAnalyzer<'a> {
    types: &'a dyn TypeSystem,
    def: Arc<TypeDef>,
    arguments: Vec<Option<Ty>>,
    parameters: Vec<GenericParameterAnalyzer<'a>>,
    graph: DependencyGraph,
}

impl<'a> OpenGenericTypeAnalyzer<'a> {
    /// Arguments that mention none of the definition's own parameters count
    /// as substituted. Cyclic parameter dependencies are rejected.
    pub fn new(types: &'a dyn TypeSystem, ty: &Ty) -> Result<Self> {
        let named = ty
            .as_named()
            .ok_or_else(|| Error::type_resolution(ty.to_string(), "not a named type"))?;
        let def = types
            .type_def(&named.name)
            .ok_or_else(|| Error::type_resolution(ty.to_string(), "unknown type"))?;
        if !named.args.is_empty() && named.args.len() != def.params.len() {
            return Err(Error::type_resolution(
                ty.to_string(),
                format!(
                    "expects {} type argument(s), got {}",
                    def.params.len(),
                    named.args.len()
                ),
            ));
        }

        let arguments = (0..def.params.len())
            .map(|index| {
                named
                    .args
                    .get(index)
                    .filter(|arg| !arg.params().iter().any(|param| param.owner == def.name))
                    .cloned()
            })
            .collect_vec();
        let parameters = (0..def.params.len())
            .map(|index| GenericParameterAnalyzer::new(types, &def, index))
            .collect::<Result<Vec<_>>>()?;

        let mut graph = DependencyGraph::new(parameters.len());
        for param in &parameters {
            for &dependency in &param.info().depends_on {
                graph.add_edge(param.position(), dependency);
            }
        }
        if let Some(cycle) = graph.find_cycle() {
            let cycle = cycle
                .into_iter()
                .map(|index| def.params[index].name.clone())
                .collect_vec();
            reflekt_core::warn!(
                "rejecting `{}`: cyclic parameter dependency {}",
                def.name,
                cycle.join(" -> ")
            );
            return Err(Error::CyclicDependency {
                ty: def.self_ty().to_string(),
                cycle,
            });
        }

        Ok(Self {
            types,
            def,
            arguments,
            parameters,
            graph,
        })
    }

    pub fn definition(&self) -> &TypeDef {
        &self.def
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn arguments(&self) -> &[Option<Ty>] {
        &self.arguments
    }

    pub fn all_parameters(&self) -> &[GenericParameterAnalyzer<'a>] {
        &self.parameters
    }

    pub fn open_parameters(&self) -> Vec<&GenericParameterAnalyzer<'a>> {
        self.parameters
            .iter()
            .zip(&self.arguments)
            .filter(|(_, arg)| arg.is_none())
            .map(|(param, _)| param)
            .collect()
    }

    pub fn substituted_parameters(&self) -> Vec<(&GenericParameterAnalyzer<'a>, &Ty)> {
        self.parameters
            .iter()
            .zip(&self.arguments)
            .filter_map(|(param, arg)| arg.as_ref().map(|arg| (param, arg)))
            .collect()
    }

    /// Substitutes one parameter, checking its constraints against the
    /// arguments known so far.
    pub fn with_argument(mut self, index: usize, ty: Ty) -> Result<Self> {
        let param = self.parameters.get(index).ok_or_else(|| {
            Error::type_resolution(
                self.def.name.clone(),
                format!("no generic parameter at position {}", index),
            )
        })?;
        param.check_constraints(&ty, &self.bindings_for(&self.arguments))?;
        self.arguments[index] = Some(ty);
        Ok(self)
    }

    pub fn bindings(&self) -> Bindings {
        self.bindings_for(&self.arguments)
    }

    fn bindings_for(&self, arguments: &[Option<Ty>]) -> Bindings {
        self.parameters
            .iter()
            .zip(arguments)
            .filter_map(|(param, arg)| arg.clone().map(|arg| (param.param().clone(), arg)))
            .collect()
    }

    /// Propagates known arguments to the parameters they depend on, for at
    /// most one round per parameter, visiting parameters in index order.
    pub fn try_infer_type_arguments(&self) -> InferenceOutcome {
        let mut arguments = self.arguments.clone();
        let mut inferred_any = false;
        for _ in 0..self.parameters.len() {
            let mut progressed = false;
            for param in &self.parameters {
                let index = param.position();
                if arguments[index].is_some() {
                    continue;
                }
                let known = self.bindings_for(&arguments);
                let inferred = param.info().depended_on_by.iter().find_map(|&dependent| {
                    let concrete = arguments[dependent].as_ref()?;
                    param.try_infer_type_from(&self.parameters[dependent], concrete, &known)
                });
                if let Some(ty) = inferred {
                    arguments[index] = Some(ty);
                    progressed = true;
                    inferred_any = true;
                }
            }
            if !progressed {
                break;
            }
        }
        InferenceOutcome {
            arguments,
            inferred_any,
        }
    }

    /// Instantiates the definition with `arguments`.
    pub fn close(&self, arguments: &[Option<Ty>]) -> Result<Ty> {
        let missing = self
            .parameters
            .iter()
            .filter(|param| {
                arguments
                    .get(param.position())
                    .map_or(true, |arg| arg.is_none())
            })
            .map(|param| param.name().to_string())
            .collect_vec();
        if !missing.is_empty() {
            return Err(Error::InferenceIncomplete {
                ty: self.def.self_ty().to_string(),
                missing,
            });
        }
        Ok(Ty::generic(
            self.def.name.clone(),
            arguments.iter().take(self.parameters.len()).flatten().cloned(),
        ))
    }

    /// Checks every parameter's constraints with all arguments bound.
    pub fn verify(&self, arguments: &[Ty]) -> Result<()> {
        let bindings: Bindings = self
            .parameters
            .iter()
            .zip(arguments)
            .map(|(param, arg)| (param.param().clone(), arg.clone()))
            .collect();
        self.parameters
            .iter()
            .zip(arguments)
            .try_for_each(|(param, arg)| param.check_constraints(arg, &bindings))
    }

    pub fn types(&self) -> &'a dyn TypeSystem {
        self.types
    }
}
