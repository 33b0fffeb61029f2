use itertools::Itertools;
use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{SpecialConstraints, TypeDef, TypeSystem};
use reflekt_core::ty::TyParam;
use reflekt_core::unify::{apply, Bindings, Unifier};
use reflekt_core::Ty;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParameterInfo {
    pub name: String,
    pub position: usize,
    pub special: SpecialConstraints,
    pub type_constraints: Vec<Ty>,
    /// Positions of parameters mentioned in this parameter's constraints.
    pub depends_on: Vec<usize>,
    /// Positions of parameters whose constraints mention this one.
    pub depended_on_by: Vec<usize>,
}

/// Constraint checks and inference for one parameter of a generic definition.
pub struct GenericParameterAnalyzer<'a> {
    types: &'a dyn TypeSystem,
    param: TyParam,
    info: GenericParameterInfo,
}

impl<'a> GenericParameterAnalyzer<'a> {
    pub fn new(types: &'a dyn TypeSystem, def: &TypeDef, position: usize) -> Result<Self> {
        let declared = def.params.get(position).ok_or_else(|| {
            Error::type_resolution(
                def.name.clone(),
                format!(
                    "has {} generic parameter(s), no position {}",
                    def.params.len(),
                    position
                ),
            )
        })?;
        let param = TyParam {
            owner: def.name.clone(),
            index: position,
            name: declared.name.clone(),
        };

        let depends_on = (0..def.params.len())
            .filter(|&other| other != position)
            .filter(|&other| {
                let other_param = TyParam {
                    owner: def.name.clone(),
                    index: other,
                    name: def.params[other].name.clone(),
                };
                declared
                    .constraints
                    .iter()
                    .any(|constraint| constraint.mentions(&other_param))
            })
            .collect();
        let depended_on_by = def
            .params
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != position)
            .filter(|(_, other)| {
                other
                    .constraints
                    .iter()
                    .any(|constraint| constraint.mentions(&param))
            })
            .map(|(other, _)| other)
            .collect();

        Ok(Self {
            types,
            info: GenericParameterInfo {
                name: declared.name.clone(),
                position,
                special: declared.special,
                type_constraints: declared.constraints.clone(),
                depends_on,
                depended_on_by,
            },
            param,
        })
    }

    pub fn info(&self) -> &GenericParameterInfo {
        &self.info
    }

    pub fn param(&self) -> &TyParam {
        &self.param
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn position(&self) -> usize {
        self.info.position
    }

    /// Parameters of `known` stand in for their bindings; any other
    /// parameter a constraint mentions is a wildcard, bound consistently
    /// within that one constraint.
    pub fn satisfies_constraints(&self, candidate: &Ty, known: &Bindings) -> bool {
        self.first_violation(candidate, known).is_none()
    }

    pub fn check_constraints(&self, candidate: &Ty, known: &Bindings) -> Result<()> {
        match self.first_violation(candidate, known) {
            None => Ok(()),
            Some(reason) => Err(Error::ConstraintUnsatisfied {
                param: self.info.name.clone(),
                ty: candidate.to_string(),
                reason,
            }),
        }
    }

    fn first_violation(&self, candidate: &Ty, known: &Bindings) -> Option<String> {
        let special = self.info.special;
        if special.reference_type && !self.types.is_reference_type(candidate) {
            return Some("must be a reference type".into());
        }
        if special.value_type && !self.types.is_value_type(candidate) {
            return Some("must be a value type".into());
        }
        if special.default_constructor && !self.types.has_default_constructor(candidate) {
            return Some("must have a parameterless constructor".into());
        }

        let mut bindings = known.clone();
        bindings.insert(self.param.clone(), candidate.clone());
        let unifier = Unifier::new(self.types);
        self.info
            .type_constraints
            .iter()
            .find(|constraint| {
                let constraint = apply(constraint, &bindings);
                if constraint.is_open() {
                    !unifier.unify_assignable(&constraint, candidate, &mut Bindings::new())
                } else {
                    !self.types.is_assignable(&constraint, candidate)
                }
            })
            .map(|constraint| format!("must convert to `{}`", apply(constraint, &bindings)))
    }

    /// Infers this parameter from a known argument of `dependent`, whose
    /// constraints mention this parameter: the constraint is unified against
    /// `dependent_concrete` or one of its supertypes.
    pub fn try_infer_type_from(
        &self,
        dependent: &GenericParameterAnalyzer<'_>,
        dependent_concrete: &Ty,
        known: &Bindings,
    ) -> Option<Ty> {
        let mut bindings = known.clone();
        bindings.remove(&self.param);
        bindings.insert(dependent.param.clone(), dependent_concrete.clone());
        let unifier = Unifier::new(self.types);
        dependent
            .info
            .type_constraints
            .iter()
            .filter(|constraint| constraint.mentions(&self.param))
            .find_map(|constraint| {
                let pattern = apply(constraint, &bindings);
                let mut inferred = Bindings::new();
                if !unifier.unify_assignable(&pattern, dependent_concrete, &mut inferred) {
                    return None;
                }
                inferred.remove(&self.param).filter(|ty| !ty.is_open())
            })
            .inspect(|ty| {
                reflekt_core::trace!(
                    "inferred {} = {} from {} = {}",
                    self.info.name,
                    ty,
                    dependent.info.name,
                    dependent_concrete
                )
            })
    }

    pub fn describe(&self) -> String {
        if self.info.type_constraints.is_empty() {
            return self.info.name.clone();
        }
        format!(
            "{}: {}",
            self.info.name,
            self.info.type_constraints.iter().join(" + ")
        )
    }
}
