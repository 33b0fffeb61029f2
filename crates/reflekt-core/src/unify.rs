//! Structural unification of open types against concrete ones.
//!
//! Type arguments are invariant: `List<T>` unifies with `List<int>` but not
//! with `List<string>` once `T = int`. Looking through supertypes happens only
//! at the outermost level, in [`Unifier::unify_assignable`].

use crate::registry::TypeSystem;
use crate::ty::{Ty, TyParam};
use std::collections::BTreeMap;

pub type Bindings = BTreeMap<TyParam, Ty>;

pub struct Unifier<'a> {
    types: &'a dyn TypeSystem,
}

impl<'a> Unifier<'a> {
    pub fn new(types: &'a dyn TypeSystem) -> Self {
        Self { types }
    }

    /// Binds the parameters of `pattern` so it equals `concrete`. On failure
    /// `bindings` is left untouched.
    pub fn unify(&self, pattern: &Ty, concrete: &Ty, bindings: &mut Bindings) -> bool {
        let mut trial = bindings.clone();
        if unify_exact(pattern, concrete, &mut trial) {
            *bindings = trial;
            true
        } else {
            false
        }
    }

    /// Like [`Unifier::unify`], but `concrete` may also convert to the pattern
    /// through one of its supertypes. Closed patterns reduce to assignability.
    pub fn unify_assignable(&self, pattern: &Ty, concrete: &Ty, bindings: &mut Bindings) -> bool {
        if !pattern.is_open() {
            return self.types.is_assignable(pattern, concrete);
        }
        if let Ty::Param(_) = pattern {
            return self.unify(pattern, concrete, bindings);
        }
        self.types
            .supertypes(concrete)
            .iter()
            .any(|candidate| self.unify(pattern, candidate, bindings))
    }
}

fn unify_exact(pattern: &Ty, concrete: &Ty, bindings: &mut Bindings) -> bool {
    match (pattern, concrete) {
        (Ty::Param(param), _) => match bindings.get(param) {
            Some(bound) => bound == concrete,
            None => {
                bindings.insert(param.clone(), concrete.clone());
                true
            }
        },
        (Ty::Array(pattern_elem), Ty::Array(concrete_elem)) => {
            unify_exact(pattern_elem, concrete_elem, bindings)
        }
        (Ty::Named(p), Ty::Named(c)) if p.name == c.name && p.args.len() == c.args.len() => p
            .args
            .iter()
            .zip(&c.args)
            .all(|(p_arg, c_arg)| unify_exact(p_arg, c_arg, bindings)),
        _ => pattern == concrete,
    }
}

pub fn apply(ty: &Ty, bindings: &Bindings) -> Ty {
    ty.substitute(&|param| bindings.get(param).cloned())
}
