#![allow(dead_code)]

use reflekt_core::registry::{GenericParamDef, TypeDef, TypeRegistry};
use reflekt_core::Ty;
use std::sync::Arc;

/// `Wrapper<T1, T2> where T1: IEnumerable<T2>`
pub fn wrapper() -> TypeDef {
    TypeDef::class("Wrapper")
        .generic_param_with("T1", |def, param| {
            param.constraint(Ty::enumerable(def.param_ty(1)))
        })
        .generic_param(GenericParamDef::new("T2"))
}

/// `Chain<A, B, C> where B: IEnumerable<A>, C: IEnumerable<B>`
pub fn chain() -> TypeDef {
    TypeDef::class("Chain")
        .generic_param(GenericParamDef::new("A"))
        .generic_param_with("B", |def, param| {
            param.constraint(Ty::enumerable(def.param_ty(0)))
        })
        .generic_param_with("C", |def, param| {
            param.constraint(Ty::enumerable(def.param_ty(1)))
        })
}

/// `Cycle<A, B> where A: IEnumerable<B>, B: IEnumerable<A>`
pub fn cycle() -> TypeDef {
    TypeDef::class("Cycle")
        .generic_param_with("A", |def, param| {
            param.constraint(Ty::enumerable(def.param_ty(1)))
        })
        .generic_param_with("B", |def, param| {
            param.constraint(Ty::enumerable(def.param_ty(0)))
        })
}

pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();
    registry.register(TypeDef::structure("Sprite"));
    registry.register(TypeDef::class("SpriteRenderer"));
    registry.register(TypeDef::class("FallbackRenderer"));
    let bag = TypeDef::class("Bag").generic_param(GenericParamDef::new("T"));
    let elem = bag.param_ty(0);
    registry.register(bag.base(Ty::list(elem)));
    registry.register(TypeDef::class("Box").generic_param(GenericParamDef::new("T")));
    registry.register(
        TypeDef::class("Pool").generic_param(GenericParamDef::new("T").default_constructor()),
    );
    registry.register(
        TypeDef::class("Handle").generic_param(GenericParamDef::new("T").reference_type()),
    );
    registry.register(wrapper());
    registry.register(chain());
    registry.register(cycle());
    Arc::new(registry)
}

pub fn param(owner: &str, index: usize, name: &str) -> Ty {
    Ty::param(owner, index, name)
}

pub fn definition(registry: &TypeRegistry, name: &str) -> Ty {
    registry
        .get(name)
        .map(|def| def.self_ty())
        .unwrap_or_else(|| panic!("`{}` is not registered", name))
}
