use crate::registry::def::{GenericParamDef, Indexer, TypeDef};
use crate::registry::member::{MethodInfo, PropertyInfo};
use crate::ty::{names, Ty};
use crate::value::Value;

fn count_property() -> PropertyInfo {
    PropertyInfo::new("Count", Ty::int(), |owner| Ok(Value::Int(owner.len()? as i64)))
}

/// Definitions every registry starts with.
pub fn builtin_types() -> Vec<TypeDef> {
    let primitives = [names::INT, names::FLOAT, names::BOOL]
        .into_iter()
        .map(TypeDef::structure);

    let enumerable = TypeDef::interface(names::ENUMERABLE).generic_param(GenericParamDef::new("T"));
    let list_interface = TypeDef::interface(names::LIST_INTERFACE)
        .indexer(Indexer::Untyped)
        .property(count_property());

    let list = TypeDef::class(names::LIST).generic_param(GenericParamDef::new("T"));
    let elem = list.param_ty(0);
    let list = list
        .implements(Ty::enumerable(elem.clone()))
        .implements(Ty::named(names::LIST_INTERFACE))
        .default_constructible()
        .indexer(Indexer::Typed)
        .property(count_property())
        .method(MethodInfo::new(
            "Add",
            [("item", elem)],
            Ty::void(),
            |owner, args| {
                if let (Value::List(seq), [item]) = (owner, args) {
                    seq.write().items.push(item.clone());
                }
                Ok(Value::Null)
            },
        ));

    let array_list = TypeDef::class(names::ARRAY_LIST)
        .implements(Ty::named(names::LIST_INTERFACE))
        .default_constructible()
        .indexer(Indexer::Untyped)
        .property(count_property());

    [
        TypeDef::class(names::OBJECT).default_constructible(),
        TypeDef::class(names::VOID),
        TypeDef::class(names::STRING),
    ]
    .into_iter()
    .chain(primitives)
    .chain([enumerable, list_interface, list, array_list])
    .collect()
}
