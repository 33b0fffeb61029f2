#![allow(dead_code)]

use reflekt_core::registry::{MethodInfo, PropertyInfo, TypeDef, TypeRegistry};
use reflekt_core::{Ty, Value};
use reflekt_path::PathCompiler;
use std::sync::Arc;

pub fn vector2(x: f64, y: f64) -> Value {
    Value::structure(
        Ty::named("Vector2"),
        [("x", Value::Float(x)), ("y", Value::Float(y))],
    )
}

fn int_arg(args: &[Value], index: usize) -> i64 {
    args.get(index).and_then(Value::as_int).unwrap_or_default()
}

pub fn registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry.register(
        TypeDef::structure("Vector2")
            .field("x", Ty::float())
            .field("y", Ty::float()),
    );
    registry.register(
        TypeDef::structure("Transform")
            .field("position", Ty::named("Vector2"))
            .field("scale", Ty::float()),
    );
    registry.register(TypeDef::class("Stats").field("Score", Ty::int()).method(
        MethodInfo::new(
            "Calculate",
            [("a", Ty::int()), ("b", Ty::int())],
            Ty::int(),
            |_, args| Ok(Value::Int(int_arg(args, 0) * 10 + int_arg(args, 1))),
        ),
    ));
    registry.register(
        TypeDef::class("Player")
            .field("Name", Ty::string())
            .readonly_field("Id", Ty::int())
            .field("Health", Ty::int())
            .field("transform", Ty::named("Transform"))
            .field("stats", Ty::named("Stats"))
            .field("Tags", Ty::list(Ty::string()))
            .field("Waypoints", Ty::array(Ty::named("Vector2")))
            .field("Inventory", Ty::array_list())
            .property(PropertyInfo::new("IsAlive", Ty::bool(), |owner| {
                Ok(Value::Bool(
                    owner.field("Health")?.as_int().unwrap_or_default() > 0,
                ))
            }))
            .property(
                PropertyInfo::new("Level", Ty::int(), |owner| owner.field("level"))
                    .with_setter(|owner, value| owner.with_field("level", value)),
            )
            .property(PropertyInfo::new("Anchor", Ty::named("Vector2"), |_| {
                Ok(vector2(0.0, 0.0))
            }))
            .method(MethodInfo::new(
                "Heal",
                [("amount", Ty::int())],
                Ty::int(),
                |owner, args| {
                    let health = owner.field("Health")?.as_int().unwrap_or_default()
                        + int_arg(args, 0);
                    owner.clone().with_field("Health", Value::Int(health))?;
                    Ok(Value::Int(health))
                },
            ))
            .method(MethodInfo::new(
                "Heal",
                [("amount", Ty::int()), ("times", Ty::int())],
                Ty::int(),
                |owner, args| {
                    let health = owner.field("Health")?.as_int().unwrap_or_default()
                        + int_arg(args, 0) * int_arg(args, 1);
                    owner.clone().with_field("Health", Value::Int(health))?;
                    Ok(Value::Int(health))
                },
            ))
            .method(MethodInfo::new(
                "Describe",
                Vec::<(&str, Ty)>::new(),
                Ty::string(),
                |owner, _| {
                    let name = owner.field("Name")?;
                    Ok(Value::string(format!("player {}", name)))
                },
            ))
            .method(MethodInfo::new(
                "Rename",
                [("name", Ty::string())],
                Ty::void(),
                |owner, args| {
                    let name = args.first().cloned().unwrap_or_default();
                    owner.clone().with_field("Name", name)?;
                    Ok(Value::Null)
                },
            )),
    );
    registry.register(
        TypeDef::class("Game")
            .static_field("Origin", Ty::named("Vector2"), vector2(1.0, 2.0))
            .static_field("Current", Ty::named("Player"), Value::Null)
            .static_field("Round", Ty::int(), Value::Int(1))
            .property(
                PropertyInfo::new("Title", Ty::string(), |_| Ok(Value::string("reflekt")))
                    .into_static(),
            )
            .method(
                MethodInfo::new(
                    "Add",
                    [("a", Ty::int()), ("b", Ty::int())],
                    Ty::int(),
                    |_, args| Ok(Value::Int(int_arg(args, 0) + int_arg(args, 1))),
                )
                .into_static(),
            ),
    );
    registry
}

pub fn compiler() -> PathCompiler {
    PathCompiler::new(Arc::new(registry()))
}

pub fn player_ty() -> Ty {
    Ty::named("Player")
}

pub fn player() -> Value {
    Value::object(
        player_ty(),
        [
            ("Name", Value::string("ada")),
            ("Id", Value::Int(7)),
            ("Health", Value::Int(50)),
            ("level", Value::Int(3)),
            (
                "transform",
                Value::structure(
                    Ty::named("Transform"),
                    [("position", vector2(3.0, 4.0)), ("scale", Value::Float(1.0))],
                ),
            ),
            (
                "stats",
                Value::object(Ty::named("Stats"), [("Score", Value::Int(12))]),
            ),
            (
                "Tags",
                Value::list(Ty::string(), [Value::string("hero"), Value::string("mage")]),
            ),
            (
                "Waypoints",
                Value::array(Ty::named("Vector2"), [vector2(0.0, 0.0), vector2(5.0, 6.0)]),
            ),
            (
                "Inventory",
                Value::untyped_list([Value::string("sword"), Value::Int(3), vector2(9.0, 9.0)]),
            ),
        ],
    )
}
