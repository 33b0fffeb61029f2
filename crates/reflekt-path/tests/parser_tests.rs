mod common;

use common::{player_ty, registry};
use pretty_assertions::assert_eq;
use reflekt_core::config::ParserConfig;
use reflekt_core::error::Error;
use reflekt_core::{Ty, Value};
use reflekt_path::parser::PathParser;
use reflekt_path::{MemberRef, PathCompiler, PathStep};
use std::sync::Arc;

fn parser_config(implicit_calls: bool) -> ParserConfig {
    ParserConfig { implicit_calls }
}

#[test]
fn rejects_blank_paths() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    for text in ["", "   "] {
        assert!(matches!(
            parser.parse(&player_ty(), text, false),
            Err(Error::Parse { .. })
        ));
    }
}

#[test]
fn unknown_members_are_reported_with_their_owner() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    assert_eq!(
        parser.parse(&player_ty(), "transform.rotation", false).unwrap_err(),
        Error::MemberNotFound {
            ty: "Transform".into(),
            member: "rotation".into(),
        }
    );
}

#[test]
fn indexing_requires_an_indexable_type() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    assert!(matches!(
        parser.parse(&player_ty(), "Name[0]", false),
        Err(Error::Parse { .. })
    ));
}

#[test]
fn index_steps_follow_the_collection_kind() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));

    let path = parser.parse(&player_ty(), "Waypoints[0].x", false).unwrap();
    assert_eq!(path.len(), 3);
    assert!(matches!(
        &path.steps[1],
        PathStep::ArrayElement { index: 0, elem_ty } if *elem_ty == Ty::named("Vector2")
    ));
    assert_eq!(path.result_ty(), Ty::float());

    let tags = parser.parse(&player_ty(), "Tags[1]", false).unwrap();
    assert!(matches!(
        tags.last_step(),
        Some(PathStep::TypedListElement { index: 1, .. })
    ));
    assert_eq!(tags.result_ty(), Ty::string());

    let inventory = parser.parse(&player_ty(), "Inventory[2]", false).unwrap();
    assert!(matches!(
        inventory.last_step(),
        Some(PathStep::UntypedListElement { index: 2 })
    ));
    assert_eq!(inventory.result_ty(), Ty::object());
}

#[test]
fn resolution_prefers_fields_then_properties_then_methods() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    let kinds = ["Health", "IsAlive", "Describe"]
        .into_iter()
        .map(|text| {
            let path = parser.parse(&player_ty(), text, false).unwrap();
            match path.last_step() {
                Some(PathStep::Member { member, .. }) => match member {
                    MemberRef::Field(_) => "field",
                    MemberRef::Property(_) => "property",
                    MemberRef::Method { .. } => "method",
                },
                other => panic!("unexpected step {:?}", other),
            }
        })
        .collect::<Vec<_>>();
    assert_eq!(kinds, vec!["field", "property", "method"]);
}

#[test]
fn implicit_calls_can_be_disabled() {
    let registry = registry();
    let strict = PathParser::new(&registry, parser_config(false));
    assert!(matches!(
        strict.parse(&player_ty(), "Describe", false),
        Err(Error::Parse { .. })
    ));
    assert!(strict.parse(&player_ty(), "Describe()", false).is_ok());

    let compiler = PathCompiler::with_config(Arc::new(common::registry()), parser_config(false));
    assert!(compiler.getter(&player_ty(), "Describe").is_err());
}

#[test]
fn call_segments_bind_their_literals() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    let path = parser.parse(&player_ty(), "Heal(5, 2)", false).unwrap();
    match path.last_step() {
        Some(PathStep::Member {
            member: MemberRef::Method { method, args },
            result_ty,
            ..
        }) => {
            assert_eq!(method.arity(), 2);
            assert_eq!(args, &vec![Value::Int(5), Value::Int(2)]);
            assert_eq!(result_ty, &Ty::int());
        }
        other => panic!("expected a call step, got {:?}", other),
    }

    match parser.parse(&player_ty(), r#"Heal("lots")"#, false) {
        Err(Error::OverloadMismatch { index, .. }) => assert_eq!(index, Some(0)),
        other => panic!("expected overload mismatch, got {:?}", other),
    }
}

#[test]
fn malformed_segments_are_parse_errors() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    for text in [
        "transform..scale",
        "Heal(5",
        "Tags[x]",
        "Tags[-1]",
        "Heal(five)",
        "Tags[0]]",
        "1Health",
    ] {
        assert!(
            matches!(parser.parse(&player_ty(), text, false), Err(Error::Parse { .. })),
            "`{}` should not parse",
            text
        );
    }
}

#[test]
fn static_paths_require_a_static_first_segment() {
    let registry = registry();
    let parser = PathParser::new(&registry, parser_config(true));
    let game = Ty::named("Game");

    let path = parser.parse(&game, "Origin.x", true).unwrap();
    assert!(path.is_static);
    assert!(path.steps[0].is_static());
    assert!(!path.steps[1].is_static());

    assert!(matches!(
        parser.parse(&player_ty(), "Name", true),
        Err(Error::Parse { .. })
    ));
    assert!(matches!(
        parser.parse(&game, "Origin", false),
        Err(Error::MemberNotFound { .. })
    ));
}
