mod common;

use common::{compiler, player, player_ty, vector2};
use pretty_assertions::assert_eq;
use reflekt_core::config::ExpressionConfig;
use reflekt_core::error::Error;
use reflekt_core::{Ty, Value};
use reflekt_path::{Expression, ExpressionMode, PathCompiler};
use std::sync::Arc;

const GATED: ExpressionConfig = ExpressionConfig { flag_gating: true };
const UNGATED: ExpressionConfig = ExpressionConfig { flag_gating: false };

fn shared() -> Arc<PathCompiler> {
    Arc::new(compiler())
}

fn dynamic(text: &str) -> Expression {
    Expression::new(shared(), text, Some(player_ty()), UNGATED)
}

#[test]
fn literal_expressions_ignore_their_context() {
    let literal = Expression::literal("Name");
    assert_eq!(literal.evaluate(&player()).unwrap(), Value::string("Name"));
    assert_eq!(literal.evaluate(&Value::Null).unwrap(), Value::string("Name"));
    assert_eq!(literal.try_get_error(), None);
}

#[test]
fn flag_gating_selects_the_mode() {
    let compiler = shared();
    let flagged = Expression::new(compiler.clone(), "@Name", Some(player_ty()), GATED);
    assert_eq!(flagged.mode(), ExpressionMode::Dynamic);
    assert_eq!(flagged.evaluate(&player()).unwrap(), Value::string("ada"));

    let plain = Expression::new(compiler.clone(), "Name", Some(player_ty()), GATED);
    assert!(plain.is_literal());
    assert_eq!(plain.evaluate(&player()).unwrap(), Value::string("Name"));

    let ungated = Expression::new(compiler.clone(), "Name", Some(player_ty()), UNGATED);
    assert_eq!(ungated.evaluate(&player()).unwrap(), Value::string("ada"));
    let ungated_flag = Expression::new(compiler, "@Name", Some(player_ty()), UNGATED);
    assert_eq!(ungated_flag.evaluate(&player()).unwrap(), Value::string("ada"));
}

#[test]
fn dynamic_expressions_read_nested_members() {
    assert_eq!(
        dynamic("transform.position.y").evaluate(&player()).unwrap(),
        Value::Float(4.0)
    );
    assert_eq!(
        dynamic("Waypoints[1]").evaluate(&player()).unwrap(),
        vector2(5.0, 6.0)
    );
}

#[test]
fn inline_calls_route_through_the_invoker() {
    assert_eq!(
        dynamic("stats.Calculate(5,3)").evaluate(&player()).unwrap(),
        Value::Int(53)
    );
    let player = player();
    assert_eq!(dynamic("Heal(1, 2)").evaluate(&player).unwrap(), Value::Int(52));
    assert_eq!(
        dynamic(r#"Rename("grace")"#).evaluate(&player).unwrap(),
        Value::Null
    );
    assert_eq!(player.field("Name").unwrap(), Value::string("grace"));
}

#[test]
fn type_directives_evaluate_against_statics() {
    let compiler = shared();
    let origin = Expression::new(compiler.clone(), "-t:Game -p:Origin.x", None, UNGATED);
    assert_eq!(origin.evaluate(&Value::Null).unwrap(), Value::Float(1.0));

    let add = Expression::new(compiler.clone(), "@-t:Game -p:Add(2, 3)", None, GATED);
    assert_eq!(add.evaluate(&player()).unwrap(), Value::Int(5));

    let path_only = Expression::new(compiler, "-p:Health", Some(player_ty()), UNGATED);
    assert_eq!(path_only.evaluate(&player()).unwrap(), Value::Int(50));
}

#[test]
fn type_directive_without_path_is_an_error() {
    let expression = Expression::new(shared(), "-t:Game", None, UNGATED);
    assert!(expression.has_error());
    let unknown = Expression::new(shared(), "-t:Nope -p:Origin", None, UNGATED);
    assert!(unknown.try_get_error().unwrap_or_default().contains("Nope"));
}

#[test]
fn resolution_failures_are_memoized() {
    let expression = dynamic("Mana");
    let message = expression.try_get_error().map(str::to_string);
    assert!(message.is_some());
    assert_eq!(expression.try_get_error().map(str::to_string), message);
    match expression.evaluate(&player()) {
        Err(Error::InvalidExpression {
            source_text,
            message: cached,
        }) => {
            assert_eq!(source_text, "Mana");
            assert_eq!(Some(cached), message);
        }
        other => panic!("expected invalid expression, got {:?}", other),
    }
}

#[test]
fn rootless_expressions_compile_per_context_type() {
    let compiler = shared();
    let scale = Expression::new(compiler.clone(), "scale", None, UNGATED);
    assert_eq!(scale.try_get_error(), None);
    let transform = Value::structure(
        Ty::named("Transform"),
        [("position", vector2(0.0, 0.0)), ("scale", Value::Float(3.0))],
    );
    assert_eq!(scale.evaluate(&transform).unwrap(), Value::Float(3.0));
    assert!(matches!(
        scale.evaluate(&player()),
        Err(Error::MemberNotFound { .. })
    ));

    let name = Expression::new(compiler.clone(), "Name", None, UNGATED);
    assert_eq!(name.evaluate(&player()).unwrap(), Value::string("ada"));

    let broken = Expression::new(compiler, "Name..First", None, UNGATED);
    assert!(broken.has_error());
}
