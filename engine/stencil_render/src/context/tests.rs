use super::*;
use pretty_assertions::assert_eq;
use stencil_value::{evaluation_error, syntax_error, MapValue};

use crate::filters::{FilterModule, FilterRegistry};
use crate::limits::ResourceLimits;
use crate::scope::MAX_NESTING;

fn upcase() -> FilterModule {
    FilterModule::new("Text").with_filter("upcase", |_ctx, args| {
        Ok(Value::string(
            args.first().map(ToString::to_string).unwrap_or_default().to_uppercase(),
        ))
    })
}

#[test]
fn pop_on_single_scope_is_a_balance_error() {
    let mut ctx = Context::new();
    assert_eq!(ctx.pop(), Err(RenderError::Balance));
    assert_eq!(ctx.depth(), 1);
}

#[test]
fn push_then_pop_restores_depth() {
    let mut ctx = Context::new();
    ctx.push(Mapping::new()).unwrap();
    assert_eq!(ctx.depth(), 2);
    ctx.pop().unwrap();
    assert_eq!(ctx.depth(), 1);
}

#[test]
fn hundred_and_first_push_fails_and_keeps_the_stack() {
    let mut ctx = Context::new();
    for level in 0..MAX_NESTING {
        ctx.push(Mapping::new()).unwrap();
        ctx.set("level", Value::int(i64::try_from(level).unwrap()));
    }
    assert_eq!(ctx.depth(), MAX_NESTING + 1);
    assert_eq!(
        ctx.push(Mapping::new()),
        Err(RenderError::StackDepthExceeded { limit: MAX_NESTING })
    );
    assert_eq!(ctx.depth(), MAX_NESTING + 1);
    assert_eq!(ctx.get("level").unwrap(), Value::int(99));
}

#[test]
fn set_writes_innermost_scope_only() {
    let mut ctx = Context::new();
    ctx.push(Mapping::new()).unwrap();
    ctx.set("x", Value::int(1));
    let popped = ctx.pop().unwrap();
    assert_eq!(popped.get("x"), Some(&Value::int(1)));
    assert_eq!(ctx.get("x").unwrap(), Value::Nil);
}

#[test]
fn merge_and_clear_touch_innermost_scope() {
    let mut ctx = Context::builder().assign("outer", 1).build();
    ctx.push(Mapping::new()).unwrap();
    ctx.merge(Mapping::from([
        ("a".to_string(), Value::int(1)),
        ("b".to_string(), Value::int(2)),
    ]));
    assert_eq!(ctx.get("b").unwrap(), Value::int(2));
    ctx.clear_instance_assigns();
    assert_eq!(ctx.get("a").unwrap(), Value::Nil);
    assert_eq!(ctx.get("outer").unwrap(), Value::int(1));
}

#[test]
fn has_key_means_non_nil() {
    let mut ctx = Context::builder()
        .assign("present", 0)
        .assign("nothing", Value::Nil)
        .build();
    assert!(ctx.has_key("present").unwrap());
    assert!(!ctx.has_key("nothing").unwrap());
    assert!(!ctx.has_key("absent").unwrap());
}

#[test]
fn invoke_dispatches_registered_filters() {
    let mut ctx = Context::new();
    ctx.register_filters([upcase()]).unwrap();
    let out = ctx.invoke("upcase", &[Value::string("tobi")]).unwrap();
    assert_eq!(out, Value::string("TOBI"));
}

#[test]
fn invoke_unknown_filter_fails() {
    let mut ctx = Context::new();
    assert_eq!(
        ctx.invoke("nope", &[]),
        Err(RenderError::UndefinedFilter {
            name: "nope".to_string()
        })
    );
}

#[test]
fn filters_registered_after_first_use_extend_the_table() {
    let mut ctx = Context::new();
    ctx.register_filters([upcase()]).unwrap();
    ctx.invoke("upcase", &[Value::string("a")]).unwrap();
    let module = FilterModule::new("Math").with_filter("double", |_ctx, args| {
        Ok(Value::int(args.first().and_then(Value::as_int).unwrap_or(0) * 2))
    });
    ctx.register_filters([module]).unwrap();
    assert_eq!(ctx.invoke("double", &[Value::int(4)]).unwrap(), Value::int(8));
    assert_eq!(ctx.invoke("upcase", &[Value::string("b")]).unwrap(), Value::string("B"));
    assert_eq!(ctx.filter_invoker().module_names(), ["Text", "Math"]);
}

#[test]
fn malformed_modules_are_rejected_atomically() {
    let mut ctx = Context::new();
    let result = ctx.register_filters([upcase(), FilterModule::new("Empty")]);
    assert!(matches!(result, Err(RenderError::Argument { .. })));
    assert!(ctx.filter_invoker().is_empty());
}

#[test]
fn global_registry_modules_come_first() {
    let registry = SharedFilterRegistry::new(FilterRegistry::new());
    registry
        .write()
        .register(FilterModule::new("Global").with_filter("tag", |_ctx, _args| {
            Ok(Value::string("global"))
        }))
        .unwrap();
    let mut ctx = Context::builder().filter_registry(registry.clone()).build();
    ctx.register_filters([FilterModule::new("Local").with_filter("tag", |_ctx, _args| {
        Ok(Value::string("local"))
    })])
    .unwrap();
    assert_eq!(ctx.invoke("tag", &[]).unwrap(), Value::string("local"));

    // The table is built once; later global changes do not leak in.
    registry.write().clear();
    assert_eq!(ctx.invoke("tag", &[]).unwrap(), Value::string("local"));
}

#[test]
fn filters_can_use_the_context() {
    let mut ctx = Context::builder().assign("currency", "EUR").build();
    ctx.register_filters([FilterModule::new("Money").with_filter("money", |ctx, args| {
        let currency = ctx.resolve("currency")?;
        let amount = args.first().cloned().unwrap_or_default();
        Ok(Value::string(format!("{amount} {currency}")))
    })])
    .unwrap();
    assert_eq!(
        ctx.invoke("money", &[Value::int(5)]).unwrap(),
        Value::string("5 EUR")
    );
}

#[test]
fn interrupts_are_a_stack() {
    let mut ctx = Context::new();
    assert!(!ctx.has_interrupt());
    ctx.push_interrupt(Interrupt::Break);
    ctx.push_interrupt(Interrupt::Continue);
    assert!(ctx.has_interrupt());
    assert_eq!(ctx.pop_interrupt(), Some(Interrupt::Continue));
    assert_eq!(ctx.pop_interrupt(), Some(Interrupt::Break));
    assert_eq!(ctx.pop_interrupt(), None);
}

#[test]
fn handle_error_records_and_classifies() {
    let mut ctx = Context::new();
    assert_eq!(
        ctx.handle_error(syntax_error("unknown tag 'frob'")).unwrap(),
        "Stencil syntax error: unknown tag 'frob'"
    );
    assert_eq!(
        ctx.handle_error(evaluation_error("divided by 0")).unwrap(),
        "Stencil error: divided by 0"
    );
    assert_eq!(ctx.errors().len(), 2);
    assert_eq!(ctx.errors()[1].error, evaluation_error("divided by 0"));
}

#[test]
fn handle_error_rethrows_without_recording() {
    let mut ctx = Context::builder().rethrow_errors(true).build();
    assert!(ctx.rethrows_errors());
    let err = evaluation_error("boom");
    assert_eq!(ctx.handle_error(err.clone()), Err(err));
    assert!(ctx.errors().is_empty());
}

#[test]
fn structural_errors_always_propagate() {
    let mut ctx = Context::new();
    let err = ctx.pop().unwrap_err();
    assert_eq!(ctx.handle_error(err.clone()), Err(err));
    assert!(ctx.errors().is_empty());
}

#[test]
fn resource_usage_is_advisory() {
    let mut ctx = Context::builder()
        .resource_limits(ResourceLimits::default().with_assign_score_limit(3))
        .build();
    let three = Value::list(vec![Value::Nil; 3]);
    ctx.increment_used(ResourceKey::AssignScore, &three);
    assert!(!ctx.limits_reached());
    ctx.increment_used(ResourceKey::AssignScore, &Value::int(1));
    assert!(ctx.limits_reached());
    assert_eq!(ctx.resource_limiter().used(ResourceKey::AssignScore), 4);
    assert_eq!(ctx.get("anything").unwrap(), Value::Nil);
}

#[test]
fn registers_pass_through_untouched() {
    let mut ctx = Context::builder().register("page", "home").build();
    assert_eq!(ctx.registers().get("page"), Some(&Value::string("home")));
    ctx.registers_mut()
        .insert("cache".to_string(), Value::map(Mapping::new()));
    assert_eq!(ctx.registers().len(), 2);
    assert_eq!(ctx.get("page").unwrap(), Value::Nil);
}

#[test]
fn render_context_view() {
    let mut ctx = Context::builder()
        .assign("name", "tobi")
        .register("locale", "en")
        .build();
    let view: &mut dyn RenderContext = &mut ctx;
    assert_eq!(view.resolve("name").unwrap(), Value::string("tobi"));
    view.set("other", Value::int(1));
    assert_eq!(view.depth(), 1);
    assert_eq!(view.register("locale"), Some(Value::string("en")));
    assert_eq!(view.register("missing"), None);
    assert_eq!(ctx.get("other").unwrap(), Value::int(1));
}

#[test]
fn environments_are_never_written_by_set() {
    let env = MapValue::new(Mapping::from([("x".to_string(), Value::int(1))]));
    let mut ctx = Context::builder().environment(env.clone()).build();
    ctx.set("x", Value::int(2));
    assert_eq!(ctx.get("x").unwrap(), Value::int(2));
    assert_eq!(env.borrow().get("x"), Some(&Value::int(1)));
}
