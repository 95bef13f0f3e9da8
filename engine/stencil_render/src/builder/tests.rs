use super::*;
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let ctx = ContextBuilder::new().build();
    assert_eq!(ctx.depth(), 1);
    assert!(ctx.environments().is_empty());
    assert!(ctx.registers().is_empty());
    assert!(!ctx.rethrows_errors());
    assert_eq!(*ctx.resource_limiter().limits(), ResourceLimits::unlimited());
}

#[test]
fn assign_builds_the_initial_scope() {
    let mut ctx = ContextBuilder::new()
        .scope(Mapping::from([("a".to_string(), Value::int(1))]))
        .assign("b", "two")
        .build();
    assert_eq!(ctx.get("a"), Ok(Value::int(1)));
    assert_eq!(ctx.get("b"), Ok(Value::string("two")));
    assert_eq!(ctx.scopes().outermost().borrow().len(), 2);
}

#[test]
fn environments_keep_registration_order() {
    let ctx = ContextBuilder::new()
        .environment(Mapping::new())
        .environments([Environment::mapping(Mapping::new())])
        .build();
    assert_eq!(ctx.environments().len(), 2);
}

#[test]
fn registers_and_limits() {
    let limits = ResourceLimits::default().with_render_length_limit(10);
    let ctx = ContextBuilder::new()
        .registers(Mapping::from([("a".to_string(), Value::int(1))]))
        .register("b", 2)
        .resource_limits(limits)
        .rethrow_errors(true)
        .build();
    assert_eq!(ctx.registers().len(), 2);
    assert_eq!(*ctx.resource_limiter().limits(), limits);
    assert!(ctx.rethrows_errors());
}
