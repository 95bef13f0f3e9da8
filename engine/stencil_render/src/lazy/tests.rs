use super::*;
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use stencil_value::{ContextBindable, Droppable, IndexedLookup, Mapping, RenderContext, ToRenderable};

fn counting(calls: &Rc<Cell<u32>>, result: Value) -> Value {
    let calls = Rc::clone(calls);
    Value::deferred(move || {
        calls.set(calls.get() + 1);
        Ok(result.clone())
    })
}

#[test]
fn list_slots() {
    assert_eq!(list_slot(0, 3), Some(0));
    assert_eq!(list_slot(2, 3), Some(2));
    assert_eq!(list_slot(3, 3), None);
    assert_eq!(list_slot(-1, 3), Some(2));
    assert_eq!(list_slot(-3, 3), Some(0));
    assert_eq!(list_slot(-4, 3), None);
    assert_eq!(list_slot(i64::MIN, 3), None);
    assert_eq!(list_slot(0, 0), None);
}

#[test]
fn deferred_map_entry_is_evaluated_once_and_memoized() {
    let calls = Rc::new(Cell::new(0));
    let entries = MapValue::new(Mapping::from([(
        "total".to_string(),
        counting(&calls, Value::int(42)),
    )]));
    let container = Container::Map(entries.clone());
    let key = Key::Name("total".to_string());
    let mut ctx = Context::new();

    assert_eq!(ctx.fetch(&container, &key), Ok(Value::int(42)));
    assert_eq!(ctx.fetch(&container, &key), Ok(Value::int(42)));
    assert_eq!(calls.get(), 1);
    assert_eq!(entries.borrow().get("total"), Some(&Value::int(42)));
}

#[test]
fn deferred_list_entry_is_memoized_at_negative_index() {
    let calls = Rc::new(Cell::new(0));
    let items = ListValue::new(vec![Value::int(1), counting(&calls, Value::string("z"))]);
    let container = Container::List(items.clone());
    let mut ctx = Context::new();

    assert_eq!(ctx.fetch(&container, &Key::Index(-1)), Ok(Value::string("z")));
    assert_eq!(ctx.fetch(&container, &Key::Index(1)), Ok(Value::string("z")));
    assert_eq!(calls.get(), 1);
    assert!(!items.borrow()[1].is_deferred());
}

#[test]
fn missing_entries_fetch_nil() {
    let mut ctx = Context::new();
    let container = Container::List(ListValue::new(vec![Value::int(1)]));
    assert_eq!(ctx.fetch(&container, &Key::Index(5)), Ok(Value::Nil));
    assert_eq!(
        ctx.fetch(&container, &Key::Name("x".to_string())),
        Ok(Value::Nil)
    );
}

#[test]
fn contextual_deferred_sees_the_context() {
    let entries = MapValue::new(Mapping::from([(
        "greeting".to_string(),
        Value::deferred_with_context(|ctx: &mut dyn RenderContext| {
            let name = ctx.resolve("name")?;
            Ok(Value::string(format!("hello {name}")))
        }),
    )]));
    let mut ctx = Context::builder().assign("name", "tobi").build();
    let value = ctx.fetch(&Container::Map(entries), &Key::Name("greeting".to_string()));
    assert_eq!(value, Ok(Value::string("hello tobi")));
}

#[test]
fn deferred_errors_propagate_and_are_not_memoized() {
    let entries = MapValue::new(Mapping::from([(
        "broken".to_string(),
        Value::deferred(|| Err(stencil_value::evaluation_error("boom"))),
    )]));
    let mut ctx = Context::new();
    let key = Key::Name("broken".to_string());
    let result = ctx.fetch(&Container::Map(entries.clone()), &key);
    assert_eq!(result, Err(stencil_value::evaluation_error("boom")));
    assert!(entries.borrow()["broken"].is_deferred());
}

#[test]
fn self_referencing_deferred_hits_the_depth_limit() {
    let mut ctx = Context::new();
    ctx.set(
        "loop",
        Value::deferred_with_context(|ctx: &mut dyn RenderContext| ctx.resolve("loop")),
    );
    let result = ctx.resolve("loop");
    assert_eq!(result, Err(stack_depth_exceeded(MAX_NESTING)));
    assert_eq!(ctx.evaluation_depth, 0);
}

#[derive(Debug)]
struct Price(i64);

impl Droppable for Price {
    fn renderable(&self) -> Option<&dyn ToRenderable> {
        Some(self)
    }
}

impl ToRenderable for Price {
    fn to_renderable(&self) -> Value {
        Value::string(format!("{}.00", self.0))
    }
}

#[test]
fn coerce_uses_renderable_form() {
    let mut ctx = Context::new();
    assert_eq!(ctx.coerce(Value::drop(Price(3))), Value::string("3.00"));
    assert_eq!(ctx.coerce(Value::int(3)), Value::int(3));
}

#[derive(Debug, Default)]
struct Witness {
    seen_depth: Cell<usize>,
}

impl Droppable for Witness {
    fn bindable(&self) -> Option<&dyn ContextBindable> {
        Some(self)
    }
}

impl ContextBindable for Witness {
    fn bind_context(&self, ctx: &mut dyn RenderContext) {
        self.seen_depth.set(ctx.depth());
    }
}

#[test]
fn coerce_binds_context_aware_drops() {
    let witness = Rc::new(Witness::default());
    let value = Value::Drop(witness.clone());
    let mut ctx = Context::new();
    ctx.push(Mapping::new()).unwrap();
    let coerced = ctx.coerce(value.clone());
    assert_eq!(coerced, value);
    assert_eq!(witness.seen_depth.get(), 2);
}

#[derive(Debug, Default)]
struct Slots(RefCell<Vec<Value>>);

impl Droppable for Slots {
    fn indexed(&self) -> Option<&dyn IndexedLookup> {
        Some(self)
    }
}

impl IndexedLookup for Slots {
    fn fetch_index(&self, index: i64) -> Option<Value> {
        let slot = usize::try_from(index).ok()?;
        self.0.borrow().get(slot).cloned()
    }

    fn store_index(&self, index: i64, value: Value) {
        let Ok(slot) = usize::try_from(index) else {
            return;
        };
        if let Some(entry) = self.0.borrow_mut().get_mut(slot) {
            *entry = value;
        }
    }
}

#[test]
fn drops_memoize_through_their_store_hook() {
    let calls = Rc::new(Cell::new(0));
    let slots = Rc::new(Slots(RefCell::new(vec![counting(&calls, Value::int(9))])));
    let object = Value::Drop(slots.clone());
    let key = Key::Index(0);
    let container = Container::for_lookup(&object, &key).unwrap();
    let mut ctx = Context::new();

    assert_eq!(ctx.fetch(&container, &key), Ok(Value::int(9)));
    assert_eq!(ctx.fetch(&container, &key), Ok(Value::int(9)));
    assert_eq!(calls.get(), 1);
}

#[test]
fn for_lookup_requires_a_present_key() {
    let map = Value::map_from([("a", 1)]);
    assert!(Container::for_lookup(&map, &Key::Name("a".to_string())).is_some());
    assert!(Container::for_lookup(&map, &Key::Name("b".to_string())).is_none());
    assert!(Container::for_lookup(&map, &Key::Index(0)).is_none());

    let list = Value::list(vec![]);
    assert!(Container::for_lookup(&list, &Key::Index(7)).is_some());
    assert!(Container::for_lookup(&list, &Key::Name("a".to_string())).is_none());

    assert!(Container::for_lookup(&Value::drop(Price(1)), &Key::Index(0)).is_none());
}
