//! Scope construction, validation, localisation and resolution.

mod common;

use std::sync::Arc;

use boolex::prelude::*;
use common::{Context, ContextVariable, Greet};

fn variable(name: &str) -> Bind<Context> {
    Bind::variable(name, ContextVariable::new(name, Datatypes::STRING)).unwrap()
}

#[test]
fn names_are_lowercased_on_construction() {
    let bind = variable("Traffic_Light");
    assert_eq!(bind.global_name(), "traffic_light");
    let namespace: Namespace<Context> = Namespace::new("Root");
    assert_eq!(namespace.global_name(), "root");
}

#[test]
fn equivalent_binds_cannot_be_attached_twice() {
    let mut root = Namespace::new("root");
    root.add_bind(variable("light")).unwrap();
    let error = root.add_bind(variable("light")).unwrap_err();
    assert!(error.is_scope(), "got {:?}", error);
}

#[test]
fn global_name_clashes_fail_validation() {
    // Distinct localisations make the binds non-equivalent, so they attach;
    // the clash on the shared global name is validation's to find.
    let mut root = Namespace::new("root");
    root.add_bind(variable("light").with_name("es", "semaforo"))
        .unwrap();
    root.add_bind(variable("light").with_name("fr", "feu"))
        .unwrap();
    let error = root.validate().unwrap_err();
    assert!(error.is_scope(), "got {:?}", error);
}

#[test]
fn localized_name_clashes_fail_validation() {
    let mut root = Namespace::new("root");
    root.add_bind(variable("light").with_name("es", "semaforo"))
        .unwrap();
    root.add_bind(variable("lamp").with_name("es", "semaforo"))
        .unwrap();
    let error = root.validate().unwrap_err();
    assert!(error.is_scope(), "got {:?}", error);
}

#[test]
fn a_bind_and_a_namespace_may_share_a_name() {
    let mut root = Namespace::new("root");
    root.add_bind(variable("place")).unwrap();
    root.add_namespace(Namespace::new("place")).unwrap();
    root.validate().unwrap();
}

#[test]
fn sub_namespace_clashes_fail_validation() {
    let mut root: Namespace<Context> = Namespace::new("root");
    root.add_namespace(Namespace::new("place").with_name("es", "lugar"))
        .unwrap();
    root.add_namespace(Namespace::new("place").with_name("fr", "lieu"))
        .unwrap();
    let error = root.validate().unwrap_err();
    assert!(error.is_scope(), "got {:?}", error);
}

#[test]
fn validation_recurses_into_sub_namespaces() {
    let mut child = Namespace::new("child");
    child
        .add_bind(variable("x").with_name("es", "equis"))
        .unwrap();
    child.add_bind(variable("x").with_name("fr", "iks")).unwrap();
    let mut root = Namespace::new("root");
    root.add_namespace(child).unwrap();
    let error = root.validate().unwrap_err();
    assert!(error.is_scope(), "got {:?}", error);
}

#[test]
fn resolution_walks_sub_tables_in_order() {
    let mut inner = Namespace::new("inner");
    inner.add_bind(variable("x")).unwrap();
    let mut outer = Namespace::new("outer");
    outer.add_namespace(inner).unwrap();
    let mut root = Namespace::new("root");
    root.add_namespace(outer).unwrap();

    let table = root.symbol_table(None);
    let path: NamespacePath = ["outer".to_string(), "inner".to_string()]
        .into_iter()
        .collect();
    assert!(matches!(
        table.resolve(&path, "x").unwrap(),
        BindTarget::Variable(_)
    ));

    let missing = table.resolve(&path, "y").unwrap_err();
    assert!(missing.is_scope(), "got {:?}", missing);
    let wrong_path: NamespacePath = ["nowhere".to_string()].into_iter().collect();
    let missing = table.resolve(&wrong_path, "x").unwrap_err();
    assert!(missing.is_scope(), "got {:?}", missing);
}

#[test]
fn symbol_tables_are_cached_per_locale() {
    let mut root = Namespace::new("root");
    root.add_bind(variable("light").with_name("es", "semaforo"))
        .unwrap();

    let global_one = root.symbol_table(None);
    let global_two = root.symbol_table(None);
    assert!(
        Arc::ptr_eq(&global_one, &global_two),
        "the global table must be derived once"
    );

    let spanish = root.symbol_table(Some("es"));
    assert!(!Arc::ptr_eq(&global_one, &spanish));
    assert!(Arc::ptr_eq(&spanish, &root.symbol_table(Some("es"))));
}

#[test]
fn localisation_falls_back_to_the_global_name() {
    let mut root = Namespace::new("root");
    root.add_bind(variable("light")).unwrap();
    let spanish = root.symbol_table(Some("es"));
    assert!(spanish.resolve(&NamespacePath::new(), "light").is_ok());
}

#[test]
fn binds_reject_capability_less_operands() {
    struct Opaque;
    impl Variable<Context> for Opaque {
        fn datatypes(&self) -> Datatypes {
            Datatypes::empty()
        }

        fn value(&self, _context: &Context) -> BoolexResult<Value> {
            Ok(Value::Boolean(false))
        }
    }

    let error = Bind::variable("opaque", Arc::new(Opaque)).unwrap_err();
    assert!(error.is_bad_operand(), "got {:?}", error);
}

#[test]
fn binds_validate_function_signatures() {
    struct Broken {
        signature: Signature<Context>,
    }

    impl Function<Context> for Broken {
        fn signature(&self) -> &Signature<Context> {
            &self.signature
        }

        fn datatypes(&self) -> Datatypes {
            Datatypes::BOOLEAN
        }

        fn call(
            &self,
            _arguments: &Arguments<Context>,
            _context: &Context,
        ) -> BoolexResult<Value> {
            Ok(Value::Boolean(true))
        }
    }

    let broken = Broken {
        signature: Signature::new(["a", "a"]),
    };
    let error = Bind::function("broken", Arc::new(broken)).unwrap_err();
    assert!(error.is_bad_function(), "got {:?}", error);

    assert!(Bind::function("greet", Greet::new()).is_ok());
}
