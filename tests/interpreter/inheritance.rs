use crate::helpers::{execute, try_execute};
use insta::assert_snapshot;
use rlox::ExitStatus;

#[test]
fn methods_are_inherited_from_the_superclass() {
    let source = r#"class Doughnut {
  cook() { print "Fry until golden brown."; }
}
class BostonCream < Doughnut {}
BostonCream().cook();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Fry until golden brown.
    "###);
}

#[test]
fn a_subclass_method_overrides_the_inherited_one() {
    let source = r#"class Doughnut {
  cook() { print "Fry until golden brown."; }
}
class BostonCream < Doughnut {
  cook() { print "Pipe full of custard and coat with chocolate."; }
}
BostonCream().cook();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Pipe full of custard and coat with chocolate.
    "###);
}

#[test]
fn super_calls_the_superclass_method() {
    let source = r#"class Doughnut {
  cook() { print "Fry until golden brown."; }
}
class BostonCream < Doughnut {
  cook() {
    super.cook();
    print "Pipe full of custard and coat with chocolate.";
  }
}
BostonCream().cook();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Fry until golden brown.
    Pipe full of custard and coat with chocolate.
    "###);
}

#[test]
fn super_binds_to_the_class_declaring_the_method_not_the_receiver() {
    let source = r#"class A { method() { print "A"; } }
class B < A { method() { print "B"; } test() { super.method(); } }
class C < B {}
C().test();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    A
    "###);
}

#[test]
fn inherited_methods_see_the_subclass_receiver_through_this() {
    let source = r#"class Greeter {
  greet() { print "Hello, " + this.name + "!"; }
}
class Named < Greeter {
  init(name) { this.name = name; }
}
Named("Lox").greet();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Hello, Lox!
    "###);
}

#[test]
fn an_initializer_can_chain_to_the_superclass_one() {
    let source = r#"class Base {
  init(value) { this.value = value; }
}
class Derived < Base {
  init() {
    super.init("from super.init");
  }
}
print Derived().value;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    from super.init
    "###);
}

#[test]
fn a_superclass_must_be_a_class_at_runtime() {
    let outcome = try_execute(
        r#"var NotAClass = "so very much not";
class Subclass < NotAClass {}"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Superclass must be a class.
    [line 2]
    "###);
}

#[test]
fn a_missing_superclass_method_is_a_runtime_error() {
    let outcome = try_execute(
        r#"class Base {}
class Derived < Base {
  method() { super.missing(); }
}
Derived().method();"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Undefined property 'missing'.
    [line 3]
    "###);
}
