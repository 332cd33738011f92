use crate::helpers::{execute, try_execute};
use insta::assert_snapshot;
use rlox::ExitStatus;

#[test]
fn classes_and_instances_print_their_names() {
    let source = r#"class Bagel {}
print Bagel;
print Bagel();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Bagel
    Bagel instance
    "###);
}

#[test]
fn fields_spring_into_existence_on_assignment() {
    let source = r#"class Bag {}
var bag = Bag();
bag.content = "crumbs";
print bag.content;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    crumbs
    "###);
}

#[test]
fn methods_are_called_on_instances() {
    let source = r#"class Bacon {
  eat() {
    print "Crunch crunch crunch!";
  }
}
Bacon().eat();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Crunch crunch crunch!
    "###);
}

#[test]
fn this_refers_to_the_receiver() {
    let source = r#"class Cake {
  taste() {
    var adjective = "delicious";
    print "The " + this.flavor + " cake is " + adjective + "!";
  }
}
var cake = Cake();
cake.flavor = "German chocolate";
cake.taste();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    The German chocolate cake is delicious!
    "###);
}

#[test]
fn a_bound_method_remembers_its_receiver() {
    let source = r#"class Person {
  sayName() { print this.name; }
}
var jane = Person();
jane.name = "Jane";
var method = jane.sayName;
method();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Jane
    "###);
}

#[test]
fn fields_shadow_methods() {
    let source = r#"class Oops {
  describe() { print "the method"; }
}
var oops = Oops();
fun replacement() { print "the field"; }
oops.describe = replacement;
oops.describe();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    the field
    "###);
}

#[test]
fn an_initializer_runs_at_construction_with_the_class_arity() {
    let source = r#"class Point {
  init(x, y) {
    this.x = x;
    this.y = y;
  }
}
var point = Point(3, 4);
print point.x;
print point.y;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    3
    4
    "###);
}

#[test]
fn an_initializer_returns_the_instance_even_when_called_directly() {
    let source = r#"class Foo {
  init() {
    this.value = "set by init";
    print "init ran";
  }
}
var foo = Foo();
print foo.init();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    init ran
    init ran
    Foo instance
    "###);
}

#[test]
fn a_bare_return_in_an_initializer_still_yields_the_instance() {
    let source = r#"class Guard {
  init(armed) {
    this.armed = armed;
    if (!armed) return;
    print "armed!";
  }
}
print Guard(false);
print Guard(true);"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Guard instance
    armed!
    Guard instance
    "###);
}

#[test]
fn methods_can_refer_to_the_class_itself() {
    let source = r#"class Singleton {
  instance() { return Singleton; }
}
print Singleton().instance();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Singleton
    "###);
}

#[test]
fn reading_a_missing_property_is_a_runtime_error() {
    let outcome = try_execute(
        r#"class Empty {}
print Empty().missing;"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Undefined property 'missing'.
    [line 2]
    "###);
}

#[test]
fn constructing_with_the_wrong_arity_is_a_runtime_error() {
    let outcome = try_execute(
        r#"class Point { init(x, y) { this.x = x; this.y = y; } }
Point(1);"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Expected 2 arguments but got 1.
    [line 2]
    "###);
}
