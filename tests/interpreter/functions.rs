use crate::helpers::execute;
use insta::assert_snapshot;

#[test]
fn declare_and_invoke_function() {
    let source = r#"fun sayHi(first, last) {
  print "Hi, " + first + " " + last + "!";
}

sayHi("Dear", "Reader");"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    Hi, Dear Reader!
    "###);
}

#[test]
fn a_function_without_a_return_evaluates_to_nil() {
    let source = r#"fun noop() {}
print noop();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    nil
    "###);
}

#[test]
fn a_bare_return_yields_nil() {
    let source = r#"fun early() { return; print "not reached"; }
print early();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    nil
    "###);
}

#[test]
fn a_return_unwinds_out_of_nested_blocks_and_loops() {
    let source = r#"fun find(limit) {
  for (var i = 0; i < 100; i = i + 1) {
    if (i >= limit) {
      return i;
    }
  }
}
print find(7);"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    7
    "###);
}

#[test]
fn functions_are_first_class_values() {
    let source = r#"fun add(a, b) { return a + b; }
var operation = add;
print operation(1, 2);
print operation;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    3
    <fn add>
    "###);
}

#[test]
fn recursion_works_through_the_function_name() {
    let source = r#"fun fib(n) { if (n < 2) return n; return fib(n - 2) + fib(n - 1); }
for (var i = 0; i < 6; i = i + 1) print fib(i);"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    0
    1
    1
    2
    3
    5
    "###);
}

#[test]
fn the_clock_native_is_callable_and_prints_as_a_native_fn() {
    let source = r#"print clock;
print clock() >= 0;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    <native fn>
    true
    "###);
}
