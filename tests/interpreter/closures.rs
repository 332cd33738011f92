use crate::helpers::execute;
use insta::assert_snapshot;

#[test]
fn a_closure_captures_its_defining_environment_not_the_calling_one() {
    let source = r#"var a = "global";
{
  fun showA() { print a; }
  showA();
  var a = "block";
  showA();
}"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    global
    global
    "###);
}

#[test]
fn a_closure_outlives_the_call_that_created_it() {
    let source = r#"fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    print count;
  }
  return increment;
}
var counter = makeCounter();
counter();
counter();
counter();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    1
    2
    3
    "###);
}

#[test]
fn two_closures_share_one_captured_variable() {
    let source = r#"fun makePair() {
  var value = 0;
  fun set(v) { value = v; }
  fun get() { print value; }
  set(42);
  get();
}
makePair();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    42
    "###);
}

#[test]
fn each_call_gets_a_fresh_environment() {
    let source = r#"fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    print count;
  }
  return increment;
}
var first = makeCounter();
var second = makeCounter();
first();
first();
second();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    1
    2
    1
    "###);
}

#[test]
fn loop_variables_are_captured_by_reference() {
    let source = r#"var handler;
for (var i = 0; i < 3; i = i + 1) {
  fun show() { print i; }
  handler = show;
}
handler();"#;
    // The single `i` binding lives in the desugared initializer block and
    // every iteration's closure sees its final value.
    let output = execute(source);
    assert_snapshot!(output, @r###"
    3
    "###);
}
