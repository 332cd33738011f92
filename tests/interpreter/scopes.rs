use crate::helpers::execute;
use insta::assert_snapshot;

#[test]
fn lexical_scopes_are_interpreted_correctly() {
    let source = r#"var a = "global a";
var b = "global b";
var c = "global c";
{
  var a = "outer a";
  var b = "outer b";
  {
    var a = "inner a";
    print a;
    print b;
    print c;
  }
  print a;
  print b;
  print c;
}
print a;
print b;
print c;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    inner a
    outer b
    global c
    outer a
    outer b
    global c
    global a
    global b
    global c
    "###);
}

#[test]
fn a_block_scoped_variable_dies_with_its_block() {
    let source = r#"{
  var hidden = 1;
}
print hidden;"#;
    let outcome = crate::helpers::try_execute(source);
    assert_eq!(outcome.status, rlox::ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Undefined variable 'hidden'.
    [line 4]
    "###);
}

#[test]
fn an_uninitialised_variable_is_nil() {
    let source = r#"var a;
print a;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    nil
    "###);
}

#[test]
fn assignment_reaches_through_enclosing_scopes() {
    let source = r#"var a = "before";
{
  a = "after";
}
print a;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    after
    "###);
}

#[test]
fn assignment_is_an_expression_with_a_value() {
    let source = r#"var a = 1;
var b = 2;
print a = b = 3;
print a;
print b;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    3
    3
    3
    "###);
}

#[test]
fn shadowing_does_not_leak_into_the_outer_scope() {
    let source = r#"var volume = 11;
volume = 0;
{
  var volume = 3 * 4 * 5;
  print volume;
}
print volume;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    60
    0
    "###);
}
