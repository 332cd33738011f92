use crate::helpers::execute;
use insta::assert_snapshot;

#[test]
fn two_branch_conditional_works() {
    let source = r#"if (3 > 5) {
    print true;
} else {
    print false;
}"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    false
    "###);
}

#[test]
fn single_branch_conditional_works() {
    let source = r#"if (5 > 2) {
    print true;
}"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    true
    "###);
}

#[test]
fn an_else_binds_to_the_nearest_if() {
    let source = r#"if (true) if (false) print "inner"; else print "else of inner";"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    else of inner
    "###);
}

#[test]
fn a_while_loop_re_evaluates_its_condition() {
    let source = r#"var i = 0;
while (i < 3) {
  print i;
  i = i + 1;
}"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    0
    1
    2
    "###);
}

#[test]
fn a_for_loop_desugars_to_an_equivalent_while() {
    let source = r#"for (var i = 0; i < 3; i = i + 1) print i;"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    0
    1
    2
    "###);
}

#[test]
fn a_for_loop_can_omit_all_three_clauses() {
    let source = r#"fun count() {
  var i = 0;
  for (;;) {
    if (i >= 2) {
      print "done";
      return;
    }
    print i;
    i = i + 1;
  }
}
count();"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    0
    1
    done
    "###);
}

#[test]
fn logical_operators_short_circuit() {
    let source = r#"fun shout(value) { print value; return value; }
print false and shout("not reached");
print true or shout("not reached either");
print true and shout("reached");"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    false
    true
    reached
    reached
    "###);
}

#[test]
fn conditions_use_lox_truthiness() {
    let source = r#"if (0) print "zero is truthy";
if ("") print "an empty string is truthy";
if (nil) print "never"; else print "nil is falsy";"#;
    let output = execute(source);
    assert_snapshot!(output, @r###"
    zero is truthy
    an empty string is truthy
    nil is falsy
    "###);
}
