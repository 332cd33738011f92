use crate::helpers::try_execute;
use insta::assert_snapshot;
use rlox::ExitStatus;

#[test]
fn adding_a_string_and_a_number_fails_at_runtime() {
    let outcome = try_execute(r#"print "a" + 1;"#);
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert!(outcome.output.is_empty());
    assert_snapshot!(outcome.diagnostics, @r###"
    Operands must be two numbers or two strings.
    [line 1]
    "###);
}

#[test]
fn comparing_mixed_operands_fails_at_runtime() {
    let outcome = try_execute(r#"print 1 < "two";"#);
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Operands must be numbers.
    [line 1]
    "###);
}

#[test]
fn execution_stops_at_the_first_runtime_error() {
    let outcome = try_execute(
        r#"print "before";
print nil - 1;
print "after";"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.output, @r###"
    before
    "###);
    assert_snapshot!(outcome.diagnostics, @r###"
    Operands must be numbers.
    [line 2]
    "###);
}

#[test]
fn calling_a_non_callable_fails_at_the_call_site_line() {
    let outcome = try_execute("var x = 1;\nx(\n);");
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Can only call function and classes
    [line 3]
    "###);
}

#[test]
fn arity_is_checked_before_the_call_runs() {
    let outcome = try_execute(
        r#"fun greet(name) { print name; }
greet();"#,
    );
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Expected 1 arguments but got 0.
    [line 2]
    "###);
}

#[test]
fn setting_a_field_on_a_non_instance_fails() {
    let outcome = try_execute(r#"var x = "str"; x.field = 1;"#);
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Only instances have fields.
    [line 1]
    "###);
}

#[test]
fn getting_a_property_of_a_non_instance_fails() {
    let outcome = try_execute(r#"print true.field;"#);
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Only instances have properties.
    [line 1]
    "###);
}

#[test]
fn a_parse_error_exits_with_the_static_error_code() {
    let outcome = try_execute("print 1 +;");
    assert_eq!(outcome.status, ExitStatus::StaticError);
    assert!(outcome.output.is_empty());
    assert_snapshot!(outcome.diagnostics, @"[line 1] Error at ';': Expect expression.");
}

#[test]
fn a_resolver_error_exits_with_the_static_error_code() {
    let outcome = try_execute("var a = 1;\n{ var a = a; }");
    assert_eq!(outcome.status, ExitStatus::StaticError);
    assert!(outcome.output.is_empty());
    assert_snapshot!(
        outcome.diagnostics,
        @"[line 2] Error at 'a': Can't read local variable in its own initializer."
    );
}

#[test]
fn assigning_to_an_undefined_variable_fails_at_runtime() {
    let outcome = try_execute("ghost = 1;");
    assert_eq!(outcome.status, ExitStatus::RuntimeFailure);
    assert_snapshot!(outcome.diagnostics, @r###"
    Undefined variable 'ghost'.
    [line 1]
    "###);
}
