use crate::parser::ast::{Expression, LiteralExpression};
use crate::scanner::format_number_literal;

/// Render an expression in its parenthesised prefix form, e.g.
/// `(* (group (+ 1.0 2.0)) 3.0)`. This is the output of the `parse` command.
pub fn print_expression(e: &Expression) -> String {
    match e {
        Expression::Literal(l) => match l {
            LiteralExpression::Boolean(b) => b.to_string(),
            LiteralExpression::Nil => "nil".to_string(),
            LiteralExpression::String(s) => s.clone(),
            LiteralExpression::Number(n) => format_number_literal(*n),
        },
        Expression::Unary(u) => {
            format!("({} {})", u.operator.lexeme(), print_expression(&u.operand))
        }
        Expression::Binary(b) => format!(
            "({} {} {})",
            b.operator.lexeme(),
            print_expression(&b.left),
            print_expression(&b.right)
        ),
        Expression::Logical(l) => format!(
            "({} {} {})",
            l.operator.lexeme(),
            print_expression(&l.left),
            print_expression(&l.right)
        ),
        Expression::Grouping(g) => format!("(group {})", print_expression(&g.0)),
        Expression::VariableReference(v) => v.identifier.lexeme().to_string(),
        Expression::VariableAssignment(a) => format!(
            "(= {} {})",
            a.identifier.lexeme(),
            print_expression(&a.value)
        ),
        Expression::Call(c) => {
            let mut rendered = format!("(call {}", print_expression(&c.callee));
            for argument in &c.arguments {
                rendered.push(' ');
                rendered.push_str(&print_expression(argument));
            }
            rendered.push(')');
            rendered
        }
        Expression::PropertyGet(g) => {
            format!("(. {} {})", print_expression(&g.object), g.name.lexeme())
        }
        Expression::PropertySet(s) => format!(
            "(= (. {} {}) {})",
            print_expression(&s.object),
            s.name.lexeme(),
            print_expression(&s.value)
        ),
        Expression::This(_) => "this".to_string(),
        Expression::Super(s) => format!("(super {})", s.method.lexeme()),
    }
}
