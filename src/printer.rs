use crate::ast::{Expr, ExprVisitor, Literal};
use crate::token::Token;

/// Lisp-like rendering: `-123 * (45.67)` becomes `(* (- 123) (group 45.67))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut output = format!("({name}");
        for expr in exprs {
            output.push(' ');
            output.push_str(&expr.accept(self));
        }
        output.push(')');
        output
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[left, right])
    }
    fn visit_grouping(&mut self, inner: &Expr) -> String {
        self.parenthesize("group", &[inner])
    }
    fn visit_literal(&mut self, value: &Literal) -> String {
        format!("{value}")
    }
    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[right])
    }
}

/// Reverse polish notation: `(1 + 2) * (4 - 3)` becomes `1 2 + 4 3 - *`.
/// Groupings vanish since postfix order already encodes them.
pub struct RpnPrinter;

impl RpnPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }
}

impl ExprVisitor<String> for RpnPrinter {
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        format!(
            "{} {} {}",
            left.accept(self),
            right.accept(self),
            operator.lexeme
        )
    }
    fn visit_grouping(&mut self, inner: &Expr) -> String {
        inner.accept(self)
    }
    fn visit_literal(&mut self, value: &Literal) -> String {
        format!("{value}")
    }
    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        format!("{} {}", right.accept(self), operator.lexeme)
    }
}
