//! Read-only renderings of the AST: an indented text tree and a Graphviz
//! `digraph` for external visualisation tools.

use crate::syntax::*;

fn number_label(n: &Number) -> String {
    match n {
        Number::Integer(i) => i.to_string(),
        Number::Real(r) => format!("{r:?}"),
    }
}

fn operator_label(op: crate::token::TokenKind) -> &'static str {
    op.symbol().unwrap_or_else(|| op.name())
}

struct TreePrinter {
    out: String,
    depth: usize,
}

impl TreePrinter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn program(&mut self, program: &Program) {
        match &program.name {
            Some(name) => self.line(&format!("Program {}", name.name())),
            None => self.line("Program"),
        }
        self.nested(|p| {
            for decl in &program.declarations {
                p.line(&format!("VarDecl {} : {}", decl.var.name(), decl.type_spec.name()));
            }
            p.compound(&program.body);
        });
    }

    fn compound(&mut self, compound: &Compound) {
        self.line("Compound");
        self.nested(|p| {
            for stmt in &compound.children {
                p.statement(stmt);
            }
        });
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Compound(compound) => self.compound(compound),
            Statement::Assign(assign) => {
                self.line(&format!("Assign {}", assign.target.name()));
                self.nested(|p| p.expression(&assign.value));
            }
            Statement::NoOp => self.line("NoOp"),
        }
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::BinOp(b) => {
                self.line(&format!("BinOp {}", operator_label(b.op)));
                self.nested(|p| {
                    p.expression(&b.left);
                    p.expression(&b.right);
                });
            }
            Expression::UnaryOp(u) => {
                self.line(&format!("UnaryOp {}", operator_label(u.op)));
                self.nested(|p| p.expression(&u.operand));
            }
            Expression::Num(n) => self.line(&format!("Num {}", number_label(&n.value))),
            Expression::Var(v) => self.line(&format!("Var {}", v.name())),
        }
    }
}

pub fn render_tree(program: &Program) -> String {
    let mut printer = TreePrinter::new();
    printer.program(program);
    printer.out
}

pub fn render_expression_tree(expr: &Expression) -> String {
    let mut printer = TreePrinter::new();
    printer.expression(expr);
    printer.out
}

// nodes are numbered in pre-order
struct DotPrinter {
    out: String,
    next_id: usize,
}

impl DotPrinter {
    fn new() -> Self {
        Self {
            out: String::from("digraph ast {\n  node [shape=box];\n"),
            next_id: 0,
        }
    }

    fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }

    fn node(&mut self, label: &str, parent: Option<usize>) -> usize {
        let id = self.next_id;
        self.next_id += 1;

        let label = label.replace('\\', "\\\\").replace('"', "\\\"");
        self.out.push_str(&format!("  n{id} [label=\"{label}\"];\n"));
        if let Some(parent) = parent {
            self.out.push_str(&format!("  n{parent} -> n{id};\n"));
        }
        id
    }

    fn program(&mut self, program: &Program) {
        let label = match &program.name {
            Some(name) => format!("Program({})", name.name()),
            None => "Program".to_string(),
        };
        let id = self.node(&label, None);
        for decl in &program.declarations {
            self.node(
                &format!("VarDecl({}: {})", decl.var.name(), decl.type_spec.name()),
                Some(id),
            );
        }
        self.compound(&program.body, Some(id));
    }

    fn compound(&mut self, compound: &Compound, parent: Option<usize>) {
        let id = self.node("Compound", parent);
        for stmt in &compound.children {
            self.statement(stmt, id);
        }
    }

    fn statement(&mut self, stmt: &Statement, parent: usize) {
        match stmt {
            Statement::Compound(compound) => self.compound(compound, Some(parent)),
            Statement::Assign(assign) => {
                let id = self.node(":=", Some(parent));
                self.node(&format!("Var({})", assign.target.name()), Some(id));
                self.expression(&assign.value, Some(id));
            }
            Statement::NoOp => {
                self.node("NoOp", Some(parent));
            }
        }
    }

    fn expression(&mut self, expr: &Expression, parent: Option<usize>) {
        match expr {
            Expression::BinOp(b) => {
                let id = self.node(&format!("BinOp({})", operator_label(b.op)), parent);
                self.expression(&b.left, Some(id));
                self.expression(&b.right, Some(id));
            }
            Expression::UnaryOp(u) => {
                let id = self.node(&format!("UnaryOp({})", operator_label(u.op)), parent);
                self.expression(&u.operand, Some(id));
            }
            Expression::Num(n) => {
                self.node(&format!("Num({})", number_label(&n.value)), parent);
            }
            Expression::Var(v) => {
                self.node(&format!("Var({})", v.name()), parent);
            }
        }
    }
}

pub fn render_dot(program: &Program) -> String {
    let mut printer = DotPrinter::new();
    printer.program(program);
    printer.finish()
}

pub fn render_expression_dot(expr: &Expression) -> String {
    let mut printer = DotPrinter::new();
    printer.expression(expr, None);
    printer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_expression, parse_program};
    use pretty_assertions::assert_eq;

    #[test]
    fn tree_shows_every_node() {
        let source = "PROGRAM p; VAR x : REAL; BEGIN x := -(1 + 2.5) * y; END.";
        let program = parse_program(source).unwrap();
        let expected = "\
Program p
  VarDecl x : REAL
  Compound
    Assign x
      BinOp *
        UnaryOp -
          BinOp +
            Num 1
            Num 2.5
        Var y
    NoOp
";
        assert_eq!(render_tree(&program), expected);
    }

    #[test]
    fn comments_render_the_same_tree() {
        let with_comments = parse_program("{ c1 } BEGIN x := 1; END .").unwrap();
        let without = parse_program("BEGIN x:=1;END.").unwrap();
        assert_eq!(render_tree(&with_comments), render_tree(&without));
    }

    #[test]
    fn dot_numbers_nodes_in_preorder() {
        let expr = parse_expression("1 + 2 DIV x").unwrap();
        let expected = "\
digraph ast {
  node [shape=box];
  n0 [label=\"BinOp(+)\"];
  n1 [label=\"Num(1)\"];
  n0 -> n1;
  n2 [label=\"BinOp(DIV)\"];
  n0 -> n2;
  n3 [label=\"Num(2)\"];
  n2 -> n3;
  n4 [label=\"Var(x)\"];
  n2 -> n4;
}
";
        assert_eq!(render_expression_dot(&expr), expected);
    }

    #[test]
    fn dot_for_program_links_statements_to_their_block() {
        let program = parse_program("BEGIN a := 1 END.").unwrap();
        let dot = render_dot(&program);
        assert!(dot.contains("n0 [label=\"Program\"];"));
        assert!(dot.contains("n1 [label=\"Compound\"];\n  n0 -> n1;"));
        assert!(dot.contains("n2 [label=\":=\"];\n  n1 -> n2;"));
        assert!(dot.contains("n3 [label=\"Var(a)\"];\n  n2 -> n3;"));
        assert!(dot.contains("n4 [label=\"Num(1)\"];\n  n2 -> n4;"));
    }

    #[test]
    fn expression_tree_stands_alone() {
        let expr = parse_expression("--5").unwrap();
        assert_eq!(render_expression_tree(&expr), "UnaryOp -\n  UnaryOp -\n    Num 5\n");
    }
}
