//! Builders for assembling Mira syntax trees in tests without the noise
//! of spans and boxes. All nodes carry `Span::default()`; spans compare
//! equal anyway.

use mira_lang::ast::{
    ArrayLiteral, AssertStatement, Assignment, BinaryExpression, BinaryOperator, Block, Bool,
    Expression, ForLoop, FunctionDeclaration, Id, IfStatement, InvariantStatement, Num, Parameter,
    Postfix, Program, RangeExpression, ReturnStatement, Span, Statement, Str, TypeAnnotation,
    TypeOf, UntilLoop, VariableDeclaration, VariableDeclarator, WhileLoop,
};

pub fn program(statements: Vec<Statement>) -> Program {
    Program { statements }
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block {
        statements,
        position: Span::default(),
    }
}

pub fn id(name: &str) -> Id {
    Id {
        name: name.into(),
        position: Span::default(),
    }
}

pub fn int(value: i64) -> Expression {
    Expression::Num(Num::Integer(value, Span::default()))
}

pub fn float(value: f64) -> Expression {
    Expression::Num(Num::FloatingPoint(value, Span::default()))
}

pub fn string(value: &str) -> Expression {
    Expression::Str(Str {
        value: value.into(),
        position: Span::default(),
    })
}

pub fn boolean(value: bool) -> Expression {
    Expression::Bool(Bool {
        value,
        position: Span::default(),
    })
}

pub fn ident(name: &str) -> Expression {
    Expression::Id(id(name))
}

pub fn array(elements: Vec<Expression>) -> Expression {
    Expression::Array(ArrayLiteral {
        elements,
        position: Span::default(),
    })
}

pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        position: Span::default(),
    })
}

pub fn range(start: Option<Expression>, end: Option<Expression>, inclusive: bool) -> Expression {
    Expression::Range(RangeExpression {
        start: start.map(Box::new),
        end: end.map(Box::new),
        inclusive,
        position: Span::default(),
    })
}

pub fn call(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Postfix(Postfix::Call {
        expr: Box::new(ident(name)),
        args,
        position: Span::default(),
    })
}

pub fn method_call(receiver: Expression, method: &str, args: Vec<Expression>) -> Expression {
    Expression::Postfix(Postfix::Call {
        expr: Box::new(Expression::Postfix(Postfix::PropertyAccess {
            expr: Box::new(receiver),
            property: id(method),
            position: Span::default(),
        })),
        args,
        position: Span::default(),
    })
}

pub fn index(object: Expression, idx: Expression) -> Expression {
    Expression::Postfix(Postfix::Index {
        expr: Box::new(object),
        index: Box::new(idx),
        position: Span::default(),
    })
}

pub fn type_of(operand: Expression) -> Expression {
    Expression::TypeOf(TypeOf {
        operand: Box::new(operand),
        position: Span::default(),
    })
}

pub fn let_stmt(name: &str, initializer: Expression) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        declarations: vec![declarator(name, None, initializer)],
        position: Span::default(),
    })
}

pub fn let_annotated(name: &str, annotation: TypeAnnotation, initializer: Expression) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        declarations: vec![declarator(name, Some(annotation), initializer)],
        position: Span::default(),
    })
}

pub fn declarator(
    name: &str,
    type_annotation: Option<TypeAnnotation>,
    initializer: Expression,
) -> VariableDeclarator {
    VariableDeclarator {
        name: id(name),
        type_annotation,
        initializer,
        info: None,
        position: Span::default(),
    }
}

pub fn assign(target: Expression, value: Expression) -> Statement {
    Statement::Assignment(Assignment {
        target,
        value,
        position: Span::default(),
    })
}

pub fn expr_stmt(expression: Expression) -> Statement {
    Statement::Expression(expression)
}

pub fn param(name: &str) -> Parameter {
    Parameter {
        name: id(name),
        type_annotation: None,
        info: None,
        position: Span::default(),
    }
}

pub fn param_annotated(name: &str, annotation: TypeAnnotation) -> Parameter {
    Parameter {
        name: id(name),
        type_annotation: Some(annotation),
        info: None,
        position: Span::default(),
    }
}

pub fn function(
    name: &str,
    parameters: Vec<Parameter>,
    return_type: Option<TypeAnnotation>,
    body: Vec<Statement>,
) -> Statement {
    Statement::FunctionDeclaration(FunctionDeclaration {
        name: id(name),
        parameters,
        return_type,
        body: block(body),
        info: None,
        position: Span::default(),
    })
}

pub fn ret(value: Option<Expression>) -> Statement {
    Statement::Return(ReturnStatement {
        value,
        position: Span::default(),
    })
}

pub fn if_stmt(
    condition: Expression,
    then_branch: Vec<Statement>,
    else_branch: Option<Vec<Statement>>,
) -> Statement {
    Statement::If(IfStatement {
        condition,
        then_branch: block(then_branch),
        else_branch: else_branch.map(block),
        position: Span::default(),
    })
}

pub fn while_stmt(condition: Expression, body: Vec<Statement>) -> Statement {
    Statement::WhileLoop(WhileLoop {
        condition,
        body: block(body),
        position: Span::default(),
    })
}

pub fn until_stmt(condition: Expression, body: Vec<Statement>) -> Statement {
    Statement::UntilLoop(UntilLoop {
        condition,
        body: block(body),
        position: Span::default(),
    })
}

pub fn for_stmt(variable: &str, iterable: Expression, body: Vec<Statement>) -> Statement {
    Statement::ForLoop(ForLoop {
        variable: id(variable),
        iterable,
        body: block(body),
        position: Span::default(),
    })
}

pub fn invariant(condition: Expression, message: Option<Expression>) -> Statement {
    Statement::Invariant(InvariantStatement {
        condition,
        message,
        position: Span::default(),
    })
}

pub fn assert_stmt(condition: Expression, message: Option<Expression>) -> Statement {
    Statement::Assert(AssertStatement {
        condition,
        message,
        position: Span::default(),
    })
}

/// The declarator info of the only variable in a single-declarator `let`.
pub fn declared_type(statement: &Statement) -> String {
    let Statement::VariableDeclaration(decl) = statement else {
        panic!("not a variable declaration: {statement:?}");
    };
    let info = decl.declarations[0]
        .info
        .as_ref()
        .expect("declarator has no type information");
    info.type_id.borrow().to_string()
}
