pub mod ast;
pub mod printer;

use crate::parser::ast::{
    BlockStatement, ClassDeclarationStatement, Expression, ExpressionId, ExpressionStatement,
    FunctionDeclarationStatement, IfElseStatement, PrintStatement, ReturnStatement, Statement,
    VariableDeclarationStatement, VariableReferenceExpression, WhileStatement,
};
use crate::scanner::{Token, TokenDiscriminant, TokenType};
use std::iter::Peekable;
use std::rc::Rc;

/// Functions and calls are capped at 255 parameters/arguments.
const MAX_ARITY: usize = 255;

pub struct Parser<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    tokens: Peekable<Source<TokenIter>>,
    next_expression_id: u64,
    last_seen_line: u64,
}

impl<TokenIter> Parser<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    /// Parse a whole program - a sequence of declarations terminated by `EOF`.
    ///
    /// The first syntax error aborts the parse.
    pub fn parse(tokens: TokenIter) -> Result<Vec<Statement>, ParseError> {
        let mut parser = Self::new(tokens);
        let mut statements = vec![];
        while !parser.is_at_end() {
            statements.push(parser.declaration()?);
        }
        Ok(statements)
    }

    /// Parse a single expression - the grammar used by the `parse` and
    /// `evaluate` commands.
    pub fn parse_expression(tokens: TokenIter) -> Result<Expression, ParseError> {
        Self::new(tokens).expression()
    }

    fn new(tokens: TokenIter) -> Self {
        Self {
            tokens: Source(tokens).peekable(),
            next_expression_id: 0,
            last_seen_line: 1,
        }
    }

    fn declaration(&mut self) -> Result<Statement, ParseError> {
        if self.advance_on_match(&[TokenDiscriminant::Class]).is_some() {
            self.class_declaration()
        } else if self.advance_on_match(&[TokenDiscriminant::Fun]).is_some() {
            self.function("function").map(Statement::FunctionDeclaration)
        } else if self.advance_on_match(&[TokenDiscriminant::Var]).is_some() {
            self.variable_declaration()
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect class name.")?;

        let superclass = if self.advance_on_match(&[TokenDiscriminant::Less]).is_some() {
            let identifier =
                self.expect(TokenDiscriminant::Identifier, "Expect superclass name.")?;
            Some(VariableReferenceExpression {
                id: self.next_id(),
                identifier,
            })
        } else {
            None
        };

        self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before class body.")?;
        let mut methods = vec![];
        while !self.check(TokenDiscriminant::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after class body.")?;

        Ok(Statement::ClassDeclaration(ClassDeclarationStatement {
            name,
            superclass,
            methods,
        }))
    }

    fn variable_declaration(&mut self) -> Result<Statement, ParseError> {
        let identifier = self.expect(TokenDiscriminant::Identifier, "Expect variable name.")?;
        let mut initializer = None;
        if self.advance_on_match(&[TokenDiscriminant::Equal]).is_some() {
            initializer = Some(self.expression()?);
        }
        self.expect(
            TokenDiscriminant::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Statement::VariableDeclaration(
            VariableDeclarationStatement {
                identifier,
                initializer,
            },
        ))
    }

    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDeclarationStatement>, ParseError> {
        let name = self.expect(
            TokenDiscriminant::Identifier,
            format!("Expect {kind} name."),
        )?;
        self.expect(
            TokenDiscriminant::LeftParen,
            format!("Expect '(' after {kind} name."),
        )?;

        let mut parameters = vec![];
        if !self.check(TokenDiscriminant::RightParen) {
            loop {
                if parameters.len() >= MAX_ARITY {
                    return Err(self.error_at_peek("Can't have more than 255 parameters."));
                }
                parameters.push(
                    self.expect(TokenDiscriminant::Identifier, "Expect parameter name.")?,
                );
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after parameters.")?;

        self.expect(
            TokenDiscriminant::LeftBrace,
            format!("Expect '{{' before {kind} body."),
        )?;
        let body = self.block_statement()?;

        Ok(Rc::new(FunctionDeclarationStatement {
            name,
            parameters,
            body: body.0,
        }))
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        if self.advance_on_match(&[TokenDiscriminant::Print]).is_some() {
            self.print_statement().map(Statement::Print)
        } else if self.advance_on_match(&[TokenDiscriminant::While]).is_some() {
            self.while_statement().map(Statement::While)
        } else if self.advance_on_match(&[TokenDiscriminant::For]).is_some() {
            self.for_statement()
        } else if self.advance_on_match(&[TokenDiscriminant::If]).is_some() {
            self.if_else_statement().map(Statement::IfElse)
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Return]) {
            self.return_statement(keyword).map(Statement::Return)
        } else if self
            .advance_on_match(&[TokenDiscriminant::LeftBrace])
            .is_some()
        {
            self.block_statement().map(Statement::Block)
        } else {
            self.expression_statement().map(Statement::Expression)
        }
    }

    fn for_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'for'.")?;
        let initializer = if self
            .advance_on_match(&[TokenDiscriminant::Semicolon])
            .is_some()
        {
            None
        } else if self.advance_on_match(&[TokenDiscriminant::Var]).is_some() {
            Some(self.variable_declaration()?)
        } else {
            Some(Statement::Expression(self.expression_statement()?))
        };
        let condition = if self.check(TokenDiscriminant::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenDiscriminant::Semicolon,
            "Expect ';' after loop condition.",
        )?;
        let increment = if self.check(TokenDiscriminant::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after for clauses.")?;
        let mut body = self.statement()?;

        // De-sugar the for loop into an equivalent while loop.
        if let Some(increment) = increment {
            body = Statement::Block(BlockStatement(vec![
                body,
                Statement::Expression(ExpressionStatement(increment)),
            ]))
        }

        body = Statement::While(WhileStatement {
            condition: condition.unwrap_or_else(|| Expression::boolean(true)),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Statement::Block(BlockStatement(vec![initializer, body]))
        }

        Ok(body)
    }

    fn block_statement(&mut self) -> Result<BlockStatement, ParseError> {
        let mut statements = vec![];
        while !self.check(TokenDiscriminant::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after block.")?;
        Ok(BlockStatement(statements))
    }

    fn while_statement(&mut self) -> Result<WhileStatement, ParseError> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Ok(WhileStatement {
            condition,
            body: Box::new(body),
        })
    }

    fn if_else_statement(&mut self) -> Result<IfElseStatement, ParseError> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(
            TokenDiscriminant::RightParen,
            "Expect ')' after if condition.",
        )?;
        let if_branch = self.statement()?;
        let mut else_branch = None;
        if self.advance_on_match(&[TokenDiscriminant::Else]).is_some() {
            else_branch = Some(Box::new(self.statement()?));
        }
        Ok(IfElseStatement {
            condition,
            if_branch: Box::new(if_branch),
            else_branch,
        })
    }

    fn return_statement(&mut self, keyword: Token) -> Result<ReturnStatement, ParseError> {
        let mut value = None;
        if !self.check(TokenDiscriminant::Semicolon) {
            value = Some(self.expression()?);
        }
        self.expect(
            TokenDiscriminant::Semicolon,
            "Expect ';' after return value.",
        )?;
        Ok(ReturnStatement { keyword, value })
    }

    fn print_statement(&mut self) -> Result<PrintStatement, ParseError> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after expression.")?;
        Ok(PrintStatement(expr))
    }

    fn expression_statement(&mut self) -> Result<ExpressionStatement, ParseError> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after expression.")?;
        Ok(ExpressionStatement(expr))
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expression, ParseError> {
        let expr = self.or()?;

        if let Some(equals) = self.advance_on_match(&[TokenDiscriminant::Equal]) {
            // The right-hand side is parsed before the target is validated.
            let value = self.assignment()?;
            return match expr {
                Expression::VariableReference(variable) => Ok(Expression::variable_assignment(
                    self.next_id(),
                    variable.identifier,
                    value,
                )),
                Expression::PropertyGet(get) => {
                    Ok(Expression::property_set(get.object, get.name, value))
                }
                _ => Err(ParseError::new(&equals, "Invalid assignment target.")),
            };
        }
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.and()?;

        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::Or]) {
            expr = Expression::logical(expr, operator, self.and()?);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.equality()?;

        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::And]) {
            expr = Expression::logical(expr, operator, self.equality()?);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.comparison()?;

        while let Some(operator) = self.advance_on_match(&[
            TokenDiscriminant::BangEqual,
            TokenDiscriminant::EqualEqual,
        ]) {
            expr = Expression::binary(expr, operator, self.comparison()?);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.term()?;

        while let Some(operator) = self.advance_on_match(&[
            TokenDiscriminant::Greater,
            TokenDiscriminant::GreaterEqual,
            TokenDiscriminant::Less,
            TokenDiscriminant::LessEqual,
        ]) {
            expr = Expression::binary(expr, operator, self.term()?);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.factor()?;

        while let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Minus, TokenDiscriminant::Plus])
        {
            expr = Expression::binary(expr, operator, self.factor()?);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.unary()?;

        while let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Slash, TokenDiscriminant::Star])
        {
            expr = Expression::binary(expr, operator, self.unary()?);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        if let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Bang, TokenDiscriminant::Minus])
        {
            Ok(Expression::unary(operator, self.unary()?))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self
                .advance_on_match(&[TokenDiscriminant::LeftParen])
                .is_some()
            {
                expr = self.finish_call(expr)?;
            } else if self.advance_on_match(&[TokenDiscriminant::Dot]).is_some() {
                let name = self.expect(
                    TokenDiscriminant::Identifier,
                    "Expect property name after '.'.",
                )?;
                expr = Expression::property_get(expr, name);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expression) -> Result<Expression, ParseError> {
        let mut arguments = vec![];
        if !self.check(TokenDiscriminant::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    return Err(self.error_at_peek("Can't have more than 255 arguments."));
                }
                arguments.push(self.expression()?);
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        let closing_parenthesis =
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after arguments.")?;
        Ok(Expression::call(callee, closing_parenthesis, arguments))
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        if self.advance_on_match(&[TokenDiscriminant::True]).is_some() {
            Ok(Expression::boolean(true))
        } else if self.advance_on_match(&[TokenDiscriminant::False]).is_some() {
            Ok(Expression::boolean(false))
        } else if self.advance_on_match(&[TokenDiscriminant::Nil]).is_some() {
            Ok(Expression::nil())
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Number]) {
            match t.into_ty() {
                TokenType::Number(n) => Ok(Expression::number(n)),
                _ => unreachable!(),
            }
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::String]) {
            match t.into_ty() {
                TokenType::String(s) => Ok(Expression::string(s)),
                _ => unreachable!(),
            }
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Identifier]) {
            Ok(Expression::variable_reference(self.next_id(), t))
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::This]) {
            Ok(Expression::this(self.next_id(), keyword))
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Super]) {
            self.expect(TokenDiscriminant::Dot, "Expect '.' after 'super'.")?;
            let method = self.expect(
                TokenDiscriminant::Identifier,
                "Expect superclass method name.",
            )?;
            Ok(Expression::superclass_method(self.next_id(), keyword, method))
        } else if self
            .advance_on_match(&[TokenDiscriminant::LeftParen])
            .is_some()
        {
            let expr = self.expression()?;
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after expression.")?;
            Ok(Expression::grouping(expr))
        } else {
            Err(self.error_at_peek("Expect expression."))
        }
    }

    fn next_id(&mut self) -> ExpressionId {
        let id = ExpressionId::new(self.next_expression_id);
        self.next_expression_id += 1;
        id
    }

    fn advance_on_match(&mut self, token_types: &[TokenDiscriminant]) -> Option<Token> {
        let upcoming = self.tokens.peek()?;
        if token_types.contains(&upcoming.discriminant()) {
            let token = self.tokens.next()?;
            self.last_seen_line = token.line();
            return Some(token);
        }
        None
    }

    fn expect(
        &mut self,
        token_type: TokenDiscriminant,
        message: impl Into<String>,
    ) -> Result<Token, ParseError> {
        self.advance_on_match(&[token_type])
            .ok_or_else(|| self.error_at_peek(message))
    }

    fn check(&mut self, token_type: TokenDiscriminant) -> bool {
        self.tokens
            .peek()
            .map(|t| t.discriminant() == token_type)
            .unwrap_or(false)
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens
            .peek()
            .map(|t| t.discriminant() == TokenDiscriminant::Eof)
            .unwrap_or(true)
    }

    fn error_at_peek(&mut self, message: impl Into<String>) -> ParseError {
        match self.tokens.peek() {
            Some(token) => ParseError::new(token, message),
            // The scanner guarantees a final EOF token, so this only triggers
            // on an already-drained stream.
            None => ParseError {
                line: self.last_seen_line,
                location: "at end".into(),
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("[line {line}] Error {location}: {message}")]
pub struct ParseError {
    line: u64,
    location: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.discriminant() == TokenDiscriminant::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme())
        };
        Self {
            line: token.line(),
            location,
            message: message.into(),
        }
    }
}

/// The parser does not care about trivia tokens, nor about the scanner's
/// error tokens (the session reports those before parsing starts). `Source`
/// wraps the raw token stream and makes both invisible to the parser.
struct Source<TokenIter>(TokenIter)
where
    TokenIter: Iterator<Item = Token>;

impl<TokenIter> Iterator for Source<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.0.next() {
                None => break None,
                Some(t)
                    if matches!(
                        t.discriminant(),
                        TokenDiscriminant::Trivia | TokenDiscriminant::SyntaxError
                    ) =>
                {
                    continue
                }
                Some(t) => break Some(t),
            }
        }
    }
}
