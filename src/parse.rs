//! Análisis sintáctico.
//!
//! Parser descendente recursivo. Las expresiones se analizan por
//! escalada de precedencia: cada nivel de la gramática recurre únicamente
//! al siguiente nivel más fuerte, de modo que el árbol resultante ya
//! refleja la precedencia correcta sin necesidad de tablas en tiempo de
//! análisis.
//!
//! ```text
//! program     := function EOF
//! function    := "int" identifier "(" ")" "{" statement "}"
//! statement   := "return" expr ";"
//! expr        := logical_or
//! logical_or  := logical_and ( "||" logical_and )*
//! logical_and := equality ( "&&" equality )*
//! equality    := relational ( ("==" | "!=") relational )*
//! relational  := additive ( ("<" | ">" | "<=" | ">=") additive )*
//! additive    := term ( ("+" | "-") term )*
//! term        := factor ( ("*" | "/") factor )*
//! factor      := "(" expr ")" | unary_op factor | integer
//! unary_op    := "-" | "~" | "!"
//! ```
//!
//! Todos los operadores binarios asocian a la izquierda. El primer error
//! aborta el análisis completo; no hay recuperación ni árboles parciales.

use log::debug;
use std::{
    convert::TryFrom,
    fmt::{self, Display},
};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Function, Program, Statement, UnaryOp},
    lex::{Keyword, Token, TokenSource},
    source::Located,
};

/// Lo que el parser esperaba encontrar al fallar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Token(Token),
    Identifier,
    Expression,
    EndOfInput,
}

impl Display for Expected {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(token) => token.fmt(fmt),
            Expected::Identifier => fmt.write_str("an identifier"),
            Expected::Expression => fmt.write_str("an expression"),
            Expected::EndOfInput => fmt.write_str("end of input"),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Se encontró un token que no satisface la producción actual.
    #[error("Expected {expected}, found {}", describe(.found))]
    UnexpectedToken {
        expected: Expected,
        found: Option<Token>,
    },

    /// Una constante entera no es representable como `int`, ya sea por
    /// exceder su máximo o por no ser un número válido en su base.
    #[error("Integer literal `{0}` overflows `int`, valid range is [0, {}]", i32::MAX)]
    IntegerOverflow(String),
}

fn describe(found: &Option<Token>) -> String {
    match found {
        Some(token) => token.to_string(),
        None => String::from("end of input"),
    }
}

pub type Parse<T> = Result<T, Located<ParserError>>;

/// Analiza un programa completo a partir de una fuente de tokens.
pub fn parse<T: TokenSource>(tokens: T) -> Parse<Program> {
    Parser::new(tokens).program()
}

const LOGICAL_OR: &[(Token, BinOp)] = &[(Token::Or, BinOp::Or)];

const LOGICAL_AND: &[(Token, BinOp)] = &[(Token::And, BinOp::And)];

const EQUALITY: &[(Token, BinOp)] = &[
    (Token::Equal, BinOp::Equal),
    (Token::NotEqual, BinOp::NotEqual),
];

const RELATIONAL: &[(Token, BinOp)] = &[
    (Token::Less, BinOp::Less),
    (Token::Greater, BinOp::Greater),
    (Token::LessOrEqual, BinOp::LessOrEqual),
    (Token::GreaterOrEqual, BinOp::GreaterOrEqual),
];

const ADDITIVE: &[(Token, BinOp)] = &[(Token::Plus, BinOp::Add), (Token::Minus, BinOp::Sub)];

const TERM: &[(Token, BinOp)] = &[(Token::Times, BinOp::Mul), (Token::Slash, BinOp::Div)];

pub struct Parser<T> {
    tokens: T,
}

impl<T: TokenSource> Parser<T> {
    pub fn new(tokens: T) -> Self {
        Parser { tokens }
    }

    pub fn program(&mut self) -> Parse<Program> {
        let function = self.function()?;

        match self.tokens.next_token() {
            None => Ok(Program { function }),
            found => self.unexpected(Expected::EndOfInput, found),
        }
    }

    pub fn function(&mut self) -> Parse<Function> {
        self.keyword(Keyword::Int)?;
        let name = self.id()?;

        self.expect(Token::OpenParen)?;
        self.expect(Token::CloseParen)?;

        self.expect(Token::OpenCurly)?;
        let body = self.statement()?;
        self.expect(Token::CloseCurly)?;

        debug!("Parsed function `{}`", name);
        Ok(Function { name, body })
    }

    pub fn statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::Return)?;
        let expr = self.expr()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Return(expr))
    }

    pub fn expr(&mut self) -> Parse<Expr> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::logical_and, LOGICAL_OR)
    }

    fn logical_and(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::equality, LOGICAL_AND)
    }

    fn equality(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::relational, EQUALITY)
    }

    fn relational(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::additive, RELATIONAL)
    }

    fn additive(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::term, ADDITIVE)
    }

    fn term(&mut self) -> Parse<Expr> {
        self.binary_chain(Self::factor, TERM)
    }

    fn factor(&mut self) -> Parse<Expr> {
        match self.tokens.next_token() {
            Some(Token::OpenParen) => {
                let expr = self.expr()?;
                self.expect(Token::CloseParen)?;

                Ok(expr)
            }

            Some(Token::Minus) => Ok(Expr::unary(UnaryOp::Negate, self.factor()?)),
            Some(Token::Tilde) => Ok(Expr::unary(UnaryOp::Complement, self.factor()?)),
            Some(Token::Bang) => Ok(Expr::unary(UnaryOp::Not, self.factor()?)),

            Some(Token::IntLiteral(literal)) => self.integer(literal).map(Expr::Integer),

            found => self.unexpected(Expected::Expression, found),
        }
    }

    /// Regla común a todos los niveles de operadores binarios:
    /// `operand ( op operand )*`, plegando hacia la izquierda.
    fn binary_chain<F>(&mut self, mut operand: F, operators: &[(Token, BinOp)]) -> Parse<Expr>
    where
        F: FnMut(&mut Self) -> Parse<Expr>,
    {
        let mut expr = operand(self)?;
        while let Some(op) = self.peek_operator(operators) {
            self.tokens.next_token();

            let right = operand(self)?;
            expr = Expr::binary(expr, op, right);
        }

        Ok(expr)
    }

    fn peek_operator(&mut self, operators: &[(Token, BinOp)]) -> Option<BinOp> {
        let next = self.tokens.peek_token()?;
        operators
            .iter()
            .find(|(token, _)| token == next)
            .map(|&(_, op)| op)
    }

    /// Interpreta el texto de una constante entera.
    ///
    /// `0x`/`0X` indica base 16, un `0` inicial seguido de más dígitos
    /// indica base 8, y cualquier otro caso es decimal. El valor se
    /// calcula en 64 bits sin signo antes de compararse contra `i32::MAX`.
    /// Dígitos inválidos para la base (`09`, `0x`) también se reportan
    /// como desbordamiento.
    fn integer(&self, literal: String) -> Parse<i32> {
        let (digits, radix) = if let Some(hex) = literal
            .strip_prefix("0x")
            .or_else(|| literal.strip_prefix("0X"))
        {
            (hex, 16)
        } else if literal.len() > 1 && literal.starts_with('0') {
            (&literal[1..], 8)
        } else {
            (literal.as_str(), 10)
        };

        let value = u64::from_str_radix(digits, radix)
            .ok()
            .and_then(|value| i32::try_from(value).ok());

        match value {
            Some(value) => Ok(value),
            None => self.fail(ParserError::IntegerOverflow(literal)),
        }
    }

    fn id(&mut self) -> Parse<String> {
        match self.tokens.next_token() {
            Some(Token::Id(id)) => Ok(id),
            found => self.unexpected(Expected::Identifier, found),
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.tokens.next_token() {
            Some(found) if found == token => Ok(()),
            found => self.unexpected(Expected::Token(token), found),
        }
    }

    fn unexpected<U>(&self, expected: Expected, found: Option<Token>) -> Parse<U> {
        self.fail(ParserError::UnexpectedToken { expected, found })
    }

    fn fail<U>(&self, error: ParserError) -> Parse<U> {
        Err(Located::at(error, self.tokens.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lex::{Lexer, TokenBuffer},
        source::Position,
    };

    fn expr(source: &str) -> Parse<Expr> {
        Parser::new(Lexer::new(source.chars().peekable())).expr()
    }

    fn program(source: &str) -> Parse<Program> {
        parse(Lexer::new(source.chars().peekable()))
    }

    fn int(value: i32) -> Expr {
        Expr::Integer(value)
    }

    fn failure(result: Parse<impl fmt::Debug>) -> (ParserError, Position) {
        let (position, error) = result.unwrap_err().split();
        (error, position)
    }

    fn basic_function() -> Vec<Token> {
        vec![
            Token::Keyword(Keyword::Int),
            Token::Id(String::from("main")),
            Token::OpenParen,
            Token::CloseParen,
            Token::OpenCurly,
            Token::Keyword(Keyword::Return),
            Token::IntLiteral(String::from("0")),
            Token::Semicolon,
            Token::CloseCurly,
        ]
    }

    #[test]
    fn integer_literals_in_every_radix() {
        for &n in &[0u32, 1, 7, 8, 9, 42, 255, 4096, 65535, 1 << 30, i32::MAX as u32] {
            let expected = Ok(int(n as i32));

            assert_eq!(expr(&n.to_string()), expected);
            assert_eq!(expr(&format!("{:#x}", n)), expected);
            assert_eq!(expr(&format!("0X{:X}", n)), expected);
            assert_eq!(expr(&format!("0{:o}", n)), expected);
        }
    }

    #[test]
    fn integer_overflow_in_every_radix() {
        let n = 1u64 << 31;
        for literal in &[n.to_string(), format!("{:#x}", n), format!("0{:o}", n)] {
            assert_eq!(
                failure(expr(literal)).0,
                ParserError::IntegerOverflow(literal.clone())
            );
        }

        let huge = "99999999999999999999999";
        assert_eq!(
            failure(expr(huge)).0,
            ParserError::IntegerOverflow(String::from(huge))
        );
    }

    #[test]
    fn overflow_is_located_at_the_literal() {
        let (error, position) = failure(program("int main() {\n  return 1 + 2147483648;\n}"));

        assert_eq!(error, ParserError::IntegerOverflow(String::from("2147483648")));
        assert_eq!(position, Position::new(2, 14));
    }

    #[test]
    fn digits_invalid_in_their_radix_overflow() {
        for literal in &["0x", "0X", "09", "0778"] {
            let (error, position) = failure(expr(literal));

            assert_eq!(error, ParserError::IntegerOverflow(literal.to_string()));
            assert_eq!(position, Position::new(1, 1));
        }
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(
            expr("-~!5"),
            Ok(Expr::unary(
                UnaryOp::Negate,
                Expr::unary(UnaryOp::Complement, Expr::unary(UnaryOp::Not, int(5)))
            ))
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let operators = [
            ("+", BinOp::Add),
            ("-", BinOp::Sub),
            ("*", BinOp::Mul),
            ("/", BinOp::Div),
            ("==", BinOp::Equal),
            ("!=", BinOp::NotEqual),
            ("<", BinOp::Less),
            ("<=", BinOp::LessOrEqual),
            (">", BinOp::Greater),
            (">=", BinOp::GreaterOrEqual),
            ("&&", BinOp::And),
            ("||", BinOp::Or),
        ];

        for &(text, op) in &operators {
            let source = format!("1 {0} 2 {0} 3", text);
            let expected = Expr::binary(Expr::binary(int(1), op, int(2)), op, int(3));

            assert_eq!(expr(&source), Ok(expected), "{}", source);
        }
    }

    #[test]
    fn mixed_operators_on_the_same_level() {
        assert_eq!(
            expr("1 - 2 + 3"),
            Ok(Expr::binary(
                Expr::binary(int(1), BinOp::Sub, int(2)),
                BinOp::Add,
                int(3)
            ))
        );
    }

    #[test]
    fn precedence_tiers() {
        let expected = Expr::binary(
            int(1),
            BinOp::Or,
            Expr::binary(
                int(2),
                BinOp::And,
                Expr::binary(
                    int(3),
                    BinOp::NotEqual,
                    Expr::binary(
                        int(4),
                        BinOp::GreaterOrEqual,
                        Expr::binary(
                            int(5),
                            BinOp::Sub,
                            Expr::binary(
                                Expr::binary(int(6), BinOp::Add, int(7)),
                                BinOp::Mul,
                                Expr::unary(UnaryOp::Complement, int(8)),
                            ),
                        ),
                    ),
                ),
            ),
        );

        assert_eq!(expr("1 || 2 && 3 != 4 >= 5 - (6 + 7) * ~8"), Ok(expected));
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            expr("(1 + 2) * 3"),
            Ok(Expr::binary(
                Expr::binary(int(1), BinOp::Add, int(2)),
                BinOp::Mul,
                int(3)
            ))
        );

        assert_eq!(expr("((((7))))"), Ok(int(7)));
    }

    #[test]
    fn basic_program() {
        let expected = Program {
            function: Function {
                name: String::from("main"),
                body: Statement::Return(int(0)),
            },
        };

        assert_eq!(parse(TokenBuffer::new(basic_function())), Ok(expected));
    }

    #[test]
    fn removing_any_token_fails() {
        let tokens = basic_function();
        for i in 0..tokens.len() {
            let mut bad = tokens.clone();
            bad.remove(i);

            match parse(TokenBuffer::new(bad)) {
                Err(error) => assert!(
                    matches!(error.val(), ParserError::UnexpectedToken { .. }),
                    "token {}: {}",
                    i,
                    error
                ),
                Ok(program) => panic!("token {}: parsed as {:?}", i, program),
            }
        }
    }

    #[test]
    fn missing_semicolon() {
        let (error, position) = failure(program("int main() { return 2 }"));

        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::Token(Token::Semicolon),
                found: Some(Token::CloseCurly),
            }
        );

        assert_eq!(position, Position::new(1, 23));
        assert_eq!(error.to_string(), "Expected `;`, found `}`");
    }

    #[test]
    fn missing_closing_brace() {
        let (error, position) = failure(program("int main() {\n    return 2;\n"));

        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::Token(Token::CloseCurly),
                found: None,
            }
        );

        assert_eq!(position, Position::new(3, 1));
        assert_eq!(error.to_string(), "Expected `}`, found end of input");
    }

    #[test]
    fn trailing_tokens() {
        let (error, _) = failure(program("int main() { return 2; } int"));

        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::EndOfInput,
                found: Some(Token::Keyword(Keyword::Int)),
            }
        );
    }

    #[test]
    fn missing_operand() {
        let (error, _) = failure(expr("1 +"));
        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::Expression,
                found: None,
            }
        );

        let (error, _) = failure(program("int main() { return 1 = 2; }"));
        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::Token(Token::Semicolon),
                found: Some(Token::Assign),
            }
        );
    }

    #[test]
    fn function_name_must_be_an_identifier() {
        let (error, position) = failure(program("int return() { return 0; }"));

        assert_eq!(
            error,
            ParserError::UnexpectedToken {
                expected: Expected::Identifier,
                found: Some(Token::Keyword(Keyword::Return)),
            }
        );

        assert_eq!(position, Position::new(1, 5));
    }
}
