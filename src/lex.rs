//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`CharSource`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco se descartan durante esta operación. Cada token emitido está
//! asociado a la posición de su primer carácter en el código fuente original.
//!
//! # Contenido de un token
//! Operadores, puntuación y palabras clave se identifican por el hecho de lo
//! que son y no incluyen lexemas. Los identificadores y las constantes enteras
//! sí incluyen su lexema original. Una constante entera no se valida aquí: su
//! texto se interpreta (decimal, octal o hexadecimal) y se verifica contra el
//! rango de `int` durante el análisis sintáctico.
//!
//! # Errores
//! El lexer nunca falla. Cualquier secuencia de caracteres que no sea espacio
//! en blanco, puntuación ni operador se emite como identificador, y es el
//! parser quien la rechaza si no tiene sentido en su contexto.

use crate::source::{CharSource, Located, Position};
use log::trace;
use std::{
    fmt::{self, Display},
    iter::Peekable,
    str::FromStr,
    vec,
};

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(String),

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal de entero, tal y como aparece en el código fuente.
    IntLiteral(String),

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `;`
    Semicolon,

    /// `-`
    Minus,

    /// `~`
    Tilde,

    /// `!`
    Bang,

    /// `+`
    Plus,

    /// `/`
    Slash,

    /// `*`
    Times,

    /// `&&`
    And,

    /// `||`
    Or,

    /// `==`
    Equal,

    /// `!=`
    NotEqual,

    /// `<`
    Less,

    /// `>`
    Greater,

    /// `<=`
    LessOrEqual,

    /// `>=`
    GreaterOrEqual,

    /// `&`
    Ampersand,

    /// `|`
    Pipe,

    /// `=`
    Assign,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        let punctuation = match self {
            Id(id) => return write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => return write!(fmt, "keyword `{}`", keyword),
            IntLiteral(literal) => return write!(fmt, "literal `{}`", literal),
            OpenCurly => "{",
            CloseCurly => "}",
            OpenParen => "(",
            CloseParen => ")",
            Semicolon => ";",
            Minus => "-",
            Tilde => "~",
            Bang => "!",
            Plus => "+",
            Slash => "/",
            Times => "*",
            And => "&&",
            Or => "||",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessOrEqual => "<=",
            GreaterOrEqual => ">=",
            Ampersand => "&",
            Pipe => "|",
            Assign => "=",
        };

        write!(fmt, "`{}`", punctuation)
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Int,
    Return,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Keyword::Int => "int",
            Keyword::Return => "return",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        const KEYWORDS: &[(&str, Keyword)] = &[("int", Int), ("return", Return)];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Fuente abstracta de tokens, tal y como la consume el parser.
///
/// El parser requiere a lo sumo un token de lookahead. Además del
/// token actual, toda fuente debe poder informar la posición de este
/// para fines de diagnóstico.
pub trait TokenSource {
    /// Avanza al siguiente token y lo retorna, o `None` al final de la entrada.
    fn next_token(&mut self) -> Option<Token>;

    /// Observa lo que retornaría [`TokenSource::next_token()`] sin avanzar.
    fn peek_token(&mut self) -> Option<&Token>;

    /// Último token producido por [`TokenSource::next_token()`].
    fn current(&self) -> Option<&Token>;

    /// Posición del token actual, o del final de la entrada si ya se agotó.
    fn position(&self) -> Position;
}

/// Escáner de tokens sobre un flujo de caracteres.
pub struct Lexer<S> {
    source: S,
    next: Position,
    current: Option<Located<Token>>,
    peeked: Option<Option<Located<Token>>>,
    position: Position,
}

impl<S: CharSource> Lexer<S> {
    /// Crea un lexer al inicio de un flujo.
    pub fn new(source: S) -> Self {
        Lexer {
            source,
            next: Position::default(),
            current: None,
            peeked: None,
            position: Position::default(),
        }
    }

    /// Número de línea del token actual.
    pub fn line(&self) -> u32 {
        self.position.line()
    }

    /// Número de columna del token actual.
    pub fn column(&self) -> u32 {
        self.position.column()
    }

    /// Intenta construir un siguiente token.
    fn scan(&mut self) -> Option<Located<Token>> {
        let mut lexeme = String::new();
        let mut start = self.next;

        while let Some(c) = self.source.peek_char() {
            if lexeme.is_empty() {
                if c.is_whitespace() {
                    self.bump();
                    continue;
                }

                start = self.next;
                if let Some(token) = self.operator(c) {
                    return Some(Located::at(token, start));
                }
            } else if c.is_whitespace() || is_operator_char(c) {
                // El carácter que termina el lexema no se consume
                break;
            }

            lexeme.push(c);
            self.bump();
        }

        if lexeme.is_empty() {
            None
        } else {
            Some(Located::at(classify(lexeme), start))
        }
    }

    /// Reconoce puntuación y operadores que inician con `c`.
    ///
    /// Los operadores de dos caracteres requieren un carácter adicional
    /// de lookahead luego de consumir el primero.
    fn operator(&mut self, c: char) -> Option<Token> {
        use Token::*;

        let single = PUNCTUATION
            .iter()
            .find(|&&(punctuation, _)| punctuation == c)
            .map(|(_, token)| token.clone())?;

        self.bump();

        let double = match (&single, self.source.peek_char()) {
            (Bang, Some('=')) => NotEqual,
            (Assign, Some('=')) => Equal,
            (Less, Some('=')) => LessOrEqual,
            (Greater, Some('=')) => GreaterOrEqual,
            (Ampersand, Some('&')) => And,
            (Pipe, Some('|')) => Or,
            _ => return Some(single),
        };

        self.bump();
        Some(double)
    }

    /// Consume un carácter, actualizando la posición siguiente.
    fn bump(&mut self) {
        if let Some(c) = self.source.next_char() {
            self.next = match c {
                '\n' => self.next.newline(),
                _ => self.next.advance(),
            };
        }
    }
}

impl<S: CharSource> TokenSource for Lexer<S> {
    fn next_token(&mut self) -> Option<Token> {
        let next = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.scan(),
        };

        self.position = match &next {
            Some(token) => token.position(),
            None => self.next,
        };

        if let Some(token) = &next {
            trace!("{} at {}", token.val(), token.position());
        }

        self.current = next;
        self.current().cloned()
    }

    fn peek_token(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan());
        }

        self.peeked.as_ref().and_then(|peeked| peeked.as_ref()).map(Located::val)
    }

    fn current(&self) -> Option<&Token> {
        self.current.as_ref().map(Located::val)
    }

    fn position(&self) -> Position {
        self.position
    }
}

impl<S: CharSource> Iterator for Lexer<S> {
    type Item = Located<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()?;
        self.current.clone()
    }
}

/// Fuente de tokens en memoria.
///
/// Permite alimentar al parser con secuencias arbitrarias de tokens
/// sin pasar por el lexer.
pub struct TokenBuffer {
    tokens: Peekable<vec::IntoIter<Located<Token>>>,
    current: Option<Located<Token>>,
    end: Position,
}

impl TokenBuffer {
    /// Construye a partir de tokens sin ubicación. Se les asignan
    /// columnas consecutivas en la línea 1.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut position = Position::default();
        let located = tokens
            .into_iter()
            .map(|token| {
                let token = Located::at(token, position);
                position = position.advance();
                token
            })
            .collect();

        TokenBuffer::located(located)
    }

    /// Construye a partir de tokens con ubicaciones arbitrarias.
    pub fn located(tokens: Vec<Located<Token>>) -> Self {
        let end = tokens
            .last()
            .map(|last| last.position().advance())
            .unwrap_or_default();

        TokenBuffer {
            tokens: tokens.into_iter().peekable(),
            current: None,
            end,
        }
    }
}

impl TokenSource for TokenBuffer {
    fn next_token(&mut self) -> Option<Token> {
        self.current = self.tokens.next();
        self.current().cloned()
    }

    fn peek_token(&mut self) -> Option<&Token> {
        self.tokens.peek().map(Located::val)
    }

    fn current(&self) -> Option<&Token> {
        self.current.as_ref().map(Located::val)
    }

    fn position(&self) -> Position {
        match &self.current {
            Some(token) => token.position(),
            None => self.end,
        }
    }
}

/// Puntuación y operadores de un solo carácter. Los de dos caracteres
/// siempre inician con uno de estos.
const PUNCTUATION: &[(char, Token)] = &[
    ('{', Token::OpenCurly),
    ('}', Token::CloseCurly),
    ('(', Token::OpenParen),
    (')', Token::CloseParen),
    (';', Token::Semicolon),
    ('-', Token::Minus),
    ('~', Token::Tilde),
    ('+', Token::Plus),
    ('/', Token::Slash),
    ('*', Token::Times),
    ('!', Token::Bang),
    ('=', Token::Assign),
    ('<', Token::Less),
    ('>', Token::Greater),
    ('&', Token::Ampersand),
    ('|', Token::Pipe),
];

/// Clasifica un lexema completo como palabra clave, literal o identificador.
fn classify(lexeme: String) -> Token {
    if let Ok(keyword) = Keyword::from_str(&lexeme) {
        Token::Keyword(keyword)
    } else if is_int_literal(&lexeme) {
        Token::IntLiteral(lexeme)
    } else {
        Token::Id(lexeme)
    }
}

/// Determina si un lexema tiene forma de constante entera.
///
/// Se aceptan dígitos decimales, o bien dígitos hexadecimales tras un
/// prefijo `0x`/`0X`. El prefijo en sí no se revisa como dígito.
fn is_int_literal(lexeme: &str) -> bool {
    let hex = lexeme.starts_with("0x") || lexeme.starts_with("0X");
    lexeme
        .char_indices()
        .all(|(i, c)| c.is_ascii_digit() || (hex && (i < 2 || c.is_ascii_hexdigit())))
}

/// Determina si un carácter inicia un token de puntuación u operador.
fn is_operator_char(c: char) -> bool {
    PUNCTUATION.iter().any(|&(punctuation, _)| punctuation == c)
}
