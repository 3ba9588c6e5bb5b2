// src/sema/notation.rs
//
// Compact type notation, as written on the command line and in tests.
//
//   any  String  HTMLCanvasElement  Widget        named types
//   Array<Int>  Map<String,Int>  Promise<void>    generic containers
//   [Int,String]                                  tuple
//   {a:String,b:Int}                              object literal
//   (Int,String)=>void                            function
//   "canvas"  42  -1  true                        literal instances
//   GLEnum<"TEXTURE_2D">                          named GL constant
//
// The lexer and the recursive-descent parser are one pass; every error
// carries the byte span it refers to.

use std::iter::Peekable;
use std::str::CharIndices;

use miette::SourceSpan;

use crate::errors::NotationError;
use crate::sema::builtin::BuiltinType;
use crate::sema::function::{FunctionType, Signature};
use crate::sema::type_arena::{EventKind, TypeArena, TypeId, TypeKind, TypedArrayKind};
use crate::sema::value::Literal;

/// Parse `source` into a type interned in `arena`.
pub fn parse_type(arena: &mut TypeArena, source: &str) -> Result<TypeId, NotationError> {
    let mut parser = NotationParser::new(arena, source)?;
    let ty = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(ty)
}

/// Comma-separated list of types, e.g. call arguments. Empty input is an
/// empty list.
pub fn parse_type_list(arena: &mut TypeArena, source: &str) -> Result<Vec<TypeId>, NotationError> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parser = NotationParser::new(arena, source)?;
    let mut types = vec![parser.parse_type()?];
    while parser.match_punct(',')? {
        types.push(parser.parse_type()?);
    }
    parser.expect_eof()?;
    Ok(types)
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Str(String),
    Int(i64),
    Punct(char),
    Arrow,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    start: usize,
    end: usize,
}

impl Token {
    fn span(&self) -> SourceSpan {
        (self.start, self.end - self.start).into()
    }

    fn describe(&self) -> String {
        match &self.tok {
            Tok::Ident(name) => format!("'{}'", name),
            Tok::Str(s) => format!("\"{}\"", s),
            Tok::Int(i) => i.to_string(),
            Tok::Punct(c) => format!("'{}'", c),
            Tok::Arrow => "'=>'".to_string(),
            Tok::Eof => "end of input".to_string(),
        }
    }
}

struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.chars.peek().is_some_and(|(_, c)| pred(*c)) {
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Token, NotationError> {
        self.eat_while(char::is_whitespace);

        let Some((start, c)) = self.chars.next() else {
            let end = self.source.len();
            return Ok(Token {
                tok: Tok::Eof,
                start: end,
                end,
            });
        };

        let tok = match c {
            '<' | '>' | ',' | '(' | ')' | '[' | ']' | '{' | '}' | ':' => Tok::Punct(c),
            '=' => match self.chars.next() {
                Some((_, '>')) => Tok::Arrow,
                _ => {
                    return Err(NotationError::UnexpectedCharacter {
                        ch: c,
                        span: (start, 1).into(),
                    });
                }
            },
            '"' => {
                let body_start = start + 1;
                loop {
                    match self.chars.next() {
                        Some((i, '"')) => break Tok::Str(self.source[body_start..i].to_string()),
                        Some(_) => {}
                        None => {
                            return Err(NotationError::UnterminatedString {
                                span: (start, 1).into(),
                            });
                        }
                    }
                }
            }
            '-' | '0'..='9' => {
                self.eat_while(|c| c.is_ascii_digit());
                let end = self.offset();
                let text = &self.source[start..end];
                match text.parse::<i64>() {
                    Ok(i) => Tok::Int(i),
                    Err(_) => {
                        return Err(NotationError::InvalidNumber {
                            span: (start, end - start).into(),
                        });
                    }
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                self.eat_while(|c| c.is_alphanumeric() || c == '_');
                let end = self.offset();
                Tok::Ident(self.source[start..end].to_string())
            }
            other => {
                return Err(NotationError::UnexpectedCharacter {
                    ch: other,
                    span: (start, other.len_utf8()).into(),
                });
            }
        };

        Ok(Token {
            tok,
            start,
            end: self.offset(),
        })
    }
}

// ============================================================================
// Parser
// ============================================================================

struct NotationParser<'src, 'a> {
    lexer: Lexer<'src>,
    current: Token,
    arena: &'a mut TypeArena,
}

/// A type argument; `None` is `void`, only valid in return position and as
/// the content of a `Promise`.
type Arg = (Option<TypeId>, SourceSpan);

impl<'src, 'a> NotationParser<'src, 'a> {
    fn new(arena: &'a mut TypeArena, source: &'src str) -> Result<Self, NotationError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            arena,
        })
    }

    fn advance(&mut self) -> Result<Token, NotationError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check_punct(&self, c: char) -> bool {
        self.current.tok == Tok::Punct(c)
    }

    fn match_punct(&mut self, c: char) -> Result<bool, NotationError> {
        if self.check_punct(c) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expected(&self, what: &str) -> NotationError {
        NotationError::Expected {
            expected: what.to_string(),
            found: self.current.describe(),
            span: self.current.span(),
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), NotationError> {
        if self.match_punct(c)? {
            return Ok(());
        }
        Err(self.expected(&format!("'{}'", c)))
    }

    fn expect_eof(&self) -> Result<(), NotationError> {
        match self.current.tok {
            Tok::Eof => Ok(()),
            _ => Err(self.expected("end of input")),
        }
    }

    /// `items` separated by commas up to the closing `close`.
    fn parse_list<T>(
        &mut self,
        close: char,
        mut item: impl FnMut(&mut Self) -> Result<T, NotationError>,
    ) -> Result<Vec<T>, NotationError> {
        let mut items = Vec::new();
        if self.match_punct(close)? {
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            if self.match_punct(close)? {
                return Ok(items);
            }
            if !self.match_punct(',')? {
                return Err(self.expected(&format!("',' or '{}'", close)));
            }
        }
    }

    fn parse_type(&mut self) -> Result<TypeId, NotationError> {
        let (ty, span) = self.parse_type_or_void()?;
        ty.ok_or_else(|| NotationError::Expected {
            expected: "a type".to_string(),
            found: "'void'".to_string(),
            span,
        })
    }

    fn parse_type_or_void(&mut self) -> Result<Arg, NotationError> {
        let token = self.current.clone();
        let ty = match token.tok.clone() {
            Tok::Str(s) => {
                self.advance()?;
                self.arena.literal(TypeId::STRING, Literal::String(s))
            }
            Tok::Int(i) => {
                self.advance()?;
                self.arena.literal(TypeId::INT, Literal::Int(i))
            }
            Tok::Punct('[') => {
                self.advance()?;
                let items = self.parse_list(']', Self::parse_type)?;
                self.arena.tuple(Some(items))
            }
            Tok::Punct('{') => {
                self.advance()?;
                let members = self.parse_list('}', Self::parse_member)?;
                self.arena.object(members)
            }
            Tok::Punct('(') => {
                self.advance()?;
                let params = self.parse_list(')', Self::parse_type)?;
                if self.current.tok != Tok::Arrow {
                    return Err(self.expected("'=>'"));
                }
                self.advance()?;
                let (ret, _) = self.parse_type_or_void()?;
                self.arena
                    .function(FunctionType::new([Signature::new(params, ret)]))
            }
            Tok::Ident(name) if name == "void" => {
                self.advance()?;
                return Ok((None, token.span()));
            }
            Tok::Ident(name) => {
                self.advance()?;
                let args = if self.match_punct('<')? {
                    self.parse_list('>', Self::parse_type_or_void)?
                } else {
                    Vec::new()
                };
                self.named(&name, &token, &args)?
            }
            _ => return Err(self.expected("a type")),
        };
        let end = self.current.start.max(token.end);
        Ok((Some(ty), (token.start, end - token.start).into()))
    }

    fn parse_member(&mut self) -> Result<(String, TypeId), NotationError> {
        let key = match &self.current.tok {
            Tok::Ident(k) | Tok::Str(k) => k.clone(),
            _ => return Err(self.expected("a member name")),
        };
        self.advance()?;
        self.expect_punct(':')?;
        Ok((key, self.parse_type()?))
    }

    fn named(&mut self, name: &str, token: &Token, args: &[Arg]) -> Result<TypeId, NotationError> {
        let arity = |allowed: &[usize]| -> Result<(), NotationError> {
            if allowed.contains(&args.len()) {
                return Ok(());
            }
            Err(NotationError::TypeArgumentCount {
                name: name.to_string(),
                expected: allowed.iter().copied().max().unwrap_or(0),
                found: args.len(),
                span: token.span(),
            })
        };
        let values = |args: &[Arg]| -> Result<Vec<TypeId>, NotationError> {
            args.iter()
                .map(|(ty, span)| {
                    ty.ok_or_else(|| NotationError::Expected {
                        expected: "a type".to_string(),
                        found: "'void'".to_string(),
                        span: *span,
                    })
                })
                .collect()
        };

        let ty = match name {
            "any" => {
                arity(&[0])?;
                TypeId::ANY
            }
            "true" | "false" => {
                arity(&[0])?;
                self.arena.literal(TypeId::BOOLEAN, Literal::Bool(name == "true"))
            }
            "function" => {
                arity(&[0])?;
                self.arena.function(FunctionType::generic())
            }
            "Array" | "Set" | "IDBRequest" | "Object" => {
                arity(&[0, 1])?;
                let content = values(args)?.first().copied();
                match name {
                    "Array" => self.arena.array(content),
                    "Set" => self.arena.set(content),
                    "IDBRequest" => self.arena.request(content),
                    _ => self.arena.map_like_object(content),
                }
            }
            "Map" => {
                arity(&[0, 2])?;
                let kv = values(args)?;
                self.arena.map(kv.first().copied(), kv.get(1).copied())
            }
            "Promise" => {
                arity(&[0, 1])?;
                match args.first() {
                    Some((None, _)) => self.arena.void_promise(),
                    Some((content, _)) => self.arena.promise(*content),
                    None => self.arena.promise(None),
                }
            }
            "Tuple" => {
                let items = values(args)?;
                self.arena.tuple(Some(items))
            }
            "GLEnum" => {
                arity(&[0, 1])?;
                let glenum = TypeId::builtin(BuiltinType::GLEnum);
                match values(args)?.first() {
                    None => glenum,
                    Some(arg) => match self.arena.get(*arg).clone() {
                        TypeKind::Literal {
                            value: value @ Literal::String(_),
                            ..
                        } => self.arena.literal(glenum, value),
                        _ => {
                            return Err(NotationError::Expected {
                                expected: "a string literal".to_string(),
                                found: self.arena.display(*arg),
                                span: args[0].1,
                            });
                        }
                    },
                }
            }
            _ => {
                if let Some(kind) = EventKind::from_name(name) {
                    arity(&[0, 1])?;
                    let target = values(args)?.first().copied();
                    self.arena.event(kind, target)
                } else if let Some(kind) = TypedArrayKind::from_name(name) {
                    arity(&[0])?;
                    self.arena.typed_array(kind)
                } else {
                    arity(&[0])?;
                    self.arena
                        .lookup_name(name)
                        .ok_or_else(|| NotationError::UnknownType {
                            name: name.to_string(),
                            span: token.span(),
                        })?
                }
            }
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(source: &str) -> String {
        let mut arena = TypeArena::new();
        let ty = parse_type(&mut arena, source).unwrap();
        arena.display(ty)
    }

    fn fail(source: &str) -> NotationError {
        let mut arena = TypeArena::new();
        parse_type(&mut arena, source).unwrap_err()
    }

    #[test]
    fn containers() {
        assert_eq!(show("Array<Int>"), "Array<Int>");
        assert_eq!(show("Array<any>"), "Array");
        assert_eq!(show("Map< String , Array<Int> >"), "Map<String,Array<Int>>");
        assert_eq!(show("Promise<void>"), "Promise<void>");
        assert_eq!(show("Promise"), "Promise");
        assert_eq!(show("[Int,String]"), "Tuple<Int,String>");
        assert_eq!(show("Tuple<Int,Int>"), "Tuple<Int,Int>");
        assert_eq!(show("Object<Int>"), "Object<Int>");
        assert_eq!(show("IDBRequest<String>"), "IDBRequest<String>");
        assert_eq!(show("Uint8Array"), "Uint8Array");
        assert_eq!(show("MouseEvent<HTMLCanvasElement>"), "MouseEvent<HTMLCanvasElement>");
    }

    #[test]
    fn objects_and_functions() {
        assert_eq!(show("{b:Int,a:String}"), "{a:String,b:Int}");
        assert_eq!(show("{}"), "Object");
        assert_eq!(show("(Int)=>String"), "function<Int,String>");
        assert_eq!(show("(Int, Int) => void"), "function<Int,Int,void>");
        assert_eq!(show("function"), "function");
    }

    #[test]
    fn literals() {
        assert_eq!(show("\"canvas\""), "String<\"canvas\">");
        assert_eq!(show("-3"), "Int<-3>");
        assert_eq!(show("true"), "Boolean<true>");
        assert_eq!(show("GLEnum<\"TEXTURE_2D\">"), "GLEnum<\"TEXTURE_2D\">");
    }

    #[test]
    fn lists() {
        let mut arena = TypeArena::new();
        let args = parse_type_list(&mut arena, "Int, \"a\", Array<String>").unwrap();
        assert_eq!(args.len(), 3);
        assert!(parse_type_list(&mut arena, "  ").unwrap().is_empty());
    }

    #[test]
    fn errors() {
        assert!(matches!(fail("Widget"), NotationError::UnknownType { .. }));
        assert!(matches!(
            fail("Map<Int>"),
            NotationError::TypeArgumentCount { expected: 2, found: 1, .. }
        ));
        assert!(matches!(fail("Array<Int"), NotationError::Expected { .. }));
        assert!(matches!(fail("\"open"), NotationError::UnterminatedString { .. }));
        assert!(matches!(fail("Int # String"), NotationError::UnexpectedCharacter { ch: '#', .. }));
        assert!(matches!(fail("Array<void>"), NotationError::Expected { .. }));
        assert!(matches!(fail("GLEnum<Int>"), NotationError::Expected { .. }));
        assert_eq!(fail("Int String").to_string(), "expected end of input, found 'String'");
    }
}
