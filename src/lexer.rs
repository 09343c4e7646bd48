// ABOUTME: Tokenizer for RPAL source text, built from nom character combinators

use crate::error::RpalError;
use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{anychar, char, digit1, satisfy},
    combinator::recognize,
    IResult, Parser,
};

const KEYWORDS: &[&str] = &["let", "where", "within", "aug", "fn", "in"];
const WORD_OPERATORS: &[&str] = &["and", "or", "not", "gr", "ge", "ls", "le", "eq", "ne"];
const OPERATOR_SYMBOLS: &str = "+-*<>&.@/:=~|$!#%^_[}{?,";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Str,
    Operator,
    Keyword,
    Delimiter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

/// Tokenizes a full RPAL source string. `true`/`false` keywords are folded
/// to `integer` tokens of text `"1"`/`"0"` here, matching the lexer's
/// original interface contract (§6A.1).
pub fn tokenize(source: &str) -> Result<Vec<Token>, RpalError> {
    let mut tokens = Vec::new();
    let mut input = source;

    loop {
        input = skip_trivia(input);
        if input.is_empty() {
            break;
        }
        let (rest, token) = next_token(input)
            .map_err(|_| RpalError::SyntaxError(format!("unrecognized token near: {}", preview(input))))?;
        tokens.push(token);
        input = rest;
    }

    Ok(tokens)
}

fn preview(input: &str) -> String {
    input.chars().take(20).collect()
}

fn skip_trivia(mut input: &str) -> &str {
    loop {
        let start_len = input.len();
        input = input.trim_start();
        if let Some(rest) = input.strip_prefix("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            input = &rest[end..];
        }
        if input.len() == start_len {
            break;
        }
    }
    input
}

fn next_token(input: &str) -> IResult<&str, Token> {
    alt((
        identifier_like,
        integer_literal,
        string_literal,
        operator_run,
        delimiter,
    ))
    .parse(input)
}

fn identifier_like(input: &str) -> IResult<&str, Token> {
    let (rest, text) = recognize((
        satisfy(|c: char| c.is_alphabetic()),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)?;

    let token = if KEYWORDS.contains(&text) {
        Token::new(TokenKind::Keyword, text)
    } else if WORD_OPERATORS.contains(&text) {
        Token::new(TokenKind::Operator, text)
    } else if text == "true" {
        Token::new(TokenKind::Integer, "1")
    } else if text == "false" {
        Token::new(TokenKind::Integer, "0")
    } else {
        Token::new(TokenKind::Identifier, text)
    };
    Ok((rest, token))
}

fn integer_literal(input: &str) -> IResult<&str, Token> {
    let (rest, digits) = digit1(input)?;
    Ok((rest, Token::new(TokenKind::Integer, digits)))
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    let (mut rest, quote) = alt((char('\''), char('"'))).parse(input)?;
    let mut text = String::new();
    loop {
        let (next, c) = anychar(rest).map_err(|_| {
            nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Eof))
        })?;
        rest = next;
        if c == quote {
            break;
        }
        if c == '\\' {
            let (next, esc) = anychar(rest)?;
            rest = next;
            match esc {
                't' => text.push('\t'),
                'n' => text.push('\n'),
                '\\' => text.push('\\'),
                '\'' => text.push('\''),
                '"' => text.push('"'),
                other => {
                    text.push('\\');
                    text.push(other);
                }
            }
        } else {
            text.push(c);
        }
    }
    Ok((rest, Token::new(TokenKind::Str, text)))
}

fn is_operator_symbol(c: char) -> bool {
    OPERATOR_SYMBOLS.contains(c)
}

fn operator_run(input: &str) -> IResult<&str, Token> {
    let (rest, first) = satisfy(is_operator_symbol).parse(input)?;
    if first == ',' {
        return Ok((rest, Token::new(TokenKind::Operator, ",")));
    }
    let (rest, more) = take_while(is_operator_symbol)(rest)?;
    let mut text = String::new();
    text.push(first);
    text.push_str(more);
    Ok((rest, Token::new(TokenKind::Operator, text)))
}

fn delimiter(input: &str) -> IResult<&str, Token> {
    let (rest, c) = alt((char('('), char(')'))).parse(input)?;
    Ok((rest, Token::new(TokenKind::Delimiter, c.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_identifiers() {
        let tokens = tokenize("let x = 5 in Print x").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Keyword, "let"),
                (TokenKind::Identifier, "x"),
                (TokenKind::Operator, "="),
                (TokenKind::Integer, "5"),
                (TokenKind::Keyword, "in"),
                (TokenKind::Identifier, "Print"),
                (TokenKind::Identifier, "x"),
            ]
        );
    }

    #[test]
    fn true_false_fold_to_integer() {
        let tokens = tokenize("true false").unwrap();
        assert_eq!(tokens[0], Token::new(TokenKind::Integer, "1"));
        assert_eq!(tokens[1], Token::new(TokenKind::Integer, "0"));
    }

    #[test]
    fn strings_unescape() {
        let tokens = tokenize("'ab\\ncd'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "ab\ncd");
    }

    #[test]
    fn comparison_operators_and_comma() {
        let tokens = tokenize("a,b gr c").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", ",", "b", "gr", "c"]);
    }

    #[test]
    fn line_comment_is_skipped() {
        let tokens = tokenize("x // comment\n+ 1").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["x", "+", "1"]);
    }
}
