// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lexer for the SQL2 query subset
//!
//! Every token parser either consumes input or returns an error; the main
//! loop rejects any token that leaves the input unchanged.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, char, multispace1, satisfy},
    combinator::{map, recognize, value},
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};

/// Token types for the query language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    From,
    As,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Where,
    And,
    Or,
    Not,
    Contains,
    IsChildNode,
    IsDescendantNode,
    IsSameNode,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Star,

    // Literals and names
    String(String),
    BracketName(String),
    Identifier(String),

    Whitespace,

    // End of file
    EOF,
}

/// Lexer state
#[derive(Debug, Clone)]
pub struct Lexer {
    input: String,
}

impl Lexer {
    pub fn new(input: String) -> Self {
        Self { input }
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, String> {
        let mut remaining = self.input.as_str();
        let mut tokens = Vec::new();

        while !remaining.is_empty() {
            match token(remaining) {
                Ok((next_remaining, token)) => {
                    if next_remaining.len() == remaining.len() {
                        return Err(format!(
                            "Parser function not consuming input. Token: {:?}, Remaining: '{}'",
                            token, remaining
                        ));
                    }
                    if token != Token::Whitespace {
                        tokens.push(token);
                    }
                    remaining = next_remaining;
                }
                Err(_) => {
                    let snippet: String = remaining.chars().take(20).collect();
                    return Err(format!("Unrecognized input near '{}'", snippet));
                }
            }
        }

        tokens.push(Token::EOF);
        Ok(tokens)
    }
}

/// Parse a single token
///
/// Quoted forms come before words so that `[a:b]` and `'x'` are never
/// split into identifier pieces.
fn token(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Whitespace, multispace1),
        map(string_literal('\''), Token::String),
        map(string_literal('"'), Token::String),
        map(bracket_name, |s| Token::BracketName(s.to_string())),
        punctuation,
        map(word, keyword_or_identifier),
    ))(input)
}

fn punctuation(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
        value(Token::Comma, char(',')),
        value(Token::Dot, char('.')),
        value(Token::Star, char('*')),
    ))(input)
}

/// `[test:Parent]` with the brackets stripped
fn bracket_name(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_while1(|c: char| c != ']'), char(']'))(input)
}

/// Quoted string; a doubled quote inside stands for one literal quote
fn string_literal(quote: char) -> impl Fn(&str) -> IResult<&str, String> {
    move |input: &str| {
        let (mut remaining, _) = char(quote)(input)?;
        let mut value = String::new();
        loop {
            let (rest, chunk) = take_while(|c: char| c != quote)(remaining)?;
            value.push_str(chunk);
            let (rest, _) = char(quote)(rest)?;
            match char::<&str, nom::error::Error<&str>>(quote)(rest) {
                Ok((after_escape, _)) => {
                    value.push(quote);
                    remaining = after_escape;
                }
                Err(_) => return Ok((rest, value)),
            }
        }
    }
}

/// Names and keywords; `:` is allowed after the first character for prefixed names
fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(satisfy(|c: char| c.is_alphanumeric() || c == '_' || c == ':')),
    ))(input)
}

fn keyword_or_identifier(word: &str) -> Token {
    match word.to_ascii_uppercase().as_str() {
        "SELECT" => Token::Select,
        "FROM" => Token::From,
        "AS" => Token::As,
        "JOIN" => Token::Join,
        "INNER" => Token::Inner,
        "LEFT" => Token::Left,
        "RIGHT" => Token::Right,
        "FULL" => Token::Full,
        "OUTER" => Token::Outer,
        "CROSS" => Token::Cross,
        "ON" => Token::On,
        "WHERE" => Token::Where,
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        "CONTAINS" => Token::Contains,
        "ISCHILDNODE" => Token::IsChildNode,
        "ISDESCENDANTNODE" => Token::IsDescendantNode,
        "ISSAMENODE" => Token::IsSameNode,
        _ => Token::Identifier(word.to_string()),
    }
}

/// Public function to tokenize input
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    Lexer::new(input.to_string()).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_query_tokens() {
        let tokens = tokenize(
            "SELECT * FROM [test:Parent] as p LEFT OUTER JOIN [test:Child] as c ON ISCHILDNODE(c, p)",
        )
        .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Star,
                Token::From,
                Token::BracketName("test:Parent".to_string()),
                Token::As,
                Token::Identifier("p".to_string()),
                Token::Left,
                Token::Outer,
                Token::Join,
                Token::BracketName("test:Child".to_string()),
                Token::As,
                Token::Identifier("c".to_string()),
                Token::On,
                Token::IsChildNode,
                Token::LeftParen,
                Token::Identifier("c".to_string()),
                Token::Comma,
                Token::Identifier("p".to_string()),
                Token::RightParen,
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_contains_tokens_and_case_insensitive_keywords() {
        let tokens = tokenize("where contains(p.*, 'name2') or Not contains(c.title, \"x\")").unwrap();
        assert_eq!(tokens[0], Token::Where);
        assert_eq!(tokens[1], Token::Contains);
        assert_eq!(tokens[4], Token::Dot);
        assert_eq!(tokens[5], Token::Star);
        assert_eq!(tokens[7], Token::String("name2".to_string()));
        assert_eq!(tokens[9], Token::Or);
        assert_eq!(tokens[10], Token::Not);
        assert_eq!(tokens[15], Token::Identifier("title".to_string()));
        assert_eq!(tokens[17], Token::String("x".to_string()));
    }

    #[test]
    fn test_doubled_quote_escape() {
        let tokens = tokenize("'it''s'").unwrap();
        assert_eq!(tokens, vec![Token::String("it's".to_string()), Token::EOF]);
    }

    #[test]
    fn test_prefixed_identifier() {
        let tokens = tokenize("nt:unstructured").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Identifier("nt:unstructured".to_string()), Token::EOF]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(tokenize("WHERE CONTAINS(p.*, 'oops").is_err());
        assert!(tokenize("SELECT ; FROM").is_err());
    }
}
