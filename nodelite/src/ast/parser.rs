// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Parser for the SQL2 query subset using nom parsers over a token stream
//!
//! ```text
//! query      := SELECT columns FROM selector [join] [WHERE constraint]
//! columns    := '*' | name '.' '*' (',' name '.' '*')*
//! selector   := name [[AS] name]
//! join       := [INNER | LEFT [OUTER] | RIGHT [OUTER] | FULL [OUTER] | CROSS] JOIN selector ON condition
//! condition  := ISCHILDNODE(a, b) | ISDESCENDANTNODE(a, b) | ISSAMENODE(a, b)
//! constraint := and (OR and)*
//! and        := not (AND not)*
//! not        := NOT not | '(' constraint ')' | CONTAINS '(' name '.' ('*' | name) ',' string ')'
//! ```

use log::debug;
use nom::{
    branch::alt,
    combinator::{cut, map, opt, success, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::ast::*;
use super::lexer::{tokenize, Token};

/// Parser error type
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Lexer error: {0}")]
    LexerError(String),
    #[error("Unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("Unexpected end of query")]
    UnexpectedEnd,
}

/// Parse query text into a structured descriptor
pub fn parse_query(input: &str) -> Result<QueryDescriptor, ParserError> {
    debug!("Parsing query: {}", input.trim());

    let tokens = tokenize(input).map_err(ParserError::LexerError)?;

    match query(&tokens) {
        Ok((remaining, descriptor)) => match remaining.first() {
            Some(Token::EOF) | None => Ok(descriptor),
            Some(token) => Err(ParserError::UnexpectedToken(token.clone())),
        },
        Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => {
            Err(match error.input.first() {
                Some(Token::EOF) | None => ParserError::UnexpectedEnd,
                Some(token) => ParserError::UnexpectedToken(token.clone()),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(ParserError::UnexpectedEnd),
    }
}

fn query(tokens: &[Token]) -> IResult<&[Token], QueryDescriptor> {
    map(
        tuple((
            expect_token(Token::Select),
            cut(columns),
            cut(expect_token(Token::From)),
            cut(selector),
            opt(join_clause),
            opt(preceded(expect_token(Token::Where), cut(constraint))),
        )),
        |(_, columns, _, left, join, constraint)| QueryDescriptor {
            columns,
            left,
            join,
            constraint,
        },
    )(tokens)
}

fn columns(tokens: &[Token]) -> IResult<&[Token], Columns> {
    alt((
        value(Columns::All, expect_token(Token::Star)),
        map(
            separated_list1(
                expect_token(Token::Comma),
                terminated(
                    name,
                    pair(expect_token(Token::Dot), expect_token(Token::Star)),
                ),
            ),
            Columns::Selectors,
        ),
    ))(tokens)
}

/// `[node type] [AS] alias`; without an alias the type name doubles as the alias
fn selector(tokens: &[Token]) -> IResult<&[Token], Selector> {
    map(
        pair(name, opt(preceded(opt(expect_token(Token::As)), name))),
        |(node_type, alias)| Selector {
            alias: alias.unwrap_or_else(|| node_type.clone()),
            node_type,
        },
    )(tokens)
}

fn join_clause(tokens: &[Token]) -> IResult<&[Token], Join> {
    map(
        tuple((
            join_type,
            expect_token(Token::Join),
            cut(selector),
            cut(preceded(expect_token(Token::On), join_condition)),
        )),
        |(join_type, _, right, condition)| Join {
            join_type,
            right,
            condition,
        },
    )(tokens)
}

fn join_type(tokens: &[Token]) -> IResult<&[Token], JoinType> {
    alt((
        value(JoinType::Inner, expect_token(Token::Inner)),
        value(
            JoinType::LeftOuter,
            pair(expect_token(Token::Left), opt(expect_token(Token::Outer))),
        ),
        value(
            JoinType::RightOuter,
            pair(expect_token(Token::Right), opt(expect_token(Token::Outer))),
        ),
        value(
            JoinType::FullOuter,
            pair(expect_token(Token::Full), opt(expect_token(Token::Outer))),
        ),
        value(JoinType::Cross, expect_token(Token::Cross)),
        // Bare JOIN
        success(JoinType::Inner),
    ))(tokens)
}

fn join_condition(tokens: &[Token]) -> IResult<&[Token], JoinCondition> {
    alt((
        map(selector_pair_call(Token::IsChildNode), |(child, parent)| {
            JoinCondition::ChildNode {
                child_selector: child,
                parent_selector: parent,
            }
        }),
        map(
            selector_pair_call(Token::IsDescendantNode),
            |(descendant, ancestor)| JoinCondition::DescendantNode {
                descendant_selector: descendant,
                ancestor_selector: ancestor,
            },
        ),
        map(selector_pair_call(Token::IsSameNode), |(first, second)| {
            JoinCondition::SameNode {
                selector1: first,
                selector2: second,
            }
        }),
    ))(tokens)
}

/// `FUNCTION(name, name)`
fn selector_pair_call(
    function: Token,
) -> impl Fn(&[Token]) -> IResult<&[Token], (String, String)> {
    move |tokens: &[Token]| {
        map(
            tuple((
                expect_token(function.clone()),
                cut(expect_token(Token::LeftParen)),
                cut(name),
                cut(expect_token(Token::Comma)),
                cut(name),
                cut(expect_token(Token::RightParen)),
            )),
            |(_, _, first, _, second, _)| (first, second),
        )(tokens)
    }
}

fn constraint(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        pair(
            and_constraint,
            many0(preceded(expect_token(Token::Or), cut(and_constraint))),
        ),
        |(first, rest)| rest.into_iter().fold(first, Constraint::or),
    )(tokens)
}

fn and_constraint(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        pair(
            not_constraint,
            many0(preceded(expect_token(Token::And), cut(not_constraint))),
        ),
        |(first, rest)| rest.into_iter().fold(first, Constraint::and),
    )(tokens)
}

fn not_constraint(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    alt((
        map(
            preceded(expect_token(Token::Not), cut(not_constraint)),
            Constraint::not,
        ),
        delimited(
            expect_token(Token::LeftParen),
            cut(constraint),
            cut(expect_token(Token::RightParen)),
        ),
        full_text_search,
    ))(tokens)
}

/// `CONTAINS(alias.*, 'expr')`, `CONTAINS(alias.[prop], 'expr')` or `CONTAINS(alias.prop, 'expr')`
fn full_text_search(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        preceded(
            expect_token(Token::Contains),
            cut(tuple((
                expect_token(Token::LeftParen),
                name,
                expect_token(Token::Dot),
                alt((value(None, expect_token(Token::Star)), map(name, Some))),
                expect_token(Token::Comma),
                string_literal,
                expect_token(Token::RightParen),
            ))),
        ),
        |(_, selector, _, property, _, expression, _)| Constraint::FullTextSearch {
            selector,
            property,
            expression,
        },
    )(tokens)
}

/// Plain or bracketed name
fn name(tokens: &[Token]) -> IResult<&[Token], String> {
    match tokens.first() {
        Some(Token::Identifier(s)) | Some(Token::BracketName(s)) => Ok((&tokens[1..], s.clone())),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            tokens,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn string_literal(tokens: &[Token]) -> IResult<&[Token], String> {
    match tokens.first() {
        Some(Token::String(s)) => Ok((&tokens[1..], s.clone())),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            tokens,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

/// Expect a specific token
fn expect_token(expected: Token) -> impl Fn(&[Token]) -> IResult<&[Token], Token> {
    move |tokens: &[Token]| {
        if let Some(token) = tokens.first() {
            if std::mem::discriminant(token) == std::mem::discriminant(&expected) {
                Ok((&tokens[1..], token.clone()))
            } else {
                Err(nom::Err::Error(nom::error::Error::new(
                    tokens,
                    nom::error::ErrorKind::Tag,
                )))
            }
        } else {
            Err(nom::Err::Error(nom::error::Error::new(
                tokens,
                nom::error::ErrorKind::Tag,
            )))
        }
    }
}
