//! Command argument parsing using nom
//!
//! Handlers own their keyword; this module parses the argument forms they
//! share. Per RFC 3977 §6.2.1 the article retrieval commands accept a
//! message-id, an article number, or no argument (current article).

use nom::{
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{char, digit1, space0},
    combinator::{map, map_res},
    sequence::delimited,
    IResult, Parser,
};

use crate::types::MessageId;

/// Article specifier accepted by ARTICLE/BODY/HEAD/STAT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleSpec {
    /// Article by message-id, e.g. `<123@example.com>`
    ByMessageId(MessageId),
    /// Article by number in the currently selected group
    ByNumber(u64),
    /// No argument: the session's current article cursor
    Current,
}

/// Parse a bracketed message-id (RFC 3977 §3.6)
fn parse_message_id(input: &str) -> IResult<&str, MessageId> {
    let (input, inner) = delimited(char('<'), take_until(">"), char('>')).parse(input)?;
    match MessageId::new(format!("<{}>", inner)) {
        Ok(msgid) => Ok((input, msgid)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

/// Parse an article number (1-16 digits, RFC 3977 §6)
fn parse_article_number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse::<u64>()).parse(input)
}

/// Parse the argument of an article retrieval command
///
/// Empty argument text resolves to [`ArticleSpec::Current`].
pub fn parse_article_spec(args: &str) -> Option<ArticleSpec> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return Some(ArticleSpec::Current);
    }

    let result: IResult<&str, ArticleSpec> = alt((
        map(parse_message_id, ArticleSpec::ByMessageId),
        map(parse_article_number, ArticleSpec::ByNumber),
    ))
    .parse(trimmed);

    match result {
        Ok((rest, spec)) if rest.trim().is_empty() => Some(spec),
        _ => None,
    }
}

/// Parse a group name token (RFC 3977 §9.8: printable, no whitespace)
pub fn parse_group_name(args: &str) -> Option<&str> {
    let result: IResult<&str, &str> = nom::sequence::preceded(
        space0,
        take_while1(|c: char| !c.is_ascii_whitespace()),
    )
    .parse(args.trim());

    match result {
        Ok((rest, name)) if rest.trim().is_empty() => Some(name),
        _ => None,
    }
}
