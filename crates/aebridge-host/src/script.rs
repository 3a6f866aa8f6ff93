//! Parser for the ExtendScript subset the bridge client emits
//!
//! # Grammar
//!
//! ```ebnf
//! program    = statement, {";", statement}, [";"];
//! statement  = postfix, "=", statement | equality;
//! equality   = postfix, ["===", postfix];
//! postfix    = primary, {"." ident | "[" statement "]" | "(" args ")"};
//! primary    = "new" ident "(" args ")" | registry | string | number | array
//!            | ident | "(" statement ")";
//! registry   = "$._pydobe[" string "]";
//! args       = [statement, {"," statement}];
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1, take_while_m_n},
    character::complete::{char, multispace0, multispace1, none_of},
    combinator::{all_consuming, cut, map, map_opt, not, opt, recognize, value},
    multi::{fold_many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{HostError, HostResult};

/// Expression tree of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Expr>),
    Ident(String),
    /// `$._pydobe["id"]`
    Registry(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    New(String, Vec<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    StrictEq(Box<Expr>, Box<Expr>),
}

/// A request body after the exception guard is removed
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Install the registry global
    Prelude,
    /// Evaluate one line and describe the result
    Register(Vec<Expr>),
    /// Evaluate code and stringify the last value
    Raw(Vec<Expr>),
}

const GUARD_OPEN: &str = "try{\n";
const GUARD_CLOSE: &str = "\n}catch(e){e.error=true;ExtendJSON.stringify(e)}";
const RESULT_LINE: &str = "var tmp = ";

/// Strip the client's try/catch guard, if present
pub fn unguard(code: &str) -> &str {
    code.strip_prefix(GUARD_OPEN)
        .and_then(|inner| inner.strip_suffix(GUARD_CLOSE))
        .unwrap_or(code)
}

/// Classify and parse an unguarded request
pub fn parse_request(code: &str) -> HostResult<Request> {
    let code = code.trim();
    if code.starts_with("if (typeof $._pydobe") {
        return Ok(Request::Prelude);
    }
    if let Some(rest) = code.strip_prefix(RESULT_LINE) {
        // The line itself never spans lines: the client escapes newlines
        let line = rest.lines().next().unwrap_or_default();
        return parse_program(line).map(Request::Register);
    }
    parse_program(code).map(Request::Raw)
}

/// Parse `;`-separated statements
pub fn parse_program(source: &str) -> HostResult<Vec<Expr>> {
    let parsed = all_consuming(terminated(
        separated_list0(ws(char(';')), statement),
        tuple((multispace0, opt(char(';')), multispace0)),
    ))(source);

    match parsed {
        Ok((_, statements)) => Ok(statements),
        Err(e) => Err(HostError::syntax(format!("cannot parse `{source}`: {e}"))),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn statement(input: &str) -> IResult<&str, Expr> {
    alt((assignment, equality))(input)
}

fn assignment(input: &str) -> IResult<&str, Expr> {
    map(
        tuple((postfix, ws(terminated(char('='), not(char('=')))), statement)),
        |(target, _, value)| Expr::Assign(Box::new(target), Box::new(value)),
    )(input)
}

fn equality(input: &str) -> IResult<&str, Expr> {
    let (input, left) = postfix(input)?;
    let (input, right) = opt(preceded(ws(tag("===")), postfix))(input)?;
    Ok(match right {
        Some(right) => (input, Expr::StrictEq(Box::new(left), Box::new(right))),
        None => (input, left),
    })
}

enum Suffix {
    Member(String),
    Index(Expr),
    Call(Vec<Expr>),
}

fn postfix(input: &str) -> IResult<&str, Expr> {
    let (input, base) = ws(primary)(input)?;
    let suffix = alt((
        map(preceded(ws(char('.')), identifier), Suffix::Member),
        map(delimited(ws(char('[')), statement, ws(char(']'))), Suffix::Index),
        map(arguments, Suffix::Call),
    ));
    fold_many0(
        suffix,
        move || base.clone(),
        |expr, suffix| match suffix {
            Suffix::Member(name) => Expr::Member(Box::new(expr), name),
            Suffix::Index(index) => Expr::Index(Box::new(expr), Box::new(index)),
            Suffix::Call(args) => Expr::Call(Box::new(expr), args),
        },
    )(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Expr>> {
    delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), statement),
        ws(char(')')),
    )(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        construction,
        registry,
        map(string_literal, Expr::Str),
        map(identifier, keyword_or_ident),
        map(double, Expr::Number),
        map(
            delimited(
                ws(char('[')),
                separated_list0(ws(char(',')), statement),
                ws(char(']')),
            ),
            Expr::Array,
        ),
        delimited(ws(char('(')), statement, ws(char(')'))),
    ))(input)
}

fn construction(input: &str) -> IResult<&str, Expr> {
    map(
        preceded(pair(tag("new"), multispace1), cut(pair(identifier, arguments))),
        |(class, args)| Expr::New(class, args),
    )(input)
}

fn registry(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(tag("$._pydobe["), string_literal, char(']')),
        Expr::Registry,
    )(input)
}

fn keyword_or_ident(name: String) -> Expr {
    match name.as_str() {
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "null" => Expr::Null,
        "undefined" => Expr::Undefined,
        "NaN" => Expr::Number(f64::NAN),
        "Infinity" => Expr::Number(f64::INFINITY),
        _ => Expr::Ident(name),
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
        )),
        str::to_string,
    )(input)
}

fn string_char(input: &str) -> IResult<&str, char> {
    alt((
        preceded(
            char('\\'),
            alt((
                value('"', char('"')),
                value('\'', char('\'')),
                value('\\', char('\\')),
                value('/', char('/')),
                value('\n', char('n')),
                value('\r', char('r')),
                value('\t', char('t')),
                map_opt(
                    preceded(
                        char('u'),
                        take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()),
                    ),
                    |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32),
                ),
            )),
        ),
        none_of("\"\\"),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(string_char, String::new, |mut s, c| {
            s.push(c);
            s
        }),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn reg(id: &str) -> Box<Expr> {
        Box::new(Expr::Registry(id.to_string()))
    }

    #[test]
    fn test_member_call_chain() {
        assert_eq!(
            parse_program(r#"$._pydobe["p1"].layers.addSolid([1, 0, 0], "BG", 1920, 1080, 1);"#)
                .unwrap(),
            vec![Expr::Call(
                Box::new(Expr::Member(
                    Box::new(Expr::Member(reg("p1"), "layers".into())),
                    "addSolid".into()
                )),
                vec![
                    Expr::Array(vec![Expr::Number(1.0), Expr::Number(0.0), Expr::Number(0.0)]),
                    Expr::Str("BG".into()),
                    Expr::Number(1920.0),
                    Expr::Number(1080.0),
                    Expr::Number(1.0),
                ]
            )]
        );
    }

    #[test]
    fn test_assignment_and_identity() {
        assert_eq!(
            parse_program(r#"$._pydobe["p2"].file = $._pydobe["p3"];"#).unwrap(),
            vec![Expr::Assign(
                Box::new(Expr::Member(reg("p2"), "file".into())),
                reg("p3")
            )]
        );
        assert_eq!(
            parse_program(r#"$._pydobe["p1"] === $._pydobe["p2"];"#).unwrap(),
            vec![Expr::StrictEq(reg("p1"), reg("p2"))]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_program(r#"File("a \"b\"\\c\nd\u2028");"#).unwrap(),
            vec![Expr::Call(
                Box::new(Expr::Ident("File".into())),
                vec![Expr::Str("a \"b\"\\c\nd\u{2028}".into())]
            )]
        );
    }

    #[test]
    fn test_new_and_keywords() {
        assert_eq!(
            parse_program("new ImportOptions();").unwrap(),
            vec![Expr::New("ImportOptions".into(), vec![])]
        );
        assert_eq!(
            parse_program("$._pydobe[\"p1\"].shy = false").unwrap(),
            vec![Expr::Assign(
                Box::new(Expr::Member(reg("p1"), "shy".into())),
                Box::new(Expr::Bool(false))
            )]
        );
    }

    #[test]
    fn test_request_classification() {
        assert_eq!(
            unguard("try{\napp;\n}catch(e){e.error=true;ExtendJSON.stringify(e)}"),
            "app;"
        );
        assert_eq!(
            parse_request("if (typeof $._pydobe === 'undefined') { }").unwrap(),
            Request::Prelude
        );
        assert_eq!(
            parse_request("var tmp = app.project;\nvar __pydobeDescribe = 1;").unwrap(),
            Request::Register(vec![Expr::Member(
                Box::new(Expr::Ident("app".into())),
                "project".into()
            )])
        );
        assert!(matches!(parse_request("app.(").unwrap_err(), HostError::Syntax(_)));
    }
}
