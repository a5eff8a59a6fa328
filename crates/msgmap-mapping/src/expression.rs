//! Transform expression parsing
//!
//! Expressions are single function calls from a closed vocabulary:
//!
//! | call                               | result                                   |
//! |------------------------------------|------------------------------------------|
//! | `formatDateTime(now(), 'pattern')` | current UTC instant in `pattern`          |
//! | `concat(a, b, ...)`                | arguments joined without a separator      |
//! | `substring(source, n)`             | tail of `source` (negative `n` counts back) |
//! | `subtractDays(now(), n)`           | `n` days ago as an ISO timestamp         |
//! | `mapStatusToResponseCode(field)`   | ISO status code to response code         |
//! | `extractSessionId(field)`          | the value itself                         |
//!
//! Anything else passes the value through untouched.

use regex::Regex;
use std::sync::LazyLock;

/// Matches a call head such as `concat (`
static CALL_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*\(").expect("call head pattern is valid")
});

/// The functions an expression may call, in dispatch priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    FormatDateTime,
    Concat,
    Substring,
    SubtractDays,
    MapStatusToResponseCode,
    ExtractSessionId,
}

impl Function {
    const ALL: [Function; 6] = [
        Function::FormatDateTime,
        Function::Concat,
        Function::Substring,
        Function::SubtractDays,
        Function::MapStatusToResponseCode,
        Function::ExtractSessionId,
    ];

    /// Name as written in expressions
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Function::FormatDateTime => "formatDateTime",
            Function::Concat => "concat",
            Function::Substring => "substring",
            Function::SubtractDays => "subtractDays",
            Function::MapStatusToResponseCode => "mapStatusToResponseCode",
            Function::ExtractSessionId => "extractSessionId",
        }
    }

    /// First function whose name prefixes `expression`
    fn dispatch(expression: &str) -> Option<Function> {
        Self::ALL.into_iter().find(|f| expression.starts_with(f.name()))
    }
}

/// A parsed transform expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    FormatDateTime { source: String, pattern: String },
    Concat { args: Vec<String> },
    Substring { source: String, index: i64 },
    SubtractDays { source: String, days: i64 },
    MapStatusToResponseCode,
    ExtractSessionId,
    /// A recognized function whose arguments could not be parsed
    Malformed(Function),
    /// Blank or unrecognized expression
    Passthrough,
}

impl Expression {
    /// Parse an expression. Never fails; unusable input degrades to
    /// [`Expression::Malformed`] or [`Expression::Passthrough`].
    #[must_use]
    pub fn parse(expression: &str) -> Self {
        let expression = expression.trim();
        let Some(function) = Function::dispatch(expression) else {
            return Expression::Passthrough;
        };

        match function {
            Function::MapStatusToResponseCode => Expression::MapStatusToResponseCode,
            Function::ExtractSessionId => Expression::ExtractSessionId,
            _ => call_arguments(expression, function)
                .and_then(|args| Self::from_call(function, args))
                .unwrap_or(Expression::Malformed(function)),
        }
    }

    fn from_call(function: Function, mut args: Vec<String>) -> Option<Self> {
        match function {
            Function::FormatDateTime => {
                let [source, pattern] = two(&mut args)?;
                let pattern = unquote(&pattern)?;
                if pattern.is_empty() || pattern.contains(['\'', '"']) {
                    return None;
                }
                Some(Expression::FormatDateTime {
                    source,
                    pattern: pattern.to_string(),
                })
            }
            Function::Concat => {
                if args.is_empty() {
                    return None;
                }
                Some(Expression::Concat { args })
            }
            Function::Substring => {
                let [source, index] = two(&mut args)?;
                let index = index.parse().ok()?;
                Some(Expression::Substring { source, index })
            }
            Function::SubtractDays => {
                let [source, days] = two(&mut args)?;
                if !days.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let days = days.parse().ok()?;
                Some(Expression::SubtractDays { source, days })
            }
            Function::MapStatusToResponseCode => Some(Expression::MapStatusToResponseCode),
            Function::ExtractSessionId => Some(Expression::ExtractSessionId),
        }
    }
}

/// Exactly two non-empty arguments
fn two(args: &mut Vec<String>) -> Option<[String; 2]> {
    if args.len() != 2 || args.iter().any(String::is_empty) {
        return None;
    }
    let second = args.pop()?;
    let first = args.pop()?;
    Some([first, second])
}

/// Literal content of a `'single'` or `"double"` quoted argument
#[must_use]
pub fn unquote(arg: &str) -> Option<&str> {
    let bytes = arg.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            return Some(&arg[1..arg.len() - 1]);
        }
    }
    None
}

/// Arguments of the call to `function` at the start of `expression`.
///
/// The argument list ends at the parenthesis that balances the opening one;
/// anything after it is ignored.
fn call_arguments(expression: &str, function: Function) -> Option<Vec<String>> {
    let head = CALL_HEAD.captures(expression)?;
    if head.get(1)?.as_str() != function.name() {
        return None;
    }
    let open = head.get(0)?.end();
    let inner = balanced_inner(&expression[open..])?;
    Some(split_arguments(inner))
}

/// Text up to the parenthesis closing an already-consumed `(`
fn balanced_inner(rest: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous = '\0';

    for (i, c) in rest.char_indices() {
        match quote {
            Some(q) if c == q && previous != '\\' => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' if previous != '\\' => quote = Some(c),
                '(' => depth += 1,
                ')' if depth == 0 => return Some(&rest[..i]),
                ')' => depth -= 1,
                _ => {}
            },
        }
        previous = c;
    }
    None
}

/// Split on top-level commas, keeping quoted text and nested calls intact.
///
/// Arguments are trimmed. A trailing empty argument is dropped; an empty
/// argument between commas is kept and later resolves to the current value.
#[must_use]
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous = '\0';

    for c in input.chars() {
        match quote {
            Some(q) if c == q && previous != '\\' => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' if previous != '\\' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    args.push(current.trim().to_string());
                    current.clear();
                    previous = c;
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
        previous = c;
    }

    if !current.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}
