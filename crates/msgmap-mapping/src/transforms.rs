//! Transform evaluation
//!
//! A [`Transformer`] evaluates parsed [`Expression`]s against the current
//! field value and, for field references, the message being mapped.

use crate::datetime::format_pattern;
use crate::expression::{unquote, Expression, Function};
use crate::paths::{resolve_from_source, SOURCE_PREFIX};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use msgmap_ir::ParsedInput;
use std::fmt;
use std::sync::Arc;

/// Source of the current instant
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Pattern used by `now()` inside `concat`
const COMPACT_TIMESTAMP: &str = "yyyyMMddHHmmss";
/// Pattern used by `subtractDays`
const ISO_TIMESTAMP: &str = "yyyy-MM-dd'T'HH:mm:ss.SSS'Z'";
/// Response code for unknown or missing statuses
const UNKNOWN_STATUS_CODE: &str = "99";

/// Evaluates transform expressions
#[derive(Clone)]
pub struct Transformer {
    clock: Clock,
}

impl Transformer {
    /// Create a transformer reading the system clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Utc::now),
        }
    }

    /// Create a transformer with a custom clock
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Parse and evaluate `expression`.
    ///
    /// `value` is the current field value and `context` the message that
    /// `source.` references resolve against.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transform`] when a date pattern is invalid or date
    /// arithmetic overflows.
    pub fn apply(&self, value: Option<&str>, expression: &str, context: Option<&ParsedInput>) -> Result<Option<String>> {
        self.evaluate(&Expression::parse(expression), value, context)
    }

    /// Evaluate an already parsed expression
    ///
    /// # Errors
    ///
    /// See [`Transformer::apply`].
    pub fn evaluate(&self, expression: &Expression, value: Option<&str>, context: Option<&ParsedInput>) -> Result<Option<String>> {
        let owned = || value.map(str::to_string);

        match expression {
            Expression::FormatDateTime { pattern, .. } => self.format_now(pattern).map(Some),
            Expression::Concat { args } => self.concat(args, value, context).map(Some),
            Expression::Substring { source, index } => {
                Ok(resolve_reference(source, value, context)
                    .map(|text| tail(&text, *index))
                    .or_else(owned))
            }
            Expression::SubtractDays { days, .. } => {
                let instant = Duration::try_days(*days)
                    .and_then(|delta| (self.clock)().checked_sub_signed(delta))
                    .ok_or_else(|| Error::Transform(format!("cannot subtract {days} days")))?;
                format_pattern(&instant, ISO_TIMESTAMP)
                    .map(Some)
                    .map_err(Error::Transform)
            }
            Expression::MapStatusToResponseCode => Ok(Some(status_to_response_code(value).to_string())),
            Expression::ExtractSessionId => Ok(owned()),
            Expression::Malformed(Function::FormatDateTime | Function::SubtractDays) => {
                Ok(Some(value.unwrap_or_default().to_string()))
            }
            Expression::Malformed(_) | Expression::Passthrough => Ok(owned()),
        }
    }

    /// Current instant formatted with a route-authored pattern
    fn format_now(&self, pattern: &str) -> Result<String> {
        let pattern = normalize_pattern(pattern);
        format_pattern(&(self.clock)(), &pattern).map_err(Error::Transform)
    }

    fn concat(&self, args: &[String], value: Option<&str>, context: Option<&ParsedInput>) -> Result<String> {
        let mut out = String::new();
        for arg in args {
            if let Some(literal) = unquote(arg) {
                out.push_str(literal);
            } else if arg == "now()" {
                out.push_str(&format_pattern(&(self.clock)(), COMPACT_TIMESTAMP).map_err(Error::Transform)?);
            } else if arg.starts_with(Function::FormatDateTime.name()) || arg.starts_with(Function::Substring.name()) {
                let nested = Expression::parse(arg);
                if let Some(text) = self.evaluate(&nested, value, context)? {
                    out.push_str(&text);
                }
            } else if let Some(text) = resolve_reference(arg, value, context) {
                out.push_str(&text);
            }
        }
        Ok(out)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer").finish_non_exhaustive()
    }
}

/// Resolve a function argument.
///
/// `value` (or an empty argument) is the current value, `source.X` is read
/// from the context, a quoted argument is its literal text, and anything
/// else stands for itself.
fn resolve_reference(reference: &str, value: Option<&str>, context: Option<&ParsedInput>) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference == "value" {
        return value.map(str::to_string);
    }
    if reference.starts_with(SOURCE_PREFIX) {
        return context.and_then(|ctx| resolve_from_source(ctx, reference));
    }
    if let Some(literal) = unquote(reference) {
        return Some(literal.to_string());
    }
    Some(reference.to_string())
}

/// Quote a bare `T` separator and a trailing zone designator so they print
/// literally.
#[must_use]
pub fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.to_string();
    if ["THH", "Tmm", "Tss"].iter().any(|t| normalized.contains(t)) {
        normalized = normalized.replace('T', "'T'");
    }
    if !normalized.ends_with("'Z'") && !normalized.ends_with("'z'") {
        if let Some(stripped) = normalized.strip_suffix(|c: char| c == 'Z' || c == 'z') {
            normalized = format!("{stripped}'Z'");
        }
    }
    normalized
}

/// Last `|index|` characters for a negative index, otherwise everything from
/// `index` on. The whole text is returned when it is too short.
fn tail(text: &str, index: i64) -> String {
    let len = text.chars().count();
    let skip = if index < 0 {
        let keep = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(keep)
    } else {
        let start = usize::try_from(index).unwrap_or(usize::MAX);
        if start >= len { 0 } else { start }
    };
    text.chars().skip(skip).collect()
}

/// Map an ISO 20022 transaction status to a response code
#[must_use]
pub fn status_to_response_code(status: Option<&str>) -> &'static str {
    match status {
        Some("ACSC") => "25",
        Some("ACCP") => "00",
        Some("ACSP") => "01",
        Some("RJCT") => "99",
        Some("CANC") => "98",
        Some("PDNG") => "02",
        _ => UNKNOWN_STATUS_CODE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use serde_json::json;

    fn fixed() -> Transformer {
        Transformer::with_clock(|| Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap())
    }

    #[test]
    fn test_blank_and_unknown_pass_through() {
        let t = fixed();
        assert_eq!(t.apply(Some("x"), "", None).unwrap().as_deref(), Some("x"));
        assert_eq!(t.apply(Some("x"), "toUpper(value)", None).unwrap().as_deref(), Some("x"));
        assert_eq!(t.apply(None, "toUpper(value)", None).unwrap(), None);
    }

    #[test]
    fn test_format_date_time_ignores_source() {
        let t = fixed();
        let out = t.apply(Some("2001-01-01"), "formatDateTime(value, 'yyyy-MM-dd')", None).unwrap();
        assert_eq!(out.as_deref(), Some("2024-03-07"));
    }

    #[test]
    fn test_format_date_time_system_clock_shape() {
        let out = Transformer::new()
            .apply(None, "formatDateTime(now(), 'yyyy-MM-dd')", None)
            .unwrap()
            .unwrap();
        assert!(Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap().is_match(&out));
    }

    #[test]
    fn test_format_date_time_normalizes_pattern() {
        let t = fixed();
        let out = t.apply(None, "formatDateTime(now(), 'yyyy-MM-ddTHH:mm:ss.SSSZ')", None).unwrap();
        assert_eq!(out.as_deref(), Some("2024-03-07T14:05:09.000Z"));
    }

    #[test]
    fn test_format_date_time_bad_pattern_is_error() {
        let t = fixed();
        let err = t.apply(None, "formatDateTime(now(), 'yyyy-bb')", None).unwrap_err();
        assert!(matches!(err, Error::Transform(_)));
    }

    #[test]
    fn test_malformed_date_calls_fall_back() {
        let t = fixed();
        assert_eq!(t.apply(None, "formatDateTime(now())", None).unwrap().as_deref(), Some(""));
        assert_eq!(t.apply(Some("v"), "subtractDays(now())", None).unwrap().as_deref(), Some("v"));
        assert_eq!(t.apply(Some("v"), "substring(value)", None).unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_substring() {
        let t = fixed();
        let twenty = "ABCDEFGHIJ0123456789";
        assert_eq!(
            t.apply(Some(twenty), "substring(value, -15)", None).unwrap().as_deref(),
            Some("FGHIJ0123456789")
        );
        assert_eq!(
            t.apply(Some("ABCDEFGHIJ"), "substring(value, -15)", None).unwrap().as_deref(),
            Some("ABCDEFGHIJ")
        );
        assert_eq!(t.apply(Some("ABCDEF"), "substring(value, 2)", None).unwrap().as_deref(), Some("CDEF"));
        assert_eq!(t.apply(Some("ABC"), "substring(value, 3)", None).unwrap().as_deref(), Some("ABC"));
        assert_eq!(t.apply(Some("ABC"), "substring(value, 0)", None).unwrap().as_deref(), Some("ABC"));
    }

    #[test]
    fn test_substring_unresolvable_source_returns_value() {
        let t = fixed();
        let context = ParsedInput::Json(json!({}));
        let out = t.apply(Some("keep"), "substring(source.missing, 1)", Some(&context)).unwrap();
        assert_eq!(out.as_deref(), Some("keep"));
    }

    #[test]
    fn test_subtract_days() {
        let t = fixed();
        let out = t.apply(None, "subtractDays(now(), 6)", None).unwrap();
        assert_eq!(out.as_deref(), Some("2024-03-01T14:05:09.000Z"));
    }

    #[test]
    fn test_concat_mixed_arguments() {
        let t = fixed();
        let context = ParsedInput::Json(json!({"SourceInstitutionCode": "BANKKE"}));
        let out = t
            .apply(
                Some("REF-00000000001234567890"),
                "concat(source.SourceInstitutionCode, formatDateTime(now(), 'yyyyMMdd'), '-', substring(value, -6))",
                Some(&context),
            )
            .unwrap();
        assert_eq!(out.as_deref(), Some("BANKKE20240307-567890"));
    }

    #[test]
    fn test_concat_now_and_literals() {
        let t = fixed();
        let out = t.apply(None, "concat(\"ID\", now(), value, bare)", None).unwrap();
        assert_eq!(out.as_deref(), Some("ID20240307140509bare"));
    }

    #[test]
    fn test_concat_source_without_context_is_skipped() {
        let t = fixed();
        let out = t.apply(Some("v"), "concat('a', source.x, value)", None).unwrap();
        assert_eq!(out.as_deref(), Some("av"));
    }

    #[test]
    fn test_status_mapping() {
        let t = fixed();
        for (status, code) in [
            ("ACSC", "25"),
            ("ACCP", "00"),
            ("ACSP", "01"),
            ("RJCT", "99"),
            ("CANC", "98"),
            ("PDNG", "02"),
            ("UNKNOWN", "99"),
        ] {
            let out = t.apply(Some(status), "mapStatusToResponseCode(TxSts)", None).unwrap();
            assert_eq!(out.as_deref(), Some(code), "status {status}");
        }
        assert_eq!(
            t.apply(None, "mapStatusToResponseCode(TxSts)", None).unwrap().as_deref(),
            Some("99")
        );
    }

    #[test]
    fn test_extract_session_id_is_identity() {
        let t = fixed();
        assert_eq!(t.apply(Some("S-1"), "extractSessionId(MsgId)", None).unwrap().as_deref(), Some("S-1"));
        assert_eq!(t.apply(None, "extractSessionId(MsgId)", None).unwrap(), None);
    }

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern("yyyy-MM-ddTHH:mm:ss"), "yyyy-MM-dd'T'HH:mm:ss");
        assert_eq!(normalize_pattern("yyyy-MM-dd'T'HH:mm:ssZ"), "yyyy-MM-dd'T'HH:mm:ss'Z'");
        assert_eq!(normalize_pattern("HH:mm z"), "HH:mm 'Z'");
        assert_eq!(normalize_pattern("yyyyMMdd"), "yyyyMMdd");
    }
}
