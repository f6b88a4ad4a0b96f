use std::{cmp::Ordering, sync::LazyLock, time::Duration};

use regex::Regex;

use crate::schema::TypeClass;

/// A native field value read from a record.
///
/// Every queryable field produces exactly one variant, chosen by its
/// [`TypeClass`]. Optional fields produce [`Value::Null`] when unset.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use userquery::Value;
///
/// let rating = Value::from(5);
/// let title = Value::from("Waffles");
/// let length = Value::from(Duration::from_secs(185));
/// let album: Value = None::<String>.into();
///
/// assert_eq!(rating, Value::Integer(5));
/// assert_eq!(title, Value::String("Waffles".to_string()));
/// assert_eq!(length, Value::Duration(Duration::from_secs(185)));
/// assert!(album.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value of an optional field
    Null,

    /// Integer number
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// Length of time
    Duration(Duration),

    /// UTF-8 string
    String(String),

    /// Enum variant, by name
    Enum(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Equality as used by `=` and `!=`.
    ///
    /// Strings and enum names compare case-insensitively. Null equals only null.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::String(a), Value::String(b)) | (Value::Enum(a), Value::Enum(b)) => {
                a.to_lowercase() == b.to_lowercase()
            }
            _ => false,
        }
    }

    /// Ordering as used by `<`, `<=`, `>` and `>=`.
    ///
    /// `None` when either side is null or the two values are not comparable.
    pub fn partial_order(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write_number(f, n.to_string()),
            Value::Float(n) => write_number(f, n.to_string()),
            Value::Duration(d) => write!(f, "'{}'", format_duration(*d)),
            Value::String(s) | Value::Enum(s) => write!(f, "'{}'", escape_literal(s)),
        }
    }
}

/// Numbers that would not lex as a number token (`-3`, `NaN`, `inf`) are quoted.
fn write_number(f: &mut std::fmt::Formatter<'_>, text: String) -> std::fmt::Result {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        write!(f, "{}", text)
    } else {
        write!(f, "'{}'", text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Escape a string so it reads back as the same quoted literal.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Literal parsers
// ============================================================================

type LiteralParser = fn(&str, &[String]) -> Option<Value>;

/// Parser table, one entry per type class.
fn literal_parser(class: TypeClass) -> LiteralParser {
    match class {
        TypeClass::Int => |s, _| s.parse::<i64>().ok().map(Value::Integer),
        TypeClass::Float => |s, _| s.parse::<f64>().ok().map(Value::Float),
        TypeClass::Duration => |s, _| parse_duration(s).map(Value::Duration),
        TypeClass::String => |s, _| Some(Value::String(s.to_string())),
        TypeClass::Enum => |s, variants| {
            variants
                .iter()
                .find(|v| v.to_lowercase() == s.to_lowercase())
                .map(|v| Value::Enum(v.clone()))
        },
    }
}

/// Parse literal text into the native value of a type class.
///
/// `variants` is only consulted for [`TypeClass::Enum`]; the returned enum
/// value carries the declared spelling of the variant.
pub fn parse_literal(class: TypeClass, literal: &str, variants: &[String]) -> Option<Value> {
    literal_parser(class)(literal, variants)
}

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)\.)?(\d+):(\d+)(?::(\d+)(?:\.(\d{1,7}))?)?$")
        .expect("duration pattern is valid")
});

/// Parse a duration literal.
///
/// Accepted layouts:
///
/// ```text
/// d                      // whole days
/// hh:mm
/// hh:mm:ss
/// hh:mm:ss.fffffff
/// d.hh:mm[:ss[.fffffff]]
/// ```
///
/// Hours must be below 24, minutes and seconds below 60.
pub fn parse_duration(s: &str) -> Option<Duration> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let s = s.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let days = s.parse::<u64>().ok()?;
        return days.checked_mul(DAY).map(Duration::from_secs);
    }

    let caps = DURATION.captures(s)?;
    let number = |i: usize| -> Option<u64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let days = number(1)?;
    let hours = number(2)?;
    let minutes = number(3)?;
    let seconds = number(4)?;
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos = match caps.get(5) {
        Some(m) => {
            let digits = m.as_str();
            // Right-pad to nine digits: ".5" is half a second.
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        None => 0,
    };

    let secs = days
        .checked_mul(DAY)?
        .checked_add(hours * HOUR + minutes * MINUTE + seconds)?;
    Some(Duration::new(secs, nanos))
}

/// Render a duration in the layout [`parse_duration`] reads.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = if days > 0 {
        format!("{}.{:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    };
    if d.subsec_nanos() > 0 {
        let fraction = format!("{:09}", d.subsec_nanos());
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

// ============================================================================
// Sort keys
// ============================================================================

/// Ordering key for `orderby`.
///
/// Keys order by the natural ordering of the underlying type, never by
/// identity:
///
/// - null sorts before every other key
/// - numbers and durations by magnitude (floats with total ordering)
/// - strings case-insensitively, ties broken by exact spelling
/// - enums by declaration order of their variants
#[derive(Debug, Clone)]
pub enum SortKey {
    Null,
    Integer(i64),
    Float(f64),
    Duration(Duration),
    Text { folded: String, original: String },
    Enum { index: usize, name: String },
}

impl SortKey {
    pub fn new(value: Value, variants: &[String]) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Integer(n) => SortKey::Integer(n),
            Value::Float(n) => SortKey::Float(n),
            Value::Duration(d) => SortKey::Duration(d),
            Value::String(s) => SortKey::Text {
                folded: s.to_lowercase(),
                original: s,
            },
            Value::Enum(name) => {
                // Unknown variants sort after every declared one.
                let index = variants
                    .iter()
                    .position(|v| v.to_lowercase() == name.to_lowercase())
                    .unwrap_or(variants.len());
                SortKey::Enum { index, name }
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Integer(_) => 1,
            SortKey::Float(_) => 2,
            SortKey::Duration(_) => 3,
            SortKey::Text { .. } => 4,
            SortKey::Enum { .. } => 5,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Duration(a), SortKey::Duration(b)) => a.cmp(b),
            (
                SortKey::Text { folded: fa, original: oa },
                SortKey::Text { folded: fb, original: ob },
            ) => fa.cmp(fb).then_with(|| oa.cmp(ob)),
            (SortKey::Enum { index: ia, name: na }, SortKey::Enum { index: ib, name: nb }) => {
                ia.cmp(ib).then_with(|| na.cmp(nb))
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}
