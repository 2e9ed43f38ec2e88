//! A string-or-error accessor result.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ValueError;

/// The outcome of looking up a query, path or form value.
///
/// It carries either the string or the reason there is none, so conversions can be
/// chained without checking presence first:
///
/// ```
/// # use mini_web::StringValue;
/// let age = StringValue::from("42").to_i64();
/// assert_eq!(age, Ok(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    inner: Result<String, ValueError>,
}

impl StringValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self { inner: Ok(value.into()) }
    }

    pub fn error(error: ValueError) -> Self {
        Self { inner: Err(error) }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        Self::error(ValueError::not_found(key))
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }

    pub fn as_str(&self) -> Result<&str, &ValueError> {
        self.inner.as_deref()
    }

    pub fn into_string(self) -> Result<String, ValueError> {
        self.inner
    }

    pub fn to_i64(&self) -> Result<i64, ValueError> {
        self.parse::<i64>()
    }

    /// Parses the value with [`FromStr`], or returns the stored error unchanged.
    pub fn parse<T>(&self) -> Result<T, ValueError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match &self.inner {
            Ok(value) => value.parse::<T>().map_err(|e| ValueError::invalid_value(value, e)),
            Err(e) => Err(e.clone()),
        }
    }
}

impl From<String> for StringValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StringValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Result<String, ValueError>> for StringValue {
    fn from(inner: Result<String, ValueError>) -> Self {
        Self { inner }
    }
}
