//! Properties and their parameters.

use super::Value;

/// A property parameter such as `TZID=Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Uppercased parameter name.
    pub name: String,
    /// Values in order, quoted values without their quotes.
    pub values: Vec<String>,
}

/// One content line of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Uppercased property name.
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    /// The value as it appeared after unfolding.
    pub raw_value: String,
}

impl Property {
    /// Returns the first value of the parameter called `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case(name))
            .and_then(|param| param.values.first())
            .map(String::as_str)
    }

    /// Returns true if the property holds DATE values rather than date-times.
    #[must_use]
    pub fn is_date_valued(&self) -> bool {
        self.param("VALUE")
            .is_some_and(|kind| kind.eq_ignore_ascii_case("DATE"))
            || matches!(self.value, Value::Date(_) | Value::Dates(_))
    }

    /// Returns the unescaped text, or the raw value if the property is not
    /// TEXT typed.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.value {
            Value::Text(text) => text,
            _ => &self.raw_value,
        }
    }
}
