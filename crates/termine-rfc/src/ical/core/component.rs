//! Components and the calendar root.

use super::Property;

/// A `BEGIN:<name>` ... `END:<name>` block with its nested blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    /// Uppercased component name, e.g. `VEVENT`.
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            ..Self::default()
        }
    }

    /// Returns the first property called `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties_named(name).next()
    }

    /// Returns every property called `name`, in feed order.
    pub fn properties_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |prop| prop.name.eq_ignore_ascii_case(name))
    }
}

/// A parsed `VCALENDAR` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// Returns the `VEVENT` children of the calendar, in feed order.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.root
            .children
            .iter()
            .filter(|child| child.name == "VEVENT")
            .collect()
    }
}
