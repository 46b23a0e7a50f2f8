//! Style-Auflösung: literale Werte oder Feature-abhängige Funktionen.
//!
//! Beim Auflösen werden Literale wie konstante Funktionen behandelt;
//! `resolve` ist dadurch ein einfaches Map-Evaluate über den Defaults.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::core::{DrawError, Feature};

/// Feature-abhängige Style-Funktion.
pub type StyleFn = Box<dyn Fn(&Feature) -> Value + Send + Sync>;

/// Ein Style-Eintrag: literaler Wert oder Funktion über dem Feature.
pub enum StyleValue {
    Literal(Value),
    Derived(StyleFn),
}

impl StyleValue {
    /// Wertet den Eintrag gegen das Feature aus.
    pub fn evaluate(&self, feature: &Feature) -> Value {
        match self {
            StyleValue::Literal(value) => value.clone(),
            StyleValue::Derived(f) => f(feature),
        }
    }
}

impl fmt::Debug for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            StyleValue::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Style-Overrides eines Modus, Key auf Wert oder Funktion.
#[derive(Debug, Default)]
pub struct Styles {
    entries: HashMap<String, StyleValue>,
}

impl Styles {
    /// Setzt einen literalen Style-Wert.
    pub fn set_literal(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), StyleValue::Literal(value));
    }

    /// Setzt eine Feature-abhängige Style-Funktion.
    pub fn set_derived(
        &mut self,
        key: impl Into<String>,
        f: impl Fn(&Feature) -> Value + Send + Sync + 'static,
    ) {
        self.entries
            .insert(key.into(), StyleValue::Derived(Box::new(f)));
    }

    /// Übernimmt ein JSON-Mapping als literale Overrides.
    ///
    /// Alles außer einem Objekt schlägt mit `InvalidStyles` fehl.
    pub fn set_from_json(&mut self, value: Value) -> Result<(), DrawError> {
        let Value::Object(map) = value else {
            return Err(DrawError::InvalidStyles);
        };
        for (key, value) in map {
            self.entries.insert(key, StyleValue::Literal(value));
        }
        Ok(())
    }

    /// Löst alle Styles gegen das Feature auf, Overrides über den Defaults.
    pub fn resolve(&self, defaults: &Map<String, Value>, feature: &Feature) -> Map<String, Value> {
        let mut resolved = defaults.clone();
        for (key, value) in &self.entries {
            resolved.insert(key.clone(), value.evaluate(feature));
        }
        resolved
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
