//! Variable expressions
//!
//! A mapping entry is either a bare simulator reference (`L:FLAPS_TGT`,
//! `A:GEAR HANDLE POSITION, Bool`, or an unprefixed local name) or a computed
//! expression in parentheses that the service evaluates as a command, such
//! as `(>K:TOGGLE_GEAR)`.

use std::fmt;

/// Namespace of a bare reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `L:` local variable
    Local,
    /// `A:` aircraft variable
    Aircraft,
    /// No prefix; treated as a local variable when written
    Unprefixed,
}

/// A parsed mapping expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableExpr {
    Reference { scope: Scope, raw: String },
    Computed(String),
}

impl VariableExpr {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('(') {
            return VariableExpr::Computed(raw.to_string());
        }
        let scope = if raw.starts_with("L:") {
            Scope::Local
        } else if raw.starts_with("A:") {
            Scope::Aircraft
        } else {
            Scope::Unprefixed
        };
        VariableExpr::Reference {
            scope,
            raw: raw.to_string(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            VariableExpr::Reference { raw, .. } | VariableExpr::Computed(raw) => raw,
        }
    }

    /// Only prefixed references can be read back
    pub fn is_readable(&self) -> bool {
        matches!(
            self,
            VariableExpr::Reference {
                scope: Scope::Local | Scope::Aircraft,
                ..
            }
        )
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, VariableExpr::Computed(_))
    }

    /// Expression that evaluates to the current value, e.g. `(L:FLAPS_TGT)`
    pub fn read_expr(&self) -> Option<String> {
        self.is_readable().then(|| format!("({})", self.raw()))
    }

    /// Variable a write lands in; unprefixed names become locals
    pub fn write_target(&self) -> Option<String> {
        match self {
            VariableExpr::Reference {
                scope: Scope::Unprefixed,
                raw,
            } => Some(format!("L:{raw}")),
            VariableExpr::Reference { raw, .. } => Some(raw.clone()),
            VariableExpr::Computed(_) => None,
        }
    }

    /// Set-expression storing `value`, e.g. `15.0 (>L:FLAPS_TGT)`
    pub fn set_expr(&self, value: f64) -> Option<String> {
        self.write_target()
            .map(|target| format!("{} (>{})", format_value(value), target))
    }
}

impl fmt::Display for VariableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Format a value for a set-expression
///
/// Whole numbers keep one decimal (`15.0`) so the service always sees a float.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            VariableExpr::parse("L:FLAPS_TGT"),
            VariableExpr::Reference {
                scope: Scope::Local,
                raw: "L:FLAPS_TGT".into()
            }
        );
        assert!(matches!(
            VariableExpr::parse("A:GEAR HANDLE POSITION, Bool"),
            VariableExpr::Reference {
                scope: Scope::Aircraft,
                ..
            }
        ));
        assert!(matches!(
            VariableExpr::parse("SEATBELTS"),
            VariableExpr::Reference {
                scope: Scope::Unprefixed,
                ..
            }
        ));
        assert!(VariableExpr::parse(" (>K:TOGGLE_GEAR)").is_computed());
    }

    #[test]
    fn test_readable() {
        assert_eq!(
            VariableExpr::parse("L:FLAPS_TGT").read_expr().as_deref(),
            Some("(L:FLAPS_TGT)")
        );
        assert!(VariableExpr::parse("SEATBELTS").read_expr().is_none());
        assert!(VariableExpr::parse("(>K:TOGGLE_GEAR)").read_expr().is_none());
    }

    #[test]
    fn test_set_expr() {
        assert_eq!(
            VariableExpr::parse("L:FLAPS_TGT").set_expr(15.0).as_deref(),
            Some("15.0 (>L:FLAPS_TGT)")
        );
        assert_eq!(
            VariableExpr::parse("SEATBELTS").set_expr(1.0).as_deref(),
            Some("1.0 (>L:SEATBELTS)")
        );
        assert_eq!(
            VariableExpr::parse("A:LIGHT LANDING").set_expr(0.5).as_deref(),
            Some("0.5 (>A:LIGHT LANDING)")
        );
        assert!(VariableExpr::parse("(>K:TOGGLE_GEAR)").set_expr(1.0).is_none());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(15.0), "15.0");
        assert_eq!(format_value(-2.0), "-2.0");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(1013.5), "1013.5");
    }
}
