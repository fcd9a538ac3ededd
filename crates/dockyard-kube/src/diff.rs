//! Field-level comparison between declared and observed state

use std::fmt;

/// One field whose observed value differs from the declared one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub current: String,
    pub desired: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.current, self.desired)
    }
}

/// Collects [`FieldChange`]s
#[derive(Debug, Default)]
pub struct FieldDiff {
    changes: Vec<FieldChange>,
}

impl FieldDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare two values exactly
    pub fn field<T: PartialEq + fmt::Debug + ?Sized>(
        mut self,
        field: &'static str,
        current: &T,
        desired: &T,
    ) -> Self {
        if current != desired {
            self.changes.push(FieldChange {
                field,
                current: format!("{:?}", current),
                desired: format!("{:?}", desired),
            });
        }
        self
    }

    /// Compare two strings ignoring case
    pub fn ignore_case(mut self, field: &'static str, current: &str, desired: &str) -> Self {
        if current.to_lowercase() != desired.to_lowercase() {
            self.changes.push(FieldChange {
                field,
                current: format!("{:?}", current),
                desired: format!("{:?}", desired),
            });
        }
        self
    }

    /// Compare only when a desired value is declared
    pub fn declared<T: PartialEq + fmt::Debug>(
        self,
        field: &'static str,
        current: &Option<T>,
        desired: &Option<T>,
    ) -> Self {
        match desired {
            Some(_) => self.field(field, current, desired),
            None => self,
        }
    }

    pub fn into_changes(self) -> Vec<FieldChange> {
        self.changes
    }
}

/// Render changes for a log line
pub fn summarize(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_diff() {
        let changes = FieldDiff::new()
            .field("name", "hub", "hub")
            .field("insecure", &false, &true)
            .ignore_case("type", "Docker-Hub", "docker-hub")
            .declared("severity", &Some("low"), &None)
            .declared("auto_scan", &None, &Some("true"))
            .into_changes();

        assert_eq!(
            summarize(&changes),
            r#"insecure: false -> true, auto_scan: None -> Some("true")"#
        );
    }
}
