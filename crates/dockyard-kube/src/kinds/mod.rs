//! [`HarborResource`](crate::engine::HarborResource) implementations, one per kind

mod member;
mod project;
mod registry;
mod user;

/// Case-insensitive name match used for adoption
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match() {
        assert!(names_match("Team-A", "team-a"));
        assert!(!names_match("team-a", "team-b"));
    }
}
