//! Class list
//!
//! Space-separated view over an element's `class` attribute.

/// Ordered, duplicate-free set of class names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(&[token]);
        }
        list
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s), ignoring empty ones and duplicates
    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    /// Attribute value form
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_dedups() {
        let list = ClassList::from_string("  a b\ta  c ");
        assert_eq!(list.value(), "a b c");
    }

    #[test]
    fn test_add_skips_empty_and_duplicates() {
        let mut list = ClassList::new();
        list.add(&["x", "", "y", "x"]);
        assert!(list.contains("x"));
        assert_eq!(list.to_string(), "x y");
    }
}
