//! Field Records
//!
//! An `Example` is an insertion-ordered set of named string fields. It carries
//! both the inputs of a forward call and the prediction it returns.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Example {
    fields: Vec<(String, String)>,
}

impl Example {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field; an existing field keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Example {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut example = Example::new();
        for (k, v) in iter {
            example.set(k, v);
        }
        example
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Example(")?;
        for (i, (n, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={:?}", n, v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut example = Example::new().with("question", "What is 1+1?");
        example.set("answer", "2");
        example.set("question", "again");
        assert_eq!(example.get("question"), Some("again"));
        assert_eq!(example.len(), 2);
        assert_eq!(example.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec!["question", "answer"]);
    }

    #[test]
    fn test_display() {
        let example: Example = [("a", "1"), ("b", "x y")].into_iter().collect();
        assert_eq!(example.to_string(), "Example(a=\"1\", b=\"x y\")");
    }
}
