//! Predictor Signatures
//!
//! A signature names the input and output fields of a predictor:
//! `"question -> answer"`, `"context, question -> reasoning, answer"`.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use super::error::{ForwardError, ForwardResult};
use crate::registry::is_identifier;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Signature {
    /// Parse `"in1, in2 -> out1, out2"`.
    ///
    /// Both sides must list at least one identifier; names may not repeat.
    pub fn parse(text: &str) -> ForwardResult<Self> {
        let invalid = |reason: &str| ForwardError::InvalidSignature {
            signature: text.to_string(),
            reason: reason.to_string(),
        };

        let (lhs, rhs) = text.split_once("->").ok_or_else(|| invalid("missing '->'"))?;
        if rhs.contains("->") {
            return Err(invalid("more than one '->'"));
        }

        let inputs = fields(lhs).ok_or_else(|| invalid("inputs must be comma-separated identifiers"))?;
        let outputs = fields(rhs).ok_or_else(|| invalid("outputs must be comma-separated identifiers"))?;
        if !inputs.iter().chain(&outputs).all_unique() {
            return Err(invalid("field names must be unique"));
        }

        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

fn fields(side: &str) -> Option<Vec<String>> {
    let names: Vec<String> = side.split(',').map(|s| s.trim().to_string()).collect();
    if names.iter().all(|n| is_identifier(n)) {
        Some(names)
    } else {
        None
    }
}

impl FromStr for Signature {
    type Err = ForwardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.inputs.iter().join(", "), self.outputs.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let sig = Signature::parse("question -> query").unwrap();
        assert_eq!(sig.inputs(), &["question".to_string()]);
        assert_eq!(sig.outputs(), &["query".to_string()]);
    }

    #[test]
    fn test_parse_multiple_fields() {
        let sig: Signature = "context,question->reasoning, answer".parse().unwrap();
        assert_eq!(sig.inputs().len(), 2);
        assert_eq!(sig.outputs().len(), 2);
        assert_eq!(sig.to_string(), "context, question -> reasoning, answer");
    }

    #[test]
    fn test_invalid_signatures() {
        for text in ["question answer", "-> answer", "question ->", "a -> b -> c", "a b -> c", "a -> a", "a, -> b"] {
            assert!(
                matches!(Signature::parse(text), Err(ForwardError::InvalidSignature { .. })),
                "expected invalid: {}",
                text
            );
        }
    }
}
