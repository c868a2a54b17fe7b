//! Forward Contract
//!
//! The invocation side of the module tree:
//! - `Forward` - Anything runnable on a set of input fields
//! - `Predict` - The stock `Parameter`: a `Signature` plus a forward pass
//! - `LanguageModel` - Completion backend seam, with the table-driven `DummyLm`
//! - `Example` - Ordered field record used for inputs and predictions

mod error;
mod example;
mod lm;
mod predictor;
mod signature;

pub use error::{ForwardError, ForwardResult};
pub use example::Example;
pub use lm::{DummyLm, LanguageModel};
pub use predictor::{Forward, Predict};
pub use signature::Signature;
