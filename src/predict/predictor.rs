//! Predict Parameter
//!
//! `Predict` is the stock parameter: a signature plus a forward pass that asks
//! the model for the signature's output fields.

use std::any::Any;

use tracing::debug;

use super::error::{ForwardError, ForwardResult};
use super::example::Example;
use super::lm::LanguageModel;
use super::signature::Signature;
use crate::registry::{ParamRef, Parameter};

/// Something that can be run on a set of input fields.
pub trait Forward {
    fn forward(&self, lm: &dyn LanguageModel, inputs: &Example) -> ForwardResult<Example>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predict {
    signature: Signature,
}

impl Predict {
    pub fn new(signature: Signature) -> Self {
        Self { signature }
    }

    /// Parse `signature` and build a predictor.
    pub fn from_signature(signature: &str) -> ForwardResult<Self> {
        Signature::parse(signature).map(Self::new)
    }

    /// Parse `signature` and wrap the predictor in a parameter handle.
    pub fn param(signature: &str) -> ForwardResult<ParamRef> {
        Self::from_signature(signature).map(ParamRef::new)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Prompt text: the input values, one per line, in signature order.
    fn prompt(&self, inputs: &Example) -> ForwardResult<String> {
        let mut lines = Vec::with_capacity(self.signature.inputs().len());
        for field in self.signature.inputs() {
            let value = inputs
                .get(field)
                .ok_or_else(|| ForwardError::MissingInput(field.clone()))?;
            lines.push(value);
        }
        Ok(lines.join("\n"))
    }
}

impl Parameter for Predict {
    fn kind(&self) -> &str {
        "Predict"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Forward for Predict {
    fn forward(&self, lm: &dyn LanguageModel, inputs: &Example) -> ForwardResult<Example> {
        let prompt = self.prompt(inputs)?;
        let reply = lm.complete(&prompt)?;

        let mut prediction = Example::new();
        for field in self.signature.outputs() {
            let value = reply
                .get(field)
                .ok_or_else(|| ForwardError::MissingOutput(field.clone()))?;
            prediction.set(field.clone(), value);
        }
        debug!(target: "modtree::predict", signature = %self.signature, "Forward complete");
        Ok(prediction)
    }
}

impl Forward for ParamRef {
    /// Forward through the wrapped parameter; only `Predict` parameters can run.
    fn forward(&self, lm: &dyn LanguageModel, inputs: &Example) -> ForwardResult<Example> {
        match self.downcast_ref::<Predict>() {
            Some(predict) => predict.forward(lm, inputs),
            None => Err(ForwardError::Model(format!(
                "parameter of kind '{}' cannot be run",
                self.kind()
            ))),
        }
    }
}
