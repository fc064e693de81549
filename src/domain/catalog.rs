//! # Tool Catalog
//!
//! Name-indexed view of the tools a provider advertised, built once after
//! discovery. Resolves model-issued invocation requests and validates their
//! arguments against the advertised input schema before anything is dispatched.

use std::collections::HashMap;
use std::fmt;

use jsonschema::Validator;
use serde_json::Value;

use crate::domain::errors::{Error, Result};
use crate::domain::types::{ToolDescriptor, ToolInvocation};

pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
    /// One slot per descriptor; `None` when the schema did not compile.
    validators: Vec<Option<Validator>>,
}

impl ToolCatalog {
    /// Build the catalog, rejecting duplicate tool names.
    pub fn build(descriptors: Vec<ToolDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        let mut validators = Vec::with_capacity(descriptors.len());

        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name.clone(), position).is_some() {
                return Err(Error::DuplicateTool(descriptor.name.clone()));
            }
            validators.push(compile_schema(descriptor));
        }

        Ok(Self {
            descriptors,
            index,
            validators,
        })
    }

    /// Descriptors in the order the provider advertised them.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Check that an invocation names a known tool and satisfies its schema.
    pub fn resolve(&self, call: &ToolInvocation) -> Result<&ToolDescriptor> {
        let position = *self
            .index
            .get(&call.name)
            .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;

        if let Some(validator) = &self.validators[position] {
            let instance = Value::Object(call.arguments.clone());
            let problems: Vec<String> = validator
                .iter_errors(&instance)
                .map(|e| e.to_string())
                .collect();
            if !problems.is_empty() {
                return Err(Error::InvalidArguments {
                    tool: call.name.clone(),
                    message: problems.join("; "),
                });
            }
        }

        Ok(&self.descriptors[position])
    }
}

impl fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}

fn compile_schema(descriptor: &ToolDescriptor) -> Option<Validator> {
    match jsonschema::validator_for(&descriptor.input_schema) {
        Ok(validator) => Some(validator),
        Err(e) => {
            // Schema stays advisory for the model; dispatch goes ahead unchecked.
            tracing::warn!(tool = %descriptor.name, error = %e, "Could not compile tool input schema");
            None
        }
    }
}
