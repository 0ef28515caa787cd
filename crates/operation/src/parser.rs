use serde_json::Value;

use crate::{
    operation::{
        CreateOperation, DeactivateOperation, Operation, OperationType, RecoverOperation,
        SidetreeOperation, UpdateOperation,
    },
    ParseError, Protocol,
};

/// Operation discriminator field.
pub const TYPE_PROPERTY: &str = "type";

/// Turns raw request payloads into typed operations.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    protocol: &'a Protocol,
}

impl<'a> Parser<'a> {
    pub fn new(protocol: &'a Protocol) -> Self {
        Self { protocol }
    }

    pub fn parse(&self, raw: &[u8]) -> Result<Operation, ParseError> {
        if raw.len() > self.protocol.max_operation_size {
            return Err(ParseError::malformed(format_args!(
                "operation size {} exceeds maximum of {} bytes",
                raw.len(),
                self.protocol.max_operation_size
            )));
        }

        let mut envelope = match serde_json::from_slice(raw)? {
            Value::Object(map) => map,
            _ => return Err(ParseError::malformed("request must be a JSON object")),
        };

        let operation_type = match envelope.remove(TYPE_PROPERTY) {
            Some(Value::String(t)) => t,
            Some(_) => return Err(ParseError::malformed("operation type must be a string")),
            None => return Err(ParseError::malformed("missing operation type")),
        };
        let operation_type = OperationType::from_type(&operation_type)
            .ok_or(ParseError::UnsupportedOperationType(operation_type))?;

        let envelope = Value::Object(envelope);
        let operation = match operation_type {
            OperationType::Create => {
                Operation::Create(serde_json::from_value::<CreateOperation>(envelope)?)
            }
            OperationType::Update => {
                Operation::Update(serde_json::from_value::<UpdateOperation>(envelope)?)
            }
            OperationType::Recover => {
                Operation::Recover(serde_json::from_value::<RecoverOperation>(envelope)?)
            }
            OperationType::Deactivate => {
                Operation::Deactivate(serde_json::from_value::<DeactivateOperation>(envelope)?)
            }
        };

        let operation = operation.check(self.protocol)?;
        log::debug!("parsed {} operation", operation_type);
        Ok(operation)
    }
}

/// Parses `raw` with the given protocol.
pub fn parse(protocol: &Protocol, raw: &[u8]) -> Result<Operation, ParseError> {
    Parser::new(protocol).parse(raw)
}
