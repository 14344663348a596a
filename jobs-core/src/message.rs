//! Message base shared by every type in the jobs schema
//!
//! Each message supplies its fully-qualified name and a hook that assigns a
//! single field from dynamic init data. Everything else (descriptor lookup,
//! construction from init data, binary and JSON codecs) is provided here.

use prost::Message;
use prost::bytes::BufMut;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{JobsError, Result};
use crate::repeated::{FieldType, json_kind};
use crate::schema::{self, FieldDescriptor, MessageDescriptor};

/// Base behaviour of every `jobs.v1` message
///
/// Implementors only provide [`JobsMessage::FULL_NAME`] and
/// [`JobsMessage::apply_init_field`]; the codecs come with the trait.
pub trait JobsMessage: Message + Default + Serialize + DeserializeOwned {
    /// Fully-qualified protobuf name, e.g. `jobs.v1.Pipelines`
    const FULL_NAME: &'static str;

    /// Assigns one field from init data
    ///
    /// `field` is always a field of this message's descriptor. Implementations
    /// must validate `value` before mutating anything.
    fn apply_init_field(&mut self, field: &FieldDescriptor, value: &Value) -> Result<()>;

    /// Descriptor of this message from the schema registry
    fn descriptor() -> Result<&'static MessageDescriptor> {
        schema::init_once()
            .message(Self::FULL_NAME)
            .ok_or_else(|| JobsError::UnknownMessage(Self::FULL_NAME.to_string()))
    }

    /// Builds a message from dynamic init data
    ///
    /// `null` yields an empty message. Otherwise `init` must be an object whose
    /// keys are field names (proto or JSON spelling) of this message.
    fn from_init_value(init: &Value) -> Result<Self> {
        let descriptor = Self::descriptor()?;
        let mut message = Self::default();

        let entries = match init {
            Value::Null => return Ok(message),
            Value::Object(entries) => entries,
            other => {
                return Err(JobsError::type_validation(
                    Self::FULL_NAME,
                    FieldType::Message,
                    format!("init data must be an object, got {}", json_kind(other)),
                ));
            }
        };

        for (key, value) in entries {
            let field = descriptor
                .field_by_name(key)
                .ok_or_else(|| JobsError::unknown_field(Self::FULL_NAME, key))?;
            message.apply_init_field(field, value)?;
        }

        Ok(message)
    }

    /// Encodes the message in the binary wire format
    fn serialize_to_bytes(&self) -> Vec<u8> {
        let bytes = self.encode_to_vec();
        tracing::trace!("Encoded {} into {} bytes", Self::FULL_NAME, bytes.len());
        bytes
    }

    /// Encodes the message into a caller-provided buffer
    ///
    /// Fails without writing if the buffer has insufficient capacity.
    fn serialize_into<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        self.encode(buf)?;
        Ok(())
    }

    /// Decodes a message from the binary wire format
    ///
    /// Unknown fields are skipped.
    fn parse_from_bytes(bytes: &[u8]) -> Result<Self> {
        schema::init_once();
        let message = Self::decode(bytes)?;
        tracing::trace!("Decoded {} from {} bytes", Self::FULL_NAME, bytes.len());
        Ok(message)
    }

    /// Merges a binary payload into this message
    ///
    /// Repeated fields are appended to, not replaced. The payload is decoded
    /// in full first, so a malformed payload leaves this message unchanged.
    fn merge_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let other = Self::decode(bytes)?;
        self.merge(other.encode_to_vec().as_slice())?;
        Ok(())
    }

    /// Encodes the message as proto3 JSON
    fn serialize_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a message from proto3 JSON
    fn parse_from_json(json: &str) -> Result<Self> {
        schema::init_once();
        Ok(serde_json::from_str(json)?)
    }

    /// Merges a proto3 JSON payload into this message, with the same
    /// semantics as [`JobsMessage::merge_from_bytes`]
    fn merge_from_json(&mut self, json: &str) -> Result<()> {
        let other = Self::parse_from_json(json)?;
        self.merge_from_bytes(&other.serialize_to_bytes())
    }
}
