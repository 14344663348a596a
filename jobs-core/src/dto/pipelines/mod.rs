//! Pipelines DTO
//!
//! `jobs.v1.Pipelines` is the request body used to pause, resume, list or
//! destroy pipelines. It only carries pipeline names.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{JobsError, Result};
use crate::message::JobsMessage;
use crate::repeated::{IntoRepeatedField, RepeatedField, check_repeated_field};
use crate::schema::{self, FieldDescriptor};

const PIPELINES_FIELD: &str = "pipelines";

/// Request to pause/resume/list/destroy
///
/// Wire form: `repeated string pipelines = 1;`. Names keep their order and
/// may repeat.
#[derive(Clone, PartialEq, Serialize, Deserialize, ::prost::Message)]
#[serde(default, deny_unknown_fields)]
pub struct Pipelines {
    #[prost(string, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pipelines: Vec<String>,
}

/// proto3 JSON reads `null` as the field's default
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Init options for [`Pipelines`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelinesInit {
    /// Initial pipeline names; empty when `None`
    #[serde(default)]
    pub pipelines: Option<Vec<String>>,
}

impl PipelinesInit {
    /// Sets the initial pipeline names
    pub fn with_pipelines(mut self, values: impl IntoRepeatedField<String>) -> Self {
        self.pipelines = Some(values.into_repeated_field().into_vec());
        self
    }
}

impl Pipelines {
    /// Creates an empty message
    pub fn new() -> Self {
        schema::init_once();
        Self::default()
    }

    /// Creates a message from init options
    pub fn from_init(init: PipelinesInit) -> Self {
        schema::init_once();
        Self {
            pipelines: init.pipelines.unwrap_or_default(),
        }
    }

    /// Current pipeline names
    pub fn pipelines(&self) -> &[String] {
        &self.pipelines
    }

    /// Live handle on the pipeline names
    ///
    /// Changes made through the handle are changes to this message.
    pub fn pipelines_mut(&mut self) -> &mut Vec<String> {
        &mut self.pipelines
    }

    /// Replaces all pipeline names
    pub fn set_pipelines(&mut self, values: impl IntoRepeatedField<String>) -> &mut Self {
        self.pipelines = values.into_repeated_field().into_vec();
        self
    }

    /// Replaces all pipeline names from a dynamic value
    ///
    /// `value` must be an array of strings. On error the current names are
    /// left untouched.
    pub fn try_set_pipelines(&mut self, value: &Value) -> Result<&mut Self> {
        let checked: RepeatedField<String> =
            check_repeated_field(PIPELINES_FIELD, value).inspect_err(|err| {
                tracing::debug!("Rejected pipelines value: {}", err);
            })?;

        Ok(self.set_pipelines(checked))
    }

    /// Removes all pipeline names
    pub fn clear_pipelines(&mut self) -> &mut Self {
        self.pipelines.clear();
        self
    }

    /// Moves the pipeline names out, leaving the message empty
    pub fn take_pipelines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pipelines)
    }
}

impl From<PipelinesInit> for Pipelines {
    fn from(init: PipelinesInit) -> Self {
        Self::from_init(init)
    }
}

impl JobsMessage for Pipelines {
    const FULL_NAME: &'static str = "jobs.v1.Pipelines";

    fn apply_init_field(&mut self, field: &FieldDescriptor, value: &Value) -> Result<()> {
        match field.number {
            1 => {
                self.try_set_pipelines(value)?;
                Ok(())
            }
            _ => Err(JobsError::unknown_field(Self::FULL_NAME, &field.name)),
        }
    }
}
