//! Wire format of the persisted history log.
//!
//! ```json
//! { "max_stack_size": 25, "undo_stack": [ ... ], "redo_stack": [ ... ] }
//! ```
//!
//! Stacks are written oldest first. Entries are decoded one at a time so a
//! single bad entry is skipped instead of discarding the whole log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    commands::{BatchCommand, Command, CommandKind, RecordCommand, BATCH_TYPE},
    config::DEFAULT_UNDO_LIMIT,
    domain::{EntityKind, Record},
    errors::StoreError,
};

use super::stacks::CommandStacks;

#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("unknown command type `{0}`")]
    UnknownType(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("malformed entry: {0}")]
    Malformed(String),
    #[error("batches cannot contain other batches")]
    NestedBatch,
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Malformed(err.to_string())
    }
}

impl From<StoreError> for CodecError {
    fn from(err: StoreError) -> Self {
        CodecError::Malformed(err.to_string())
    }
}

/// Top-level document. Entries stay as raw JSON until decoded individually.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogDocument {
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: usize,
    #[serde(default)]
    pub undo_stack: Vec<Value>,
    #[serde(default)]
    pub redo_stack: Vec<Value>,
}

fn default_max_stack_size() -> usize {
    DEFAULT_UNDO_LIMIT
}

/// One serialized command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub entity_kind: Option<EntityKind>,
    #[serde(default)]
    pub target_id: Option<Uuid>,
    #[serde(default)]
    pub before_state: Option<Value>,
    #[serde(default)]
    pub after_state: Option<Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub soft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CommandEntry>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_batch: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Decoded stacks plus a warning for every entry that had to be skipped.
#[derive(Debug)]
pub struct DecodedLog {
    pub max_stack_size: usize,
    pub undo: Vec<Command>,
    pub redo: Vec<Command>,
    pub warnings: Vec<String>,
}

pub fn encode_stacks(stacks: &CommandStacks) -> serde_json::Result<LogDocument> {
    let encode_all = |entries: Vec<&Command>| -> serde_json::Result<Vec<Value>> {
        entries
            .into_iter()
            .map(|command| serde_json::to_value(encode(command)?))
            .collect()
    };
    Ok(LogDocument {
        max_stack_size: stacks.max_depth(),
        undo_stack: encode_all(stacks.undo_entries().collect())?,
        redo_stack: encode_all(stacks.redo_entries().collect())?,
    })
}

pub fn decode_document(document: LogDocument) -> DecodedLog {
    let mut warnings = Vec::new();
    let undo = decode_stack("undo_stack", document.undo_stack, &mut warnings);
    let redo = decode_stack("redo_stack", document.redo_stack, &mut warnings);
    DecodedLog {
        max_stack_size: document.max_stack_size,
        undo,
        redo,
        warnings,
    }
}

fn decode_stack(name: &str, entries: Vec<Value>, warnings: &mut Vec<String>) -> Vec<Command> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let decoded = serde_json::from_value::<CommandEntry>(value)
                .map_err(CodecError::from)
                .and_then(decode);
            match decoded {
                Ok(command) => Some(command),
                Err(err) => {
                    warnings.push(format!("skipped {name}[{index}]: {err}"));
                    None
                }
            }
        })
        .collect()
}

pub fn encode(command: &Command) -> serde_json::Result<CommandEntry> {
    match command {
        Command::Record(record) => encode_record(record),
        Command::Batch(batch) => Ok(CommandEntry {
            type_name: BATCH_TYPE.to_string(),
            timestamp: batch.timestamp(),
            entity_kind: None,
            target_id: None,
            before_state: None,
            after_state: None,
            description: batch.description().to_string(),
            soft: false,
            children: Some(
                batch
                    .children()
                    .iter()
                    .map(encode_record)
                    .collect::<serde_json::Result<_>>()?,
            ),
            is_batch: true,
        }),
    }
}

fn encode_record(command: &RecordCommand) -> serde_json::Result<CommandEntry> {
    let state = |record: Option<&Record>| record.map(serde_json::to_value).transpose();
    Ok(CommandEntry {
        type_name: command.kind().to_string(),
        timestamp: command.timestamp(),
        entity_kind: Some(command.entity_kind()),
        target_id: Some(command.target_id()),
        before_state: state(command.before_state())?,
        after_state: state(command.after_state())?,
        description: command.description().to_string(),
        soft: command.is_soft(),
        children: None,
        is_batch: false,
    })
}

pub fn decode(entry: CommandEntry) -> Result<Command, CodecError> {
    if entry.type_name == BATCH_TYPE || entry.is_batch {
        let children = entry
            .children
            .ok_or(CodecError::MissingField("children"))?
            .into_iter()
            .map(decode_record)
            .collect::<Result<Vec<_>, _>>()?;
        let batch = BatchCommand::from_parts(entry.description, entry.timestamp, children)?;
        return Ok(Command::Batch(batch));
    }
    decode_record(entry).map(Command::Record)
}

fn decode_record(entry: CommandEntry) -> Result<RecordCommand, CodecError> {
    if entry.type_name == BATCH_TYPE || entry.is_batch {
        return Err(CodecError::NestedBatch);
    }
    let kind = CommandKind::parse(&entry.type_name)
        .ok_or_else(|| CodecError::UnknownType(entry.type_name.clone()))?;
    if let Some(stated) = entry.entity_kind {
        if stated != kind.entity_kind {
            return Err(CodecError::Malformed(format!(
                "{} entry carries entity_kind {}",
                kind, stated
            )));
        }
    }
    let target_id = entry.target_id.ok_or(CodecError::MissingField("target_id"))?;
    let state = |value: Option<Value>| -> Result<Option<Record>, CodecError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(Record::from_value(kind.entity_kind, value)?)),
        }
    };
    let before_state = state(entry.before_state)?;
    let after_state = state(entry.after_state)?;
    Ok(RecordCommand::from_parts(
        kind,
        target_id,
        before_state,
        after_state,
        entry.description,
        entry.timestamp,
        entry.soft,
    )?)
}
