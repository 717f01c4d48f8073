use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::{
    bingo_store::MISSIONS_DOC_ID,
    models::{AnswerEntity, MissionBoardEntity, MissionEntity, PlayerEntity, answer_key},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMissionsDocument {
    #[serde(rename = "_id")]
    id: String,
    missions: Vec<MissionEntity>,
    updated_at: DateTime,
}

impl From<MissionBoardEntity> for MongoMissionsDocument {
    fn from(value: MissionBoardEntity) -> Self {
        Self {
            id: MISSIONS_DOC_ID.to_owned(),
            missions: value.missions,
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoMissionsDocument> for MissionBoardEntity {
    fn from(value: MongoMissionsDocument) -> Self {
        Self {
            missions: value.missions,
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Player document keyed by its token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    token: String,
    board: Vec<i32>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    completed: Vec<i32>,
    updated_at: DateTime,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            token: value.token,
            board: value.board.into_iter().map(i32::from).collect(),
            locked: value.locked,
            completed: value.completed.into_iter().map(i32::from).collect(),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            token: value.token,
            board: narrow(value.board),
            locked: value.locked,
            completed: narrow(value.completed),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Answer document keyed by `token_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    #[serde(rename = "_id")]
    id: String,
    token: String,
    mission_number: i32,
    text: String,
    submitted_at: DateTime,
}

impl From<AnswerEntity> for MongoAnswerDocument {
    fn from(value: AnswerEntity) -> Self {
        Self {
            id: value.key(),
            token: value.token,
            mission_number: i32::from(value.mission_number),
            text: value.text,
            submitted_at: DateTime::from_system_time(value.submitted_at),
        }
    }
}

impl From<MongoAnswerDocument> for AnswerEntity {
    fn from(value: MongoAnswerDocument) -> Self {
        Self {
            token: value.token,
            mission_number: u8::try_from(value.mission_number).unwrap_or(0),
            text: value.text,
            submitted_at: value.submitted_at.to_system_time(),
        }
    }
}

// BSON has no unsigned byte; anything outside u8 becomes an empty cell.
fn narrow(values: Vec<i32>) -> Vec<u8> {
    values
        .into_iter()
        .map(|value| u8::try_from(value).unwrap_or(0))
        .collect()
}

pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}

pub fn answer_doc_id(token: &str, number: u8) -> Document {
    doc_id(&answer_key(token, number))
}
