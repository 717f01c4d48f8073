use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::{
    bingo_store::{ANSWERS_COLLECTION, MISSIONS_COLLECTION, MISSIONS_DOC_ID, PLAYERS_COLLECTION},
    models::answer_key,
};

pub const PLAYER_PREFIX: &str = "player::";
pub const ANSWER_PREFIX: &str = "answer::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Any entity wrapped with CouchDB's `_id` / `_rev` bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDocument<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> CouchDocument<T> {
    pub fn new(id: String, body: T) -> Self {
        Self { id, rev: None, body }
    }
}

/// Document id plus the logical collection it belongs to.
#[derive(Debug, Clone)]
pub struct DocRef {
    pub collection: &'static str,
    pub id: String,
}

impl DocRef {
    pub fn missions() -> Self {
        Self {
            collection: MISSIONS_COLLECTION,
            id: MISSIONS_DOC_ID.to_owned(),
        }
    }

    pub fn player(token: &str) -> Self {
        Self {
            collection: PLAYERS_COLLECTION,
            id: format!("{PLAYER_PREFIX}{token}"),
        }
    }

    pub fn answer(token: &str, number: u8) -> Self {
        Self {
            collection: ANSWERS_COLLECTION,
            id: format!("{ANSWER_PREFIX}{}", answer_key(token, number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::PlayerEntity;
    use std::time::{Duration, SystemTime};

    #[test]
    fn document_ids_are_prefixed_by_kind() {
        assert_eq!(DocRef::missions().id, "missions");
        assert_eq!(DocRef::player("team a").id, "player::team a");
        assert_eq!(DocRef::answer("team a", 9).id, "answer::team a_9");
    }

    #[test]
    fn flattened_document_omits_missing_revision() {
        let player = PlayerEntity {
            token: "t".into(),
            board: vec![1, 2],
            locked: false,
            completed: vec![],
            updated_at: SystemTime::UNIX_EPOCH + Duration::from_millis(1500),
        };
        let value = serde_json::to_value(CouchDocument::new(DocRef::player("t").id, player))
            .unwrap();

        assert_eq!(value["_id"], "player::t");
        assert!(value.get("_rev").is_none());
        assert_eq!(value["board"], serde_json::json!([1, 2]));
        assert_eq!(value["updated_at"], 1500);
    }
}
