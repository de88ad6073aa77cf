// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::extra_unused_lifetimes)]

use crate::{
    db::postgres::schema::event,
    store::{Entity, StoreError},
};
use diesel::prelude::*;
use field_count::FieldCount;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

/// Discriminator stored in `event.event_type` (at most 13 characters).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString, AsRefStr,
)]
pub enum EventType {
    SetCodeTxType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCodeTxTypePayload {
    pub from: String,
    /// Empty when the transaction carried no delegation.
    #[serde(default)]
    pub designator_address: String,
}

/// Event payload, tagged by `isTypeOf` in the jsonb column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "isTypeOf")]
pub enum EventPayload {
    SetCodeTxTypePayload(SetCodeTxTypePayload),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::SetCodeTxTypePayload(_) => EventType::SetCodeTxType,
        }
    }
}

/// Domain event derived from one qualifying transaction. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub block_id: String,
    pub transaction_hash: String,
    pub event_type: EventType,
    pub payload: EventPayload,
    pub from: Option<String>,
    pub designator_id: Option<String>,
    pub account_id: Option<String>,
}

impl Entity for Event {
    const NAME: &'static str = "Event";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Row shape of the `event` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, FieldCount)]
#[diesel(table_name = event)]
pub struct EventRow {
    pub id: String,
    pub block_id: String,
    pub transaction_hash: String,
    pub event_type: Option<String>,
    pub payload: serde_json::Value,
    pub from_: Option<String>,
    pub designator_id: Option<String>,
    pub account_id: Option<String>,
}

impl TryFrom<&Event> for EventRow {
    type Error = StoreError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id.clone(),
            block_id: event.block_id.clone(),
            transaction_hash: event.transaction_hash.clone(),
            event_type: Some(event.event_type.to_string()),
            payload: serde_json::to_value(&event.payload)?,
            from_: event.from.clone(),
            designator_id: event.designator_id.clone(),
            account_id: event.account_id.clone(),
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let payload: EventPayload = serde_json::from_value(row.payload)?;
        let event_type = match row.event_type {
            Some(raw) => EventType::from_str(&raw).map_err(|e| {
                StoreError::Serialization(format!("unknown event type {}: {}", raw, e))
            })?,
            None => payload.event_type(),
        };

        Ok(Self {
            id: row.id,
            block_id: row.block_id,
            transaction_hash: row.transaction_hash,
            event_type,
            payload,
            from: row.from_,
            designator_id: row.designator_id,
            account_id: row.account_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Event {
        Event {
            id: "0000000010-abcde-000000".to_string(),
            block_id: "0000000010-abcde".to_string(),
            transaction_hash: "0xdeadbeef".to_string(),
            event_type: EventType::SetCodeTxType,
            payload: EventPayload::SetCodeTxTypePayload(SetCodeTxTypePayload {
                from: "0xbbbb".to_string(),
                designator_address: "0xcccc".to_string(),
            }),
            from: Some("0xbbbb".to_string()),
            designator_id: Some("1-0xcccc".to_string()),
            account_id: Some("1-0xaaaa".to_string()),
        }
    }

    #[test]
    fn test_payload_is_tagged() {
        let event = sample_event();
        let value = serde_json::to_value(&event.payload).unwrap();
        assert_eq!(
            value,
            json!({
                "isTypeOf": "SetCodeTxTypePayload",
                "from": "0xbbbb",
                "designatorAddress": "0xcccc",
            })
        );
    }

    #[test]
    fn test_event_type_fits_column() {
        assert_eq!(EventType::SetCodeTxType.to_string(), "SetCodeTxType");
        assert!(EventType::SetCodeTxType.as_ref().len() <= 13);
    }

    #[test]
    fn test_row_conversion() {
        let event = sample_event();
        let row = EventRow::try_from(&event).unwrap();
        assert_eq!(row.event_type.as_deref(), Some("SetCodeTxType"));
        assert_eq!(row.from_.as_deref(), Some("0xbbbb"));

        let decoded = Event::try_from(row).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_row_with_unknown_payload_is_rejected() {
        let mut row = EventRow::try_from(&sample_event()).unwrap();
        row.payload = json!({"isTypeOf": "Unknown"});
        assert!(matches!(
            Event::try_from(row),
            Err(StoreError::Serialization(_))
        ));
    }
}
