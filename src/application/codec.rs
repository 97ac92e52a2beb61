//! Serialization codec: catalog records to JSON-compatible trees.
//!
//! Timestamps become RFC 3339 strings and ticket expiry dates ISO calendar
//! dates, so a payload read back from the cache is indistinguishable from
//! one produced live. A sight with no profile serializes as an explicit
//! `null`, never an omitted field.
//!
//! Non-finite aggregates (a NaN score from a malformed row, for instance)
//! are a codec error; list encoding isolates such rows instead of failing
//! the whole page.

use serde_json::Value;
use thiserror::Error;

use sightline_api_types::{SightProfileResponse, SightResponse, TicketResponse};

use crate::domain::entities::{SightProfileRecord, SightRecord, TicketRecord};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("record {id}: non-finite value in field `{field}`")]
    NonFinite { id: i64, field: &'static str },
    #[error("record {id}: {source}")]
    Json {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// One skipped row from a fallible-mapping pass.
#[derive(Debug)]
pub struct CodecFailure {
    pub id: i64,
    pub error: CodecError,
}

/// Encode a single sight into its JSON projection.
pub fn encode_sight(record: &SightRecord) -> Result<Value, CodecError> {
    check_finite(record.id, "score", record.score)?;
    check_finite(record.id, "min_price", record.min_price)?;
    for ticket in &record.tickets {
        check_finite(record.id, "ticket.price", ticket.price)?;
        check_finite(record.id, "ticket.discount", ticket.discount)?;
    }

    let response = to_response(record);
    serde_json::to_value(&response).map_err(|source| CodecError::Json {
        id: record.id,
        source,
    })
}

/// Encode a list of sights, skipping rows that fail.
///
/// Returns the surviving projections alongside the failures so the caller
/// can log each skipped row; one bad row never fails the page.
pub fn encode_sights(records: &[SightRecord]) -> (Vec<Value>, Vec<CodecFailure>) {
    let mut encoded = Vec::with_capacity(records.len());
    let mut failures = Vec::new();
    for record in records {
        match encode_sight(record) {
            Ok(value) => encoded.push(value),
            Err(error) => failures.push(CodecFailure {
                id: record.id,
                error,
            }),
        }
    }
    (encoded, failures)
}

/// Encode a single ticket into its JSON projection.
pub fn encode_ticket(ticket: &TicketRecord) -> Result<Value, CodecError> {
    check_finite(ticket.id, "price", ticket.price)?;
    check_finite(ticket.id, "discount", ticket.discount)?;

    let response = ticket_to_response(ticket);
    serde_json::to_value(&response).map_err(|source| CodecError::Json {
        id: ticket.id,
        source,
    })
}

/// Encode a list of tickets, skipping rows that fail.
pub fn encode_tickets(tickets: &[TicketRecord]) -> (Vec<Value>, Vec<CodecFailure>) {
    let mut encoded = Vec::with_capacity(tickets.len());
    let mut failures = Vec::new();
    for ticket in tickets {
        match encode_ticket(ticket) {
            Ok(value) => encoded.push(value),
            Err(error) => failures.push(CodecFailure {
                id: ticket.id,
                error,
            }),
        }
    }
    (encoded, failures)
}

fn check_finite(id: i64, field: &'static str, value: f64) -> Result<(), CodecError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CodecError::NonFinite { id, field })
    }
}

fn to_response(record: &SightRecord) -> SightResponse {
    SightResponse {
        id: record.id,
        name: record.name.clone(),
        desc: record.desc.clone(),
        main_img: record.main_img.clone(),
        banner_img: record.banner_img.clone(),
        content: record.content.clone(),
        score: record.score,
        min_price: record.min_price,
        province: record.province.clone(),
        city: record.city.clone(),
        area: record.area.clone(),
        town: record.town.clone(),
        is_top: record.is_top,
        is_hot: record.is_hot,
        is_valid: record.is_valid,
        created_at: record.created_at,
        updated_at: record.updated_at,
        profile: record.profile.as_ref().map(profile_to_response),
        tickets: record.tickets.iter().map(ticket_to_response).collect(),
    }
}

fn profile_to_response(profile: &SightProfileRecord) -> SightProfileResponse {
    SightProfileResponse {
        id: profile.id,
        sight_id: profile.sight_id,
        img: profile.img.clone(),
        address: profile.address.clone(),
        explain: profile.explain.clone(),
        open_time: profile.open_time.clone(),
        tel: profile.tel.clone(),
        level: profile.level.clone(),
        tags: profile.tags.clone(),
        attention: profile.attention.clone(),
        location: profile.location.clone(),
    }
}

fn ticket_to_response(ticket: &TicketRecord) -> TicketResponse {
    TicketResponse {
        id: ticket.id,
        sight_id: ticket.sight_id,
        name: ticket.name.clone(),
        desc: ticket.desc.clone(),
        kind: ticket.kind.clone(),
        price: ticket.price,
        discount: ticket.discount,
        total: ticket.total,
        remain: ticket.remain,
        expire_date: ticket.expire_date.map(|date| date.to_string()),
        return_policy: ticket.return_policy.clone(),
        is_valid: ticket.is_valid,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn sample_sight(id: i64) -> SightRecord {
        SightRecord {
            id,
            name: "West Lake".to_string(),
            desc: "Freshwater lake".to_string(),
            main_img: "/img/west-lake.jpg".to_string(),
            banner_img: "/img/west-lake-banner.jpg".to_string(),
            content: "Scenic area in Hangzhou.".to_string(),
            score: 4.8,
            min_price: 0.0,
            province: "Zhejiang".to_string(),
            city: "Hangzhou".to_string(),
            area: Some("Xihu".to_string()),
            town: None,
            is_top: true,
            is_hot: true,
            is_valid: true,
            created_at: datetime!(2025-03-01 08:00 UTC),
            updated_at: datetime!(2025-03-02 09:30 UTC),
            profile: None,
            tickets: Vec::new(),
        }
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        let value = encode_sight(&sample_sight(1)).expect("encodes");
        assert_eq!(value["created_at"], "2025-03-01T08:00:00Z");
        assert_eq!(value["updated_at"], "2025-03-02T09:30:00Z");
    }

    #[test]
    fn missing_profile_is_explicit_null() {
        let value = encode_sight(&sample_sight(1)).expect("encodes");
        assert!(value.as_object().unwrap().contains_key("profile"));
        assert_eq!(value["profile"], Value::Null);
    }

    #[test]
    fn non_finite_score_is_a_codec_error() {
        let mut record = sample_sight(3);
        record.score = f64::NAN;
        let err = encode_sight(&record).expect_err("NaN must not encode");
        assert!(matches!(err, CodecError::NonFinite { id: 3, .. }));
    }

    #[test]
    fn ticket_with_non_finite_price_is_skipped_from_lists() {
        let mut sight = sample_sight(1);
        sight.tickets = vec![
            TicketRecord {
                id: 100,
                sight_id: 1,
                name: "Adult day pass".to_string(),
                desc: None,
                kind: Some("entrance".to_string()),
                price: 80.0,
                discount: 0.9,
                total: 1000,
                remain: 800,
                expire_date: None,
                return_policy: None,
                is_valid: true,
                created_at: datetime!(2025-03-01 08:00 UTC),
                updated_at: datetime!(2025-03-01 08:00 UTC),
            },
            TicketRecord {
                id: 101,
                sight_id: 1,
                name: "Broken".to_string(),
                desc: None,
                kind: None,
                price: f64::NAN,
                discount: 1.0,
                total: 0,
                remain: 0,
                expire_date: None,
                return_policy: None,
                is_valid: false,
                created_at: datetime!(2025-03-01 08:00 UTC),
                updated_at: datetime!(2025-03-01 08:00 UTC),
            },
        ];

        let value = encode_ticket(&sight.tickets[0]).expect("encodes");
        assert_eq!(value["id"], 100);
        assert_eq!(value["sight_id"], 1);

        let (encoded, failures) = encode_tickets(&sight.tickets);
        assert_eq!(encoded.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, 101);
    }

    #[test]
    fn encode_sights_skips_bad_rows_and_keeps_the_rest() {
        let mut bad = sample_sight(3);
        bad.min_price = f64::INFINITY;
        let records = vec![
            sample_sight(1),
            sample_sight(2),
            bad,
            sample_sight(4),
            sample_sight(5),
        ];

        let (encoded, failures) = encode_sights(&records);
        assert_eq!(encoded.len(), 4);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, 3);
    }
}
