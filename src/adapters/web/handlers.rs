//! HTTP request handlers for the web adapter.
//!
//! Every response carries the `{status, status_code, message, ...}`
//! envelope the frontend expects; extra keys ride alongside.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::dashboard::compute_dashboard;
use crate::domain::entry::{parse_amount, CapitalUnit, EntryPatch, NewEntry, Outcome, Side};
use crate::domain::filter::{EntryFilter, PageRequest, SortDirection, SortField};
use crate::ports::image_port::ImageKind;
use crate::ports::pairs_port::PairKind;

use super::{AppState, AuthOwner, WebError};

fn envelope(status: StatusCode, message: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("status".into(), json!(status.is_success()));
    map.insert("status_code".into(), json!(status.as_u16()));
    map.insert("message".into(), json!(message));
    map
}

fn respond(status: StatusCode, mut body: Map<String, Value>) -> Response {
    body.entry("status".to_string())
        .or_insert(json!(status.is_success()));
    (status, Json(Value::Object(body))).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub instrument: Option<String>,
    /// Legacy alias for `instrument`.
    pub pair: Option<String>,
    pub date: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub outcome: Option<String>,
    pub side: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, WebError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| WebError::bad_request(format!("Invalid date: {raw}")))
}

impl ListParams {
    fn into_filter(self) -> Result<EntryFilter, WebError> {
        Ok(EntryFilter {
            instrument: self
                .instrument
                .or(self.pair)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            date: self.date.as_deref().map(parse_date).transpose()?,
            date_from: self.date_from.as_deref().map(parse_date).transpose()?,
            date_to: self.date_to.as_deref().map(parse_date).transpose()?,
            outcome: self.outcome.as_deref().and_then(Outcome::parse),
            side: self.side.as_deref().and_then(Side::parse),
            sort_by: self
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
        })
    }
}

pub async fn list_journal(
    State(state): State<Arc<AppState>>,
    AuthOwner(owner): AuthOwner,
    Query(params): Query<ListParams>,
) -> Result<Response, WebError> {
    let page = PageRequest::new(params.page, params.limit);
    let filter = params.into_filter()?;

    let result = state.journal.list(owner.id, &filter, page)?;

    let mut body = envelope(StatusCode::OK, "Journals fetched successfully");
    body.insert(
        "data".into(),
        serde_json::to_value(&result.rows).map_err(|e| WebError::internal(e.to_string()))?,
    );
    body.insert("page".into(), json!(page.page));
    body.insert("limit".into(), json!(page.limit));
    body.insert("total".into(), json!(result.total));
    body.insert("total_pages".into(), json!(result.total_pages(page.limit)));
    Ok(respond(StatusCode::OK, body))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthOwner(owner): AuthOwner,
) -> Result<Response, WebError> {
    let rows = state.journal.fetch_all_for_owner(owner.id)?;

    let message = if rows.is_empty() {
        "No data available for dashboard"
    } else {
        "Dashboard data calculated successfully"
    };
    let summary = compute_dashboard(&rows);

    let mut body = envelope(StatusCode::OK, message);
    body.insert(
        "data".into(),
        serde_json::to_value(&summary).map_err(|e| WebError::internal(e.to_string()))?,
    );
    Ok(respond(StatusCode::OK, body))
}

/// Text fields plus any uploaded image bytes from a multipart form.
struct JournalForm {
    text: HashMap<String, String>,
    before_image: Option<(String, Vec<u8>)>,
    after_image: Option<(String, Vec<u8>)>,
}

impl JournalForm {
    async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut form = JournalForm {
            text: HashMap::new(),
            before_image: None,
            after_image: None,
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::bad_request(format!("Invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "before_image" | "after_image" => {
                    let file_name = field
                        .file_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| "image".to_string());
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| WebError::bad_request(format!("Invalid upload: {e}")))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    if name == "before_image" {
                        form.before_image = Some((file_name, bytes.to_vec()));
                    } else {
                        form.after_image = Some((file_name, bytes.to_vec()));
                    }
                }
                _ => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| WebError::bad_request(format!("Invalid field: {e}")))?;
                    form.text.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.text
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDate>, WebError> {
        self.text(key).map(parse_date).transpose()
    }
}

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    AuthOwner(owner): AuthOwner,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = JournalForm::read(multipart).await?;

    let date = form
        .date("date")?
        .ok_or_else(|| WebError::bad_request("date is required"))?;

    let mut entry = NewEntry {
        date: Some(date),
        capital: parse_amount(form.text("capital")),
        capital_unit: form
            .text("capital_unit")
            .map(CapitalUnit::from_raw)
            .unwrap_or_default(),
        instrument: form
            .text("instrument")
            .or_else(|| form.text("pair"))
            .map(str::to_string),
        side: form.text("side").and_then(Side::parse),
        lot_size: parse_amount(form.text("lot_size")),
        entry_price: parse_amount(form.text("entry_price")),
        take_profit: parse_amount(form.text("take_profit")),
        stop_loss: parse_amount(form.text("stop_loss")),
        outcome: form.text("outcome").and_then(Outcome::parse),
        profit: parse_amount(form.text("profit")),
        entry_reason: form.text("entry_reason").map(str::to_string),
        ..NewEntry::default()
    }
    .normalized();

    if let Some((name, bytes)) = &form.before_image {
        entry.before_image = Some(state.images.store(owner.id, ImageKind::Before, name, bytes)?);
    }
    if let Some((name, bytes)) = &form.after_image {
        entry.after_image = Some(state.images.store(owner.id, ImageKind::After, name, bytes)?);
    }

    let stored = match state.journal.insert(owner.id, entry.clone()) {
        Ok(stored) => stored,
        Err(e) => {
            // Orphaned uploads are worse than a lost insert; clean up.
            for reference in [&entry.before_image, &entry.after_image].into_iter().flatten() {
                if let Err(remove_err) = state.images.remove(reference) {
                    tracing::warn!("failed to remove orphaned upload {reference}: {remove_err}");
                }
            }
            return Err(e.into());
        }
    };

    let mut body = envelope(StatusCode::CREATED, "Journal added successfully");
    body.insert(
        "data".into(),
        serde_json::to_value(&stored).map_err(|e| WebError::internal(e.to_string()))?,
    );
    Ok(respond(StatusCode::CREATED, body))
}

pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    AuthOwner(owner): AuthOwner,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = JournalForm::read(multipart).await?;

    let current = state
        .journal
        .get(owner.id, id)?
        .ok_or_else(|| WebError::not_found(format!("Journal entry {id} not found")))?;

    let mut patch = EntryPatch {
        date: form.date("date")?,
        capital: parse_amount(form.text("capital")),
        capital_unit: form.text("capital_unit").map(CapitalUnit::from_raw),
        instrument: form
            .text("instrument")
            .or_else(|| form.text("pair"))
            .map(str::to_string),
        side: form.text("side").and_then(Side::parse),
        lot_size: parse_amount(form.text("lot_size")),
        entry_price: parse_amount(form.text("entry_price")),
        take_profit: parse_amount(form.text("take_profit")),
        stop_loss: parse_amount(form.text("stop_loss")),
        outcome: form.text("outcome").and_then(Outcome::parse),
        profit: parse_amount(form.text("profit")),
        entry_reason: form.text("entry_reason").map(str::to_string),
        ..EntryPatch::default()
    }
    .normalized(current.capital_unit);

    let mut superseded: Vec<String> = Vec::new();
    if let Some((name, bytes)) = &form.before_image {
        patch.before_image = Some(state.images.store(owner.id, ImageKind::Before, name, bytes)?);
        superseded.extend(current.before_image.clone());
    }
    if let Some((name, bytes)) = &form.after_image {
        patch.after_image = Some(state.images.store(owner.id, ImageKind::After, name, bytes)?);
        superseded.extend(current.after_image.clone());
    }

    let changed = state.journal.update(owner.id, id, patch)?;
    if !changed {
        return Err(WebError::not_found(format!("Journal entry {id} not found")));
    }

    // The row now points at the replacements; the old files can go.
    for reference in &superseded {
        if let Err(e) = state.images.remove(reference) {
            tracing::warn!("failed to remove superseded image {reference}: {e}");
        }
    }

    let updated = state.journal.get(owner.id, id)?;
    let mut body = envelope(StatusCode::OK, "Journal updated successfully");
    body.insert(
        "data".into(),
        serde_json::to_value(&updated).map_err(|e| WebError::internal(e.to_string()))?,
    );
    Ok(respond(StatusCode::OK, body))
}

pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    AuthOwner(owner): AuthOwner,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let current = state
        .journal
        .get(owner.id, id)?
        .ok_or_else(|| WebError::not_found(format!("Journal entry {id} not found")))?;

    if !state.journal.delete(owner.id, id)? {
        return Err(WebError::not_found(format!("Journal entry {id} not found")));
    }

    // Row first, then files: a dangling file beats a row pointing at
    // nothing.
    for reference in [&current.before_image, &current.after_image]
        .into_iter()
        .flatten()
    {
        if let Err(e) = state.images.remove(reference) {
            tracing::warn!("failed to remove image {reference}: {e}");
        }
    }

    let body = envelope(StatusCode::OK, "Journal and files deleted successfully");
    Ok(respond(StatusCode::OK, body))
}

#[derive(Debug, serde::Deserialize)]
pub struct PairsParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
}

pub async fn list_pairs(
    State(state): State<Arc<AppState>>,
    AuthOwner(_owner): AuthOwner,
    Query(params): Query<PairsParams>,
) -> Result<Response, WebError> {
    let kind = params.kind.as_deref().and_then(PairKind::parse);
    let search = params.search.clone();

    // The catalog's crypto source uses a blocking HTTP client.
    let pairs = state.pairs.clone();
    let list = tokio::task::spawn_blocking(move || pairs.list_pairs(kind, search.as_deref()))
        .await
        .map_err(|e| WebError::internal(e.to_string()))??;

    let mut body = envelope(StatusCode::OK, "Pairs fetched successfully");
    body.insert(
        "data".into(),
        serde_json::to_value(&list).map_err(|e| WebError::internal(e.to_string()))?,
    );
    Ok(respond(StatusCode::OK, body))
}

pub async fn not_found() -> Response {
    let body = envelope(StatusCode::NOT_FOUND, "Endpoint not found");
    respond(StatusCode::NOT_FOUND, body)
}
