//! Acquisition protocol shared by every backend.
//!
//! Backends only describe their endpoint and how to normalize a record;
//! the request sequencing lives here.

use serde_json::Value;
use tracing::debug;

use super::{AcquisitionError, AcquisitionStrategy, AttemptBudget, MuseumApiClient};
use crate::models::{ObjectRecord, RawSearchResult, SearchParams};
use crate::utils::random_int;

/// Translate a zero-based offset into a one-based page number.
///
/// The result is clamped to `[1, max_page]`; offsets beyond the last
/// reachable page land on `max_page` rather than producing a request the
/// backend would reject.
pub fn page_for_offset(offset: u64, page_size: u32, max_page: u32) -> u32 {
    let page = (offset / u64::from(page_size.max(1))).saturating_add(1);
    page.clamp(1, u64::from(max_page.max(1))) as u32
}

fn term_params<C: MuseumApiClient + ?Sized>(client: &C, term: &str) -> SearchParams {
    SearchParams::for_term(term, client.terms().is_strict())
        .image_only(client.options().image_only)
}

/// Issue one budgeted request.
async fn request<C: MuseumApiClient + ?Sized>(
    client: &C,
    params: SearchParams,
    budget: &mut AttemptBudget,
) -> Result<RawSearchResult, AcquisitionError> {
    let attempt = budget.consume()?;
    debug!(
        "[{}] attempt {}/{}: term={:?} page={} page_size={} random={}",
        client.id(),
        attempt,
        budget.max(),
        params.term(),
        params.page,
        params.page_size,
        params.random_order
    );
    Ok(client.proxy().search(&params).await?)
}

fn records_of(result: RawSearchResult, what: &str) -> Result<Vec<Value>, AcquisitionError> {
    result
        .records
        .ok_or_else(|| AcquisitionError::MalformedPayload(format!("{} has no records array", what)))
}

pub(crate) async fn search<C: MuseumApiClient + ?Sized>(
    client: &C,
    term: &str,
    page: u32,
    page_size: u32,
) -> Result<RawSearchResult, AcquisitionError> {
    let params = term_params(client, term).page(page).page_size(page_size);
    Ok(client.proxy().search(&params).await?)
}

pub(crate) async fn fetch_by_id<C: MuseumApiClient + ?Sized>(
    client: &C,
    id: &str,
) -> Result<ObjectRecord, AcquisitionError> {
    let result = client.proxy().search(&SearchParams::for_id(id)).await?;
    let records = records_of(result, "lookup response")?;
    records
        .first()
        .map(|raw| client.normalize(raw))
        .ok_or_else(|| AcquisitionError::EmptyResultSet {
            term: id.to_string(),
        })
}

/// Strategy A: one request with the backend's random ordering.
///
/// Whatever record comes back is accepted, with or without an image.
async fn native_random<C: MuseumApiClient + ?Sized>(
    client: &C,
    term: &str,
    budget: &mut AttemptBudget,
) -> Result<ObjectRecord, AcquisitionError> {
    let params = term_params(client, term).page_size(1).random_order(true);
    let result = request(client, params, budget).await?;
    let records = records_of(result, "random response")?;

    records
        .first()
        .map(|raw| client.normalize(raw))
        .ok_or_else(|| {
            AcquisitionError::MalformedPayload(format!("random response for '{}' is empty", term))
        })
}

/// Strategy B: probe the match count, then fetch a random offset.
async fn count_then_offset<C: MuseumApiClient + ?Sized>(
    client: &C,
    term: &str,
    budget: &mut AttemptBudget,
) -> Result<ObjectRecord, AcquisitionError> {
    let probe = request(client, term_params(client, term).page_size(1), budget).await?;
    let count = probe.record_count.ok_or_else(|| {
        AcquisitionError::MalformedPayload("count probe has no record count".to_string())
    })?;

    if count == 0 {
        return Err(AcquisitionError::EmptyResultSet {
            term: term.to_string(),
        });
    }

    let offset = random_int(0, count);
    debug!("[{}] '{}' has {} match(es), offset {}", client.id(), term, count, offset);

    fetch_by_offset(client, term, offset, budget).await
}

pub(crate) async fn fetch_by_offset<C: MuseumApiClient + ?Sized>(
    client: &C,
    term: &str,
    offset: u64,
    budget: &mut AttemptBudget,
) -> Result<ObjectRecord, AcquisitionError> {
    let page_size = client.options().page_size.max(1);
    let page = page_for_offset(offset, page_size, client.endpoint().max_page);

    let params = term_params(client, term).page(page).page_size(page_size);
    let result = request(client, params, budget).await?;
    let records = records_of(result, "page response")?;

    if records.is_empty() {
        return Err(AcquisitionError::MalformedPayload(format!(
            "page {} for '{}' is empty",
            page, term
        )));
    }

    // Prefer an illustrated object; only the first two candidates are considered
    for raw in records.iter().take(2) {
        let candidate = client.normalize(raw);
        if candidate.has_image() {
            return Ok(candidate);
        }
        debug!("[{}] candidate {} has no image", client.id(), candidate.id);
    }

    Err(AcquisitionError::EmptyResultSet {
        term: term.to_string(),
    })
}

/// One pass of whichever strategy applies to this client.
pub(crate) async fn attempt_random<C: MuseumApiClient + ?Sized>(
    client: &C,
    term: &str,
    budget: &mut AttemptBudget,
) -> Result<ObjectRecord, AcquisitionError> {
    match client.options().strategy.resolve(client.endpoint()) {
        AcquisitionStrategy::CountThenOffset => count_then_offset(client, term, budget).await,
        _ => native_random(client, term, budget).await,
    }
}
