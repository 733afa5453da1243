//! Report routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use bankdesk_core::reports::StatementPeriod;
use bankdesk_shared::types::ClientId;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::QueryParams,
};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/statement", get(get_statement))
}

/// Query parameters for the account statement.
///
/// Either `date` alone, or both `from` and `to` (inclusive business days).
#[derive(Debug, Default, Deserialize)]
pub struct StatementQuery {
    /// Client id.
    pub client_id: Option<i64>,
    /// Single business day.
    pub date: Option<NaiveDate>,
    /// First business day.
    pub from: Option<NaiveDate>,
    /// Last business day.
    pub to: Option<NaiveDate>,
}

impl StatementQuery {
    /// Resolves the requested period.
    pub fn period(&self) -> ApiResult<StatementPeriod> {
        match (self.date, self.from, self.to) {
            (Some(date), None, None) => Ok(StatementPeriod::single_day(date)),
            (None, Some(from), Some(to)) => Ok(StatementPeriod::new(from, to)?),
            (None, None, None) => Err(ApiError::validation("either date or from and to is required")),
            (Some(_), _, _) => Err(ApiError::validation("date cannot be combined with from/to")),
            _ => Err(ApiError::validation("from and to must be given together")),
        }
    }
}

/// GET `/reports/statement` - Account statement of a client for a period.
async fn get_statement(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StatementQuery>,
) -> ApiResult<impl IntoResponse> {
    let client_id = query
        .client_id
        .map(ClientId::new)
        .ok_or_else(|| ApiError::validation("client_id is required"))?;
    let period = query.period()?;

    let statement = state.reports().statement(client_id, period).await?;
    Ok(Json(statement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_single_day_period() {
        let query = StatementQuery {
            date: Some(day(5)),
            ..StatementQuery::default()
        };
        assert_eq!(query.period().unwrap(), StatementPeriod::single_day(day(5)));
    }

    #[test]
    fn test_range_period() {
        let query = StatementQuery {
            from: Some(day(1)),
            to: Some(day(10)),
            ..StatementQuery::default()
        };
        let period = query.period().unwrap();
        assert_eq!((period.from, period.to), (day(1), day(10)));
    }

    #[test]
    fn test_rejects_reversed_range() {
        let query = StatementQuery {
            from: Some(day(10)),
            to: Some(day(1)),
            ..StatementQuery::default()
        };
        let err = query.period().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_DATE_RANGE");
    }

    #[test]
    fn test_rejects_incomplete_or_mixed_dates() {
        for query in [
            StatementQuery::default(),
            StatementQuery {
                from: Some(day(1)),
                ..StatementQuery::default()
            },
            StatementQuery {
                date: Some(day(1)),
                to: Some(day(2)),
                ..StatementQuery::default()
            },
        ] {
            assert_eq!(query.period().unwrap_err().code(), "VALIDATION_ERROR");
        }
    }
}
