//! Khatabook Routes
//!
//! - POST /api/v1/transactions/:id/remind - Manual payment reminder
//! - POST /api/v1/transactions/:id/details - Send the entry as a statement
//! - GET /api/v1/transactions/export?status= - Ledger as CSV

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::records::find;
use crate::api::dto::ListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::notify::OutboundMessage;
use crate::records::Transaction;

pub const CSV_HEADER: [&str; 10] = [
    "id",
    "patientId",
    "patientName",
    "patientPhone",
    "date",
    "amount",
    "paymentType",
    "status",
    "dueDate",
    "description",
];

/// POST /api/v1/transactions/:id/remind
pub async fn send_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OutboundMessage>> {
    let txn: Transaction = find(&state, &id)?;
    let sent = state.dispatcher.send_payment_reminder(&txn, false).await?;
    Ok(Json(sent))
}

/// POST /api/v1/transactions/:id/details
pub async fn send_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OutboundMessage>> {
    let txn: Transaction = find(&state, &id)?;
    let sent = state.dispatcher.send_transaction_details(&txn).await?;
    Ok(Json(sent))
}

/// GET /api/v1/transactions/export
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let transactions = state
        .list::<Transaction>()
        .query(params.q.as_deref(), params.status.as_deref());

    let body = ledger_csv(&transactions)?;
    let filename = format!("khatabook_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));

    tracing::info!(rows = transactions.len(), "Exported ledger");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

pub fn ledger_csv(transactions: &[Transaction]) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| ApiError::Internal(format!("CSV error: {}", e));

    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for t in transactions {
        writer
            .write_record([
                t.id.as_str(),
                t.patient_id.as_str(),
                t.patient_name.as_str(),
                t.patient_phone.as_str(),
                t.date.as_str(),
                t.amount.as_str(),
                t.payment_type.as_str(),
                t.status.as_str(),
                t.due_date.as_deref().unwrap_or(""),
                t.description.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::PaymentStatus;

    #[test]
    fn test_ledger_csv_quotes_fields() {
        let txn = Transaction {
            id: "t1".into(),
            patient_id: "p1".into(),
            patient_name: "Ravi, Jr".into(),
            date: "2024-06-01".into(),
            amount: "1200".into(),
            payment_type: "cash".into(),
            status: PaymentStatus::Partial,
            description: "said \"soon\"".into(),
            ..Default::default()
        };
        let csv = ledger_csv(&[txn]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,patientId,patientName,patientPhone,date,amount,paymentType,status,dueDate,description"
        );
        assert_eq!(
            lines.next().unwrap(),
            "t1,p1,\"Ravi, Jr\",,2024-06-01,1200,cash,partial,,\"said \"\"soon\"\"\""
        );
    }
}
