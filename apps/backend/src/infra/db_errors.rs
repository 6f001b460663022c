//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; the repos layer converts it here so the
//! engine only ever sees `DomainError`.

use tracing::{error, warn};

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::trace_ctx;

/// MySQL server errors that mean "try again later" rather than "bad query".
const MYSQL_UNAVAILABLE_CODES: [&str; 4] = ["1040", "1053", "2002", "2013"];

/// Translate a `DbErr` into a `DomainError` with a client-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        sea_orm::DbErr::Type(_) | sea_orm::DbErr::Json(_) => {
            error!(trace_id = %trace_id, raw_error = %error_msg, "Unexpected column data");
            return DomainError::infra(InfraErrorKind::DataCorruption, "Unexpected column data");
        }
        _ => {}
    }

    let lower = error_msg.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    if MYSQL_UNAVAILABLE_CODES
        .iter()
        .any(|code| error_msg.contains(code))
        || lower.contains("pool")
        || lower.contains("connection")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
        return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(InfraErrorKind::DbUnavailable, "Database operation failed")
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
