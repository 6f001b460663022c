use actix_web::error::ResponseError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },
    #[error("Banned: {detail}")]
    Banned { detail: String },
    #[error("Upstream error: {detail}")]
    Upstream { code: ErrorCode, detail: String },
    #[error("Timed out: {detail}")]
    Timeout { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Error code for any variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest { code, .. } => *code,
            AppError::Unauthorized { .. } => ErrorCode::LoginFailed,
            AppError::Banned { .. } => ErrorCode::Banned,
            AppError::Upstream { code, .. } => *code,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Banned { .. } => StatusCode::FORBIDDEN,
            AppError::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn invalid_arguments(detail: impl Into<String>) -> Self {
        Self::bad_request(ErrorCode::InvalidArguments, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn banned(detail: impl Into<String>) -> Self {
        Self::Banned {
            detail: detail.into(),
        }
    }

    pub fn upstream(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::Timeout {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(detail) => {
                AppError::bad_request(ErrorCode::InvalidArguments, detail)
            }
            DomainError::NotFound(NotFoundKind::User, detail) => AppError::unauthorized(detail),
            DomainError::NotFound(_, detail) => {
                AppError::upstream(ErrorCode::BeatmapUnavailable, detail)
            }
            DomainError::Infra(InfraErrorKind::Timeout, detail) => AppError::timeout(detail),
            DomainError::Infra(InfraErrorKind::DbUnavailable, detail) => {
                AppError::upstream(ErrorCode::DbUnavailable, detail)
            }
            DomainError::Infra(InfraErrorKind::CacheUnavailable, detail) => {
                AppError::upstream(ErrorCode::CacheUnavailable, detail)
            }
            DomainError::Infra(InfraErrorKind::DataCorruption, detail) => AppError::Internal {
                code: ErrorCode::DataCorruption,
                detail,
            },
            DomainError::Infra(InfraErrorKind::Other(kind), detail) => {
                AppError::internal(format!("{kind}: {detail}"))
            }
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::upstream(ErrorCode::DbUnavailable, format!("db error: {e}"))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    /// The game client only understands plain `error: <word>` lines.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status())
            .content_type(ContentType::plaintext())
            .insert_header(("x-trace-id", trace_ctx::trace_id()))
            .body(self.code().client_line())
    }
}
