// src/error.rs
use log::error;
use serde_json::json;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(u32),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Reject for AppError {}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownInstrument(_) => StatusCode::NOT_FOUND,
            AppError::NotAuthenticated | AppError::Unauthorized | AppError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Storage(_) | AppError::Serialization(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<AppError>() {
        let status = e.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", e);
            (status, "Internal server error".to_string())
        } else {
            (status, e.to_string())
        }
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
