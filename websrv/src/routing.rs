// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{convert::Infallible, error::Error as StdError};

use serde::Serialize;
use thiserror::Error;
use warp::{
    Filter, Reply,
    body::BodyDeserializeError,
    filters::BoxedFilter,
    http::{StatusCode, header::CONTENT_TYPE},
    hyper::Body,
    reject::{self, MethodNotAllowed, PayloadTooLarge, Reject, Rejection},
};

use playtally_core::task::TaskUid;
use playtally_repo::prelude::RepoError;
use playtally_storage_sqlite::Error as StorageError;
use playtally_usecases::{
    Error as UseCaseError,
    task::{TaskService, TaskStatus},
};

/// Uploads are buffered in memory before the input artifact is
/// persisted.
const MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Error, Debug)]
enum Error {
    #[error(transparent)]
    BadRequest(anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("timeout: {reason}")]
    Timeout { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<UseCaseError> for Error {
    fn from(err: UseCaseError) -> Self {
        use UseCaseError::*;
        match err {
            Input(err) => Self::BadRequest(err),
            Io(err) => Self::Other(err.into()),
            Storage(err) => match err {
                StorageError::TaskTimeout { reason } => Self::Timeout { reason },
                err => Self::Other(err.into()),
            },
            Repository(err) => match err {
                RepoError::NotFound => Self::NotFound,
                RepoError::Other(err) => Self::Other(err),
            },
            Other(err) => Self::Other(err),
        }
    }
}

impl Reject for Error {}

fn reject_on_error(err: impl Into<Error>) -> Rejection {
    reject::custom(err.into())
}

#[derive(Debug, Serialize)]
struct SubmitResponseBody {
    task_id: String,
}

pub(crate) fn create_filters(task_service: TaskService) -> BoxedFilter<(impl Reply,)> {
    let task_service = warp::any().map(move || task_service.clone());

    log::info!("Creating API routes");

    // POST /upload
    let upload = warp::post()
        .and(warp::path("upload"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_UPLOAD_BYTES))
        .and(warp::body::bytes())
        .and(task_service.clone())
        .and_then(
            |body: warp::hyper::body::Bytes, task_service: TaskService| async move {
                let task_uid = task_service
                    .submit(body.to_vec())
                    .await
                    .map_err(reject_on_error)?;
                let response_body = SubmitResponseBody {
                    task_id: task_uid.to_string(),
                };
                Ok::<_, Rejection>(warp::reply::with_status(
                    warp::reply::json(&response_body),
                    StatusCode::ACCEPTED,
                ))
            },
        );

    // GET /result/<task_id>
    let result = warp::get()
        .and(warp::path("result"))
        .and(warp::path::param::<TaskUid>())
        .and(warp::path::end())
        .and(task_service)
        .and_then(|task_uid: TaskUid, task_service: TaskService| async move {
            let status = task_service
                .poll_status(&task_uid)
                .await
                .map_err(reject_on_error)?;
            let response = match status {
                TaskStatus::Completed { output_path } => {
                    let artifact_bytes = tokio::fs::read(output_path)
                        .await
                        .map_err(|err| reject_on_error(UseCaseError::Io(err)))?;
                    warp::http::Response::builder()
                        .status(StatusCode::OK)
                        .header(CONTENT_TYPE, "text/csv")
                        .body(Body::from(artifact_bytes))
                        .map_err(|err| reject_on_error(anyhow::Error::from(err)))?
                }
                TaskStatus::Processing => warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({"status": "Processing..."})),
                    StatusCode::ACCEPTED,
                )
                .into_response(),
                TaskStatus::Failed { error_message } => warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({
                        "status": "Failed",
                        "error": error_message,
                    })),
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
                .into_response(),
                TaskStatus::NotFound => warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({"status": "Not found"})),
                    StatusCode::NOT_FOUND,
                )
                .into_response(),
            };
            Ok::<_, Rejection>(response)
        });

    // GET /about
    let about_json = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "version": env!("CARGO_PKG_VERSION"),
    });
    let about = warp::get()
        .and(warp::path("about"))
        .and(warp::path::end())
        .map(move || warp::reply::json(&about_json));

    upload.or(result).or(about).boxed()
}

/// An API error serializable to JSON.
#[derive(Debug, Serialize)]
struct ErrorResponseBody {
    error: String,
}

fn status_code_to_string(code: StatusCode) -> String {
    code.canonical_reason()
        .unwrap_or_else(|| code.as_str())
        .to_string()
}

#[allow(clippy::unused_async)] // async needed for warp filter
pub(crate) async fn handle_rejection(reject: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if reject.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = status_code_to_string(code);
    } else if let Some(err) = reject.find::<BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = err
            .source()
            .map_or_else(|| err.to_string(), ToString::to_string);
    } else if reject.find::<PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = status_code_to_string(code);
    } else if reject.find::<MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = status_code_to_string(code);
    } else if let Some(err) = reject.find::<Error>() {
        match err {
            Error::BadRequest(err) => {
                code = StatusCode::BAD_REQUEST;
                message = err.to_string();
            }
            Error::NotFound => {
                code = StatusCode::NOT_FOUND;
                message = status_code_to_string(code);
            }
            Error::Timeout { reason } => {
                code = StatusCode::SERVICE_UNAVAILABLE;
                message = reason.clone();
            }
            Error::Other(err) => {
                code = StatusCode::INTERNAL_SERVER_ERROR;
                message = err.to_string();
            }
        }
    } else {
        log::error!("Unhandled rejection {reject:?}");
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = format!("{reject:?}");
    }

    let json_reply = warp::reply::json(&ErrorResponseBody { error: message });
    Ok(warp::reply::with_status(json_reply, code))
}
