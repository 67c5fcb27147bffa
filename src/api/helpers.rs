use actix_web::{
    HttpRequest, HttpResponse,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    errors::AppError,
    repositories::{PageRequest, Paged},
};

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

pub fn respond<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        status_code: StatusCode::OK.as_u16(),
        message: message.into(),
        data,
    })
}

/// Paged list payload used by the admin tables.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T: Serialize> {
    pub res: Vec<T>,
    pub count: u64,
    pub current: u64,
    pub page_size: u64,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(paged: Paged<T>, page: &PageRequest) -> Self {
        Self {
            res: paged.rows,
            count: paged.count,
            current: page.current(),
            page_size: page.page_size(),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON body: {}", err);
    AppError::InvalidInput(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(err.to_string()).into()
}
