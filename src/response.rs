//! `{data, meta}` response envelope for resource routes.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Serialize)]
pub struct Meta {
    pub count: u64,
}

pub type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

fn envelope<T: Serialize>(status: StatusCode, data: T, meta: Option<Meta>) -> EnvelopeResponse<T> {
    (status, Json(Envelope { data, meta }))
}

/// 201 with the stored record.
pub fn created<T: Serialize>(data: T) -> EnvelopeResponse<T> {
    envelope(StatusCode::CREATED, data, None)
}

pub fn ok<T: Serialize>(data: T) -> EnvelopeResponse<T> {
    envelope(StatusCode::OK, data, None)
}

/// 200 with every record and `meta.count`.
pub fn listing<T: Serialize>(data: Vec<T>) -> EnvelopeResponse<Vec<T>> {
    let count = data.len() as u64;
    envelope(StatusCode::OK, data, Some(Meta { count }))
}
