//! Serverless entry point for the custom-skill endpoint.
//!
//! Built with the `worker` feature for Cloudflare Workers. The host enforces
//! authentication; this module only routes and translates payloads.

use serde::Serialize;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router, event};

use crate::{
    ConvertOptions,
    error::Error,
    skill::{TableConverterRequest, convert_batch, health},
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
}

#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    Router::new()
        .get("/healthz", healthz_route)
        .post_async("/convert", convert_route)
        .run(req, env)
        .await
}

fn healthz_route(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    Response::from_json(&health())
}

async fn convert_route(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let body = req.text().await?;
    match serde_json::from_str::<TableConverterRequest>(&body) {
        Ok(request) => Response::from_json(&convert_batch(request, &ConvertOptions::default())),
        Err(source) => error_response(&Error::InvalidRequest(source)),
    }
}

fn error_response(error: &Error) -> Result<Response> {
    worker::console_error!("rejecting request: {error}");
    let response = Response::from_json(&ErrorResponse {
        code: error.code().to_string(),
        message: error.to_string(),
    })?;
    Ok(response.with_status(error.status_code()))
}
