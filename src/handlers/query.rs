//! Query builder endpoints: tree to query string and back

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::DataResponse;
use crate::core::MarkResult;
use crate::query::{
    ConditionTree, PopulateField, SortSpec, describe, parse_query, to_query_string,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub tree: ConditionTree,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub populate: Vec<PopulateField>,
}

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// With or without a leading `?`
    pub query: String,
}

impl QueryRequest {
    fn raw(&self) -> &str {
        self.query.trim().trim_start_matches('?')
    }
}

/// POST /query/build
pub async fn build_query(Json(request): Json<BuildRequest>) -> MarkResult<Response> {
    let query = to_query_string(&request.tree, request.sort.as_ref(), &request.populate);

    Ok(DataResponse::json(BuildResponse { query }).into_response())
}

/// POST /query/parse
pub async fn parse(Json(request): Json<QueryRequest>) -> MarkResult<Response> {
    Ok(DataResponse::json(parse_query(request.raw())).into_response())
}

/// POST /query/preview
pub async fn preview(Json(request): Json<QueryRequest>) -> MarkResult<Response> {
    Ok(DataResponse::json(describe(request.raw())).into_response())
}
