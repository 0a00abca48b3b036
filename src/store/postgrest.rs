// ABOUTME: Low-level PostgREST HTTP client with a table-oriented query builder
// ABOUTME: Select/insert/update/delete with equality, range, ilike, ordering, and pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # PostgREST Client
//!
//! Thin HTTP adapter over the hosted Postgres REST service. Every persistence
//! operation in the crate reduces to one call here: a table name, a filter
//! set, and an operation. Row-level security is enforced server-side via the
//! forwarded bearer token; this client adds no logic beyond request shaping
//! and error mapping.

use crate::errors::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Path prefix of the REST surface on the hosted service
const REST_PATH: &str = "/rest/v1";

/// Request timeout for store calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sort direction for `order` clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl Order {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Authenticated client for the hosted Postgres REST service
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    rest_url: String,
}

impl PostgrestClient {
    /// Create a client for the given base URL and credential pair.
    ///
    /// `api_key` selects the permission tier (anon or service role);
    /// `bearer` is the token presented for row-level security. For
    /// service-scoped access both are the service-role key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// or the credentials are not valid header values.
    pub fn new(base_url: &str, api_key: &str, bearer: &str) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key_value = HeaderValue::from_str(api_key)
            .map_err(|_| AppError::config("Invalid store API key"))?;
        api_key_value.set_sensitive(true);
        headers.insert("apikey", api_key_value);

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| AppError::config("Invalid store bearer token"))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            rest_url: format!("{}{REST_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Begin a query against the given table
    #[must_use]
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_owned(),
            select: "*".to_owned(),
            params: Vec::new(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
    }
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

/// Builder for one table operation
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    client: &'a PostgrestClient,
    table: String,
    select: String,
    params: Vec<(String, String)>,
}

impl QueryBuilder<'_> {
    /// Set the column (or embedded-resource) selection
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.to_owned();
        self
    }

    /// Equality filter: `column = value`
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_owned(), format!("eq.{}", value.to_string())));
        self
    }

    /// Range filter: `column >= value`
    #[must_use]
    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_owned(), format!("gte.{}", value.to_string())));
        self
    }

    /// Range filter: `column < value`
    #[must_use]
    pub fn lt(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_owned(), format!("lt.{}", value.to_string())));
        self
    }

    /// Case-insensitive pattern match: `column ILIKE pattern`
    #[must_use]
    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.params
            .push((column.to_owned(), format!("ilike.{pattern}")));
        self
    }

    /// Membership filter: `column IN (values)`
    #[must_use]
    pub fn in_list(mut self, column: &str, values: &[impl ToString]) -> Self {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.params
            .push((column.to_owned(), format!("in.({joined})")));
        self
    }

    /// Sort by the given column
    #[must_use]
    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.params
            .push(("order".to_owned(), format!("{column}.{}", direction.suffix())));
        self
    }

    /// Limit the number of returned rows
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.params.push(("limit".to_owned(), limit.to_string()));
        self
    }

    /// Skip the first `offset` rows
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.params.push(("offset".to_owned(), offset.to_string()));
        self
    }

    /// Fetch all matching rows
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// deserialized.
    pub async fn fetch<T: DeserializeOwned>(self) -> AppResult<Vec<T>> {
        let mut params = self.params;
        params.push(("select".to_owned(), self.select));
        let response = self
            .client
            .request(Method::GET, &self.table)
            .query(&params)
            .send()
            .await
            .map_err(|e| gateway_error(&self.table, &e))?;
        let response = check_status(&self.table, response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::database(format!("{}: invalid response body: {e}", self.table)))
    }

    /// Fetch all matching rows together with the exact total count
    /// (ignoring `limit`/`offset`)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the count header is missing.
    pub async fn fetch_with_count<T: DeserializeOwned>(self) -> AppResult<(Vec<T>, u64)> {
        let table = self.table.clone();
        let mut params = self.params;
        params.push(("select".to_owned(), self.select));
        let response = self
            .client
            .request(Method::GET, &table)
            .query(&params)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| gateway_error(&table, &e))?;
        let response = check_status(&table, response).await?;

        let count = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| AppError::database(format!("{table}: missing count header")))?;

        let rows = response
            .json()
            .await
            .map_err(|e| AppError::database(format!("{table}: invalid response body: {e}")))?;
        Ok((rows, count))
    }

    /// Fetch at most one matching row
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> AppResult<Option<T>> {
        let mut rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Fetch exactly one matching row, or `ResourceNotFound`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no row matches.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> AppResult<T> {
        let table = self.table.clone();
        self.fetch_optional()
            .await?
            .ok_or_else(|| AppError::not_found(row_label(&table)))
    }

    /// Insert a row and return the stored representation
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns no row.
    pub async fn insert<T: DeserializeOwned>(self, payload: &impl Serialize) -> AppResult<T> {
        let table = self.table.clone();
        let response = self
            .client
            .request(Method::POST, &table)
            .query(&[("select", self.select.as_str())])
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await
            .map_err(|e| gateway_error(&table, &e))?;
        let response = check_status(&table, response).await?;
        first_row(&table, response).await
    }

    /// Update matching rows and return one stored representation
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no row matched the filters.
    pub async fn update<T: DeserializeOwned>(self, payload: &impl Serialize) -> AppResult<T> {
        let table = self.table.clone();
        let mut params = self.params;
        params.push(("select".to_owned(), self.select));
        let response = self
            .client
            .request(Method::PATCH, &table)
            .query(&params)
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await
            .map_err(|e| gateway_error(&table, &e))?;
        let response = check_status(&table, response).await?;
        first_row(&table, response).await
    }

    /// Update matching rows without returning them
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_void(self, payload: &impl Serialize) -> AppResult<()> {
        let table = self.table.clone();
        let response = self
            .client
            .request(Method::PATCH, &table)
            .query(&self.params)
            .header("Prefer", "return=minimal")
            .json(payload)
            .send()
            .await
            .map_err(|e| gateway_error(&table, &e))?;
        check_status(&table, response).await?;
        Ok(())
    }

    /// Delete matching rows
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(self) -> AppResult<()> {
        let table = self.table.clone();
        let response = self
            .client
            .request(Method::DELETE, &table)
            .query(&self.params)
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| gateway_error(&table, &e))?;
        check_status(&table, response).await?;
        Ok(())
    }
}

fn gateway_error(table: &str, error: &reqwest::Error) -> AppError {
    AppError::database(format!("{table}: request failed: {error}"))
}

async fn check_status(table: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::not_found(row_label(table)));
    }
    Err(AppError::database(format!("{table}: {status}: {body}")))
}

async fn first_row<T: DeserializeOwned>(table: &str, response: Response) -> AppResult<T> {
    let mut rows: Vec<T> = response
        .json()
        .await
        .map_err(|e| AppError::database(format!("{table}: invalid response body: {e}")))?;
    if rows.is_empty() {
        return Err(AppError::not_found(row_label(table)));
    }
    Ok(rows.swap_remove(0))
}

fn row_label(table: &str) -> String {
    format!("Row in {table}")
}

/// Parse the total from a `Content-Range` header value like `0-9/57` or `*/0`
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.parse().ok()
}
