//! Remote configuration store.
//!
//! This module provides types and traits for:
//! - The store contract the reconciler calls through ([`ConfigStore`])
//! - Building HTTP requests and responses ([`HttpRequest`], [`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - The REST binding of the store ([`HttpConfigStore`])

mod client;
mod error;
mod http;
mod remote;


use std::future::Future;

use serde_json::Value as Json;

use crate::model::UpdateRequest;

pub use self::http::{HttpClient, HttpRequest, HttpResponse};
pub use client::ReqwestClient;
pub use error::{HttpError, StoreError};
pub use remote::HttpConfigStore;

/// CRUD + list contract of the remote configuration store.
///
/// Responses are JSON objects whose `schemas` array names exactly one
/// variant of the endpoint's family. Implementations report non-success
/// statuses as [`StoreError::Status`] and never retry.
pub trait ConfigStore: Send + Sync {
    /// Creates an object from a variant's create payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-success status.
    fn create(
        &self,
        endpoint: &str,
        payload: &Json,
    ) -> impl Future<Output = Result<Json, StoreError>> + Send;

    /// Reads one object. A missing object is a 404 [`StoreError::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-success status.
    fn get(&self, endpoint: &str, id: &str) -> impl Future<Output = Result<Json, StoreError>> + Send;

    /// Applies one operation batch atomically and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-success status.
    fn update(
        &self,
        endpoint: &str,
        id: &str,
        request: &UpdateRequest,
    ) -> impl Future<Output = Result<Json, StoreError>> + Send;

    /// Deletes one object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-success status.
    fn delete(&self, endpoint: &str, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Lists every object of an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-success status.
    fn list(&self, endpoint: &str) -> impl Future<Output = Result<Vec<Json>, StoreError>> + Send;
}
