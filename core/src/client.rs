//! Stateless HTTP request builder and response parser for the animal API.
//!
//! # Design
//! `AnimalClient` holds only a `base_url`. Each CRUD operation is split into
//! a `build_*` method producing an `HttpRequest` and a `parse_*` method
//! consuming an `HttpResponse`. Any 2xx status counts as success; the update
//! and delete bodies are ignored.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Animal, NewAnimal};

const RESOURCES: &str = "/api/resources";

#[derive(Debug, Clone)]
pub struct AnimalClient {
    base_url: String,
}

impl AnimalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection(&self) -> String {
        format!("{}{RESOURCES}", self.base_url)
    }

    fn member(&self, id: u64) -> String {
        format!("{}{RESOURCES}/{id}", self.base_url)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.member(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, input: &NewAnimal) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// `PUT` carrying the full animal, id included.
    pub fn build_update(&self, animal: &Animal) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(animal).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.member(animal.id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.member(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Animal>, ApiError> {
        check_status(&response)?;
        hydrate(&response.body)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Animal, ApiError> {
        check_status(&response)?;
        hydrate(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Animal, ApiError> {
        check_status(&response)?;
        hydrate(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn hydrate<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnimalClient {
        AnimalClient::new("http://localhost:3000")
    }

    fn rex() -> Animal {
        Animal {
            id: 7,
            name: "Rex".to_string(),
            age: 3,
            is_mammal: true,
        }
    }

    #[test]
    fn build_list_produces_correct_request() {
        let req = client().build_list();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/resources");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_update_sends_full_resource() {
        let req = client().build_update(&rex()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/resources/7");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["name"], "Rex");
        assert_eq!(body["age"], 3);
        assert_eq!(body["isMammal"], true);
    }

    #[test]
    fn build_delete_has_no_body() {
        let req = client().build_delete(7);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/resources/7");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = AnimalClient::new("http://localhost:3000/").build_list();
        assert_eq!(req.path, "http://localhost:3000/api/resources");
    }

    #[test]
    fn any_2xx_counts_as_success() {
        for status in [200, 201, 204] {
            assert!(client().parse_delete(HttpResponse::new(status, "")).is_ok());
            assert!(client().parse_update(HttpResponse::new(status, "ignored")).is_ok());
        }
    }

    #[test]
    fn parse_delete_not_found() {
        let err = client().parse_delete(HttpResponse::new(404, "")).unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_update_server_error_keeps_body() {
        let err = client()
            .parse_update(HttpResponse::new(500, "boom"))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::HttpError {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn parse_create_rejects_body_without_id() {
        let err = client()
            .parse_create(HttpResponse::new(201, r#"{"name":"Rex","age":3,"isMammal":true}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
