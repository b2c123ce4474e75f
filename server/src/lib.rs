//! REST router and in-memory controller for the animal resource.
//!
//! Every route lives under `/api/resources`. Handlers only delegate to the
//! shared [`Store`]; there is no persistence beyond the process lifetime.

pub mod config;

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub is_mammal: bool,
}

/// Body accepted by create and update. An `id` inside an update body is
/// ignored; the path decides which animal is replaced.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    pub name: String,
    pub age: u32,
    pub is_mammal: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    animals: BTreeMap<u64, Animal>,
}

impl Store {
    pub fn insert(&mut self, input: NewAnimal) -> Animal {
        self.next_id += 1;
        let animal = Animal {
            id: self.next_id,
            name: input.name,
            age: input.age,
            is_mammal: input.is_mammal,
        };
        self.animals.insert(animal.id, animal.clone());
        animal
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("animal {0} not found")]
    NotFound(u64),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let status = match self {
            ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(ErrorBody { message: self.to_string() })).into_response()
    }
}

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-populated with `seed`, ids assigned in order from 1.
pub fn app_with(seed: Vec<NewAnimal>) -> Router {
    let mut store = Store::default();
    for animal in seed {
        store.insert(animal);
    }
    let db: Db = Arc::new(RwLock::new(store));
    let resources = Router::new()
        .route("/resources", get(list_animals).post(create_animal))
        .route(
            "/resources/{id}",
            get(get_animal).put(update_animal).delete(delete_animal),
        )
        .with_state(db);
    Router::new()
        .nest("/api", resources)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn list_animals(State(db): State<Db>) -> Json<Vec<Animal>> {
    let store = db.read().await;
    Json(store.animals.values().cloned().collect())
}

async fn create_animal(
    State(db): State<Db>,
    Json(input): Json<NewAnimal>,
) -> (StatusCode, Json<Animal>) {
    let animal = db.write().await.insert(input);
    tracing::info!(id = animal.id, "animal created");
    (StatusCode::CREATED, Json(animal))
}

async fn get_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Animal>, ControllerError> {
    let store = db.read().await;
    store
        .animals
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ControllerError::NotFound(id))
}

async fn update_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewAnimal>,
) -> Result<Json<Animal>, ControllerError> {
    let mut store = db.write().await;
    let animal = store.animals.get_mut(&id).ok_or(ControllerError::NotFound(id))?;
    animal.name = input.name;
    animal.age = input.age;
    animal.is_mammal = input.is_mammal;
    tracing::info!(id, "animal updated");
    Ok(Json(animal.clone()))
}

async fn delete_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ControllerError> {
    let mut store = db.write().await;
    store
        .animals
        .remove(&id)
        .ok_or(ControllerError::NotFound(id))?;
    tracing::info!(id, "animal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rex() -> NewAnimal {
        NewAnimal {
            name: "Rex".to_string(),
            age: 3,
            is_mammal: true,
        }
    }

    #[test]
    fn animal_serializes_with_camel_case_keys() {
        let animal = Animal {
            id: 7,
            name: "Rex".to_string(),
            age: 3,
            is_mammal: true,
        };
        let json = serde_json::to_value(&animal).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Rex");
        assert_eq!(json["age"], 3);
        assert_eq!(json["isMammal"], true);
    }

    #[test]
    fn new_animal_ignores_id_in_body() {
        let input: NewAnimal =
            serde_json::from_str(r#"{"id":99,"name":"Tweety","age":1,"isMammal":false}"#).unwrap();
        assert_eq!(input.name, "Tweety");
        assert!(!input.is_mammal);
    }

    #[test]
    fn new_animal_rejects_negative_age() {
        let result: Result<NewAnimal, _> =
            serde_json::from_str(r#"{"name":"Odd","age":-1,"isMammal":false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_animal_rejects_missing_field() {
        let result: Result<NewAnimal, _> = serde_json::from_str(r#"{"name":"Half","age":2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn store_assigns_increasing_ids_from_one() {
        let mut store = Store::default();
        assert_eq!(store.insert(rex()).id, 1);
        assert_eq!(store.insert(rex()).id, 2);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = Store::default();
        let first = store.insert(rex());
        store.animals.remove(&first.id);
        assert_eq!(store.insert(rex()).id, 2);
    }
}
