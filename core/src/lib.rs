//! Client core for the animal CRUD page.
//!
//! # Overview
//! Renders a list of animals into an in-memory document and keeps it in step
//! with the server. Nothing here touches the network: requests come out as
//! data, and the host feeds the outcomes back in (host-does-IO pattern).
//!
//! # Design
//! - `AnimalClient` builds `HttpRequest`s and parses `HttpResponse`s.
//! - `Document` is an arena-backed element tree; `ElementCreator` is the
//!   fluent builder that places subtrees into it.
//! - `App` owns the document, an explicit id → element map, and the table
//!   of in-flight requests. It mutates the document only after a successful
//!   response.
//! - DTOs are defined independently from the server crate; the live
//!   integration test catches schema drift.

pub mod app;
pub mod builder;
pub mod client;
pub mod dom;
pub mod error;
pub mod form;
pub mod http;
pub mod types;

pub use app::{page, Action, App, Dispatched, Draft, PendingRequest, Resolution, Ticket};
pub use builder::ElementCreator;
pub use client::AnimalClient;
pub use dom::{Document, Event, NodeId};
pub use error::{ApiError, AppError, DomError, FormError};
pub use form::FormFields;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Outcome, Transport, TransportError};
pub use types::{anchor_id, Animal, NewAnimal};
