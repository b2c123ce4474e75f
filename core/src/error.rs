//! Error types for the client core.
//!
//! `ApiError` covers everything between issuing a request and hydrating its
//! response. `DomError` is what a misused document handle produces, and
//! `FormError` rejects input before any request is built. `AppError` is the
//! umbrella returned by the render functions.

use thiserror::Error;

use crate::dom::NodeId;
use crate::http::TransportError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be hydrated into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("no node {0:?} in this document")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot insert {node:?} below itself")]
    Cycle { node: NodeId },

    #[error("no element #{0} in the expected subtree")]
    MissingElement(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("age {0:?} is not a non-negative whole number")]
    InvalidAge(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("document has no {0} element")]
    MissingSurface(&'static str),

    #[error("no animal {0} is rendered")]
    UnknownResource(u64),

    #[error("animal {0} is not being edited")]
    NotEditing(u64),

    #[error("no create form {0}")]
    UnknownDraft(u64),

    #[error("ticket {0} is not pending")]
    UnknownTicket(u64),
}
