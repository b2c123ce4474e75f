//! The animal list page: rendering plus request/response synchronization.
//!
//! # Design
//! `App` owns the document and an explicit map from resource id to the
//! element currently rendering it. User actions never touch the network.
//! They hand back `PendingRequest`s, each tagged with a `Ticket`; the host
//! executes them in whatever order it likes and reports each outcome through
//! [`App::resolve`]. The document changes only when an outcome is a success,
//! and a success for a resource whose element is already gone is ignored.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error, info, warn};

use crate::builder::ElementCreator;
use crate::client::AnimalClient;
use crate::dom::{Document, Event, NodeId};
use crate::error::{ApiError, AppError, DomError};
use crate::form::{append_fields, FormFields};
use crate::http::{HttpRequest, Outcome, Transport};
use crate::types::Animal;

/// What a listener in the page asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenCreate,
    Edit(u64),
    Remove(u64),
    Save(u64),
    Submit(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A request the host must execute and then report back with its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

/// How a resolved request affected the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// Logged; the document is exactly as before.
    Failed(ApiError),
    /// Succeeded on the server, but its element was already gone.
    Stale,
}

#[derive(Debug)]
pub struct Dispatched {
    pub event: Event,
    pub requests: Vec<PendingRequest>,
}

/// An open create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draft {
    pub key: u64,
    pub form: NodeId,
    pub fields: FormFields,
}

#[derive(Debug)]
enum View {
    Displayed,
    Editing(FormFields),
}

#[derive(Debug)]
struct Anchor {
    animal: Animal,
    node: NodeId,
    view: View,
}

#[derive(Debug)]
enum Intent {
    Load,
    Update(Animal),
    Delete(u64),
    Create(u64),
}

impl Intent {
    fn op(&self) -> &'static str {
        match self {
            Intent::Load => "load",
            Intent::Update(_) => "update",
            Intent::Delete(_) => "delete",
            Intent::Create(_) => "create",
        }
    }

    fn resource(&self) -> Option<u64> {
        match self {
            Intent::Update(animal) => Some(animal.id),
            Intent::Delete(id) => Some(*id),
            Intent::Load | Intent::Create(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    client: AnimalClient,
    doc: Document<Action>,
    main: NodeId,
    bottom: NodeId,
    anchors: HashMap<u64, Anchor>,
    drafts: BTreeMap<u64, Draft>,
    next_draft: u64,
    pending: HashMap<Ticket, Intent>,
    next_ticket: u64,
}

/// Header with a "New animal" button, then `main` ending in `#bottom`.
pub fn page() -> Result<Document<Action>, DomError> {
    let mut doc = Document::new();
    let body = doc.body();
    ElementCreator::new("header")
        .append(ElementCreator::new("h1").text("Animals"))
        .append(
            ElementCreator::new("button")
                .id("create-button")
                .text("New animal")
                .listener("click", Action::OpenCreate),
        )
        .append_to(&mut doc, body)?;
    ElementCreator::new("main")
        .append(ElementCreator::new("div").id("bottom"))
        .append_to(&mut doc, body)?;
    Ok(doc)
}

impl App {
    pub fn new(client: AnimalClient) -> Result<Self, AppError> {
        Self::with_document(client, page()?)
    }

    /// Mounts onto an existing document, which must contain `main` with a
    /// `#bottom` child.
    pub fn with_document(client: AnimalClient, doc: Document<Action>) -> Result<Self, AppError> {
        let main = doc.query_selector("main").ok_or(AppError::MissingSurface("main"))?;
        let bottom = doc
            .query_selector("#bottom")
            .ok_or(AppError::MissingSurface("#bottom"))?;
        if doc.parent(bottom) != Some(main) {
            return Err(AppError::MissingSurface("#bottom inside main"));
        }
        Ok(Self {
            client,
            doc,
            main,
            bottom,
            anchors: HashMap::new(),
            drafts: BTreeMap::new(),
            next_draft: 0,
            pending: HashMap::new(),
            next_ticket: 0,
        })
    }

    pub fn document(&self) -> &Document<Action> {
        &self.doc
    }

    /// Mutable access for the host, e.g. to type into inputs.
    pub fn document_mut(&mut self) -> &mut Document<Action> {
        &mut self.doc
    }

    pub fn main(&self) -> NodeId {
        self.main
    }

    pub fn bottom(&self) -> NodeId {
        self.bottom
    }

    pub fn animal(&self, id: u64) -> Option<&Animal> {
        self.anchors.get(&id).map(|anchor| &anchor.animal)
    }

    /// Element currently rendering resource `id`.
    pub fn anchor(&self, id: u64) -> Option<NodeId> {
        self.anchors.get(&id).map(|anchor| anchor.node)
    }

    pub fn edit_fields(&self, id: u64) -> Option<FormFields> {
        match self.anchors.get(&id)?.view {
            View::Editing(fields) => Some(fields),
            View::Displayed => None,
        }
    }

    pub fn draft(&self, key: u64) -> Option<Draft> {
        self.drafts.get(&key).copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn render_html(&self) -> String {
        self.doc.outer_html(self.doc.root())
    }

    fn issue(&mut self, request: HttpRequest, intent: Intent) -> PendingRequest {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        debug!(
            ticket = ticket.0,
            op = intent.op(),
            method = request.method.as_str(),
            path = %request.path,
            "request issued"
        );
        self.pending.insert(ticket, intent);
        PendingRequest { ticket, request }
    }

    /// Requests the full collection. Each animal is rendered once the
    /// response is resolved.
    pub fn bootstrap(&mut self) -> PendingRequest {
        let request = self.client.build_list();
        self.issue(request, Intent::Load)
    }

    /// Renders `animal` as a list item.
    ///
    /// With `sibling` the item takes that element's place; otherwise it goes
    /// right before `#bottom`. An element already rendering the same id is
    /// replaced in place instead, so there is never more than one.
    pub fn add(&mut self, animal: Animal, sibling: Option<NodeId>) -> Result<NodeId, AppError> {
        let id = animal.id;
        let previous = self.anchor(id);
        let creator = ElementCreator::new("article")
            .id(&animal.dom_id())
            .class("animal")
            .append(ElementCreator::new("h2").text(animal.name.as_str()))
            .append(ElementCreator::new("p").text(format!("Age: {}", animal.age)))
            .append(ElementCreator::new("p").text(format!(
                "Mammal: {}",
                if animal.is_mammal { "Yes" } else { "No" }
            )))
            .append(
                ElementCreator::new("button")
                    .text("Edit")
                    .listener("click", Action::Edit(id)),
            )
            .append(
                ElementCreator::new("button")
                    .text("Remove")
                    .listener("click", Action::Remove(id)),
            );

        let node = match sibling.or(previous) {
            Some(target) => creator.replace(&mut self.doc, self.main, target)?,
            None => creator.insert_before(&mut self.doc, self.main, self.bottom)?,
        };
        if let (Some(old), Some(target)) = (previous, sibling) {
            if old != target {
                self.doc.remove(old)?;
            }
        }
        if let Some(target) = sibling {
            self.anchors.retain(|_, anchor| anchor.node != target);
        }
        self.anchors.insert(
            id,
            Anchor {
                animal,
                node,
                view: View::Displayed,
            },
        );
        Ok(node)
    }

    /// Swaps the list item of `id` for a pre-filled edit form. Editing an
    /// animal whose form is already open returns that form.
    pub fn edit(&mut self, id: u64) -> Result<NodeId, AppError> {
        let anchor = self.anchors.get(&id).ok_or(AppError::UnknownResource(id))?;
        if let View::Editing(_) = anchor.view {
            return Ok(anchor.node);
        }
        let (animal, old) = (anchor.animal.clone(), anchor.node);
        let prefix = animal.dom_id();

        let form = ElementCreator::new("form")
            .id(&prefix)
            .class("edit-form")
            .append(ElementCreator::new("h3").text(format!("Edit {}", animal.name)));
        let node = append_fields(form, &prefix, Some(&animal))
            .append(
                ElementCreator::new("button")
                    .with("type", "submit")
                    .text("Save")
                    .listener("click", Action::Save(id)),
            )
            .replace(&mut self.doc, self.main, old)?;
        let fields = FormFields::locate(&self.doc, node, &prefix)?;

        if let Some(anchor) = self.anchors.get_mut(&id) {
            anchor.node = node;
            anchor.view = View::Editing(fields);
        }
        Ok(node)
    }

    /// Reads the edit form of `id` and requests the update. The form stays
    /// until the update succeeds.
    pub fn save(&mut self, id: u64) -> Result<PendingRequest, AppError> {
        let anchor = self.anchors.get(&id).ok_or(AppError::UnknownResource(id))?;
        let View::Editing(fields) = &anchor.view else {
            return Err(AppError::NotEditing(id));
        };
        let values = fields.read(&self.doc).inspect_err(|e| {
            error!(op = "update", id, error = %e, "invalid input, nothing sent");
        })?;
        let updated = anchor.animal.with_values(values);
        let request = self.client.build_update(&updated)?;
        Ok(self.issue(request, Intent::Update(updated)))
    }

    /// Requests deletion of `id`. The element stays until the server agrees.
    pub fn remove(&mut self, id: u64) -> Result<PendingRequest, AppError> {
        if !self.anchors.contains_key(&id) {
            return Err(AppError::UnknownResource(id));
        }
        let request = self.client.build_delete(id);
        Ok(self.issue(request, Intent::Delete(id)))
    }

    /// Prepends an empty create form to the list.
    pub fn create(&mut self) -> Result<Draft, AppError> {
        self.next_draft += 1;
        let key = self.next_draft;
        let prefix = format!("new-animal-{key}");

        let form = ElementCreator::new("form")
            .id(&format!("{prefix}-form"))
            .class("create-form")
            .append(ElementCreator::new("h3").text("Create New Animal"));
        let node = append_fields(form, &prefix, None)
            .append(
                ElementCreator::new("button")
                    .with("type", "submit")
                    .text("Create")
                    .listener("click", Action::Submit(key)),
            )
            .prepend_to(&mut self.doc, self.main)?;
        let draft = Draft {
            key,
            form: node,
            fields: FormFields::locate(&self.doc, node, &prefix)?,
        };
        self.drafts.insert(key, draft);
        Ok(draft)
    }

    /// Reads create form `key` and requests creation. The form stays open
    /// whatever the outcome.
    pub fn submit(&mut self, key: u64) -> Result<PendingRequest, AppError> {
        let draft = self.drafts.get(&key).ok_or(AppError::UnknownDraft(key))?;
        let values = draft.fields.read(&self.doc).inspect_err(|e| {
            error!(op = "create", error = %e, "invalid input, nothing sent");
        })?;
        let request = self.client.build_create(&values)?;
        Ok(self.issue(request, Intent::Create(key)))
    }

    /// Fires `event` at `target` and runs every matching listener.
    ///
    /// Invalid form input is logged by the action itself and does not abort
    /// the dispatch.
    pub fn dispatch(&mut self, target: NodeId, event: &str) -> Result<Dispatched, AppError> {
        let actions: Vec<Action> = self.doc.listeners(target, event).into_iter().copied().collect();
        let mut event = Event::new(event);
        let mut requests = Vec::new();
        for action in actions {
            let issued = match action {
                Action::OpenCreate => self.create().map(|_| None),
                Action::Edit(id) => self.edit(id).map(|_| None),
                Action::Remove(id) => self.remove(id).map(Some),
                Action::Save(id) => {
                    event.prevent_default();
                    self.save(id).map(Some)
                }
                Action::Submit(key) => {
                    event.prevent_default();
                    self.submit(key).map(Some)
                }
            };
            match issued {
                Ok(Some(request)) => requests.push(request),
                Ok(None) | Err(AppError::Form(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Dispatched { event, requests })
    }

    pub fn click(&mut self, target: NodeId) -> Result<Dispatched, AppError> {
        self.dispatch(target, "click")
    }

    /// Applies the outcome of a previously issued request.
    ///
    /// Failures are logged and leave the document untouched; they come back
    /// as `Resolution::Failed` rather than `Err`. `Err` means the ticket was
    /// unknown or the document itself was in an unexpected shape.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Outcome) -> Result<Resolution, AppError> {
        let intent = self
            .pending
            .remove(&ticket)
            .ok_or(AppError::UnknownTicket(ticket.0))?;
        debug!(ticket = ticket.0, op = intent.op(), "request resolved");
        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Ok(fail(&intent, e.into())),
        };

        match intent {
            Intent::Load => match self.client.parse_list(response) {
                Ok(animals) => {
                    info!(count = animals.len(), "animals loaded");
                    for animal in animals {
                        self.add(animal, None)?;
                    }
                    Ok(Resolution::Applied)
                }
                Err(e) => Ok(fail(&intent, e)),
            },
            Intent::Update(animal) => match self.client.parse_update(response) {
                Ok(()) => match self.anchor(animal.id) {
                    Some(node) => {
                        self.add(animal, Some(node))?;
                        Ok(Resolution::Applied)
                    }
                    None => Ok(stale(&Intent::Update(animal))),
                },
                Err(e) => Ok(fail(&Intent::Update(animal), e)),
            },
            Intent::Delete(id) => match self.client.parse_delete(response) {
                Ok(()) => match self.anchors.remove(&id) {
                    Some(anchor) => {
                        self.doc.remove(anchor.node)?;
                        Ok(Resolution::Applied)
                    }
                    None => Ok(stale(&intent)),
                },
                Err(e) => Ok(fail(&intent, e)),
            },
            Intent::Create(_) => match self.client.parse_create(response) {
                Ok(animal) => {
                    info!(id = animal.id, "animal created");
                    self.add(animal, None)?;
                    Ok(Resolution::Applied)
                }
                Err(e) => Ok(fail(&intent, e)),
            },
        }
    }

    /// Executes `pending` through `transport` right away and resolves it.
    pub fn settle<T: Transport + ?Sized>(
        &mut self,
        pending: PendingRequest,
        transport: &T,
    ) -> Result<Resolution, AppError> {
        let outcome = transport.execute(&pending.request);
        self.resolve(pending.ticket, outcome)
    }
}

fn fail(intent: &Intent, err: ApiError) -> Resolution {
    error!(
        op = intent.op(),
        id = ?intent.resource(),
        error = %err,
        "request failed, document left unchanged"
    );
    Resolution::Failed(err)
}

fn stale(intent: &Intent) -> Resolution {
    warn!(
        op = intent.op(),
        id = ?intent.resource(),
        "response arrived after the element was removed"
    );
    Resolution::Stale
}
