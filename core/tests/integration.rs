//! Full page lifecycle against the live server.
//!
//! # Design
//! Starts the server on a random port, then drives `App` through bootstrap,
//! create, edit and remove, executing every request over real HTTP with
//! ureq. Validates that request building, response parsing and rendering
//! agree with the actual server.

use animal_core::{
    Animal, AnimalClient, ApiError, App, HttpMethod, HttpRequest, HttpResponse, Outcome, Resolution,
    Transport, TransportError,
};

struct Ureq(ureq::Agent);

impl Ureq {
    /// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
    /// responses come back as data and the core decides what they mean.
    fn new() -> Self {
        Self(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        )
    }
}

impl Transport for Ureq {
    fn execute(&self, req: &HttpRequest) -> Outcome {
        let agent = &self.0;
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
            (HttpMethod::Put, Some(body)) => agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse::new(status, body))
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            animal_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn page_lifecycle() {
    let base_url = start_server();
    let transport = Ureq::new();
    let mut app = App::new(AnimalClient::new(&base_url)).unwrap();

    // Step 1: bootstrap against an empty server.
    let pending = app.bootstrap();
    assert_eq!(app.settle(pending, &transport).unwrap(), Resolution::Applied);
    assert_eq!(app.document().children(app.main()), &[app.bottom()]);

    // Step 2: create Rex through the form.
    let draft = app.create().unwrap();
    let doc = app.document_mut();
    doc.set_value(draft.fields.name, "Rex").unwrap();
    doc.set_value(draft.fields.age, "3").unwrap();
    doc.set_checked(draft.fields.mammal, true).unwrap();
    let pending = app.submit(draft.key).unwrap();
    assert_eq!(app.settle(pending, &transport).unwrap(), Resolution::Applied);
    let rex = Animal {
        id: 1,
        name: "Rex".to_string(),
        age: 3,
        is_mammal: true,
    };
    assert_eq!(app.animal(1), Some(&rex));
    assert!(app.document().get_element_by_id("animal-1").is_some());

    // Step 3: edit Rex.
    app.edit(1).unwrap();
    let fields = app.edit_fields(1).unwrap();
    app.document_mut().set_value(fields.age, "4").unwrap();
    let pending = app.save(1).unwrap();
    assert_eq!(app.settle(pending, &transport).unwrap(), Resolution::Applied);
    assert_eq!(app.animal(1).unwrap().age, 4);

    // Step 4: a fresh page sees the server state.
    let mut fresh = App::new(AnimalClient::new(&base_url)).unwrap();
    let pending = fresh.bootstrap();
    fresh.settle(pending, &transport).unwrap();
    assert_eq!(fresh.animal(1), app.animal(1));

    // Step 5: remove Rex.
    let pending = app.remove(1).unwrap();
    assert_eq!(app.settle(pending, &transport).unwrap(), Resolution::Applied);
    assert_eq!(app.document().get_element_by_id("animal-1"), None);

    // Step 6: the stale page's remove now fails and leaves its item alone.
    let before = fresh.render_html();
    let pending = fresh.remove(1).unwrap();
    assert_eq!(
        fresh.settle(pending, &transport).unwrap(),
        Resolution::Failed(ApiError::NotFound)
    );
    assert_eq!(fresh.render_html(), before);

    // Step 7: the server agrees the animal is gone.
    let client = AnimalClient::new(&base_url);
    let err = client
        .parse_get(transport.execute(&client.build_get(1)).unwrap())
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    // Bind then drop so the port is very likely closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut app = App::new(AnimalClient::new(&format!("http://{addr}"))).unwrap();
    let pending = app.bootstrap();
    let resolution = app.settle(pending, &Ureq::new()).unwrap();
    assert!(matches!(resolution, Resolution::Failed(ApiError::Transport(_))));
}
