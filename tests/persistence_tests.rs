use pretty_assertions::assert_eq;
use roa_sdk::context::{set_headers, with_request_context, Session};
use roa_sdk::schema::ErrorKind;
use roa_sdk::transport::MockTransport;
use roa_sdk::{
    EntityDeclaration, EntityInstance, EntityOptions, EntityType, FieldDescriptor, FieldValidator,
    PersistenceService, PostSave, PreSave, ReadService, RoaError, RoaSettings, RoaState, SaveObserver, SaveOptions,
    TransportError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn setup(settings: RoaSettings) -> (Arc<MockTransport>, RoaState) {
    let mock = Arc::new(MockTransport::new());
    let state = RoaState::new(mock.clone(), settings);
    (mock, state)
}

fn widget(state: &RoaState) -> Arc<EntityType> {
    state
        .build(
            &EntityDeclaration::new("app", "Widget")
                .field(FieldDescriptor::text("name"))
                .list_url("/widgets/"),
        )
        .unwrap()
        .entity()
        .unwrap()
}

fn new_widget(widget: &Arc<EntityType>, name: &str) -> EntityInstance {
    EntityInstance::new(widget).unwrap().with("name", json!(name))
}

// ── Create / update / delete ────────────────────────────────────

#[tokio::test]
async fn widget_create_update_delete() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);

    mock.respond_json(201, json!({"id": 7, "name": "a"}));
    let mut w = new_widget(&widget, "a");
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    assert_eq!(w.pk(), Some(&json!(7)));
    assert!(w.is_persisted());

    mock.respond_json(200, json!({"id": 7, "name": "a"}));
    PersistenceService::save(&state, &mut w, SaveOptions::force_update()).await.unwrap();

    mock.respond(204, "");
    PersistenceService::delete(&state, &mut w).await.unwrap();
    assert_eq!(w.pk(), None);

    assert_eq!(mock.calls(), vec!["POST /widgets/", "PUT /widgets/7/", "DELETE /widgets/7/"]);
    let requests = mock.requests();
    assert_eq!(requests[0].body_json(), Some(json!({"name": "a"})));
    assert_eq!(requests[1].body_json(), Some(json!({"id": 7, "name": "a"})));
    assert_eq!(
        requests[0].request.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
    assert!(requests[2].request.body.is_none());
}

#[tokio::test]
async fn saved_key_alone_means_update() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    mock.respond_json(200, json!({"id": "12", "name": "b"}));

    let mut w = new_widget(&widget, "b").with("id", json!(12));
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();

    assert_eq!(mock.calls(), vec!["PUT /widgets/12/"]);
    assert_eq!(w.pk(), Some(&json!(12)));
}

#[tokio::test]
async fn delete_failure_keeps_the_key() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    mock.respond(500, "boom");

    let mut w = new_widget(&widget, "a").with("id", json!(7));
    PersistenceService::delete(&state, &mut w).await.unwrap();
    assert_eq!(w.pk(), Some(&json!(7)));
}

#[tokio::test]
async fn delete_connection_failure_is_a_remote_error() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    mock.fail(TransportError::Connection("refused".into()));

    let mut w = new_widget(&widget, "a").with("id", json!(7));
    let err = PersistenceService::delete(&state, &mut w).await.unwrap_err();
    assert!(matches!(err, RoaError::RemoteOperation { source: Some(_), .. }));
    assert_eq!(w.pk(), Some(&json!(7)));
}

// ── Programming errors ──────────────────────────────────────────

#[tokio::test]
async fn conflicting_flags_fail_before_any_call() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    let mut w = new_widget(&widget, "a").with("id", json!(1));
    let options = SaveOptions {
        force_insert: true,
        force_update: true,
        raw: false,
    };
    let err = PersistenceService::save(&state, &mut w, options).await.unwrap_err();
    assert!(matches!(err, RoaError::ConflictingSaveFlags));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn keyless_delete_and_forced_update_fail_before_any_call() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    let mut w = new_widget(&widget, "a");

    let err = PersistenceService::delete(&state, &mut w).await.unwrap_err();
    assert!(matches!(err, RoaError::MissingPrimaryKey { .. }));
    let err = PersistenceService::save(&state, &mut w, SaveOptions::force_update())
        .await
        .unwrap_err();
    assert!(matches!(err, RoaError::MissingPrimaryKey { .. }));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn unknown_format_surfaces_at_first_use() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    state.update_settings(|s| s.format = "msgpack".into());

    let mut w = new_widget(&widget, "a");
    let err = PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap_err();
    assert!(matches!(err, RoaError::Config(_)));
    assert!(mock.requests().is_empty());
}

#[test]
fn abstract_types_have_no_instances() {
    let (_mock, state) = setup(RoaSettings::default());
    let base = state
        .build(
            &EntityDeclaration::new("app", "Base")
                .field(FieldDescriptor::text("title"))
                .options(EntityOptions::abstract_entity()),
        )
        .unwrap()
        .entity()
        .unwrap();
    assert!(matches!(EntityInstance::new(&base), Err(RoaError::Abstract { .. })));
}

// ── Remote failures ─────────────────────────────────────────────

#[tokio::test]
async fn write_status_error_is_a_remote_error() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    mock.respond(500, "server exploded");

    let mut w = new_widget(&widget, "a");
    let err = PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap_err();
    match err {
        RoaError::RemoteOperation { source: Some(source), .. } => assert_eq!(source.status(), Some(500)),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(w.pk(), None);
}

#[tokio::test]
async fn invalid_response_carries_the_validation_detail() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    mock.respond_json(201, json!({"id": "not-a-number", "name": "a"}));

    let mut w = new_widget(&widget, "a");
    let err = PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap_err();
    match err {
        RoaError::RemoteOperation {
            details: Some(details), ..
        } => assert!(details.get("id").is_some()),
        other => panic!("unexpected error: {:?}", other),
    }
}

// ── Custom primary keys ─────────────────────────────────────────

fn tag(state: &RoaState) -> Arc<EntityType> {
    state
        .build(
            &EntityDeclaration::new("app", "Tag")
                .field(
                    FieldDescriptor::text("slug")
                        .primary_key()
                        .validator(FieldValidator::Unique),
                )
                .field(FieldDescriptor::text("label"))
                .list_url("/tags/"),
        )
        .unwrap()
        .entity()
        .unwrap()
}

#[tokio::test]
async fn probe_miss_creates() {
    let (mock, state) = setup(RoaSettings::default());
    let tag = tag(&state);
    mock.respond(404, "");
    mock.respond_json(201, json!({"slug": "rust", "label": "Rust"}));

    let mut t = EntityInstance::new(&tag)
        .unwrap()
        .with("slug", json!("rust"))
        .with("label", json!("Rust"));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();

    assert_eq!(mock.calls(), vec!["GET /tags/rust/", "POST /tags/"]);
    assert_eq!(t.pk(), Some(&json!("rust")));
}

#[tokio::test]
async fn probe_hit_updates() {
    let (mock, state) = setup(RoaSettings::default());
    let tag = tag(&state);
    mock.respond_json(200, json!({"slug": "rust", "label": "Old"}));
    mock.respond_json(200, json!({"slug": "rust", "label": "Rust"}));

    let mut t = EntityInstance::new(&tag)
        .unwrap()
        .with("slug", json!("rust"))
        .with("label", json!("Rust"));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    assert_eq!(mock.calls(), vec!["GET /tags/rust/", "PUT /tags/rust/"]);

    // Known to exist now: no second probe.
    mock.respond_json(200, json!({"slug": "rust", "label": "Rust"}));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    assert_eq!(mock.calls().last().map(String::as_str), Some("PUT /tags/rust/"));
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn probe_transport_failure_reads_as_absent() {
    let (mock, state) = setup(RoaSettings::default());
    let tag = tag(&state);
    mock.fail(TransportError::Connection("reset".into()));
    mock.respond_json(201, json!({"slug": "go"}));

    let mut t = EntityInstance::new(&tag).unwrap().with("slug", json!("go"));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    assert_eq!(mock.calls(), vec!["GET /tags/go/", "POST /tags/"]);
}

#[tokio::test]
async fn resave_after_delete_checks_again() {
    let (mock, state) = setup(RoaSettings::default());
    let tag = tag(&state);
    mock.respond(404, "");
    mock.respond_json(201, json!({"slug": "rust", "label": "Rust"}));
    mock.respond(204, "");
    mock.respond(404, "");
    mock.respond_json(201, json!({"slug": "rust", "label": "Rust"}));

    let mut t = EntityInstance::new(&tag)
        .unwrap()
        .with("slug", json!("rust"))
        .with("label", json!("Rust"));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    PersistenceService::delete(&state, &mut t).await.unwrap();
    assert!(!t.is_persisted());

    t.set("slug", json!("rust"));
    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    assert_eq!(
        mock.calls(),
        vec!["GET /tags/rust/", "POST /tags/", "DELETE /tags/rust/", "GET /tags/rust/", "POST /tags/"]
    );
    assert!(t.is_persisted());
}

#[tokio::test]
async fn rekeyed_instance_checks_its_new_key() {
    let (mock, state) = setup(RoaSettings::default());
    let tag = tag(&state);
    mock.respond_json(200, json!({"slug": "rust", "label": "Rust"}));
    mock.respond(404, "");
    mock.respond_json(201, json!({"slug": "go", "label": "Rust"}));

    let mut t = ReadService::fetch(&state, &tag, json!("rust")).await.unwrap();
    assert!(t.is_persisted());
    t.set("slug", json!("go"));
    assert!(!t.is_persisted());

    PersistenceService::save(&state, &mut t, SaveOptions::default()).await.unwrap();
    assert_eq!(mock.calls(), vec!["GET /tags/rust/", "GET /tags/go/", "POST /tags/"]);
    assert_eq!(t.pk(), Some(&json!("go")));
}

// ── Inheritance ─────────────────────────────────────────────────

fn restaurant_chain(state: &RoaState) -> (Arc<EntityType>, Arc<EntityType>, Arc<EntityType>) {
    let place = state
        .build(
            &EntityDeclaration::new("shop", "Place")
                .field(FieldDescriptor::text("name"))
                .list_url("/places/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    let restaurant = state
        .build(
            &EntityDeclaration::new("shop", "Restaurant")
                .parent(&place)
                .field(FieldDescriptor::integer("seats"))
                .list_url("/restaurants/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    let italian = state
        .build(
            &EntityDeclaration::new("shop", "Italian")
                .parent(&restaurant)
                .field(FieldDescriptor::text("pasta"))
                .list_url("/italian/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    (place, restaurant, italian)
}

#[tokio::test]
async fn chain_saves_root_first() {
    let (mock, state) = setup(RoaSettings::default());
    let (_, _, italian) = restaurant_chain(&state);
    mock.respond_json(201, json!({"id": 3, "name": "Luigi's"}));
    mock.respond_json(201, json!({"place_ptr": 3, "seats": 40}));
    mock.respond_json(201, json!({"restaurant_ptr": 3, "pasta": "penne"}));

    let mut i = EntityInstance::new(&italian)
        .unwrap()
        .with("name", json!("Luigi's"))
        .with("seats", json!(40))
        .with("pasta", json!("penne"));
    PersistenceService::save(&state, &mut i, SaveOptions::default()).await.unwrap();

    assert_eq!(mock.calls(), vec!["POST /places/", "POST /restaurants/", "POST /italian/"]);
    let requests = mock.requests();
    assert_eq!(requests[0].body_json(), Some(json!({"name": "Luigi's"})));
    assert_eq!(requests[1].body_json(), Some(json!({"seats": 40, "place_ptr": 3})));
    assert_eq!(requests[2].body_json(), Some(json!({"pasta": "penne", "restaurant_ptr": 3})));
    assert_eq!(i.get("id"), Some(&json!(3)));
    assert_eq!(i.get("place_ptr"), Some(&json!(3)));
    assert_eq!(i.pk(), Some(&json!(3)));

    mock.respond_json(200, json!({"id": 3, "name": "Luigi's"}));
    mock.respond_json(200, json!({"place_ptr": 3, "seats": 40}));
    mock.respond_json(200, json!({"restaurant_ptr": 3, "pasta": "penne"}));
    PersistenceService::save(&state, &mut i, SaveOptions::default()).await.unwrap();
    assert_eq!(
        mock.calls()[3..].to_vec(),
        vec!["PUT /places/3/", "PUT /restaurants/3/", "PUT /italian/3/"]
    );
}

#[tokio::test]
async fn force_update_only_binds_the_saved_level() {
    let (mock, state) = setup(RoaSettings::default());
    let code = state
        .build(
            &EntityDeclaration::new("app", "Code")
                .field(FieldDescriptor::text("code").primary_key())
                .list_url("/codes/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    let branch = state
        .build(
            &EntityDeclaration::new("app", "Branch")
                .parent(&code)
                .field(FieldDescriptor::text("city"))
                .list_url("/branches/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    mock.respond(404, "");
    mock.respond_json(201, json!({"code": "x"}));
    mock.respond_json(200, json!({"code_ptr": "x", "city": "Oslo"}));

    let mut b = EntityInstance::new(&branch)
        .unwrap()
        .with("code_ptr", json!("x"))
        .with("city", json!("Oslo"));
    PersistenceService::save(&state, &mut b, SaveOptions::force_update()).await.unwrap();
    assert_eq!(mock.calls(), vec!["GET /codes/x/", "POST /codes/", "PUT /branches/x/"]);
}

#[tokio::test]
async fn raw_save_skips_parent_levels() {
    let (mock, state) = setup(RoaSettings::default());
    let (_, restaurant, _) = restaurant_chain(&state);
    mock.respond_json(201, json!({"place_ptr": 9, "seats": 4}));

    let mut r = EntityInstance::new(&restaurant)
        .unwrap()
        .with("seats", json!(4))
        .with("place_ptr", json!(9));
    PersistenceService::save(&state, &mut r, SaveOptions::raw()).await.unwrap();
    assert_eq!(mock.calls(), vec!["PUT /restaurants/9/"]);
}

#[tokio::test]
async fn proxy_delegates_to_its_concrete_type() {
    let (mock, state) = setup(RoaSettings::default());
    let (place, _, _) = restaurant_chain(&state);
    let proxy = state
        .build(
            &EntityDeclaration::new("shop", "Landmark")
                .parent(&place)
                .options(EntityOptions::proxy()),
        )
        .unwrap()
        .entity()
        .unwrap();
    let events = Arc::new(Recorder::default());
    state.connect(events.clone());
    mock.respond_json(201, json!({"id": 5, "name": "Tower"}));

    let mut landmark = EntityInstance::new(&proxy).unwrap().with("name", json!("Tower"));
    PersistenceService::save(&state, &mut landmark, SaveOptions::default())
        .await
        .unwrap();

    assert_eq!(mock.calls(), vec!["POST /places/"]);
    assert_eq!(landmark.pk(), Some(&json!(5)));
    assert_eq!(
        events.seen(),
        vec!["pre Landmark".to_string(), "post Landmark created=true".to_string()]
    );

    mock.respond(204, "");
    PersistenceService::delete(&state, &mut landmark).await.unwrap();
    assert_eq!(mock.calls()[1], "DELETE /places/5/");
}

// ── Lifecycle events ────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn seen(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl SaveObserver for Recorder {
    fn pre_save(&self, event: &PreSave<'_>) {
        self.0.lock().unwrap().push(format!("pre {}", event.sender.name()));
    }

    fn post_save(&self, event: &PostSave<'_>) {
        self.0
            .lock()
            .unwrap()
            .push(format!("post {} created={}", event.sender.name(), event.created));
    }
}

#[tokio::test]
async fn events_fire_around_the_write() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    let events = Arc::new(Recorder::default());
    state.connect_for(widget.key().clone(), events.clone());

    mock.respond_json(201, json!({"id": 1, "name": "a"}));
    mock.respond_json(200, json!({"id": 1, "name": "a"}));
    let mut w = new_widget(&widget, "a");
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();

    assert_eq!(
        events.seen(),
        vec![
            "pre Widget".to_string(),
            "post Widget created=true".to_string(),
            "pre Widget".to_string(),
            "post Widget created=false".to_string(),
        ]
    );
}

#[tokio::test]
async fn parent_levels_of_a_chain_emit_nothing() {
    let (mock, state) = setup(RoaSettings::default());
    let (_, restaurant, _) = restaurant_chain(&state);
    let events = Arc::new(Recorder::default());
    state.connect(events.clone());
    mock.respond_json(201, json!({"id": 2, "name": "x"}));
    mock.respond_json(201, json!({"place_ptr": 2, "seats": 1}));

    let mut r = EntityInstance::new(&restaurant)
        .unwrap()
        .with("name", json!("x"))
        .with("seats", json!(1));
    PersistenceService::save(&state, &mut r, SaveOptions::default()).await.unwrap();
    assert_eq!(
        events.seen(),
        vec!["pre Restaurant".to_string(), "post Restaurant created=true".to_string()]
    );
}

// ── Request context, overrides and codecs ───────────────────────

#[tokio::test]
async fn context_headers_override_defaults_per_task() {
    let mut settings = RoaSettings::default();
    settings.headers.insert("Authorization".into(), "Token default".into());
    settings.headers.insert("Accept-Language".into(), "en".into());
    let (mock, state) = setup(settings);
    let widget = widget(&state);
    mock.respond_json(201, json!({"id": 1, "name": "a"}));

    with_request_context(async {
        let mut session = Session::new();
        set_headers(
            &mut session,
            Some(HashMap::from([("Authorization".to_string(), "Token user".to_string())])),
        )
        .unwrap();
        let mut w = new_widget(&widget, "a");
        PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    })
    .await;

    let headers = &mock.requests()[0].request.headers;
    assert_eq!(headers.get("Authorization").map(String::as_str), Some("Token user"));
    assert_eq!(headers.get("Accept-Language").map(String::as_str), Some("en"));
}

#[tokio::test]
async fn detail_override_only_applies_to_its_entity() {
    let (mock, state) = setup(RoaSettings::default());
    let widget = widget(&state);
    let gadget = state
        .build(
            &EntityDeclaration::new("app", "Gadget")
                .field(FieldDescriptor::text("name"))
                .list_url("/gadgets/"),
        )
        .unwrap()
        .entity()
        .unwrap();
    state.update_settings(|s| {
        s.url_overrides
            .detail
            .insert("app.widget".into(), "https://other.example/widget/".into());
    });
    mock.respond_json(200, json!({"id": 1, "name": "a"}));
    mock.respond_json(200, json!({"id": 1, "name": "a"}));

    let mut w = new_widget(&widget, "a").with("id", json!(1));
    let mut g = new_widget(&gadget, "a").with("id", json!(1));
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    PersistenceService::save(&state, &mut g, SaveOptions::default()).await.unwrap();
    assert_eq!(mock.calls(), vec!["PUT https://other.example/widget/", "PUT /gadgets/1/"]);
}

#[tokio::test]
async fn ssl_ca_is_passed_through() {
    let mut settings = RoaSettings::default();
    settings.ssl_ca = Some("/etc/ssl/ca.pem".into());
    let (mock, state) = setup(settings);
    let widget = widget(&state);
    mock.respond_json(201, json!({"id": 1, "name": "a"}));

    let mut w = new_widget(&widget, "a");
    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    assert_eq!(
        mock.requests()[0].request.verify.as_deref(),
        Some(std::path::Path::new("/etc/ssl/ca.pem"))
    );
}

#[tokio::test]
async fn xml_and_yaml_round_trip_through_a_save() {
    for (format, mime, reply) in [
        (
            "xml",
            "application/xml",
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><root><id>7</id><name>a</name></root>",
        ),
        ("yaml", "text/x-yaml", "id: 7\nname: a\n"),
    ] {
        let mut settings = RoaSettings::default();
        settings.format = format.into();
        let (mock, state) = setup(settings);
        let widget = widget(&state);
        mock.respond(201, reply);

        let mut w = new_widget(&widget, "a");
        PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
        assert_eq!(w.pk(), Some(&json!(7)), "{}", format);

        let request = &mock.requests()[0].request;
        assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some(mime));
        let sent = roa_sdk::select(format)
            .unwrap()
            .decoder()
            .decode(request.body.as_deref().unwrap())
            .unwrap();
        assert_eq!(sent, json!({"name": "a"}), "{}", format);
    }
}

#[tokio::test]
async fn xml_save_keeps_numeric_looking_text() {
    let mut settings = RoaSettings::default();
    settings.format = "xml".into();
    let (mock, state) = setup(settings);
    let widget = widget(&state);
    mock.respond(
        201,
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><root><id>8</id><name>007</name></root>",
    );

    let mut w = new_widget(&widget, "007");
    let seen = Arc::new(Mutex::new(Vec::new()));
    struct Names(Arc<Mutex<Vec<serde_json::Value>>>);
    impl SaveObserver for Names {
        fn post_save(&self, event: &PostSave<'_>) {
            if let Some(name) = event.instance.get("name") {
                self.0.lock().unwrap().push(name.clone());
            }
        }
    }
    state.connect(Arc::new(Names(seen.clone())));

    PersistenceService::save(&state, &mut w, SaveOptions::default()).await.unwrap();
    assert_eq!(w.pk(), Some(&json!(8)));
    assert_eq!(w.get("name"), Some(&json!("007")));
    assert_eq!(*seen.lock().unwrap(), vec![json!("007")]);
    assert_eq!(
        mock.requests()[0].request.body.as_deref().map(|b| String::from_utf8_lossy(b).into_owned()),
        Some("<?xml version=\"1.0\" encoding=\"utf-8\"?><root><name>007</name></root>".to_string())
    );
}

#[test]
fn lookup_kinds_follow_inheritance() {
    let (_mock, state) = setup(RoaSettings::default());
    let (place, restaurant, italian) = restaurant_chain(&state);
    let generic = ErrorKind::object_does_not_exist();
    let italian_kind = italian.does_not_exist().unwrap();
    assert!(italian_kind.is_a(restaurant.does_not_exist().unwrap()));
    assert!(italian_kind.is_a(place.does_not_exist().unwrap()));
    assert!(italian_kind.is_a(&generic));
    assert!(!italian_kind.is_a(&ErrorKind::multiple_objects_returned()));
}
