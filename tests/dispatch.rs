//! Dispatch behavior through the public API, without a network.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use mvc_dispatcher::dispatch::{DispatchOutcome, NOT_FOUND_BODY};
use mvc_dispatcher::lifecycle::{bootstrap, bootstrap_with_reporter};
use mvc_dispatcher::{HttpRequest, HttpResponse};

mod common;

use common::{CollectingReporter, Probe};

#[test]
fn test_startup_registers_controllers_and_survives_faults() {
    let app = bootstrap(&common::config(""), &common::catalog()).unwrap();

    let registry = app.registry();
    assert_eq!(registry.len(), 3);
    assert!(registry.get("BaseController").is_some());
    assert!(registry.get("ProbeController").is_some());
    assert!(registry.get("FaultyController").is_some());
    assert!(registry.get("Helper").is_none());
    assert_eq!(registry.faults().len(), 1);

    let mut keys: Vec<_> = app.dispatcher().table().keys().map(str::to_string).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "/baseController/echo",
            "/baseController/firstMethod",
            "/faulty/fails",
            "/faulty/panics",
            "/probe/identity",
        ]
    );
}

#[test]
fn test_named_value_reaches_handler() {
    let app = bootstrap(&common::config("/app"), &common::catalog()).unwrap();
    let request = HttpRequest::new(Method::GET, "/app/baseController/firstMethod")
        .with_context_path("/app")
        .with_query("name=ty");
    let mut response = HttpResponse::new();

    let outcome = app.dispatcher().dispatch(&request, &mut response);

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.character_encoding(), Some("UTF-8"));
    assert_eq!(response.body_text(), "Hello, ty");
}

#[test]
fn test_missing_named_value_binds_empty() {
    let app = bootstrap(&common::config(""), &common::catalog()).unwrap();
    let request = HttpRequest::new(Method::POST, "/baseController/echo");
    let mut response = HttpResponse::new();

    assert_eq!(app.dispatcher().dispatch(&request, &mut response), DispatchOutcome::Handled);
    assert_eq!(response.body_text(), "");
}

#[test]
fn test_multi_valued_parameter_is_joined() {
    let app = bootstrap(&common::config(""), &common::catalog()).unwrap();
    let request = HttpRequest::new(Method::GET, "/baseController/echo").with_query("value=a&value=b&value=c");
    let mut response = HttpResponse::new();

    app.dispatcher().dispatch(&request, &mut response);
    assert_eq!(response.body_text(), "a, b, c");
}

#[test]
fn test_handler_receives_the_exact_request_and_response() {
    let app = bootstrap(&common::config(""), &common::catalog()).unwrap();
    let request = HttpRequest::new(Method::GET, "/probe/identity");
    let mut response = HttpResponse::new();
    let expected = (
        &request as *const HttpRequest as usize,
        &response as *const HttpResponse as usize,
    );

    app.dispatcher().dispatch(&request, &mut response);

    let probe = app.registry().get("ProbeController").unwrap().downcast::<Probe>().unwrap();
    assert_eq!(probe.seen.lock().unwrap().as_slice(), &[expected]);
}

#[test]
fn test_unknown_path_is_not_found_and_invokes_nothing() {
    let app = bootstrap(&common::config("/app"), &common::catalog()).unwrap();
    let request = HttpRequest::new(Method::GET, "/app/probe/identity/extra").with_context_path("/app");
    let mut response = HttpResponse::new();

    let outcome = app.dispatcher().dispatch(&request, &mut response);

    assert_eq!(outcome, DispatchOutcome::NotFound);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.character_encoding(), Some("UTF-8"));
    assert_eq!(response.body_text(), NOT_FOUND_BODY);

    let probe = app.registry().get("ProbeController").unwrap().downcast::<Probe>().unwrap();
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_path_outside_context_is_not_found() {
    let app = bootstrap(&common::config("/app"), &common::catalog()).unwrap();

    for path in ["/baseController/firstMethod", "/apple/baseController/firstMethod"] {
        let request = HttpRequest::new(Method::GET, path)
            .with_context_path("/app")
            .with_query("name=ty");
        let mut response = HttpResponse::new();

        let outcome = app.dispatcher().dispatch(&request, &mut response);

        assert_eq!(outcome, DispatchOutcome::NotFound, "path {path}");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body_text(), NOT_FOUND_BODY);
    }
}

#[test]
fn test_handler_faults_are_reported_and_contained() {
    let reporter = Arc::new(CollectingReporter::default());
    let app = bootstrap_with_reporter(&common::config(""), &common::catalog(), reporter.clone()).unwrap();

    let mut response = HttpResponse::new();
    let outcome = app
        .dispatcher()
        .dispatch(&HttpRequest::new(Method::GET, "/faulty/fails"), &mut response);
    assert_eq!(outcome, DispatchOutcome::Faulted);
    assert_eq!(response.body_text(), "partial");

    let mut response = HttpResponse::new();
    let outcome = app
        .dispatcher()
        .dispatch(&HttpRequest::new(Method::GET, "/faulty/panics"), &mut response);
    assert_eq!(outcome, DispatchOutcome::Faulted);
    assert!(!response.is_written());

    let faults = reporter.faults.lock().unwrap();
    assert_eq!(faults.len(), 2);
    assert!(faults[0].contains("backend unavailable"));
    assert!(faults[1].contains("handler exploded"));
}

#[test]
fn test_concurrent_dispatch_keeps_arguments_separate() {
    let app = bootstrap(&common::config(""), &common::catalog()).unwrap();
    let dispatcher = app.dispatcher();

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let dispatcher = &dispatcher;
            scope.spawn(move || {
                for i in 0..50 {
                    let value = format!("w{worker}-{i}");
                    let request = HttpRequest::new(Method::GET, "/baseController/echo")
                        .with_query(&format!("value={value}"));
                    let mut response = HttpResponse::new();
                    dispatcher.dispatch(&request, &mut response);
                    assert_eq!(response.body_text(), value);
                }
            });
        }
    });
}
