//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use mvc_dispatcher::container::ConstructError;
use mvc_dispatcher::dispatch::{DispatchFault, FaultReporter, HandlerError};
use mvc_dispatcher::http::HttpServer;
use mvc_dispatcher::lifecycle::{bootstrap, Shutdown};
use mvc_dispatcher::{Catalog, ComponentType, FrameworkConfig, ParamDecl};
use tokio::net::TcpListener;

/// Records the addresses of the request/response objects it was handed.
#[derive(Debug, Default)]
pub struct Probe {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(usize, usize)>>,
}

#[derive(Debug, Default)]
pub struct Greeter;

#[derive(Debug, Default)]
pub struct Faulty;

/// Not a controller.
#[derive(Debug, Default)]
pub struct Helper;

/// Collects dispatch faults instead of logging them.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub faults: Mutex<Vec<String>>,
}

impl FaultReporter for CollectingReporter {
    fn report(&self, fault: &DispatchFault) {
        self.faults.lock().unwrap().push(fault.to_string());
    }
}

/// A catalog under `app.controller` exercising every binding kind.
pub fn catalog() -> Catalog {
    Catalog::new()
        .with(
            ComponentType::builder::<Greeter>("app.controller.BaseController")
                .controller("/baseController")
                .default_constructor()
                .route(
                    "firstMethod",
                    "/firstMethod",
                    [ParamDecl::request(), ParamDecl::response(), ParamDecl::named("name")],
                    |_, args| {
                        let text = format!("Hello, {}", args.value(2)?);
                        let resp = args.response(1)?;
                        resp.set_character_encoding("UTF-8");
                        resp.write(&text);
                        Ok(())
                    },
                )
                .route(
                    "echo",
                    "/echo",
                    [ParamDecl::named("value"), ParamDecl::response()],
                    |_, args| {
                        let value = args.value(0)?.to_string();
                        args.response(1)?.write(&value);
                        Ok(())
                    },
                )
                .build(),
        )
        .with(
            ComponentType::builder::<Probe>("app.controller.probe.ProbeController")
                .controller("/probe")
                .default_constructor()
                .route(
                    "identity",
                    "/identity",
                    [ParamDecl::request(), ParamDecl::response()],
                    |this, args| {
                        let req = args.request(0)? as *const _ as usize;
                        let resp = args.response(1)? as *const _ as usize;
                        this.calls.fetch_add(1, Ordering::SeqCst);
                        this.seen.lock().unwrap().push((req, resp));
                        Ok(())
                    },
                )
                .build(),
        )
        .with(
            ComponentType::builder::<Faulty>("app.controller.FaultyController")
                .controller("/faulty")
                .default_constructor()
                .route("fails", "/fails", [ParamDecl::response()], |_, args| {
                    args.response(0)?.write("partial");
                    Err(HandlerError::failed("backend unavailable"))
                })
                .route("panics", "/panics", [], |_, _| panic!("handler exploded"))
                .build(),
        )
        .with(
            ComponentType::builder::<Helper>("app.controller.support.Helper")
                .default_constructor()
                .build(),
        )
        .with(
            ComponentType::builder::<Helper>("app.controller.Broken")
                .controller("/broken")
                .constructor(|| Err(ConstructError::failed("not configured")))
                .build(),
        )
}

pub fn config(context_path: &str) -> FrameworkConfig {
    let mut config = FrameworkConfig {
        scan_package: "app.controller".into(),
        context_path: context_path.into(),
        ..Default::default()
    };
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Start a server on an ephemeral port and return its address.
pub async fn start_server(config: FrameworkConfig) -> (SocketAddr, Shutdown) {
    let app = bootstrap(&config, &catalog()).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(config, app.dispatcher());
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
