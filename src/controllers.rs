//! Demo controllers served by the binary.

use std::sync::atomic::{AtomicU64, Ordering};

use mvc_dispatcher::container::ConstructError;
use mvc_dispatcher::http::response::UTF_8;
use mvc_dispatcher::{Catalog, ComponentType, ParamDecl};

/// Root namespace of the demo components.
pub const NAMESPACE: &str = "app.controller";

#[derive(Debug, Default)]
pub struct BaseController;

/// Counts visits; shows that one instance serves every request.
#[derive(Debug, Default)]
pub struct CounterController {
    hits: AtomicU64,
}

/// Not a controller: scanned but never registered.
#[derive(Debug, Default)]
pub struct GreetingFormatter;

impl GreetingFormatter {
    pub fn format(name: &str) -> String {
        format!("Whatever, I'm the handsomest, I'm your {name}")
    }
}

pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .register(
            ComponentType::builder::<BaseController>("app.controller.BaseController")
                .controller("/baseController")
                .default_constructor()
                .route(
                    "firstMethod",
                    "/firstMethod",
                    [ParamDecl::request(), ParamDecl::response(), ParamDecl::named("name")],
                    |_, args| {
                        let text = GreetingFormatter::format(args.value(2)?);
                        let resp = args.response(1)?;
                        resp.set_character_encoding(UTF_8);
                        resp.write(&text);
                        Ok(())
                    },
                )
                .build(),
        )
        .register(
            ComponentType::builder::<CounterController>("app.controller.stats.CounterController")
                .controller("/stats")
                .constructor(|| Ok(CounterController::default()))
                .route("hit", "/hit", [ParamDecl::response()], |this, args| {
                    let n = this.hits.fetch_add(1, Ordering::Relaxed) + 1;
                    let resp = args.response(0)?;
                    resp.set_character_encoding(UTF_8);
                    resp.write(&n.to_string());
                    Ok(())
                })
                .build(),
        )
        .register(
            ComponentType::builder::<GreetingFormatter>("app.controller.support.GreetingFormatter")
                .default_constructor()
                .build(),
        )
        .register(
            ComponentType::builder::<BaseController>("app.controller.legacy.Unfinished")
                .controller("/unfinished")
                .constructor(|| Err(ConstructError::failed("not ready")))
                .build(),
        );
    catalog
}
