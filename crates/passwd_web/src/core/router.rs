use crate::core::{Request, Response};
use async_trait::async_trait;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, req: Request) -> Response;
}

/// Maps method + path to a handler. Paths match exactly; there are no
/// parameterized routes in this service.
pub struct Router {
    by_method: HashMap<String, matchit::Router<Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            by_method: HashMap::new(),
        }
    }

    pub fn add<S: Into<String>>(&mut self, method: Method, path: S, handler: Arc<dyn Handler>) {
        let key = method.as_str().to_string();
        let r = self.by_method.entry(key).or_default();
        r.insert(path.into(), handler).expect("valid route");
    }

    pub fn get<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::GET, path, handler)
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<Arc<dyn Handler>> {
        if let Some(r) = self.by_method.get(method.as_str())
            && let Ok(m) = r.at(path)
        {
            return Some(Arc::clone(m.value));
        }

        // Per RFC, HEAD behaves like GET without a body when no explicit
        // HEAD route is present.
        if *method == Method::HEAD
            && let Some(r) = self.by_method.get(Method::GET.as_str())
            && let Ok(m) = r.at(path)
        {
            return Some(Arc::clone(m.value));
        }

        None
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
