use http::Extensions;
use reqwest::{Client, Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next, Result};

/// Query parameters that VK expects on every method call: the API version and, when the
/// caller has one, the access token. Parameters already present on a request are kept.
#[derive(Clone)]
pub(crate) struct ApiParams {
    pub(crate) version: String,
    pub(crate) access_token: Option<String>,
}

impl ApiParams {
    pub(crate) fn apply(&self, req: &mut Request) {
        let has_param =
            |req: &Request, name: &str| req.url().query_pairs().any(|(key, _)| key == name);
        let add_version = !has_param(&*req, "v");
        let token = self
            .access_token
            .as_deref()
            .filter(|_| !has_param(&*req, "access_token"));

        let mut pairs = req.url_mut().query_pairs_mut();
        if add_version {
            pairs.append_pair("v", &self.version);
        }
        if let Some(token) = token {
            pairs.append_pair("access_token", token);
        }
    }

    pub(crate) fn build_client(&self, client: Client) -> ClientWithMiddleware {
        let builder = ClientBuilder::new(client).with(self.clone());
        #[cfg(any(
            feature = "tracing-otel-26",
            feature = "tracing-otel-27",
            feature = "tracing-otel-28",
            feature = "tracing-otel-29",
            feature = "tracing-otel-30",
        ))]
        let builder = builder.with(reqwest_tracing::TracingMiddleware::default());
        builder.build()
    }
}

#[async_trait::async_trait]
impl Middleware for ApiParams {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        self.apply(&mut req);
        next.run(req, extensions).await
    }
}
