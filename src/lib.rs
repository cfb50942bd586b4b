#![forbid(unsafe_code)]
//! # vk-api-client
//!
//! This crate wraps the parts of the VK HTTP API that are needed to look up user profiles
//! (`users.get`) and to keep OAuth access tokens for the VK applications a service acts on
//! behalf of. Requests are made with Reqwest. Usage example:
//!
//! ```no_run
//! use vk_api_client::VkApi;
//! # async fn look_up_users() {
//! let vk_api = VkApi::from_default_file().unwrap();
//! match vk_api.users_get(&["1", "durov"], &["sex", "bdate"], "gen").await {
//!     Err(err) => println!("Got error {}", err),
//!     Ok(users) => println!("Got {} users", users.len()),
//! }
//! # }
//! ```
//!
//! The above code will read your configuration from a file in `~/.vk_config.yml` which format is:
//! ```yaml
//! common: &common
//!   api_baseurl: https://api.vk.com/method/
//!   api_version: "5.131"
//!   access_token: <SERVICE OR USER ACCESS TOKEN>
//!   callback_url: https://<YOUR OAUTH CALLBACK>
//!   app_secrets:
//!     <APP ID>: <APP SECRET>
//! ```
//!
//! Access tokens for registered applications are kept in a [`TokenRegistry`], which the
//! calling code constructs and owns.

use ::reqwest_middleware::ClientWithMiddleware;
use crate::reqwest_middleware::ApiParams;
use reqwest::Url;

/// This is the primary struct of this crate. It holds the base URL of the VK API and the
/// HTTP client used to call it. Every method call on it is an independent request, so it can
/// be cloned and shared freely.
#[derive(Clone)]
pub struct VkApi {
    api_uri_base: Url,
    api_params: ApiParams,
    client: ClientWithMiddleware,
}

/// Helpers to parse configuration files or supply structs and construct instances of the main struct
pub mod config;
mod reqwest_middleware;
/// Cache of OAuth access tokens per VK application
pub mod token_registry;
/// Implementation of the `users.get` method and the user profile records it returns
pub mod users;

pub use config::{ConfigFileSection, ConfigReadError};
pub use token_registry::{AccessToken, TokenRegistry};
pub use users::{ApiError, NameCase, RequestParam, UserInfo, UsersGetError};

impl VkApi {
    /// Replace the HTTP client used for API calls. The parameter middleware (and request
    /// tracing, if enabled) is layered on top of the provided client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = self.api_params.build_client(client);
        self
    }

    /// The base URL that method names are resolved against.
    pub fn api_uri_base(&self) -> &Url {
        &self.api_uri_base
    }

    pub(crate) fn api_url(&self, method: &str) -> Result<Url, url::ParseError> {
        self.api_uri_base.join(method)
    }
}
