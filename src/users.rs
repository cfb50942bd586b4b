use crate::VkApi;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const FIELD_FIRST_NAME: &str = "first_name";
pub const FIELD_LAST_NAME: &str = "last_name";
pub const FIELD_SCREEN_NAME: &str = "screen_name";
pub const FIELD_NICKNAME: &str = "nickname";

/// VK codes of the grammatical cases names can be declined in.
pub const NAME_CASES: [&str; 6] = ["nom", "gen", "dat", "acc", "ins", "abl"];

/// Grammatical case VK renders first and last names in. Nominative is the API default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCase {
    Nominative,
    Genitive,
    Dative,
    Accusative,
    Instrumental,
    Prepositional,
}

impl NameCase {
    pub fn as_str(self) -> &'static str {
        match self {
            NameCase::Nominative => "nom",
            NameCase::Genitive => "gen",
            NameCase::Dative => "dat",
            NameCase::Accusative => "acc",
            NameCase::Instrumental => "ins",
            NameCase::Prepositional => "abl",
        }
    }
}

impl FromStr for NameCase {
    type Err = UsersGetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nom" => Ok(NameCase::Nominative),
            "gen" => Ok(NameCase::Genitive),
            "dat" => Ok(NameCase::Dative),
            "acc" => Ok(NameCase::Accusative),
            "ins" => Ok(NameCase::Instrumental),
            "abl" => Ok(NameCase::Prepositional),
            _ => Err(UsersGetError::InvalidNameCase(s.to_string())),
        }
    }
}

impl fmt::Display for NameCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request parameter echoed back by VK in an error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestParam {
    pub key: String,
    pub value: String,
}

/// Error object returned by VK in place of (or next to) a method result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Error)]
#[error("VK API error {error_code} ({} request params): {error_msg}", .request_params.len())]
#[serde(default)]
pub struct ApiError {
    pub error_code: i32,
    pub error_msg: String,
    pub request_params: Vec<RequestParam>,
}

// VK sends `error` and `response` as independent keys; both may be present.
#[derive(Debug, Deserialize)]
struct Response {
    error: Option<ApiError>,
    response: Option<Vec<UserInfo>>,
}

/// A user profile as returned by `users.get`. Only `id` and the name fields are always present;
/// everything else is filled in when requested through `fields`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub screen_name: String,
    pub nickname: String,
    /// 1 is female, 2 is male, 0 is not specified.
    pub sex: u8,
    pub domain: String,
    #[serde(rename = "bdate")]
    pub birthdate: String,
    pub city: Option<GeoPlace>,
    pub country: Option<GeoPlace>,
    pub photo_50: String,
    pub photo_100: String,
    pub photo_200: String,
    pub photo_max: String,
    pub photo_200_orig: String,
    pub photo_max_orig: String,
    #[serde(deserialize_with = "flag")]
    pub has_mobile: bool,
    #[serde(deserialize_with = "flag")]
    pub online: bool,
    #[serde(deserialize_with = "flag")]
    pub can_post: bool,
    #[serde(deserialize_with = "flag")]
    pub can_see_all_posts: bool,
    #[serde(deserialize_with = "flag")]
    pub can_see_audio: bool,
    #[serde(deserialize_with = "flag")]
    pub can_write_private_message: bool,
    pub site: String,
    pub status: String,
    pub last_seen: Option<PlatformInfo>,
    pub common_count: u32,
    pub university: i64,
    pub university_name: String,
    pub faculty: i64,
    pub faculty_name: String,
    pub graduation: i32,
    pub relation: i32,
    pub universities: Vec<University>,
    pub schools: Vec<School>,
    pub relatives: Vec<Relative>,
}

/// A city or a country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeoPlace {
    pub id: i64,
    pub title: String,
}

/// When the user was last seen online and from which platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformInfo {
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub time: Option<DateTime<Utc>>,
    pub platform: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct University {
    pub id: i64,
    pub country: i64,
    pub city: i64,
    pub name: String,
    pub faculty: i64,
    pub faculty_name: String,
    pub chair: i64,
    pub chair_name: String,
    pub graduation: i32,
    pub education_form: String,
    pub education_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct School {
    pub id: i64,
    pub country: i64,
    pub city: i64,
    pub name: String,
    pub year_from: i32,
    pub year_to: i32,
    pub class: String,
    pub type_str: String,
    pub speciality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Relative {
    /// Negative for relatives that have no VK account.
    pub id: i64,
    /// `parent`, `grandparent`, `sibling`, `child` or `grandchild`.
    #[serde(rename = "type")]
    pub relation_type: String,
    pub name: String,
}

// VK encodes flags as 0/1.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

impl VkApi {
    /// Call the [`users.get`](https://vk.com/dev/users.get) method.
    ///
    /// `user_ids` are user IDs or screen names; VK accepts no more than 1000 of them per call.
    /// `fields` lists the optional profile fields to return (`sex`, `bdate`, `city`, `photo_50`,
    /// `last_seen`, `relatives`, ...). `name_case` is either empty or one of [`NAME_CASES`].
    ///
    /// If VK answers with an error object, [`UsersGetError::Api`] is returned and carries
    /// whatever users were in the same response.
    pub async fn users_get<I>(
        &self,
        user_ids: &[I],
        fields: &[&str],
        name_case: &str,
    ) -> Result<Vec<UserInfo>, UsersGetError>
    where
        I: AsRef<str>,
    {
        if user_ids.is_empty() {
            return Err(UsersGetError::NoIds);
        }
        let name_case = match name_case {
            "" => None,
            code => Some(code.parse::<NameCase>()?),
        };

        let mut endpoint = self.api_url("users.get")?;
        {
            let mut query = endpoint.query_pairs_mut();
            let ids: Vec<&str> = user_ids.iter().map(AsRef::as_ref).collect();
            query.append_pair("user_ids", &ids.join(","));
            if !fields.is_empty() {
                let fields_str = fields.join(",");
                debug!(fields = %fields_str, "VK fields");
                query.append_pair("fields", &fields_str);
            }
            if let Some(name_case) = name_case {
                query.append_pair("name_case", name_case.as_str());
            }
        }
        debug!(url = %endpoint, "calling VK users.get");

        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        let body = response.bytes().await.map_err(UsersGetError::ReadBody)?;
        debug!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "VK response"
        );

        let envelope: Response = serde_json::from_slice(&body)?;
        debug!(?envelope, "Unmarshalled VK response");

        let users = envelope.response.unwrap_or_default();
        match envelope.error {
            Some(error) => {
                debug!(%error, "VK API returned error, passing it upstream");
                Err(UsersGetError::Api { error, users })
            }
            None => Ok(users),
        }
    }

    /// Look up a single user by numeric ID. Any number of returned users other than one is
    /// reported as [`UsersGetError::UnexpectedCount`].
    pub async fn get_user_by_int_id(
        &self,
        user_id: i64,
        name_case: &str,
        fields: &[&str],
    ) -> Result<UserInfo, UsersGetError> {
        let users = self
            .users_get(&[user_id.to_string()], fields, name_case)
            .await?;
        match <[UserInfo; 1]>::try_from(users) {
            Ok([user]) => Ok(user),
            Err(users) => Err(UsersGetError::UnexpectedCount(users.len())),
        }
    }
}

/// All of the errors that can take place while calling `users.get`
#[derive(Debug, Error)]
pub enum UsersGetError {
    #[error("you must pass at least one id or screen_name")]
    NoIds,
    #[error("invalid name case {0:?}, the only available name cases are: nom, gen, dat, acc, ins, abl")]
    InvalidNameCase(String),
    #[error("Unable to build the VK API URL: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("Request to the VK API failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("Failed to read VK response body: {0}")]
    ReadBody(reqwest::Error),
    #[error("Failed to unmarshal VK response: {0}")]
    Decode(#[from] serde_json::Error),
    /// VK returned an error object. `users` holds whatever the same response listed.
    #[error("{error}")]
    Api { error: ApiError, users: Vec<UserInfo> },
    #[error("expected exactly one user in the VK response, got {0}")]
    UnexpectedCount(usize),
}

impl UsersGetError {
    /// The numeric VK error code, if this error came from the API itself.
    pub fn api_error_code(&self) -> Option<i32> {
        match self {
            UsersGetError::Api { error, .. } => Some(error.error_code),
            _ => None,
        }
    }
}
