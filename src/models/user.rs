use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Role tag checked by [`User::is_admin`]
pub const ADMIN_ROLE: &str = "admin";

/// A user in the system together with its roles and free-form metadata.
///
/// `id` and `created_at` are assigned by [`User::create`] and cannot be
/// changed afterwards. Roles are kept in insertion order without duplicates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    id: Uuid,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    roles: Vec<String>,
    metadata: Map<String, Value>,
}

impl User {
    /// Create a user with a fresh id and the current time as `created_at`.
    ///
    /// Duplicate entries in `roles` keep only their first occurrence.
    pub fn create(
        username: impl Into<String>,
        email: impl Into<String>,
        roles: Option<Vec<String>>,
    ) -> Self {
        let mut user = Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
            roles: Vec::new(),
            metadata: Map::new(),
        };

        for role in roles.unwrap_or_default() {
            user.add_role(role);
        }

        user
    }

    /// Add a role if the user does not have it yet
    pub fn add_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.has_role(&role) {
            self.roles.push(role);
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display/login name, not validated
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Contact address, not validated
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.metadata
    }

    /// Set a metadata entry, returning the previous value for `key` if any
    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.metadata.insert(key.into(), value.into())
    }
}

/// Deserializable description of a user to be created, e.g. from config.
#[derive(Clone, Debug, Deserialize)]
pub struct UserSeed {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: Map<String, Value>,
}

// Goes through toml::Table so TOML datetimes arrive as plain values
fn deserialize_metadata<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = toml::Table::deserialize(deserializer)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        // NaN and infinities have no JSON form
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

impl UserSeed {
    /// Build a new [`User`] from this seed. Every call yields a distinct id.
    pub fn into_user(self) -> User {
        let mut user = User::create(self.username, self.email, self.roles);
        user.metadata.extend(self.metadata);
        user
    }
}
