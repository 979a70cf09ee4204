use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Path segment the backend uses for the unnamed core API group.
pub const CORE_GROUP_SEGMENT: &str = "core";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResourceKind {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespaced: bool,
}

impl ResourceKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        name: impl Into<String>,
        namespaced: bool,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            name: name.into(),
            kind: String::new(),
            namespaced,
        }
    }

    pub fn same_identity(&self, other: &Self) -> bool {
        self.group == other.group && self.version == other.version && self.name == other.name
    }

    /// Group as it appears in request paths; the empty core group becomes `core`.
    pub fn group_segment(&self) -> &str {
        if self.group.is_empty() {
            CORE_GROUP_SEGMENT
        } else {
            &self.group
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn matches_token(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }

        let parts = token.split('/').collect::<Vec<_>>();
        match parts.as_slice() {
            [group, version, name] => {
                let group = if group.eq_ignore_ascii_case(CORE_GROUP_SEGMENT) {
                    ""
                } else {
                    *group
                };
                self.group.eq_ignore_ascii_case(group)
                    && self.version == *version
                    && self.name.eq_ignore_ascii_case(name)
            }
            [version, name] => {
                self.group.is_empty()
                    && self.version == *version
                    && self.name.eq_ignore_ascii_case(name)
            }
            [name] => {
                self.name.eq_ignore_ascii_case(name)
                    || (!self.kind.is_empty() && self.kind.eq_ignore_ascii_case(name))
            }
            _ => false,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.group_segment(), self.version, self.name)
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum NamespaceScope {
    #[default]
    All,
    Named(String),
}

impl NamespaceScope {
    /// Parses operator input; blank input and `all` both mean unfiltered.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Named(namespace) => namespace.clone(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(namespace) => Some(namespace),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// One live instance of a resource kind, kept as the raw document the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceObject(Value);

impl ResourceObject {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.pointer("/metadata/name").and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .filter(|namespace| !namespace.is_empty())
    }

    pub fn creation_timestamp(&self) -> Option<Time> {
        let raw = self.0.pointer("/metadata/creationTimestamp")?;
        serde_json::from_value::<Time>(raw.clone()).ok()
    }

    pub fn age(&self) -> String {
        human_age(self.creation_timestamp().as_ref())
    }

    pub fn matches_filter(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_ascii_lowercase();

        if self
            .name()
            .is_some_and(|name| name.to_ascii_lowercase().contains(&query_lower))
        {
            return true;
        }

        self.namespace()
            .is_some_and(|namespace| namespace.to_ascii_lowercase().contains(&query_lower))
    }

    pub fn summary(&self) -> ObjectSummary {
        ObjectSummary {
            name: self.name().unwrap_or("-").to_string(),
            namespace: self.namespace().map(str::to_string),
            age: self.age(),
        }
    }

    pub fn yaml_detail(&self) -> String {
        yaml_detail(&self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ObjectSummary {
    pub name: String,
    pub namespace: Option<String>,
    pub age: String,
}

impl ObjectSummary {
    pub fn columns(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.namespace.clone().unwrap_or_else(|| "-".to_string()),
            self.age.clone(),
        ]
    }
}

fn human_age(timestamp: Option<&Time>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };

    let elapsed_seconds = (Utc::now().timestamp() - timestamp.0.as_second()).max(0);
    format_elapsed_seconds(elapsed_seconds)
}

fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}

fn yaml_detail<T>(value: &T) -> String
where
    T: Serialize,
{
    serde_yaml::to_string(value).unwrap_or_else(|error| format!("failed to format detail: {error}"))
}
