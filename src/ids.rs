use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of a node in the route tree.
///
/// Ids are handed out sequentially by the tree and never reused. The
/// implicit root (the `/` route) is always [`NodeId::ROOT`].
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    #[must_use]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Strongly typed request identifier backed by ULID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse an upstream `x-request-id` if it parses, otherwise mint a new id.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = ulid::Ulid::from_string(s)?;
        Ok(RequestId(id))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RequestId>()
            .map_err(|_| serde::de::Error::custom("invalid request id"))
    }
}

/// Name of the implicit outermost group. Middleware registered while no
/// group is open lands here and applies to every route.
pub const GLOBAL_GROUP: &str = "global";

const GENERATED_GROUP_PREFIX: &str = "router_group";

/// Build a collision-free group name.
///
/// Without a caller-supplied name the result is `router_group_<suffix>`,
/// otherwise `<name>_<suffix>`. The suffix is a lowercase ULID so sibling
/// groups that share a user-given name still get distinct middleware keys.
#[must_use]
pub fn unique_group_name(requested: Option<&str>) -> String {
    let suffix = ulid::Ulid::new().to_string().to_ascii_lowercase();
    match requested {
        Some(name) if !name.is_empty() => format!("{name}_{suffix}"),
        _ => format!("{GENERATED_GROUP_PREFIX}_{suffix}"),
    }
}
