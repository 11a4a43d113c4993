use serde::{Deserialize, Deserializer, Serialize};

/// Body of the `pets_at_shelter` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub pets: Vec<RawListing>,
}

/// One pet as returned in bulk by `pets_at_shelter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawListing {
    #[serde(deserialize_with = "string_or_number")]
    pub pet_id: String,
    pub pet_name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub primary_breed: Option<String>,
    #[serde(default)]
    pub secondary_breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "large_results_photo_url")]
    pub photo_url: Option<String>,
}

/// Body of the `pet_details` endpoint. `pet` is missing for unknown ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub pet: Option<RawDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDetail {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub pet_id: Option<String>,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub pet_details_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<DetailImage>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub good_with_cats: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub good_with_dogs: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub good_with_kids: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub housetrained: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub shots_current: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub spayed_neutered: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub special_needs: Option<u8>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub declawed: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DetailImage {
    #[serde(default)]
    pub original_url: Option<String>,
}

/// Outcome of a best-effort detail fetch. Failures never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Detail(RawDetail),
    NoDetail,
}

impl DetailOutcome {
    pub fn as_detail(&self) -> Option<&RawDetail> {
        match self {
            Self::Detail(detail) => Some(detail),
            Self::NoDetail => None,
        }
    }

    pub fn is_detail(&self) -> bool {
        matches!(self, Self::Detail(_))
    }
}

impl From<Option<RawDetail>> for DetailOutcome {
    fn from(value: Option<RawDetail>) -> Self {
        value.map_or(Self::NoDetail, Self::Detail)
    }
}

/// A true-valued detail flag, e.g. `good_with_kids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub display: String,
}

/// Normalized pet, the unit of the written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub size: Option<String>,
    pub url: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[serde(
        rename = "descriptionHtml",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_html: Option<String>,
    #[serde(
        rename = "descriptionMarkdown",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetsArtifact {
    pub pets: Vec<Pet>,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 0/1 flags arrive as numbers, numeric strings or booleans. Anything else is unset.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u8>().ok(),
        serde_json::Value::Bool(b) => Some(u8::from(b)),
        _ => None,
    };
    Ok(flag)
}
