//! `ResumeDocument`: the structured object decoded from the model's response.
//!
//! Every section is optional and loosely typed on the wire. The lenient decoders
//! below pin that down at the boundary so downstream stages see a fully typed,
//! possibly sparse document. Nothing here infers missing data: absent stays absent.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(default, alias = "contact", alias = "personal_info", deserialize_with = "lenient::object")]
    pub identity: Identity,
    #[serde(default, alias = "professional_summary", deserialize_with = "lenient::opt_string")]
    pub summary: Option<String>,
    #[serde(default, alias = "technical_skills", deserialize_with = "lenient::skills")]
    pub skills: Option<Skills>,
    #[serde(default, alias = "work_experience", deserialize_with = "lenient::seq")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "lenient::certifications")]
    pub certifications: Vec<Certification>,
    #[serde(
        default,
        alias = "additional",
        alias = "additional_sections",
        deserialize_with = "lenient::catalog"
    )]
    pub extras: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, alias = "full_name", deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(default, alias = "phone_number", deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub github: Option<String>,
    #[serde(default, alias = "website", deserialize_with = "lenient::opt_string")]
    pub portfolio: Option<String>,
}

/// Either a flat ordered list or an ordered category → items mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    Flat(Vec<String>),
    Categorized(IndexMap<String, Vec<String>>),
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        match self {
            Skills::Flat(items) => items.is_empty(),
            Skills::Categorized(categories) => categories.values().all(Vec::is_empty),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, alias = "company", alias = "employer", deserialize_with = "lenient::opt_string")]
    pub organization: Option<String>,
    #[serde(default, alias = "role", alias = "position", deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, alias = "duration", alias = "dates", deserialize_with = "lenient::opt_string")]
    pub period: Option<String>,
    #[serde(default, alias = "responsibilities", alias = "bullets", deserialize_with = "lenient::prose_list")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, alias = "degree", deserialize_with = "lenient::opt_string")]
    pub credential: Option<String>,
    #[serde(default, alias = "school", alias = "university", deserialize_with = "lenient::opt_string")]
    pub institution: Option<String>,
    #[serde(default, alias = "duration", alias = "year", deserialize_with = "lenient::opt_string")]
    pub period: Option<String>,
    #[serde(default, alias = "description", deserialize_with = "lenient::opt_string")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, alias = "title", deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, alias = "link", deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, alias = "tech_stack", alias = "technologies_used", deserialize_with = "lenient::string_list")]
    pub technologies: Vec<String>,
    #[serde(default, alias = "achievements", deserialize_with = "lenient::prose_list")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

mod lenient {
    //! Boundary decoders. Each goes through `serde_json::Value` and never fails on
    //! a shape it can reasonably interpret; `null` always means "absent".

    use super::*;

    /// Scalar → trimmed string; empty and non-scalars are absent.
    fn scalar_string(value: &Value) -> Option<String> {
        let s = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!s.is_empty()).then_some(s)
    }

    /// Array of scalars, or a comma/newline separated string.
    fn list_of_strings(value: &Value) -> Vec<String> {
        split_list(value, &[',', '\n'])
    }

    /// Like `list_of_strings`, but a string only splits on newlines so sentences survive.
    fn list_of_sentences(value: &Value) -> Vec<String> {
        split_list(value, &['\n'])
    }

    fn split_list(value: &Value, separators: &[char]) -> Vec<String> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => map.get("name").and_then(scalar_string),
                    other => scalar_string(other),
                })
                .collect(),
            Value::String(s) => s
                .split(separators)
                .map(|part| part.trim().trim_start_matches(['-', '•', '*']).trim())
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
            other => scalar_string(other).into_iter().collect(),
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_string(&Value::deserialize(d)?))
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(list_of_strings(&Value::deserialize(d)?))
    }

    pub fn prose_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(list_of_sentences(&Value::deserialize(d)?))
    }

    /// An object, with `null` (or any non-object) treated as the default.
    pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned + Default,
    {
        match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
            _ => Ok(T::default()),
        }
    }

    /// A list of objects; a single object is a one-element list; non-objects are skipped.
    pub fn seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            value @ Value::Object(_) => vec![value],
            _ => return Ok(Vec::new()),
        };
        items
            .into_iter()
            .filter(Value::is_object)
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect()
    }

    pub fn skills<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Skills>, D::Error> {
        let skills = match Value::deserialize(d)? {
            Value::Object(map) => Skills::Categorized(catalog_from_map(map)),
            Value::Null => return Ok(None),
            other => Skills::Flat(list_of_strings(&other)),
        };
        Ok((!skills.is_empty()).then_some(skills))
    }

    pub fn catalog<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<IndexMap<String, Vec<String>>, D::Error> {
        match Value::deserialize(d)? {
            Value::Object(map) => Ok(catalog_from_map(map)),
            _ => Ok(IndexMap::new()),
        }
    }

    /// Key order follows the payload; empty categories are dropped.
    fn catalog_from_map(map: serde_json::Map<String, Value>) -> IndexMap<String, Vec<String>> {
        map.into_iter()
            .filter_map(|(category, items)| {
                let category = category.trim().to_string();
                let items = list_of_strings(&items);
                (!category.is_empty() && !items.is_empty()).then_some((category, items))
            })
            .collect()
    }

    pub fn certifications<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Certification>, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            Value::Null => return Ok(Vec::new()),
            other => vec![other],
        };
        Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(Certification {
                    name: map.get("name").or_else(|| map.get("title")).and_then(scalar_string)?,
                    url: map.get("url").or_else(|| map.get("link")).and_then(scalar_string),
                }),
                other => scalar_string(other).map(|name| Certification { name, url: None }),
            })
            .collect())
    }
}
