//! The bootcamp document and its schema.
//!
//! Payloads arrive as untyped JSON objects. [`BootcampFields::from_document`]
//! is the schema: it casts each known field to its type, checks its
//! constraints, and collects every failure instead of stopping at the first.
//! Keys the schema does not know are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::store::{Document, FieldError};

pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const PHONE_MAX_CHARS: usize = 20;

/// A stored bootcamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub careers: Vec<Career>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    /// A new bootcamp with a fresh id and creation time.
    pub fn new(fields: BootcampFields) -> Self {
        Self::with_id(Uuid::new_v4(), Utc::now(), fields)
    }

    pub fn with_id(id: Uuid, created_at: DateTime<Utc>, fields: BootcampFields) -> Self {
        let BootcampFields {
            name, description, website, phone, email, address,
            careers, housing, job_assistance, job_guarantee, accept_gi,
        } = fields;

        Self {
            id,
            slug: slugify(&name),
            name,
            description,
            website,
            phone,
            email,
            address,
            careers,
            housing,
            job_assistance,
            job_guarantee,
            accept_gi,
            created_at,
        }
    }

    /// The writable fields as a JSON object, the starting point of an update.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), Value::from(self.name.clone()));
        insert_opt(&mut doc, "description", &self.description);
        insert_opt(&mut doc, "website", &self.website);
        insert_opt(&mut doc, "phone", &self.phone);
        insert_opt(&mut doc, "email", &self.email);
        insert_opt(&mut doc, "address", &self.address);
        doc.insert(
            "careers".into(),
            Value::Array(self.careers.iter().map(|c| Value::from(c.as_str())).collect()),
        );
        doc.insert("housing".into(), Value::Bool(self.housing));
        doc.insert("jobAssistance".into(), Value::Bool(self.job_assistance));
        doc.insert("jobGuarantee".into(), Value::Bool(self.job_guarantee));
        doc.insert("acceptGi".into(), Value::Bool(self.accept_gi));
        doc
    }
}

fn insert_opt(doc: &mut Document, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        doc.insert(key.to_owned(), Value::from(v.clone()));
    }
}

/// Career tracks a bootcamp can offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub const ALL: [Self; 6] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::UiUx,
        Self::DataScience,
        Self::Business,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebDevelopment    => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::UiUx              => "UI/UX",
            Self::DataScience       => "Data Science",
            Self::Business          => "Business",
            Self::Other             => "Other",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// How much of the schema to enforce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checks {
    /// Type casts plus every constraint (required, length, format, enum).
    Full,
    /// Type casts only.
    CastOnly,
}

/// The client-writable part of a [`Bootcamp`], validated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BootcampFields {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Vec<Career>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

impl BootcampFields {
    /// Applies the schema to `doc`.
    ///
    /// Errors come back in schema order, one per failing field.
    pub fn from_document(doc: &Document, checks: Checks) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let full = checks == Checks::Full;

        let name = string(doc, "name", &mut errors).map(|s| s.trim().to_owned());
        let description = string(doc, "description", &mut errors);
        let website = string(doc, "website", &mut errors);
        let phone = string(doc, "phone", &mut errors);
        let email = string(doc, "email", &mut errors).map(|s| s.trim().to_owned());
        let address = string(doc, "address", &mut errors);
        let careers = careers(doc, full, &mut errors);
        let housing = boolean(doc, "housing", &mut errors);
        let job_assistance = boolean(doc, "jobAssistance", &mut errors);
        let job_guarantee = boolean(doc, "jobGuarantee", &mut errors);
        let accept_gi = boolean(doc, "acceptGi", &mut errors);

        if full {
            let name_cast_failed = errors.iter().any(|e| e.path() == "name");
            match name.as_deref() {
                None if name_cast_failed => {}
                None | Some("") => errors.push(FieldError::new("name", "Please add a name")),
                Some(n) if n.chars().count() > NAME_MAX_CHARS => errors.push(FieldError::new(
                    "name",
                    format!("Name can not be more than {NAME_MAX_CHARS} characters"),
                )),
                Some(_) => {}
            }
            if description.as_ref().is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
                errors.push(FieldError::new(
                    "description",
                    format!("Description can not be more than {DESCRIPTION_MAX_CHARS} characters"),
                ));
            }
            if website.as_deref().is_some_and(|w| !is_http_url(w)) {
                errors.push(FieldError::new("website", "Please use a valid URL with HTTP or HTTPS"));
            }
            if phone.as_ref().is_some_and(|p| p.chars().count() > PHONE_MAX_CHARS) {
                errors.push(FieldError::new(
                    "phone",
                    format!("Phone number can not be longer than {PHONE_MAX_CHARS} characters"),
                ));
            }
            if email.as_deref().is_some_and(|e| !is_email(e)) {
                errors.push(FieldError::new("email", "Please add a valid email"));
            }
            // Keep schema order: careers errors were pushed during the cast.
            errors.sort_by_key(|e| schema_position(e.path()));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name: name.unwrap_or_default(),
            description,
            website,
            phone,
            email,
            address,
            careers,
            housing,
            job_assistance,
            job_guarantee,
            accept_gi,
        })
    }
}

const SCHEMA_ORDER: [&str; 11] = [
    "name", "description", "website", "phone", "email", "address",
    "careers", "housing", "jobAssistance", "jobGuarantee", "acceptGi",
];

fn schema_position(path: &str) -> usize {
    SCHEMA_ORDER.iter().position(|p| *p == path).unwrap_or(SCHEMA_ORDER.len())
}

/// `null` and a missing key both read as absent.
fn string(doc: &Document, key: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match doc.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(key, format!("{key} must be a string")));
            None
        }
    }
}

fn boolean(doc: &Document, key: &str, errors: &mut Vec<FieldError>) -> bool {
    match doc.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.push(FieldError::new(key, format!("{key} must be a boolean")));
            false
        }
    }
}

/// Unknown career names are a constraint failure, so they are only reported
/// under [`Checks::Full`]; a cast-only pass drops them.
fn careers(doc: &Document, full: bool, errors: &mut Vec<FieldError>) -> Vec<Career> {
    let items = match doc.get("careers") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(s)) => vec![Value::String(s.clone())],
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            errors.push(FieldError::new("careers", "careers must be a list of strings"));
            return Vec::new();
        }
    };

    let mut careers = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str().map(|s| (s, Career::parse(s))) {
            Some((_, Some(career))) => {
                if !careers.contains(&career) {
                    careers.push(career);
                }
            }
            Some((raw, None)) if full => {
                errors.push(FieldError::new("careers", format!("`{raw}` is not a valid career")));
            }
            Some((_, None)) => {}
            None => errors.push(FieldError::new("careers", "careers must be a list of strings")),
        }
    }
    careers
}

/// Lowercase, with every run of non-alphanumerics collapsed to one `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// An absolute `http`/`https` URL whose host has at least two non-empty labels.
fn is_http_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https")
            && u.host_str().is_some_and(|h| h.contains('.') && h.split('.').all(|l| !l.is_empty()))
    })
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
