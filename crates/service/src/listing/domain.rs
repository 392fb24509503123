use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::errors::{FieldError, ServiceError};
use crate::validation::Validator;

/// Raw listing fields as they arrive from a JSON body or multipart form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub animal_type: Option<String>,
    pub breed: Option<String>,
    pub location: Option<String>,
    pub date_lost: Option<String>,
    pub contact_phone: Option<String>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateListingInput {
    pub title: String,
    pub description: String,
    pub animal_type: String,
    pub breed: Option<String>,
    pub location: String,
    pub date_lost: NaiveDate,
    pub contact_phone: String,
    pub photos: Vec<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateListingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub animal_type: Option<String>,
    /// `Some(None)` clears the breed.
    pub breed: Option<Option<String>>,
    pub location: Option<String>,
    pub date_lost: Option<NaiveDate>,
    pub contact_phone: Option<String>,
    pub photos: Option<Vec<String>>,
}

/// Search criteria for `getFilteredListings`.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub animal_type: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

const TITLE_MSG: &str = "Title must be between 1 and 200 characters";
const DESCRIPTION_MSG: &str = "Description must be between 1 and 1000 characters";
const ANIMAL_TYPE_MSG: &str = "Animal type is required";
const LOCATION_MSG: &str = "Location is required";
const DATE_MSG: &str = "Invalid date format";
const PHONE_MSG: &str = "Contact phone must be at least 10 characters";

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn check_title(v: &mut Validator, s: &str) { v.length("title", s, 1, 200, TITLE_MSG); }
fn check_description(v: &mut Validator, s: &str) { v.length("description", s, 1, 1000, DESCRIPTION_MSG); }
fn check_phone(v: &mut Validator, s: &str) { v.check(s.chars().count() >= 10, "contactPhone", PHONE_MSG); }

fn check_date(v: &mut Validator, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_date(raw);
    v.check(parsed.is_some(), "dateLost", DATE_MSG);
    parsed
}

impl TryFrom<ListingPayload> for CreateListingInput {
    type Error = ServiceError;

    fn try_from(p: ListingPayload) -> Result<Self, Self::Error> {
        let mut v = Validator::new();
        let title = trimmed(p.title).unwrap_or_default();
        let description = trimmed(p.description).unwrap_or_default();
        let animal_type = trimmed(p.animal_type).unwrap_or_default();
        let location = trimmed(p.location).unwrap_or_default();
        let contact_phone = trimmed(p.contact_phone).unwrap_or_default();

        check_title(&mut v, &title);
        check_description(&mut v, &description);
        v.non_empty("animalType", &animal_type, ANIMAL_TYPE_MSG);
        v.non_empty("location", &location, LOCATION_MSG);
        let date_lost = match p.date_lost.as_deref() {
            Some(raw) => check_date(&mut v, raw),
            None => {
                v.push(FieldError::new("dateLost", DATE_MSG));
                None
            }
        };
        check_phone(&mut v, &contact_phone);
        v.finish()?;

        let date_lost = date_lost.ok_or_else(|| ServiceError::invalid("dateLost", DATE_MSG))?;
        Ok(Self {
            title,
            description,
            animal_type,
            breed: trimmed(p.breed).filter(|b| !b.is_empty()),
            location,
            date_lost,
            contact_phone,
            photos: p.photos.unwrap_or_default(),
        })
    }
}

impl TryFrom<ListingPayload> for UpdateListingInput {
    type Error = ServiceError;

    fn try_from(p: ListingPayload) -> Result<Self, Self::Error> {
        let mut v = Validator::new();
        let title = trimmed(p.title);
        let description = trimmed(p.description);
        let animal_type = trimmed(p.animal_type);
        let location = trimmed(p.location);
        let contact_phone = trimmed(p.contact_phone);

        if let Some(t) = &title { check_title(&mut v, t); }
        if let Some(d) = &description { check_description(&mut v, d); }
        if let Some(a) = &animal_type { v.non_empty("animalType", a, ANIMAL_TYPE_MSG); }
        if let Some(l) = &location { v.non_empty("location", l, LOCATION_MSG); }
        let date_lost = p.date_lost.as_deref().and_then(|raw| check_date(&mut v, raw));
        if let Some(c) = &contact_phone { check_phone(&mut v, c); }
        v.finish()?;

        Ok(Self {
            title,
            description,
            animal_type,
            breed: trimmed(p.breed).map(|b| Some(b).filter(|b| !b.is_empty())),
            location,
            date_lost,
            contact_phone,
            photos: p.photos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> ListingPayload {
        ListingPayload {
            title: Some("Lost cat".into()),
            description: Some("Grey tabby, answers to Tom".into()),
            animal_type: Some("cat".into()),
            breed: Some("".into()),
            location: Some("Springfield".into()),
            date_lost: Some("2024-01-01".into()),
            contact_phone: Some("5551234567".into()),
            photos: None,
        }
    }

    fn fields(err: ServiceError) -> Vec<String> {
        match err {
            ServiceError::Validation(f) => f.into_iter().map(|f| f.field).collect(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_payload_converts() {
        let input = CreateListingInput::try_from(valid_payload()).unwrap();
        assert_eq!(input.date_lost, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(input.breed, None);
        assert!(input.photos.is_empty());
    }

    #[test]
    fn create_reports_each_bad_field() {
        let payload = ListingPayload {
            title: Some("x".repeat(201)),
            description: None,
            date_lost: Some("yesterday".into()),
            contact_phone: Some("123".into()),
            ..valid_payload()
        };
        assert_eq!(
            fields(CreateListingInput::try_from(payload).unwrap_err()),
            vec!["title", "description", "dateLost", "contactPhone"]
        );
    }

    #[test]
    fn missing_date_is_rejected() {
        let payload = ListingPayload { date_lost: None, ..valid_payload() };
        assert_eq!(fields(CreateListingInput::try_from(payload).unwrap_err()), vec!["dateLost"]);
    }

    #[test]
    fn update_only_checks_present_fields() {
        let patch = UpdateListingInput::try_from(ListingPayload { title: Some("Found dog".into()), ..Default::default() }).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Found dog"));
        assert_eq!(patch.description, None);

        let err = UpdateListingInput::try_from(ListingPayload { contact_phone: Some("1".into()), ..Default::default() }).unwrap_err();
        assert_eq!(fields(err), vec!["contactPhone"]);
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(parse_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T10:00:00Z"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_date("05/03/2024"), None);
    }
}
