use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::models::domain::{
    Gender, Location, MaritalStatus, PartnerPreference, Photo, Preference, PreferenceRange,
    Profile, ProfileId,
};

/// Values that stand for "no constraint" in a preference field
const NO_CONSTRAINT_VALUES: &[&str] = &["any", "doesn't matter", "does not matter", "no preference"];

const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;

/// Profile as stored in the document store
///
/// Every field is optional on the wire; `Profile::try_from` decides what is
/// required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(alias = "_id", alias = "$id", alias = "userId", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub basic_info: BasicInfoDocument,
    #[serde(default)]
    pub professional_info: ProfessionalInfoDocument,
    #[serde(default)]
    pub partner_preferences: Option<PartnerPreferenceDocument>,
    #[serde(default)]
    pub photos: Vec<PhotoDocument>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub location: LocationDocument,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfoDocument {
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub height: Option<HeightDocument>,
    pub marital_status: Option<String>,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub sub_caste: Option<String>,
    pub mother_tongue: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeightDocument {
    pub feet: Option<u16>,
    pub inches: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalInfoDocument {
    pub education: Option<String>,
    pub college: Option<String>,
    pub occupation: Option<String>,
    pub annual_income: Option<String>,
    pub working_with: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPreferenceDocument {
    pub age_range: Option<RangeDocument>,
    pub height_range: Option<RangeDocument>,
    #[serde(default)]
    pub marital_status: Vec<String>,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub education: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeDocument {
    pub min: Option<u16>,
    pub max: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationDocument {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Trimmed text, with empty strings treated as unset
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn preference(value: Option<String>) -> Preference {
    match clean(value) {
        Some(v) if NO_CONSTRAINT_VALUES.iter().any(|nc| v.eq_ignore_ascii_case(nc)) => {
            Preference::Any
        }
        Some(v) => Preference::Exactly(v),
        None => Preference::Any,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn height_cm(height: Option<HeightDocument>) -> Result<Option<u16>, String> {
    let Some(height) = height else {
        return Ok(None);
    };
    match (height.feet, height.inches) {
        (None, None) => Ok(None),
        (_, Some(inches)) if inches >= 12 => Err(format!("height inches out of range: {}", inches)),
        (feet, inches) => {
            let cm = feet.unwrap_or(0) as f64 * CM_PER_FOOT + inches.unwrap_or(0) as f64 * CM_PER_INCH;
            if cm <= 0.0 {
                return Err("height must be positive".to_string());
            }
            Ok(Some(cm.round() as u16))
        }
    }
}

fn range(name: &str, range: Option<RangeDocument>) -> Result<Option<PreferenceRange>, String> {
    let Some(range) = range else {
        return Ok(None);
    };
    match (range.min, range.max) {
        (None, None) => Ok(None),
        (Some(min), Some(max)) => {
            if min == 0 {
                return Err(format!("{} range bounds must be positive", name));
            }
            if min > max {
                return Err(format!("{} range min {} exceeds max {}", name, min, max));
            }
            Ok(Some(PreferenceRange { min, max }))
        }
        _ => Err(format!("{} range requires both min and max", name)),
    }
}

fn partner_preference(doc: PartnerPreferenceDocument) -> Result<Option<PartnerPreference>, String> {
    let marital_statuses = doc
        .marital_status
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            MaritalStatus::parse(s).ok_or_else(|| format!("unknown preferred marital status: {}", s))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let parsed = PartnerPreference {
        age_range: range("age", doc.age_range)?,
        height_range: range("height", doc.height_range)?,
        marital_statuses,
        religion: preference(doc.religion),
        caste: preference(doc.caste),
        education: preference(doc.education),
        occupation: preference(doc.occupation),
    };

    // A block with every field unset carries no preference at all
    Ok((!parsed.is_empty()).then_some(parsed))
}

impl TryFrom<ProfileDocument> for Profile {
    type Error = MatchError;

    fn try_from(doc: ProfileDocument) -> Result<Self, Self::Error> {
        let id = doc.id.trim().to_string();
        if id.is_empty() {
            return Err(MatchError::invalid_profile("<unknown>", "missing id"));
        }
        let invalid = |reason: String| MatchError::invalid_profile(id.clone(), reason);

        let basic = doc.basic_info;

        let gender = match clean(basic.gender) {
            Some(g) => Gender::parse(&g).ok_or_else(|| invalid(format!("unknown gender: {}", g)))?,
            None => return Err(invalid("missing gender".to_string())),
        };

        let date_of_birth = match clean(basic.date_of_birth) {
            Some(d) => parse_date(&d).ok_or_else(|| invalid(format!("unparseable date of birth: {}", d)))?,
            None => return Err(invalid("missing date of birth".to_string())),
        };

        let marital_status = match clean(basic.marital_status) {
            Some(m) => Some(
                MaritalStatus::parse(&m).ok_or_else(|| invalid(format!("unknown marital status: {}", m)))?,
            ),
            None => None,
        };

        let height_cm = height_cm(basic.height).map_err(&invalid)?;

        let partner_preference = match doc.partner_preferences {
            Some(p) => partner_preference(p).map_err(&invalid)?,
            None => None,
        };

        let photos = doc
            .photos
            .into_iter()
            .filter(|p| !p.url.trim().is_empty())
            .map(|p| Photo {
                url: p.url,
                is_primary: p.is_primary,
            })
            .collect();

        let professional = doc.professional_info;

        Ok(Profile {
            id: ProfileId::new(id),
            name: clean(doc.name),
            gender,
            date_of_birth,
            height_cm,
            marital_status,
            religion: clean(basic.religion),
            caste: clean(basic.caste),
            sub_caste: clean(basic.sub_caste),
            mother_tongue: clean(basic.mother_tongue).map(|t| t.to_lowercase()),
            education: clean(professional.education),
            occupation: clean(professional.occupation),
            annual_income: clean(professional.annual_income),
            location: Location {
                city: clean(doc.location.city),
                state: clean(doc.location.state),
                country: clean(doc.location.country),
            },
            about: clean(doc.about),
            photos,
            is_verified: doc.is_verified,
            is_premium: doc.is_premium,
            partner_preference,
        })
    }
}
