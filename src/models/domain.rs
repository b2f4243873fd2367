use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, immutable profile identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProfileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Unmarried,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "unmarried" => Some(MaritalStatus::Unmarried),
            "divorced" => Some(MaritalStatus::Divorced),
            "widowed" => Some(MaritalStatus::Widowed),
            _ => None,
        }
    }
}

/// Case-insensitive comparison used by every free-text dimension
#[inline]
pub fn text_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Inclusive integer range from a partner preference (years or centimeters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRange {
    pub min: u16,
    pub max: u16,
}

impl PreferenceRange {
    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }
}

/// A categorical partner preference
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Preference {
    #[default]
    Any,
    Exactly(String),
}

impl Preference {
    pub fn is_constrained(&self) -> bool {
        matches!(self, Preference::Exactly(_))
    }

    /// Exact case-insensitive match; `Any` accepts everything, including unknown values
    pub fn accepts(&self, value: Option<&str>) -> bool {
        match self {
            Preference::Any => true,
            Preference::Exactly(wanted) => value.is_some_and(|v| text_eq(wanted, v)),
        }
    }
}

/// What a profile owner is looking for in a partner
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartnerPreference {
    pub age_range: Option<PreferenceRange>,
    pub height_range: Option<PreferenceRange>,
    /// Empty means no constraint
    pub marital_statuses: Vec<MaritalStatus>,
    pub religion: Preference,
    pub caste: Preference,
    pub education: Preference,
    pub occupation: Preference,
}

impl PartnerPreference {
    pub const fn unconstrained() -> Self {
        Self {
            age_range: None,
            height_range: None,
            marital_statuses: Vec::new(),
            religion: Preference::Any,
            caste: Preference::Any,
            education: Preference::Any,
            occupation: Preference::Any,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.age_range.is_none()
            && self.height_range.is_none()
            && self.marital_statuses.is_empty()
            && !self.religion.is_constrained()
            && !self.caste.is_constrained()
            && !self.education.is_constrained()
            && !self.occupation.is_constrained()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub is_primary: bool,
}

/// Validated profile as seen by the matching engine
///
/// Built only through `Profile::try_from(ProfileDocument)`, which rejects a
/// profile without gender or date of birth and any malformed range. Fields
/// are private so the identity cannot change once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub(crate) id: ProfileId,
    pub(crate) name: Option<String>,
    pub(crate) gender: Gender,
    pub(crate) date_of_birth: NaiveDate,
    pub(crate) height_cm: Option<u16>,
    pub(crate) marital_status: Option<MaritalStatus>,
    pub(crate) religion: Option<String>,
    pub(crate) caste: Option<String>,
    pub(crate) sub_caste: Option<String>,
    pub(crate) mother_tongue: Option<String>,
    pub(crate) education: Option<String>,
    pub(crate) occupation: Option<String>,
    pub(crate) annual_income: Option<String>,
    pub(crate) location: Location,
    pub(crate) about: Option<String>,
    pub(crate) photos: Vec<Photo>,
    pub(crate) is_verified: bool,
    pub(crate) is_premium: bool,
    pub(crate) partner_preference: Option<PartnerPreference>,
}

impl Profile {
    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    /// Completed years of age on `as_of`
    pub fn age(&self, as_of: NaiveDate) -> u16 {
        let dob = self.date_of_birth;
        let mut years = as_of.year() - dob.year();
        if (as_of.month(), as_of.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        years.clamp(0, u16::MAX as i32) as u16
    }

    pub fn height_cm(&self) -> Option<u16> {
        self.height_cm
    }

    pub fn marital_status(&self) -> Option<MaritalStatus> {
        self.marital_status
    }

    pub fn religion(&self) -> Option<&str> {
        self.religion.as_deref()
    }

    pub fn caste(&self) -> Option<&str> {
        self.caste.as_deref()
    }

    pub fn sub_caste(&self) -> Option<&str> {
        self.sub_caste.as_deref()
    }

    pub fn mother_tongue(&self) -> Option<&str> {
        self.mother_tongue.as_deref()
    }

    pub fn education(&self) -> Option<&str> {
        self.education.as_deref()
    }

    pub fn occupation(&self) -> Option<&str> {
        self.occupation.as_deref()
    }

    pub fn annual_income(&self) -> Option<&str> {
        self.annual_income.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// The photo flagged primary, else the first one
    pub fn primary_photo(&self) -> Option<&Photo> {
        self.photos
            .iter()
            .find(|p| p.is_primary)
            .or_else(|| self.photos.first())
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn partner_preference(&self) -> Option<&PartnerPreference> {
        self.partner_preference.as_ref()
    }
}

/// Server-side pre-filter passed to the profile store
///
/// Advisory only: the engine re-applies the full eligibility check to
/// every candidate the store returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHint {
    pub exclude_id: ProfileId,
    pub gender: Option<Gender>,
    pub verified_only: bool,
    pub limit: usize,
}

impl CandidateHint {
    pub fn for_seeker(seeker: &Profile, limit: usize) -> Self {
        Self {
            exclude_id: seeker.id().clone(),
            gender: Some(seeker.gender().opposite()),
            verified_only: true,
            limit,
        }
    }
}

/// One independently normalized scoring factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Age,
    Height,
    Religion,
    Caste,
    Education,
    Occupation,
    Location,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Age,
        Dimension::Height,
        Dimension::Religion,
        Dimension::Caste,
        Dimension::Education,
        Dimension::Occupation,
        Dimension::Location,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Age => "age",
            Dimension::Height => "height",
            Dimension::Religion => "religion",
            Dimension::Caste => "caste",
            Dimension::Education => "education",
            Dimension::Occupation => "occupation",
            Dimension::Location => "location",
        }
    }

    /// Categorical dimensions score exactly 0 or 1
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Dimension::Religion | Dimension::Caste | Dimension::Education | Dimension::Occupation
        )
    }
}

/// Fixed per-dimension weights
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub age: f64,
    pub height: f64,
    pub religion: f64,
    pub caste: f64,
    pub education: f64,
    pub occupation: f64,
    pub location: f64,
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Age => self.age,
            Dimension::Height => self.height,
            Dimension::Religion => self.religion,
            Dimension::Caste => self.caste,
            Dimension::Education => self.education,
            Dimension::Occupation => self.occupation,
            Dimension::Location => self.location,
        }
    }

    fn set(&mut self, dimension: Dimension, weight: f64) {
        match dimension {
            Dimension::Age => self.age = weight,
            Dimension::Height => self.height = weight,
            Dimension::Religion => self.religion = weight,
            Dimension::Caste => self.caste = weight,
            Dimension::Education => self.education = weight,
            Dimension::Occupation => self.occupation = weight,
            Dimension::Location => self.location = weight,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Equal weight for each of `dimensions`, zero elsewhere
    pub fn even_split(dimensions: &[Dimension]) -> Self {
        let mut weights = Self::default();
        if dimensions.is_empty() {
            return weights;
        }
        let share = 1.0 / dimensions.len() as f64;
        for dimension in dimensions {
            weights.set(*dimension, share);
        }
        weights
    }
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScoringWeights {
    /// Even split over the dimensions the seeker actually constrains
    #[default]
    EvenSplit,
    Fixed(DimensionWeights),
}

impl ScoringWeights {
    /// Weights in effect for one seeker
    pub fn resolve(&self, seeker: &Profile, preference: &PartnerPreference) -> DimensionWeights {
        match self {
            ScoringWeights::Fixed(weights) => *weights,
            ScoringWeights::EvenSplit => {
                let location = seeker.location();
                let active: Vec<Dimension> = Dimension::ALL
                    .into_iter()
                    .filter(|d| match d {
                        Dimension::Age => preference.age_range.is_some(),
                        Dimension::Height => preference.height_range.is_some(),
                        Dimension::Religion => preference.religion.is_constrained(),
                        Dimension::Caste => preference.caste.is_constrained(),
                        Dimension::Education => preference.education.is_constrained(),
                        Dimension::Occupation => preference.occupation.is_constrained(),
                        Dimension::Location => location.city.is_some() || location.state.is_some(),
                    })
                    .collect();
                DimensionWeights::even_split(&active)
            }
        }
    }
}

/// Contribution of a single dimension to a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionContribution {
    pub dimension: Dimension,
    /// Normalized fit in [0, 1]
    pub fit: f64,
    pub weight: f64,
}

impl DimensionContribution {
    pub fn value(&self) -> f64 {
        self.fit * self.weight
    }
}

/// Ephemeral affinity between a seeker and one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub seeker_id: ProfileId,
    pub candidate_id: ProfileId,
    /// Weighted sum, clamped to [0, 1]
    pub score: f64,
    pub contributions: Vec<DimensionContribution>,
}

impl CompatibilityScore {
    pub fn contribution(&self, dimension: Dimension) -> Option<&DimensionContribution> {
        self.contributions.iter().find(|c| c.dimension == dimension)
    }
}

/// A candidate that passed the filter, with its score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub profile: Profile,
    pub score: CompatibilityScore,
}

/// Requested result window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

/// One page of ranked matches
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResultPage {
    pub matches: Vec<RankedMatch>,
    pub offset: usize,
    pub limit: usize,
    /// Offset of the following page when `has_more` is set
    pub next_offset: Option<usize>,
    pub has_more: bool,
    /// Eligible candidates seen before slicing
    pub total_eligible: usize,
    /// Date ages were computed against
    pub as_of: NaiveDate,
}
