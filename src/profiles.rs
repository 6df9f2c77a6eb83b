//! Player profiles
//!
//! Persisted as a JSON array in LocalStorage, with the active profile held as
//! a weak id reference under a separate key.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{PersistenceStore, keys};

/// Maximum profile name length
pub const MAX_NAME_LEN: usize = 10;
/// Maximum length of a free-text club name
pub const MAX_CLUB_LEN: usize = 16;

/// Clubs offered in the onboarding list
pub const CLUBS: [&str; 32] = [
    "Ajax",
    "Arsenal",
    "Atletico Madrid",
    "Barcelona",
    "Bayern Munich",
    "Benfica",
    "Borussia Dortmund",
    "Celtic",
    "Chelsea",
    "Flamengo",
    "Inter Milan",
    "Juventus",
    "Leeds United",
    "Liverpool",
    "Lyon",
    "Man City",
    "Man United",
    "Marseille",
    "AC Milan",
    "Napoli",
    "Newcastle",
    "PSG",
    "Porto",
    "Rangers",
    "Real Madrid",
    "River Plate",
    "Roma",
    "Santos",
    "Sao Paulo",
    "Spurs",
    "West Ham",
    "Wolves",
];

/// Player nationality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    Argentina,
    Australia,
    Belgium,
    Brazil,
    Canada,
    Chile,
    Colombia,
    Croatia,
    Denmark,
    Ecuador,
    England,
    France,
    Germany,
    Ghana,
    Ireland,
    Italy,
    Japan,
    Mexico,
    Morocco,
    Netherlands,
    Nigeria,
    Norway,
    Poland,
    Portugal,
    Scotland,
    #[serde(rename = "South Korea")]
    SouthKorea,
    Spain,
    Sweden,
    #[serde(rename = "USA")]
    Usa,
    Uruguay,
    Wales,
}

impl Country {
    /// All countries in menu order
    pub const ALL: [Country; 31] = [
        Country::Argentina,
        Country::Australia,
        Country::Belgium,
        Country::Brazil,
        Country::Canada,
        Country::Chile,
        Country::Colombia,
        Country::Croatia,
        Country::Denmark,
        Country::Ecuador,
        Country::England,
        Country::France,
        Country::Germany,
        Country::Ghana,
        Country::Ireland,
        Country::Italy,
        Country::Japan,
        Country::Mexico,
        Country::Morocco,
        Country::Netherlands,
        Country::Nigeria,
        Country::Norway,
        Country::Poland,
        Country::Portugal,
        Country::Scotland,
        Country::SouthKorea,
        Country::Spain,
        Country::Sweden,
        Country::Usa,
        Country::Uruguay,
        Country::Wales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Argentina => "Argentina",
            Country::Australia => "Australia",
            Country::Belgium => "Belgium",
            Country::Brazil => "Brazil",
            Country::Canada => "Canada",
            Country::Chile => "Chile",
            Country::Colombia => "Colombia",
            Country::Croatia => "Croatia",
            Country::Denmark => "Denmark",
            Country::Ecuador => "Ecuador",
            Country::England => "England",
            Country::France => "France",
            Country::Germany => "Germany",
            Country::Ghana => "Ghana",
            Country::Ireland => "Ireland",
            Country::Italy => "Italy",
            Country::Japan => "Japan",
            Country::Mexico => "Mexico",
            Country::Morocco => "Morocco",
            Country::Netherlands => "Netherlands",
            Country::Nigeria => "Nigeria",
            Country::Norway => "Norway",
            Country::Poland => "Poland",
            Country::Portugal => "Portugal",
            Country::Scotland => "Scotland",
            Country::SouthKorea => "South Korea",
            Country::Spain => "Spain",
            Country::Sweden => "Sweden",
            Country::Usa => "USA",
            Country::Uruguay => "Uruguay",
            Country::Wales => "Wales",
        }
    }

    /// Flag emoji shown next to names on the leaderboard
    pub fn flag(&self) -> &'static str {
        match self {
            Country::Argentina => "\u{1F1E6}\u{1F1F7}",
            Country::Australia => "\u{1F1E6}\u{1F1FA}",
            Country::Belgium => "\u{1F1E7}\u{1F1EA}",
            Country::Brazil => "\u{1F1E7}\u{1F1F7}",
            Country::Canada => "\u{1F1E8}\u{1F1E6}",
            Country::Chile => "\u{1F1E8}\u{1F1F1}",
            Country::Colombia => "\u{1F1E8}\u{1F1F4}",
            Country::Croatia => "\u{1F1ED}\u{1F1F7}",
            Country::Denmark => "\u{1F1E9}\u{1F1F0}",
            Country::Ecuador => "\u{1F1EA}\u{1F1E8}",
            Country::England => "\u{1F3F4}\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F}",
            Country::France => "\u{1F1EB}\u{1F1F7}",
            Country::Germany => "\u{1F1E9}\u{1F1EA}",
            Country::Ghana => "\u{1F1EC}\u{1F1ED}",
            Country::Ireland => "\u{1F1EE}\u{1F1EA}",
            Country::Italy => "\u{1F1EE}\u{1F1F9}",
            Country::Japan => "\u{1F1EF}\u{1F1F5}",
            Country::Mexico => "\u{1F1F2}\u{1F1FD}",
            Country::Morocco => "\u{1F1F2}\u{1F1E6}",
            Country::Netherlands => "\u{1F1F3}\u{1F1F1}",
            Country::Nigeria => "\u{1F1F3}\u{1F1EC}",
            Country::Norway => "\u{1F1F3}\u{1F1F4}",
            Country::Poland => "\u{1F1F5}\u{1F1F1}",
            Country::Portugal => "\u{1F1F5}\u{1F1F9}",
            Country::Scotland => "\u{1F3F4}\u{E0067}\u{E0062}\u{E0073}\u{E0063}\u{E0074}\u{E007F}",
            Country::SouthKorea => "\u{1F1F0}\u{1F1F7}",
            Country::Spain => "\u{1F1EA}\u{1F1F8}",
            Country::Sweden => "\u{1F1F8}\u{1F1EA}",
            Country::Usa => "\u{1F1FA}\u{1F1F8}",
            Country::Uruguay => "\u{1F1FA}\u{1F1FE}",
            Country::Wales => "\u{1F3F4}\u{E0067}\u{E0062}\u{E0077}\u{E006C}\u{E0073}\u{E007F}",
        }
    }
}

impl FromStr for Country {
    type Err = ProfileError;

    /// Case-insensitive match on the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProfileError::UnknownCountry(s.trim().to_string()))
    }
}

/// Onboarding validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name is longer than 10 characters")]
    NameTooLong,
    #[error("name may only contain A-Z and spaces (found {0:?})")]
    InvalidNameChar(char),
    #[error("club must not be empty")]
    EmptyClub,
    #[error("club name is longer than 16 characters")]
    ClubTooLong,
    #[error("unknown country: {0}")]
    UnknownCountry(String),
}

/// A local player identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Creation-time-derived id; 0 means "not yet saved"
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub country: Country,
    pub club: String,
}

impl Profile {
    /// Validate onboarding input into an unsaved profile
    ///
    /// Names are trimmed and limited to upper-case letters and spaces. The club
    /// is either one of [`CLUBS`] or free text of up to 16 characters.
    pub fn new(name: &str, country: Country, club: &str) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ProfileError::NameTooLong);
        }
        if let Some(c) = name.chars().find(|c| !(c.is_ascii_uppercase() || *c == ' ')) {
            return Err(ProfileError::InvalidNameChar(c));
        }

        let club = club.trim();
        if club.is_empty() {
            return Err(ProfileError::EmptyClub);
        }
        if !CLUBS.contains(&club) && club.chars().count() > MAX_CLUB_LEN {
            return Err(ProfileError::ClubTooLong);
        }

        Ok(Self {
            id: 0,
            name: name.to_string(),
            country,
            club: club.to_string(),
        })
    }

    /// Whether the club came from the fixed list rather than free text
    pub fn has_listed_club(&self) -> bool {
        CLUBS.contains(&self.club.as_str())
    }
}

/// Synthesize a profile id: `now_ms * 1000 + random[0, 1000)`
pub(crate) fn synthesize_id(now_millis: i64) -> i64 {
    now_millis * 1000 + rand::rng().random_range(0..1000)
}

/// CRUD and active selection over stored profiles
///
/// Stateless: every call re-reads the store.
pub struct ProfileRegistry<'a> {
    store: &'a PersistenceStore,
}

impl<'a> ProfileRegistry<'a> {
    pub fn new(store: &'a PersistenceStore) -> Self {
        Self { store }
    }

    /// All profiles in insertion order
    pub fn list_profiles(&self) -> Vec<Profile> {
        self.store.read_json_list(keys::PROFILES)
    }

    pub fn active_id(&self) -> Option<i64> {
        self.store.read_int(keys::ACTIVE_ID)
    }

    /// The active profile, if the reference is set and still resolves
    pub fn active(&self) -> Option<Profile> {
        let id = self.active_id()?;
        self.list_profiles().into_iter().find(|p| p.id == id)
    }

    pub fn has_profiles(&self) -> bool {
        !self.list_profiles().is_empty()
    }

    pub fn has_active(&self) -> bool {
        self.active().is_some()
    }

    /// Insert or replace by id, returning the stored id
    pub fn save(&self, mut profile: Profile) -> i64 {
        let mut profiles = self.list_profiles();

        if profile.id == 0 {
            let now = self.store.now_millis();
            let mut id = synthesize_id(now);
            // next free id; the clock may not have moved
            while profiles.iter().any(|p| p.id == id) {
                id += 1;
            }
            profile.id = id;
        }

        let id = profile.id;
        match profiles.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
        self.store.write_json(keys::PROFILES, &profiles);
        log::info!("Saved profile {id} ({} total)", profiles.len());
        id
    }

    /// Record `id` as active; existence is resolved lazily by [`Self::active`]
    pub fn set_active(&self, id: i64) {
        self.store.set(keys::ACTIVE_ID, &id.to_string());
    }

    /// Remove a profile, clearing the active reference if it pointed here
    pub fn delete(&self, id: i64) {
        let profiles: Vec<Profile> = self
            .list_profiles()
            .into_iter()
            .filter(|p| p.id != id)
            .collect();
        self.store.write_json(keys::PROFILES, &profiles);
        if self.active_id() == Some(id) {
            self.store.remove(keys::ACTIVE_ID);
        }
        log::info!("Deleted profile {id}");
    }
}
