//! User account

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
}

/// Editable profile fields.
#[derive(Clone, Debug)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
}

impl User {
    pub fn register(profile: Profile, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(), first_name: profile.first_name, last_name: profile.last_name,
            phone_number: profile.phone_number, location: profile.location, email: profile.email, password_hash,
        }
    }

    pub fn update_profile(&mut self, profile: Profile) {
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.phone_number = profile.phone_number;
        self.location = profile.location;
        self.email = profile.email;
    }
}
