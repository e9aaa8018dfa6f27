//! Free-text sections of an ID draft.
//!
//! Nothing here is validated: any value, including an empty string, is
//! accepted.

use serde::{Deserialize, Serialize};

/// Personal and disability details printed on the card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Resident's full name.
    pub full_name: String,
    /// Home address.
    pub address: String,
    /// Date of birth as entered.
    pub date_of_birth: String,
    /// Head of household or association.
    pub household_head: String,
    /// Disability type.
    pub disability_type: String,
    /// PWD ID number.
    pub pwd_id_number: String,
    /// Cluster group number.
    pub cluster_group_number: String,
    /// Tag number.
    pub tag_number: String,
}

/// One field of [`PersonalInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FullName,
    Address,
    DateOfBirth,
    HouseholdHead,
    DisabilityType,
    PwdIdNumber,
    ClusterGroupNumber,
    TagNumber,
}

impl PersonalField {
    /// Every personal field, in form order.
    pub const ALL: [PersonalField; 8] = [
        PersonalField::FullName,
        PersonalField::Address,
        PersonalField::DateOfBirth,
        PersonalField::HouseholdHead,
        PersonalField::DisabilityType,
        PersonalField::PwdIdNumber,
        PersonalField::ClusterGroupNumber,
        PersonalField::TagNumber,
    ];
}

impl PersonalInfo {
    /// Returns the current value of `field`.
    #[must_use]
    pub fn get(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::FullName => &self.full_name,
            PersonalField::Address => &self.address,
            PersonalField::DateOfBirth => &self.date_of_birth,
            PersonalField::HouseholdHead => &self.household_head,
            PersonalField::DisabilityType => &self.disability_type,
            PersonalField::PwdIdNumber => &self.pwd_id_number,
            PersonalField::ClusterGroupNumber => &self.cluster_group_number,
            PersonalField::TagNumber => &self.tag_number,
        }
    }

    /// Overwrites `field` with `value`.
    pub fn set(&mut self, field: PersonalField, value: String) {
        let slot = match field {
            PersonalField::FullName => &mut self.full_name,
            PersonalField::Address => &mut self.address,
            PersonalField::DateOfBirth => &mut self.date_of_birth,
            PersonalField::HouseholdHead => &mut self.household_head,
            PersonalField::DisabilityType => &mut self.disability_type,
            PersonalField::PwdIdNumber => &mut self.pwd_id_number,
            PersonalField::ClusterGroupNumber => &mut self.cluster_group_number,
            PersonalField::TagNumber => &mut self.tag_number,
        };
        *slot = value;
    }

    /// Fields whose value in `target` differs from `self`.
    #[must_use]
    pub fn changes_to(&self, target: &PersonalInfo) -> Vec<(PersonalField, String)> {
        PersonalField::ALL
            .into_iter()
            .filter(|&field| self.get(field) != target.get(field))
            .map(|field| (field, target.get(field).to_owned()))
            .collect()
    }
}

/// Who to call in an emergency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Contact person's name.
    pub name: String,
    /// Contact number.
    pub contact_number: String,
    /// Contact person's address.
    pub address: String,
}

/// One field of [`EmergencyContact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyField {
    Name,
    ContactNumber,
    Address,
}

impl EmergencyField {
    /// Every emergency-contact field, in form order.
    pub const ALL: [EmergencyField; 3] = [
        EmergencyField::Name,
        EmergencyField::ContactNumber,
        EmergencyField::Address,
    ];
}

impl EmergencyContact {
    /// Returns the current value of `field`.
    #[must_use]
    pub fn get(&self, field: EmergencyField) -> &str {
        match field {
            EmergencyField::Name => &self.name,
            EmergencyField::ContactNumber => &self.contact_number,
            EmergencyField::Address => &self.address,
        }
    }

    /// Overwrites `field` with `value`.
    pub fn set(&mut self, field: EmergencyField, value: String) {
        let slot = match field {
            EmergencyField::Name => &mut self.name,
            EmergencyField::ContactNumber => &mut self.contact_number,
            EmergencyField::Address => &mut self.address,
        };
        *slot = value;
    }

    /// Fields whose value in `target` differs from `self`.
    #[must_use]
    pub fn changes_to(&self, target: &EmergencyContact) -> Vec<(EmergencyField, String)> {
        EmergencyField::ALL
            .into_iter()
            .filter(|&field| self.get(field) != target.get(field))
            .map(|field| (field, target.get(field).to_owned()))
            .collect()
    }
}
