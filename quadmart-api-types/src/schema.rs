//! Attribute schema registry: which `additional_data` fields each listing
//! type requires. Used by the validator at the parse boundary and exposed
//! verbatim through `GET /market/types`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ListingType;

impl ListingType {
    /// Fields that must be present in `additional_data` on create and must
    /// remain populated after every update.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ListingType::Item => &["condition", "category"],
            ListingType::Sublet => &["address", "beds", "baths", "start_date", "end_date"],
        }
    }

    /// Advisory fields a client UI should prompt for. Nothing is enforced
    /// for these; the set is currently empty for both types.
    pub fn recommended_fields(self) -> &'static [&'static str] {
        match self {
            ListingType::Item => &[],
            ListingType::Sublet => &[],
        }
    }
}

/// Error produced when a request names a listing type outside the known set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownListingType(pub String);

impl std::fmt::Display for UnknownListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let valid = ListingType::ALL.map(ListingType::as_str).join(", ");
        write!(
            f,
            "Invalid listing type '{}'. Valid types are: {valid}.",
            self.0
        )
    }
}

impl std::error::Error for UnknownListingType {}

impl FromStr for ListingType {
    type Err = UnknownListingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownListingType(s.to_string()))
    }
}

/// Response row for `GET /market/types`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    pub required_attributes: Vec<String>,
    pub recommended_attributes: Vec<String>,
}

impl From<ListingType> for TypeInfo {
    fn from(listing_type: ListingType) -> Self {
        TypeInfo {
            name: listing_type.as_str().to_string(),
            required_attributes: listing_type
                .required_fields()
                .iter()
                .map(ToString::to_string)
                .collect(),
            recommended_attributes: listing_type
                .recommended_fields()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_requires_condition_and_category() {
        assert_eq!(
            ListingType::Item.required_fields(),
            &["condition", "category"]
        );
    }

    #[test]
    fn sublet_requires_every_housing_field() {
        assert_eq!(
            ListingType::Sublet.required_fields(),
            &["address", "beds", "baths", "start_date", "end_date"]
        );
    }

    #[test]
    fn unknown_type_names_the_valid_set() {
        let err = "apartment".parse::<ListingType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid listing type 'apartment'. Valid types are: item, sublet."
        );
    }

    #[test]
    fn known_types_parse() {
        assert_eq!("item".parse::<ListingType>().unwrap(), ListingType::Item);
        assert_eq!(
            "sublet".parse::<ListingType>().unwrap(),
            ListingType::Sublet
        );
    }
}
