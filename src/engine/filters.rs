use std::collections::BTreeSet;

use crate::doctor::Doctor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsultationType {
    #[default]
    Any,
    Video,
    InClinic,
}

impl ConsultationType {
    pub fn from_param(s: &str) -> Self {
        match s {
            "video" => ConsultationType::Video,
            "clinic" => ConsultationType::InClinic,
            _ => ConsultationType::Any,
        }
    }

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            ConsultationType::Any => None,
            ConsultationType::Video => Some("video"),
            ConsultationType::InClinic => Some("clinic"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Unset,
    Fees,
    Experience,
}

impl SortBy {
    pub fn from_param(s: &str) -> Self {
        match s {
            "fees" => SortBy::Fees,
            "experience" => SortBy::Experience,
            _ => SortBy::Unset,
        }
    }

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            SortBy::Unset => None,
            SortBy::Fees => Some("fees"),
            SortBy::Experience => Some("experience"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub consultation: ConsultationType,
    pub specialties: BTreeSet<String>,
    pub sort: SortBy,
}

/// Narrows `doctors` by search, consultation mode and specialty, then sorts.
/// The sort is stable, so equal keys keep their list order.
pub fn apply_filters<'a>(
    doctors: &'a [Doctor],
    search: &str,
    filters: &FilterState,
) -> Vec<&'a Doctor> {
    let needle = search.trim().to_lowercase();

    let mut result: Vec<&Doctor> = doctors
        .iter()
        .filter(|d| needle.is_empty() || d.matches_search(&needle))
        .filter(|d| match filters.consultation {
            ConsultationType::Any => true,
            ConsultationType::Video => d.video_consult,
            ConsultationType::InClinic => d.in_clinic,
        })
        .filter(|d| filters.specialties.is_empty() || d.has_any_specialty(&filters.specialties))
        .collect();

    match filters.sort {
        SortBy::Unset => {}
        SortBy::Fees => result.sort_by_key(|d| d.fee_amount),
        SortBy::Experience => result.sort_by(|a, b| b.experience_years.cmp(&a.experience_years)),
    }

    result
}
