//! JSON view models for the list, suggestion and filter panel surfaces.
//!
//! The `data-testid` values are relied on by browser test suites and must not
//! change.

use serde::Serialize;

use crate::constants::{FALLBACK_SPECIALTY_LINE, PLACEHOLDER_PHOTO_URL};
use crate::doctor::Doctor;
use crate::engine::filters::{ConsultationType, FilterState, SortBy};

pub const TESTID_SEARCH_INPUT: &str = "autocomplete-input";
pub const TESTID_SUGGESTION: &str = "suggestion-item";
pub const TESTID_DOCTOR_CARD: &str = "doctor-card";
pub const TESTID_DOCTOR_NAME: &str = "doctor-name";
pub const TESTID_DOCTOR_SPECIALTY: &str = "doctor-specialty";
pub const TESTID_DOCTOR_EXPERIENCE: &str = "doctor-experience";
pub const TESTID_DOCTOR_FEE: &str = "doctor-fee";
pub const TESTID_HEADER_SORT: &str = "filter-header-sort";
pub const TESTID_HEADER_SPECIALITY: &str = "filter-header-speciality";
pub const TESTID_HEADER_MOC: &str = "filter-header-moc";
pub const TESTID_SORT_FEES: &str = "sort-fees";
pub const TESTID_SORT_EXPERIENCE: &str = "sort-experience";
pub const TESTID_VIDEO_CONSULT: &str = "filter-video-consult";
pub const TESTID_IN_CLINIC: &str = "filter-in-clinic";

pub fn specialty_test_id(specialty: &str) -> String {
    format!("filter-specialty-{}", specialty.replace('/', "-"))
}

#[derive(Debug, Clone, Serialize)]
pub struct CardTestIds {
    pub card: &'static str,
    pub name: &'static str,
    pub specialty: &'static str,
    pub experience: &'static str,
    pub fee: &'static str,
}

const CARD_TEST_IDS: CardTestIds = CardTestIds {
    card: TESTID_DOCTOR_CARD,
    name: TESTID_DOCTOR_NAME,
    specialty: TESTID_DOCTOR_SPECIALTY,
    experience: TESTID_DOCTOR_EXPERIENCE,
    fee: TESTID_DOCTOR_FEE,
};

#[derive(Debug, Clone, Serialize)]
pub struct DoctorCardView {
    pub id: String,
    pub name: String,
    pub photo: String,
    pub qualification: String,
    pub specialty_line: String,
    pub experience: String,
    pub location: String,
    pub clinic: String,
    pub fees: String,
    pub fees_with_symbol: String,
    pub video_consult: bool,
    pub in_clinic: bool,
    pub test_ids: CardTestIds,
}

impl From<&Doctor> for DoctorCardView {
    fn from(d: &Doctor) -> Self {
        let specialty_line = if d.specialties.is_empty() {
            FALLBACK_SPECIALTY_LINE.to_string()
        } else {
            d.specialties.join(", ")
        };
        let photo = if d.photo.is_empty() {
            PLACEHOLDER_PHOTO_URL.to_string()
        } else {
            d.photo.clone()
        };

        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            photo,
            qualification: d.qualification.clone(),
            specialty_line,
            experience: d.experience_text.clone(),
            location: d.location.clone(),
            clinic: d.clinic.clone(),
            fees: d.fees.clone(),
            fees_with_symbol: d.fees_with_symbol.clone(),
            video_consult: d.video_consult,
            in_clinic: d.in_clinic,
            test_ids: CARD_TEST_IDS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionView {
    pub id: String,
    pub name: String,
    pub test_id: &'static str,
}

impl From<&Doctor> for SuggestionView {
    fn from(d: &Doctor) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            test_id: TESTID_SUGGESTION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtyOptionView {
    pub name: String,
    pub test_id: String,
    pub checked: bool,
}

pub fn specialty_option_views(options: &[&str], filters: &FilterState) -> Vec<SpecialtyOptionView> {
    options
        .iter()
        .map(|name| SpecialtyOptionView {
            name: name.to_string(),
            test_id: specialty_test_id(name),
            checked: filters.specialties.contains(*name),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlView {
    pub test_id: &'static str,
    pub checked: bool,
}

/// Sort and consultation-mode radio controls with their checked state.
#[derive(Debug, Clone, Serialize)]
pub struct FilterControlsView {
    pub header_sort: &'static str,
    pub header_speciality: &'static str,
    pub header_moc: &'static str,
    pub sort_fees: ControlView,
    pub sort_experience: ControlView,
    pub video_consult: ControlView,
    pub in_clinic: ControlView,
}

impl From<&FilterState> for FilterControlsView {
    fn from(f: &FilterState) -> Self {
        Self {
            header_sort: TESTID_HEADER_SORT,
            header_speciality: TESTID_HEADER_SPECIALITY,
            header_moc: TESTID_HEADER_MOC,
            sort_fees: ControlView {
                test_id: TESTID_SORT_FEES,
                checked: f.sort == SortBy::Fees,
            },
            sort_experience: ControlView {
                test_id: TESTID_SORT_EXPERIENCE,
                checked: f.sort == SortBy::Experience,
            },
            video_consult: ControlView {
                test_id: TESTID_VIDEO_CONSULT,
                checked: f.consultation == ConsultationType::Video,
            },
            in_clinic: ControlView {
                test_id: TESTID_IN_CLINIC,
                checked: f.consultation == ConsultationType::InClinic,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctor::normalize_doctor;
    use serde_json::json;

    #[test]
    fn test_specialty_test_id() {
        assert_eq!(
            specialty_test_id("Dietitian/Nutritionist"),
            "filter-specialty-Dietitian-Nutritionist"
        );
        assert_eq!(specialty_test_id("ENT"), "filter-specialty-ENT");
    }

    #[test]
    fn test_card_falls_back_for_empty_fields() {
        let card = DoctorCardView::from(&normalize_doctor(&json!({"name": "Dr. X"})));
        assert_eq!(card.specialty_line, "General Physician");
        assert_eq!(card.photo, "https://via.placeholder.com/80");
        assert_eq!(card.fees, "0");
        assert_eq!(card.test_ids.card, "doctor-card");
    }

    #[test]
    fn test_card_joins_specialties() {
        let card = DoctorCardView::from(&normalize_doctor(&json!({
            "specialities": [{"name": "Dentist"}, {"name": "ENT"}],
            "fees": "₹ 450"
        })));
        assert_eq!(card.specialty_line, "Dentist, ENT");
        assert_eq!(card.fees, "450");
        assert_eq!(card.fees_with_symbol, "₹ 450");
    }

    #[test]
    fn test_specialty_options_checked() {
        let mut f = FilterState::default();
        f.specialties.insert("ENT".to_string());
        let views = specialty_option_views(&["Dentist", "ENT"], &f);
        assert!(!views[0].checked);
        assert!(views[1].checked);
        assert_eq!(views[1].test_id, "filter-specialty-ENT");
    }

    #[test]
    fn test_controls_reflect_state() {
        let f = FilterState {
            consultation: ConsultationType::Video,
            sort: SortBy::Fees,
            ..Default::default()
        };
        let c = FilterControlsView::from(&f);
        assert!(c.sort_fees.checked);
        assert!(!c.sort_experience.checked);
        assert!(c.video_consult.checked);
        assert!(!c.in_clinic.checked);
    }
}
