//! Page-level state container.
//!
//! Owns the doctor list, the specialty set, and the filter/search state. UI
//! events come in as [`Action`]s and navigations as query strings; both go
//! through the same "last applied" state so that pushing a URL and then
//! observing the resulting navigation does not re-apply the state.

use serde_json::Value;

use crate::constants::SUGGESTION_LIMIT;
use crate::doctor::{self, Doctor};
use crate::engine::filters::{ConsultationType, FilterState, SortBy, apply_filters};
use crate::engine::suggest::suggest;
use crate::url_state::{from_query_string, to_query_string};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit a search term. Picking a suggestion submits the doctor's name.
    Search(String),
    SetConsultation(ConsultationType),
    ToggleSpecialty(String),
    SetSort(SortBy),
    ClearFilters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading(LoadTicket),
    Loaded,
}

#[derive(Debug)]
pub struct Session {
    doctors: Vec<Doctor>,
    specialties: Vec<String>,
    filters: FilterState,
    search: String,
    last_applied: Option<(FilterState, String)>,
    load: LoadState,
    next_ticket: u64,
    closed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            doctors: Vec::new(),
            specialties: Vec::new(),
            filters: FilterState::default(),
            search: String::new(),
            last_applied: None,
            load: LoadState::Idle,
            next_ticket: 0,
            closed: false,
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.load = LoadState::Loading(ticket);
        ticket
    }

    /// Installs a fetched payload. Returns false when the completion is stale
    /// (superseded ticket or closed session) and was ignored.
    pub fn complete_load(&mut self, ticket: LoadTicket, payload: &Value) -> bool {
        if self.closed || self.load != LoadState::Loading(ticket) {
            tracing::debug!("ignoring stale load completion {:?}", ticket);
            return false;
        }
        if !payload.is_array() {
            tracing::warn!("doctor payload is not an array; showing an empty list");
        }
        self.specialties = doctor::all_specialties(payload);
        self.doctors = doctor::normalize_doctors(payload);
        self.load = LoadState::Loaded;
        tracing::info!(
            "Loaded {} doctors ({} specialties)",
            self.doctors.len(),
            self.specialties.len()
        );
        true
    }

    /// Marks a failed fetch as finished with an empty list.
    pub fn fail_load(&mut self, ticket: LoadTicket, err: &anyhow::Error) -> bool {
        if self.closed || self.load != LoadState::Loading(ticket) {
            return false;
        }
        tracing::warn!("Error loading doctors: {err:#}");
        self.doctors.clear();
        self.specialties.clear();
        self.load = LoadState::Loaded;
        true
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading(_))
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn query_string(&self) -> String {
        to_query_string(&self.filters, &self.search)
    }

    pub fn displayed(&self) -> Vec<&Doctor> {
        apply_filters(&self.doctors, &self.search, &self.filters)
    }

    pub fn suggestions(&self, input: &str) -> Vec<&Doctor> {
        suggest(&self.doctors, input, SUGGESTION_LIMIT)
    }

    pub fn specialty_options(&self, needle: &str) -> Vec<&str> {
        doctor::specialty_options(&self.specialties, needle)
    }

    /// Applies a UI action. Returns the query string to navigate to when the
    /// state changed.
    pub fn dispatch(&mut self, action: Action) -> Option<String> {
        let mut filters = self.filters.clone();
        let mut search = self.search.clone();

        match action {
            Action::Search(term) => search = term,
            Action::SetConsultation(c) => filters.consultation = c,
            Action::ToggleSpecialty(s) => {
                if !filters.specialties.remove(&s) {
                    filters.specialties.insert(s);
                }
            }
            Action::SetSort(s) => filters.sort = s,
            Action::ClearFilters => filters = FilterState::default(),
        }

        if filters == self.filters && search == self.search {
            return None;
        }

        self.adopt(filters, search);
        Some(self.query_string())
    }

    /// Applies a navigation. Returns true when the state changed and the list
    /// must be re-rendered.
    pub fn apply_location(&mut self, query: &str) -> bool {
        let (filters, search) = from_query_string(query);
        let unchanged = self
            .last_applied
            .as_ref()
            .map(|(f, s)| *f == filters && *s == search)
            .unwrap_or(false);
        if unchanged {
            return false;
        }
        self.adopt(filters, search);
        true
    }

    fn adopt(&mut self, filters: FilterState, search: String) {
        self.last_applied = Some((filters.clone(), search.clone()));
        self.filters = filters;
        self.search = search;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!([
            {
                "id": "1",
                "name": "Dr. Asha",
                "fees": "₹ 500",
                "experience": "10 Years of experience",
                "specialities": [{"name": "Dentist"}],
                "video_consult": true
            },
            {
                "id": "2",
                "name": "Dr. Bhaskar",
                "fees": "₹ 300",
                "experience": "5 Years of experience",
                "specialities": [{"name": "ENT"}],
                "in_clinic": true
            }
        ])
    }

    fn loaded() -> Session {
        let mut s = Session::new();
        let t = s.begin_load();
        assert!(s.complete_load(t, &payload()));
        s
    }

    fn ids(s: &Session) -> Vec<String> {
        s.displayed().iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_load_lifecycle() {
        let mut s = Session::new();
        assert!(!s.is_loading());
        let t = s.begin_load();
        assert!(s.is_loading());
        assert!(s.displayed().is_empty());
        assert!(s.complete_load(t, &payload()));
        assert!(!s.is_loading());
        assert_eq!(s.doctors().len(), 2);
        assert_eq!(s.specialties(), &["Dentist".to_string(), "ENT".to_string()]);
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut s = Session::new();
        let first = s.begin_load();
        let second = s.begin_load();
        assert!(!s.complete_load(first, &payload()));
        assert!(s.doctors().is_empty());
        assert!(s.complete_load(second, &payload()));
        assert!(!s.complete_load(second, &json!([])));
        assert_eq!(s.doctors().len(), 2);
    }

    #[test]
    fn test_completion_after_close_ignored() {
        let mut s = Session::new();
        let t = s.begin_load();
        s.close();
        assert!(!s.complete_load(t, &payload()));
        assert!(s.doctors().is_empty());
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        let mut s = Session::new();
        let t = s.begin_load();
        assert!(s.complete_load(t, &json!({"error": "nope"})));
        assert!(s.doctors().is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn test_failed_load_is_empty() {
        let mut s = Session::new();
        let t = s.begin_load();
        assert!(s.fail_load(t, &anyhow::anyhow!("connection refused")));
        assert!(s.doctors().is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn test_dispatch_returns_navigation() {
        let mut s = loaded();
        let q = s.dispatch(Action::SetSort(SortBy::Fees));
        assert_eq!(q.as_deref(), Some("sortBy=fees"));
        assert_eq!(ids(&s), vec!["2", "1"]);
    }

    #[test]
    fn test_dispatch_unchanged_is_none() {
        let mut s = loaded();
        assert_eq!(s.dispatch(Action::SetConsultation(ConsultationType::Any)), None);
        assert_eq!(s.dispatch(Action::Search(String::new())), None);
    }

    #[test]
    fn test_navigation_echo_is_guarded() {
        let mut s = loaded();
        let q = s
            .dispatch(Action::SetConsultation(ConsultationType::Video))
            .expect("state changed");
        assert!(!s.apply_location(&q));
        assert_eq!(ids(&s), vec!["1"]);
    }

    #[test]
    fn test_apply_location_changes_state() {
        let mut s = loaded();
        assert!(s.apply_location("?specialties=ENT&sortBy=experience"));
        assert_eq!(ids(&s), vec!["2"]);
        assert!(!s.apply_location("sortBy=experience&specialties=ENT"));
        assert!(s.apply_location(""));
        assert_eq!(ids(&s), vec!["1", "2"]);
    }

    #[test]
    fn test_toggle_specialty_twice_restores() {
        let mut s = loaded();
        s.dispatch(Action::ToggleSpecialty("Dentist".to_string()));
        assert_eq!(ids(&s), vec!["1"]);
        let q = s.dispatch(Action::ToggleSpecialty("Dentist".to_string()));
        assert_eq!(q.as_deref(), Some(""));
        assert_eq!(ids(&s), vec!["1", "2"]);
    }

    #[test]
    fn test_select_suggestion_searches_by_name() {
        let mut s = loaded();
        let name = s.suggestions("bhas")[0].name.clone();
        let q = s.dispatch(Action::Search(name)).expect("state changed");
        assert_eq!(q, "search=Dr.+Bhaskar");
        assert_eq!(ids(&s), vec!["2"]);
    }

    #[test]
    fn test_no_match_search() {
        let mut s = loaded();
        s.dispatch(Action::Search("xyz-no-match".to_string()));
        assert!(s.displayed().is_empty());
        assert!(s.suggestions("xyz-no-match").is_empty());
    }

    #[test]
    fn test_clear_filters_keeps_search() {
        let mut s = loaded();
        s.dispatch(Action::Search("dr".to_string()));
        s.dispatch(Action::SetSort(SortBy::Experience));
        let q = s.dispatch(Action::ClearFilters);
        assert_eq!(q.as_deref(), Some("search=dr"));
    }

    #[test]
    fn test_location_before_load_applies_after() {
        let mut s = Session::new();
        let t = s.begin_load();
        assert!(s.apply_location("consultationType=clinic"));
        assert!(s.displayed().is_empty());
        s.complete_load(t, &payload());
        assert_eq!(ids(&s), vec!["2"]);
    }
}
