use url::form_urlencoded;

use crate::engine::filters::{ConsultationType, FilterState, SortBy};

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_CONSULTATION: &str = "consultationType";
pub const PARAM_SPECIALTIES: &str = "specialties";
pub const PARAM_SORT: &str = "sortBy";

/// Encodes filter and search state as a query string (no leading `?`).
/// Fields at their default are omitted, so the default state encodes to "".
pub fn to_query_string(filters: &FilterState, search: &str) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    if let Some(v) = filters.consultation.as_param() {
        ser.append_pair(PARAM_CONSULTATION, v);
    }
    if let Some(v) = filters.sort.as_param() {
        ser.append_pair(PARAM_SORT, v);
    }
    for s in &filters.specialties {
        ser.append_pair(PARAM_SPECIALTIES, s);
    }
    if !search.is_empty() {
        ser.append_pair(PARAM_SEARCH, search);
    }
    ser.finish()
}

pub fn from_query_string(query: &str) -> (FilterState, String) {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut filters = FilterState::default();
    let mut consultation: Option<String> = None;
    let mut sort: Option<String> = None;
    let mut search: Option<String> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PARAM_CONSULTATION if consultation.is_none() => consultation = Some(value.into_owned()),
            PARAM_SORT if sort.is_none() => sort = Some(value.into_owned()),
            PARAM_SEARCH if search.is_none() => search = Some(value.into_owned()),
            PARAM_SPECIALTIES if !value.is_empty() => {
                filters.specialties.insert(value.into_owned());
            }
            _ => {}
        }
    }

    if let Some(c) = consultation.as_deref() {
        filters.consultation = ConsultationType::from_param(c);
        if filters.consultation == ConsultationType::Any && !c.is_empty() {
            tracing::debug!("ignoring unknown {}={:?}", PARAM_CONSULTATION, c);
        }
    }
    if let Some(s) = sort.as_deref() {
        filters.sort = SortBy::from_param(s);
        if filters.sort == SortBy::Unset && !s.is_empty() {
            tracing::debug!("ignoring unknown {}={:?}", PARAM_SORT, s);
        }
    }

    (filters, search.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn param_set(q: &str) -> BTreeSet<(String, String)> {
        form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_default_state_serializes_empty() {
        assert_eq!(to_query_string(&FilterState::default(), ""), "");
    }

    #[test]
    fn test_deserialize_specialty_and_sort() {
        let (filters, search) = from_query_string("?specialties=Dentist&sortBy=fees");
        assert_eq!(filters.specialties.iter().collect::<Vec<_>>(), vec!["Dentist"]);
        assert_eq!(filters.sort, SortBy::Fees);
        assert_eq!(filters.consultation, ConsultationType::Any);
        assert_eq!(search, "");
    }

    #[test]
    fn test_deserialize_many_specialties() {
        let (filters, _) =
            from_query_string("specialties=ENT&specialties=Dietitian%2FNutritionist&specialties=");
        assert_eq!(
            filters.specialties.into_iter().collect::<Vec<_>>(),
            vec!["Dietitian/Nutritionist", "ENT"]
        );
    }

    #[test]
    fn test_deserialize_empty_and_unknown() {
        let (filters, search) = from_query_string("");
        assert_eq!(filters, FilterState::default());
        assert_eq!(search, "");

        let (filters, _) = from_query_string("consultationType=phone&sortBy=rating&foo=bar");
        assert_eq!(filters, FilterState::default());
    }

    #[test]
    fn test_search_decodes_spaces() {
        let (_, search) = from_query_string("search=Dr.+Asha%20Rao");
        assert_eq!(search, "Dr. Asha Rao");
    }

    #[test]
    fn test_round_trip_state() {
        let mut filters = FilterState {
            consultation: ConsultationType::InClinic,
            sort: SortBy::Experience,
            ..Default::default()
        };
        filters.specialties.insert("General Physician".to_string());
        filters.specialties.insert("Dietitian/Nutritionist".to_string());
        let search = "Dr. Rao & Sons";

        let q = to_query_string(&filters, search);
        let (back, back_search) = from_query_string(&q);
        assert_eq!(back, filters);
        assert_eq!(back_search, search);
    }

    #[test]
    fn test_round_trip_query_is_order_independent() {
        let q = "search=asha&specialties=ENT&consultationType=video&specialties=Dentist";
        let (filters, search) = from_query_string(q);
        let again = to_query_string(&filters, &search);
        assert_eq!(param_set(&again), param_set(q));
    }
}
