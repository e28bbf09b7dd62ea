use anyhow::Context;
use serde::Serialize;

use crate::cli::QueryArgs;
use crate::download;
use crate::engine::filters::{ConsultationType, SortBy};
use crate::session::{Action, Session};
use crate::view::{DoctorCardView, FilterControlsView, SuggestionView};

#[derive(Debug, Serialize)]
struct QueryOutput {
    query: String,
    search: String,
    total: usize,
    specialties: Vec<String>,
    controls: FilterControlsView,
    doctors: Vec<DoctorCardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<SuggestionView>>,
}

pub async fn run(opts: QueryArgs) -> anyhow::Result<()> {
    let mut session = Session::new();
    let ticket = session.begin_load();
    match download::load_payload(&opts.source).await {
        Ok(payload) => session.complete_load(ticket, &payload),
        Err(e) => session.fail_load(ticket, &e),
    };

    session.apply_location(&opts.query);
    for action in actions(&opts) {
        if let Some(next) = session.dispatch(action) {
            tracing::info!("navigate ?{}", next);
            // The router echoes the navigation back; the session ignores it.
            session.apply_location(&next);
        }
    }
    tracing::info!(
        "query={:?} -> {} of {} doctors",
        session.query_string(),
        session.displayed().len(),
        session.doctors().len()
    );

    let out = build_output(&session, opts.suggest.as_deref());
    let json = serde_json::to_string_pretty(&out).context("serialize output")?;
    println!("{json}");
    Ok(())
}

/// UI actions requested on the command line, in the order a user would
/// click through the filter panel.
fn actions(opts: &QueryArgs) -> Vec<Action> {
    let mut out = Vec::new();
    if opts.clear_filters {
        out.push(Action::ClearFilters);
    }
    if let Some(c) = opts.consultation.as_deref() {
        out.push(Action::SetConsultation(ConsultationType::from_param(c)));
    }
    for s in &opts.toggle_specialty {
        out.push(Action::ToggleSpecialty(s.clone()));
    }
    if let Some(s) = opts.sort.as_deref() {
        out.push(Action::SetSort(SortBy::from_param(s)));
    }
    if let Some(term) = opts.search.as_ref() {
        out.push(Action::Search(term.clone()));
    }
    out
}

fn build_output(session: &Session, suggest_input: Option<&str>) -> QueryOutput {
    let doctors: Vec<DoctorCardView> = session
        .displayed()
        .into_iter()
        .map(DoctorCardView::from)
        .collect();

    QueryOutput {
        query: session.query_string(),
        search: session.search().to_string(),
        total: doctors.len(),
        specialties: session.specialties().to_vec(),
        controls: FilterControlsView::from(session.filters()),
        doctors,
        suggestions: suggest_input.map(|input| {
            session
                .suggestions(input)
                .into_iter()
                .map(SuggestionView::from)
                .collect()
        }),
    }
}
