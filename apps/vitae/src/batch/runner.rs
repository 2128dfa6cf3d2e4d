//! Drives a plan: derives each view once, then renders emissions on blocking
//! workers bounded by a semaphore and writes each artifact atomically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::plan::{Emission, ViewKey};
use crate::batch::report::{BatchReport, EmissionResult, Outcome};
use crate::batch::writer::write_atomic;
use crate::errors::EmissionError;
use crate::generation::{derive, DeriveOptions};
use crate::models::View;
use crate::render::{emitter_for, DocumentMetadata, EmitContext};
use crate::state::AppState;
use crate::theme::resolve;
use crate::validation::validate_view;

/// Derived and validated view, or the reason every emission using it fails.
pub type PreparedView = Result<Arc<View>, EmissionError>;

/// Derives and validates one view per distinct key, in first-seen order.
pub fn prepare_views<'a>(
    state: &AppState,
    keys: impl IntoIterator<Item = &'a ViewKey>,
) -> Vec<(ViewKey, PreparedView)> {
    let options = DeriveOptions {
        allow_fallback: state.config.allow_fallback,
    };
    let mut seen: Vec<(ViewKey, PreparedView)> = Vec::new();
    for key in keys {
        if seen.iter().any(|(k, _)| k == key) {
            continue;
        }
        let prepared = prepare_view(state, key, options);
        seen.push((key.clone(), prepared));
    }
    seen
}

fn prepare_view(state: &AppState, key: &ViewKey, options: DeriveOptions) -> PreparedView {
    let view = derive(
        &state.master,
        &state.roles,
        &key.role,
        key.length,
        key.audience,
        options,
    )?;

    let report = validate_view(&view);
    for issue in &report.warnings {
        warn!(view = %key, field = %issue.field, "{}", issue.message);
    }
    if !report.passed(state.config.strict) {
        for issue in &report.errors {
            warn!(view = %key, field = %issue.field, kind = ?issue.kind, "{}", issue.message);
        }
        return Err(EmissionError::Validation(report));
    }
    debug!(view = %key, sections = view.sections().len(), "View ready");
    Ok(Arc::new(view))
}

/// Runs every emission and returns the results in plan order.
pub async fn run(
    state: &AppState,
    emissions: Vec<Emission>,
    out_root: &Path,
    cancel: CancellationToken,
) -> BatchReport {
    let started = Instant::now();
    let base = state.base_name();

    let keys: Vec<ViewKey> = emissions.iter().map(Emission::view_key).collect();
    let views: HashMap<ViewKey, PreparedView> = prepare_views(state, &keys).into_iter().collect();
    info!(
        emissions = emissions.len(),
        views = views.len(),
        concurrency = state.config.concurrency,
        "Batch started"
    );

    let semaphore = Arc::new(Semaphore::new(state.config.concurrency));
    let mut slots: Vec<Option<EmissionResult>> = vec![None; emissions.len()];
    let mut set: JoinSet<(usize, EmissionResult)> = JoinSet::new();

    for (index, emission) in emissions.iter().enumerate() {
        let view = match views.get(&emission.view_key()) {
            Some(Ok(view)) => Arc::clone(view),
            Some(Err(err)) => {
                slots[index] = Some(EmissionResult::failed(emission.clone(), err.clone()));
                continue;
            }
            None => continue,
        };
        let job = Job {
            emission: emission.clone(),
            view,
            path: emission.output_path(out_root, &base),
            state: state.clone(),
            cancel: cancel.clone(),
        };
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            let emission = job.emission.clone();
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => job.execute().await,
                Err(_) => Err(EmissionError::Cancelled),
            };
            (index, EmissionResult { emission, outcome })
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("Emission task aborted: {e}"),
        }
    }

    let results: Vec<EmissionResult> = slots
        .into_iter()
        .zip(emissions)
        .map(|(slot, emission)| {
            slot.unwrap_or_else(|| {
                EmissionResult::failed(emission, EmissionError::Render("emission task aborted".into()))
            })
        })
        .collect();

    for result in &results {
        if let Err(err) = &result.outcome {
            err.log(&result.emission.to_string());
        }
    }

    let report = BatchReport::new(results, started.elapsed());
    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Batch finished"
    );
    report
}

// ────────────────────────────────────────────────────────────────────────────
// Single emission
// ────────────────────────────────────────────────────────────────────────────

struct Job {
    emission: Emission,
    view: Arc<View>,
    path: PathBuf,
    state: AppState,
    cancel: CancellationToken,
}

impl Job {
    async fn execute(self) -> Result<Outcome, EmissionError> {
        if self.cancel.is_cancelled() {
            return Err(EmissionError::Cancelled);
        }
        let started = Instant::now();

        let Job {
            emission,
            view,
            path,
            state,
            cancel,
        } = self;
        let render_cancel = cancel.clone();
        let format = emission.format;
        let scheme = emission.scheme.clone();
        let theme = state.config.themes.for_audience(emission.audience);
        let creation_date = state.config.creation_date;
        let schemes = Arc::clone(&state.schemes);

        let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, EmissionError> {
            let style = resolve(&schemes, &scheme, theme)?;
            let mut metadata = DocumentMetadata::for_view(&view);
            if let Some(date) = creation_date {
                metadata = metadata.with_creation_date(date);
            }
            let ctx = EmitContext {
                view: &view,
                style: &style,
                metadata: &metadata,
                cancel: &render_cancel,
            };
            Ok(emitter_for(format).emit(&ctx)?)
        })
        .await
        .map_err(|e| EmissionError::Render(format!("render task failed: {e}")))??;
        let rendered_in = started.elapsed();

        if cancel.is_cancelled() {
            return Err(EmissionError::Cancelled);
        }
        let size = bytes.len();
        write_atomic(&path, bytes, &cancel).await?;

        let elapsed = started.elapsed();
        debug!(
            emission = %emission,
            render_ms = rendered_in.as_millis() as u64,
            total_ms = elapsed.as_millis() as u64,
            bytes = size,
            "Emission written"
        );
        Ok(Outcome {
            path,
            bytes: size,
            elapsed,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::plan::plan;
    use crate::config::Config;
    use crate::fixtures::{make_master, make_roles};
    use crate::models::view::{Audience, Length};
    use crate::models::MasterStore;
    use crate::render::OutputFormat;
    use crate::theme::SchemeCatalogue;

    fn make_state_with(master: MasterStore, config: Config) -> AppState {
        AppState::new(config, master, make_roles(), SchemeCatalogue::builtin())
    }

    fn make_state() -> AppState {
        make_state_with(make_master(), Config::default())
    }

    fn make_plan(state: &AppState, schemes: &[&str], formats: &[OutputFormat]) -> Vec<Emission> {
        let roles = state.selected_roles().unwrap();
        let schemes: Vec<String> = schemes.iter().map(|s| s.to_string()).collect();
        plan(&roles, &Length::ALL, &schemes, &Audience::ALL, formats)
    }

    #[tokio::test]
    async fn test_every_emission_written() {
        let state = make_state();
        let out = tempfile::tempdir().unwrap();
        let emissions = make_plan(&state, &["charcoal"], &OutputFormat::ALL);
        let expected = emissions.len();

        let report = run(&state, emissions, out.path(), CancellationToken::new()).await;
        assert_eq!(report.total(), expected);
        assert_eq!(report.failed(), 0, "{}", report.failure_lines().join("\n"));
        for result in &report.results {
            let outcome = result.outcome.as_ref().unwrap();
            assert!(outcome.path.exists());
            assert!(outcome.bytes > 0);
        }
    }

    #[tokio::test]
    async fn test_results_in_plan_order() {
        let state = make_state();
        let out = tempfile::tempdir().unwrap();
        let emissions = make_plan(&state, &["charcoal", "burgundy"], &[OutputFormat::Markdown]);
        let planned = emissions.clone();

        let report = run(&state, emissions, out.path(), CancellationToken::new()).await;
        let reported: Vec<Emission> = report.results.iter().map(|r| r.emission.clone()).collect();
        assert_eq!(reported, planned);
    }

    #[tokio::test]
    async fn test_output_matches_layout() {
        let state = make_state();
        let out = tempfile::tempdir().unwrap();
        let role = state.selected_roles().unwrap()[0].clone();
        let emission = Emission {
            role: role.clone(),
            length: Length::Abbreviated,
            scheme: "forest_green".to_string(),
            audience: Audience::Ats,
            format: OutputFormat::Rtf,
        };

        let report = run(&state, vec![emission], out.path(), CancellationToken::new()).await;
        let expected = out
            .path()
            .join("ats")
            .join(&role)
            .join("short")
            .join("forest_green")
            .join(format!("jordan_rivera_{role}_short_forest_green.rtf"));
        assert!(expected.exists());
        assert_eq!(report.succeeded(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_rejected_for_every_format() {
        let mut master = make_master();
        if let Some(position) = master.positions.get_mut("initech") {
            position.employer = "Company Name".to_string();
        }
        let state = make_state_with(master, Config::default());
        let out = tempfile::tempdir().unwrap();
        let emissions = make_plan(&state, &["charcoal"], &OutputFormat::ALL);

        let report = run(&state, emissions, out.path(), CancellationToken::new()).await;
        let rejected: Vec<&EmissionResult> = report
            .results
            .iter()
            .filter(|r| matches!(r.outcome, Err(EmissionError::Validation(_))))
            .collect();
        assert!(!rejected.is_empty());
        for result in rejected {
            let path = result.emission.output_path(out.path(), "jordan_rivera");
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn test_cancelled_batch_writes_nothing() {
        let state = make_state();
        let out = tempfile::tempdir().unwrap();
        let emissions = make_plan(&state, &["charcoal"], &[OutputFormat::Pdf]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run(&state, emissions, out.path(), cancel).await;
        assert_eq!(report.succeeded(), 0);
        assert!(report
            .results
            .iter()
            .all(|r| matches!(r.outcome, Err(EmissionError::Cancelled))));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_one_is_deterministic() {
        let config = Config {
            concurrency: 1,
            ..Config::default()
        };
        let state = make_state_with(make_master(), config);
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let emissions = make_plan(&state, &["charcoal"], &[OutputFormat::Pdf, OutputFormat::Docx]);

        let first = run(&state, emissions.clone(), a.path(), CancellationToken::new()).await;
        let second = run(&state, emissions, b.path(), CancellationToken::new()).await;
        for (x, y) in first.results.iter().zip(&second.results) {
            let px = &x.outcome.as_ref().unwrap().path;
            let py = &y.outcome.as_ref().unwrap().path;
            assert_eq!(std::fs::read(px).unwrap(), std::fs::read(py).unwrap());
        }
    }

    #[test]
    fn test_views_prepared_once_per_key() {
        let state = make_state();
        let emissions = make_plan(&state, &["charcoal", "burgundy"], &OutputFormat::ALL);
        let keys: Vec<ViewKey> = emissions.iter().map(Emission::view_key).collect();
        let prepared = prepare_views(&state, &keys);
        assert_eq!(prepared.len(), state.roles.len() * Length::ALL.len() * Audience::ALL.len());
        assert!(prepared.iter().all(|(_, v)| v.is_ok()));
    }

    #[test]
    fn test_strict_rejects_warnings() {
        let mut master = make_master();
        master.achievements.clear();
        let lenient = make_state_with(master.clone(), Config::default());
        let strict = make_state_with(
            master,
            Config {
                strict: true,
                ..Config::default()
            },
        );
        let key = ViewKey {
            role: "backend".to_string(),
            length: Length::Full,
            audience: Audience::Human,
        };

        assert!(prepare_view(&lenient, &key, DeriveOptions::default()).is_ok());
        let err = prepare_view(&strict, &key, DeriveOptions::default()).unwrap_err();
        assert!(matches!(err, EmissionError::Validation(report) if report.errors.is_empty()));
    }
}
