// src/runner.rs
//
// One invocation: START → AUTHENTICATED → FETCHED → EXTRACTED → MERGED → SAVED.
// Any stage can fail; the only in-process retry is one fresh login when the
// session expires during the fetch. Everything else waits for the next
// scheduled run.

use crate::{
    error::{Error, RunError, Stage},
    merge::merge,
    progress::Progress,
    session::{Credentials, RawPage, SessionClient},
    specs,
    store::Store,
};

/// Summary of what a run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub appended: usize,
    pub updated: usize,
    /// Extracted days below the stored maximum, left untouched
    pub ignored: usize,
    /// Rows in the table after the merge
    pub total: usize,
    pub last_day: u32,
    /// False for dry runs and for runs that changed nothing in an existing file
    pub saved: bool,
    pub reauthenticated: bool,
}

/// Run the pipeline once. `progress` can be None (no UI updates) or Some(&mut impl Progress).
/// With `dry_run`, stops after MERGED and leaves the file alone.
pub fn run<C: SessionClient>(
    client: &C,
    creds: &Credentials,
    store: &Store,
    dry_run: bool,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, RunError> {
    let result = run_stages(client, creds, store, dry_run, &mut progress);
    if let Some(p) = progress.as_deref_mut() {
        p.finish(result.is_ok());
    }
    result
}

fn run_stages<C: SessionClient>(
    client: &C,
    creds: &Credentials,
    store: &Store,
    dry_run: bool,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<RunSummary, RunError> {
    // START → AUTHENTICATED
    let session = client.authenticate(creds).map_err(RunError::at(Stage::Authenticated))?;
    advance(progress, Stage::Authenticated, format!("logged in as team {}", creds.team_id()));

    // AUTHENTICATED → FETCHED, with one fresh login if the session died
    let (raw, reauthenticated) = match client.fetch_report(&session) {
        Ok(raw) => (raw, false),
        Err(Error::AuthExpired(why)) => {
            logw!("Session expired during fetch ({why}); logging in again");
            if let Some(p) = progress.as_deref_mut() {
                p.retry(&why);
            }
            drop(session);
            let session = client.authenticate(creds).map_err(RunError::at(Stage::Authenticated))?;
            let raw = client.fetch_report(&session).map_err(RunError::at(Stage::Fetched))?;
            (raw, true)
        }
        Err(e) => return Err(RunError::at(Stage::Fetched)(e)),
    };
    advance(progress, Stage::Fetched, describe(&raw));

    // FETCHED → EXTRACTED
    let records = specs::extract(&raw).map_err(RunError::at(Stage::Extracted))?;
    drop(raw);
    advance(progress, Stage::Extracted, format!("{} days on the page", records.len()));

    // EXTRACTED → MERGED, under the store lock until the save
    let merged_err = |e: std::io::Error| RunError::at(Stage::Merged)(Error::Io(e));
    let lock = store.lock().map_err(merged_err)?;
    let existing = store.load().map_err(merged_err)?;
    let existed = store.path().exists();
    let outcome = merge(existing, records);
    advance(
        progress,
        Stage::Merged,
        format!("{} appended, {} updated, {} rows", outcome.appended, outcome.updated, outcome.table.len()),
    );

    let mut summary = RunSummary {
        appended: outcome.appended,
        updated: outcome.updated,
        ignored: outcome.ignored,
        total: outcome.table.len(),
        last_day: outcome.table.max_day(),
        saved: false,
        reauthenticated,
    };

    if dry_run {
        logf!("Dry run; {} not written", store.path().display());
        return Ok(summary);
    }

    // MERGED → SAVED. An unchanged existing file is left as is.
    if outcome.changed() || !existed {
        store
            .save(&outcome.table)
            .map_err(|e| RunError::at(Stage::Saved)(Error::Io(e)))?;
        summary.saved = true;
    }
    drop(lock);
    advance(
        progress,
        Stage::Saved,
        if summary.saved { format!("wrote {}", store.path().display()) } else { s!("no changes") },
    );

    Ok(summary)
}

fn advance(progress: &mut Option<&mut dyn Progress>, stage: Stage, msg: String) {
    logf!("{stage}: {msg}");
    if let Some(p) = progress.as_deref_mut() {
        p.stage(stage);
        p.log(&msg);
    }
}

fn describe(raw: &RawPage) -> String {
    match raw {
        RawPage::Table(doc) => format!("table page, {} bytes", doc.len()),
        RawPage::Plots(pages) => format!("{} plot pages", pages.len()),
    }
}
