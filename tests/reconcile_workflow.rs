use org_recon::reconcile::{
    normalize, reconcile_sources, CandidateStream, MasterSetBuilder, MismatchReport,
    ReconcileError, SourceRole,
};
use org_recon::sources::{FileSource, InMemorySource};
use std::io::Write;

fn run(master_json: &str, candidate_csv: &str) -> Vec<String> {
    let master = InMemorySource::new("master", master_json);
    let candidates = InMemorySource::new("candidates", candidate_csv);
    let mut mismatches = Vec::new();

    reconcile_sources::<ReconcileError, _>(&master, &candidates, b',', |raw| {
        mismatches.push(raw);
        Ok(())
    })
    .expect("reconciliation succeeds");

    mismatches
}

#[test]
fn reports_only_names_missing_from_master() {
    let mismatches = run(
        r#"[{"name":"Ohio State University"}]"#,
        "Name\nOhio State University\nMIT\n",
    );
    assert_eq!(mismatches, vec!["MIT"]);
}

#[test]
fn ampersand_spacing_is_not_reconciled() {
    assert_eq!(normalize("A&B College").as_str(), "ab college");
    assert_eq!(normalize("A & B  College").as_str(), "a b college");

    let mismatches = run(r#"[{"name":"A&B College"}]"#, "Name\nA & B  College\n");
    assert_eq!(mismatches, vec!["A & B  College"]);
}

#[test]
fn header_only_feed_reports_nothing() {
    let mismatches = run(
        r#"[{"name":"Ohio State University"},{"name":"MIT"}]"#,
        "Name,City,State\n",
    );
    assert!(mismatches.is_empty());

    assert!(run("[]", "").is_empty());
}

#[test]
fn empty_master_reports_every_candidate() {
    let mismatches = run("[]", "Name\nOhio State University\nMIT\n");
    assert_eq!(mismatches, vec!["Ohio State University", "MIT"]);
}

#[test]
fn formatting_differences_still_match() {
    let mismatches = run(
        r#"[{"name":"The Ohio State University"},{"name":"Texas A&M University"},{"name":"C++ Academy"}]"#,
        "Name,State\n\"The  Ohio State, University\",OH\nTEXAS AM  UNIVERSITY,TX\nC++   academy,NY\nC Academy,NY\n",
    );
    assert_eq!(mismatches, vec!["C Academy"]);
}

#[test]
fn mismatch_order_follows_feed_order() {
    let master = InMemorySource::new(
        "master",
        r#"[{"name":"Bravo"},{"name":"Delta"},{"name":"Foxtrot"}]"#,
    );
    let set = MasterSetBuilder::build(&master).expect("master builds");
    let feed = InMemorySource::new(
        "candidates",
        "Name\nZulu\nBravo\nAlpha\nDelta\nMike\nFoxtrot\nEcho\n",
    );
    let stream = CandidateStream::open(&feed, b',').expect("feed opens");

    let report = MismatchReport::collect(&set, stream).expect("feed reads");
    assert_eq!(report.mismatches, vec!["Zulu", "Alpha", "Mike", "Echo"]);
    assert_eq!(report.summary.scanned, 7);
    assert_eq!(report.summary.matched, 3);
    assert_eq!(report.summary.mismatched, 4);
}

#[test]
fn file_backed_sources_reconcile() {
    let mut master_file = tempfile::NamedTempFile::new().expect("master temp file");
    write!(
        master_file,
        r#"[{{"id":"1","name":"Ohio State University"}},{{"id":"2","name":"Iowa State University"}}]"#
    )
    .expect("write master");
    let mut feed_file = tempfile::NamedTempFile::new().expect("feed temp file");
    write!(
        feed_file,
        "School Name\tState\nIowa State University\tIA\nGrinnell College\tIA\n"
    )
    .expect("write feed");

    let master = FileSource::new(master_file.path());
    let feed = FileSource::new(feed_file.path());
    let mut mismatches = Vec::new();
    let (set, summary) = reconcile_sources::<ReconcileError, _>(&master, &feed, b'\t', |raw| {
        mismatches.push(raw);
        Ok(())
    })
    .expect("files reconcile");

    assert_eq!(set.len(), 2);
    assert_eq!(summary.scanned, 2);
    assert_eq!(mismatches, vec!["Grinnell College"]);
}

#[test]
fn missing_candidate_file_is_reported_as_unavailable() {
    let master = InMemorySource::new("master", r#"[{"name":"MIT"}]"#);
    let feed = FileSource::new("./no-such-feed.csv");

    let error = reconcile_sources::<ReconcileError, _>(&master, &feed, b',', |_| Ok(()))
        .expect_err("missing feed fails");
    match error {
        ReconcileError::SourceUnavailable { role, location, .. } => {
            assert_eq!(role, SourceRole::Candidate);
            assert_eq!(location, "./no-such-feed.csv");
        }
        other => panic!("expected unavailable candidate source, got {other:?}"),
    }
}

#[test]
fn stray_quote_does_not_swallow_later_rows() {
    let master = InMemorySource::new("master", r#"[{"name":"Known"}]"#);
    let feed = InMemorySource::new(
        "candidates",
        "Name,State\n\"Stray Quote College,OH\nAlpha,OH\nBeta,OH\nGamma,OH\n",
    );
    let mut mismatches = Vec::new();
    let (_, summary) = reconcile_sources::<ReconcileError, _>(&master, &feed, b',', |raw| {
        mismatches.push(raw);
        Ok(())
    })
    .expect("feed reconciles");

    assert_eq!(summary.scanned, 4);
    assert_eq!(summary.mismatched, 4);
    assert_eq!(
        mismatches,
        vec!["Stray Quote College,OH", "Alpha", "Beta", "Gamma"]
    );
}
