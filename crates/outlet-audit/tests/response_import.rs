use outlet_audit::audit::{ChecklistResponseImporter, ResponseImportError, ScoreStatus, VisitId};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("outlet-audit-{}-{name}", std::process::id()));
    path
}

#[test]
fn imports_export_from_disk_and_scores_visits() {
    let path = fixture_path("responses.csv");
    fs::write(
        &path,
        "Visit ID,Checklist Point ID,Response,Notes,NOK Remark\n\
         7,1,OK,,\n\
         7,2,OK,,\n\
         7,3,NOT OK,Broken freezer seal,Call maintenance\n\
         7,4,N/A,,\n\
         8,1,ok,,\n\
         8,2,unknown,,\n",
    )
    .expect("fixture written");

    let imported = ChecklistResponseImporter::from_path(&path).expect("export imports");
    fs::remove_file(&path).ok();

    assert_eq!(imported.responses().len(), 6);

    let by_visit = imported.by_visit();
    assert_eq!(by_visit.len(), 2);
    let (visit, score) = by_visit[0];
    assert_eq!(visit, VisitId(7));
    assert_eq!(score.ok_percentage, 66.7);
    assert_eq!(score.nok_percentage, 33.3);
    assert_eq!(score.status, ScoreStatus::Critical);

    let (_, second) = by_visit[1];
    assert_eq!(second.unknown_count, 1);
    assert_eq!(second.ok_percentage, 100.0);

    let overall = imported.overall();
    assert_eq!(overall.ok_count, 3);
    assert_eq!(overall.unknown_count, 1);
    assert_eq!(overall.ok_percentage, 75.0);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = ChecklistResponseImporter::from_path(fixture_path("does-not-exist.csv"))
        .expect_err("missing file rejected");
    assert!(matches!(err, ResponseImportError::Io(_)));
}
