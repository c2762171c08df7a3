//! End-to-end behaviour on small hand-written protocols

mod common;

use std::sync::Arc;

use common::{scenario_p1, Fixture};
use filelist_db::{Error, Filter, Group, Model, ProbeClass, ProtocolId, Purpose, ScoringMode};

#[test]
fn test_p1_scenario() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    let db = fixture.db();
    let p1 = Filter::new().protocol("P1");

    assert_eq!(db.clients(&p1).unwrap(), ["c1", "c2"]);
    assert_eq!(db.models(&p1).unwrap(), [Model::new("m1", "c1")]);

    let pairs = db.probe_pairs(&p1.clone().group(Group::Dev)).unwrap();
    let tuples: Vec<_> = pairs.iter().map(|p| p.as_tuple()).collect();
    assert_eq!(
        tuples,
        [("s020", "m1", "c1", "c1"), ("s021", "m1", "c1", "c2")]
    );
    assert_eq!(pairs[0].class(), ProbeClass::Client);
    // The impostor access is surfaced, not rejected
    assert_eq!(pairs[1].class(), ProbeClass::Impostor);

    assert_eq!(db.scoring_mode(), Some(ScoringMode::Dense));
}

#[test]
fn test_world_records_are_enrollments_with_client_as_model() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    let db = fixture.db();

    let world = db
        .objects(&Filter::new().protocol("P1").group(Group::World))
        .unwrap();
    assert_eq!(world.len(), 3);
    for record in &world {
        assert_eq!(record.purpose(), Purpose::Enroll);
        assert_eq!(record.model_id(), Some(record.client_id()));
        assert_eq!(record.protocol(), &ProtocolId::named("P1"));
    }
}

#[test]
fn test_dense_pairs_are_probes_times_models() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1", "e2 m2 c2", "e3 m3 c3"]);
    fixture.write("dev/for_probes.lst", &["p1 c1", "p2 c4"]);
    let db = fixture.db();

    let pairs = db.probe_pairs(&Filter::new().group(Group::Dev)).unwrap();
    assert_eq!(pairs.len(), 6);
    assert_eq!(
        pairs.iter().filter(|p| p.class() == ProbeClass::Client).count(),
        1
    );
}

#[test]
fn test_sparse_pairs_follow_score_rows() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1", "e2 m2 c2", "e3 m3 c3"]);
    fixture.write(
        "dev/for_scores.lst",
        &["p1 m1 c1 c1", "p1 m2 c2 c1", "p2 m3 c3 c2", "p3 m1 c1 c3"],
    );
    let db = fixture.db();

    let pairs = db.probe_pairs(&Filter::new().group(Group::Dev)).unwrap();
    assert_eq!(pairs.len(), 4);
    assert_eq!(db.scoring_mode(), Some(ScoringMode::Sparse));

    let p1: Vec<_> = pairs.iter().filter(|p| p.path() == "p1").collect();
    assert_eq!(p1.len(), 2);
    assert_eq!(p1[1].claimed_client_id(), "c2");
}

#[test]
fn test_mode_mismatch_across_protocols() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write("P2/dev/for_models.lst", &["s010 m1 c1"]);
    fixture.write("P2/dev/for_scores.lst", &["s020 m1 c1 c1"]);
    let db = fixture.db();

    assert_eq!(db.clients(&Filter::new().protocol("P1")).unwrap().len(), 2);
    let err = db.clients(&Filter::new().protocol("P2")).unwrap_err();
    assert!(matches!(
        err,
        Error::ProtocolModeMismatch {
            committed: ScoringMode::Dense,
            ..
        }
    ));
    assert!(!db.is_loaded(&ProtocolId::named("P2")));
}

#[test]
fn test_preload_commits_mode_from_first_protocol() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write("P2/dev/for_models.lst", &["s010 m1 c1"]);
    fixture.write("P2/dev/for_probes.lst", &["s020 c1"]);
    fixture.write("P3/dev/for_models.lst", &["s010 m1 c1"]);
    fixture.write("P3/dev/for_scores.lst", &["s020 m1 c1 c1"]);
    fixture.write("not_a_protocol/readme.txt", &["nothing here"]);
    let db = fixture.db();

    assert_eq!(
        db.protocols().unwrap(),
        [
            ProtocolId::named("P1"),
            ProtocolId::named("P2"),
            ProtocolId::named("P3")
        ]
    );
    assert!(matches!(
        db.preload(),
        Err(Error::ProtocolModeMismatch { .. })
    ));
    assert!(db.is_loaded(&ProtocolId::named("P1")));
    assert!(!db.is_loaded(&ProtocolId::named("P3")));
}

#[test]
fn test_malformed_world_row_publishes_nothing() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write(
        "P1/norm/train_world.lst",
        &["s001 c1", "s002 c1 extra", "s003 c2"],
    );
    let db = fixture.db();

    let err = db.objects(&Filter::new().protocol("P1")).unwrap_err();
    match err {
        Error::MalformedRow {
            line,
            expected,
            found,
            ..
        } => {
            assert_eq!((line, expected, found), (2, 2, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!db.is_loaded(&ProtocolId::named("P1")));
    assert!(db.clients(&Filter::new().protocol("P1")).is_err());
}

#[test]
fn test_unknown_protocol_is_not_an_empty_result() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    let db = fixture.db();

    assert!(matches!(
        db.clients(&Filter::new().protocol("P9")),
        Err(Error::UnknownProtocol(_))
    ));
    let none = db
        .objects(&Filter::new().protocol("P1").client_id("nobody"))
        .unwrap();
    assert!(none.is_empty());
    assert!(db
        .probe_pairs(&Filter::new().protocol("P1").group(Group::Eval))
        .unwrap()
        .is_empty());
}

#[test]
fn test_default_protocol_from_config() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    let db = fixture.builder().protocol("P1").build().unwrap();
    assert_eq!(db.clients(&Filter::new()).unwrap(), ["c1", "c2"]);
}

#[test]
fn test_missing_model_list() {
    let fixture = Fixture::new();
    fixture.write("dev/for_probes.lst", &["p1 c1"]);
    let db = fixture.db();
    assert!(matches!(
        db.objects(&Filter::new()),
        Err(Error::MissingFile { .. })
    ));
}

#[test]
fn test_duplicate_sample_in_partition() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1", "e1 m1 c1"]);
    fixture.write("dev/for_probes.lst", &["p1 c1"]);
    let err = fixture.db().objects(&Filter::new()).unwrap_err();
    assert!(matches!(err, Error::DuplicateSample { line: 2, .. }));
}

#[test]
fn test_duplicate_score_pair() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1"]);
    fixture.write("dev/for_scores.lst", &["p1 m1 c1 c1", "p1 m1 c1 c1"]);
    let err = fixture.db().objects(&Filter::new()).unwrap_err();
    assert!(matches!(err, Error::DuplicateSample { .. }));
}

#[test]
fn test_same_path_in_dev_and_eval_is_allowed() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1"]);
    fixture.write("dev/for_probes.lst", &["p1 c1"]);
    fixture.write("eval/for_models.lst", &["e1 m2 c1"]);
    fixture.write("eval/for_probes.lst", &["p1 c1"]);
    let db = fixture.db();
    assert_eq!(db.objects(&Filter::new()).unwrap().len(), 4);
    assert_eq!(db.probe_pairs(&Filter::new()).unwrap().len(), 2);
}

#[test]
fn test_score_against_unknown_model_is_fatal() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1"]);
    fixture.write("dev/for_scores.lst", &["p1 m1 c1 c1", "p2 m9 c9 c1"]);
    let err = fixture.db().objects(&Filter::new()).unwrap_err();
    match err {
        Error::UnknownModel { model_id, .. } => assert_eq!(model_id, "m9"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inconsistent_model_owner() {
    let fixture = Fixture::new();
    fixture.write("dev/for_models.lst", &["e1 m1 c1", "e2 m1 c2"]);
    fixture.write("dev/for_probes.lst", &["p1 c1"]);
    let err = fixture.db().models(&Filter::new()).unwrap_err();
    assert!(matches!(err, Error::InconsistentModel { .. }));
}

#[test]
fn test_mode_detected_from_eval_without_dev() {
    let fixture = Fixture::new();
    fixture.write("eval/for_models.lst", &["e1 m1 c1"]);
    fixture.write("eval/for_scores.lst", &["p1 m1 c1 c1"]);
    let db = fixture.db();
    assert_eq!(db.probe_pairs(&Filter::new()).unwrap().len(), 1);
    assert_eq!(db.scoring_mode(), Some(ScoringMode::Sparse));
}

#[test]
fn test_concurrent_queries_share_one_index() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    let db = fixture.db();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let pairs = db
                    .probe_pairs(&Filter::new().protocol("P1"))
                    .unwrap();
                assert_eq!(pairs.len(), 2);
            });
        }
    });
    assert!(db.is_loaded(&ProtocolId::named("P1")));
}

#[test]
fn test_eval_group_must_carry_committed_list() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write("P1/eval/for_models.lst", &["s030 m2 c2"]);
    fixture.write("P1/eval/for_scores.lst", &["s040 m2 c2 c2"]);
    let db = fixture.db();

    let err = db.objects(&Filter::new().protocol("P1")).unwrap_err();
    assert!(matches!(
        err,
        Error::ProtocolModeMismatch {
            committed: ScoringMode::Dense,
            ..
        }
    ));
    assert!(!db.is_loaded(&ProtocolId::named("P1")));
    assert_eq!(db.scoring_mode(), None);
}

#[test]
fn test_duplicate_sample_across_world_lists() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write("P1/norm/train_optional_world_1.lst", &["s009 c3", "s001 c1"]);
    let db = fixture.db();

    match db.objects(&Filter::new().protocol("P1")).unwrap_err() {
        Error::DuplicateSample { path, line, sample } => {
            assert!(path.ends_with("norm/train_optional_world_1.lst"));
            assert_eq!((line, sample.as_str()), (2, "s001"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reload_leaves_other_protocols_untouched() {
    let fixture = Fixture::new();
    scenario_p1(&fixture);
    fixture.write("P2/dev/for_models.lst", &["s010 m1 c1"]);
    fixture.write("P2/dev/for_probes.lst", &["s020 c1"]);
    let db = fixture.db();
    let (p1, p2) = (ProtocolId::named("P1"), ProtocolId::named("P2"));

    let p1_before = db.index(&p1).unwrap();
    let p2_before = db.index(&p2).unwrap();

    fixture.write("P1/dev/for_probes.lst", &["s020 c1", "s021 c2", "s022 c2"]);
    let p1_after = db.reload(&p1).unwrap();

    assert!(!Arc::ptr_eq(&p1_before, &p1_after));
    assert!(Arc::ptr_eq(&p1_after, &db.index(&p1).unwrap()));
    assert!(Arc::ptr_eq(&p2_before, &db.index(&p2).unwrap()));
    // Readers of the old snapshot still see it unchanged
    assert_eq!(p1_before.len() + 1, p1_after.len());
}
