//! Shared fixtures: list-file trees in temporary directories

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use filelist_db::{Database, DatabaseBuilder};
use tempfile::TempDir;

/// A temporary base directory that list files are written into.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `rows` (one per line) to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, rows: &[&str]) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut content = rows.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        path
    }

    pub fn builder(&self) -> DatabaseBuilder {
        Database::builder(self.path())
    }

    pub fn db(&self) -> Database {
        self.builder().build().unwrap()
    }
}

/// The `/data/P1` protocol: three world rows, one model, two dense probes.
pub fn scenario_p1(fixture: &Fixture) {
    fixture.write(
        "P1/norm/train_world.lst",
        &["s001 c1", "s002 c1", "s003 c2"],
    );
    fixture.write("P1/dev/for_models.lst", &["s010 m1 c1"]);
    fixture.write("P1/dev/for_probes.lst", &["s020 c1", "s021 c2"]);
}

/// A two-group protocol with world, optional world, T-norm and Z-norm lists,
/// written under `<base>/example_fl` with both scoring lists present.
///
/// World clients are 1 and 2, dev models 3 and 4, eval models 5 and 6,
/// T-norm models 7 and 8, Z-norm clients 9 and 10.
pub fn example_fl(fixture: &Fixture) {
    let root = "example_fl";
    let at = |rel: &str| format!("{root}/{rel}");

    fixture.write(
        &at("norm/train_world.lst"),
        &[
            "data/world_c1_s1 1",
            "data/world_c1_s2 1",
            "data/world_c1_s3 1",
            "data/world_c1_s4 1",
            "data/world_c2_s1 2",
            "data/world_c2_s2 2",
            "data/world_c2_s3 2",
            "data/world_c2_s4 2",
        ],
    );
    fixture.write(
        &at("norm/train_optional_world_1.lst"),
        &["data/ow1_c1_s1 1", "data/ow1_c2_s1 2"],
    );
    fixture.write(
        &at("norm/train_optional_world_2.lst"),
        &["data/ow2_c1_s1 1", "", "   ", "data/ow2_c2_s1 2"],
    );

    fixture.write(
        &at("dev/for_models.lst"),
        &[
            "data/model3_session1_sample1 3 3",
            "data/model3_session1_sample2 3 3",
            "data/model3_session2_sample1 3 3",
            "data/model3_session2_sample2 3 3",
            "data/model4_session1_sample1 4 4",
            "data/model4_session1_sample2 4 4",
            "data/model4_session2_sample1 4 4",
            "data/model4_session2_sample2 4 4",
        ],
    );
    fixture.write(
        &at("dev/for_scores.lst"),
        &[
            "data/model3_session3_sample1 3 3 3",
            "data/model3_session3_sample2 3 3 3",
            "data/model3_session3_sample3 3 3 3",
            "data/model3_session3_sample4 3 3 3",
            "data/model4_session3_sample1 4 4 4",
            "data/model4_session3_sample2 4 4 4",
            "data/model4_session3_sample3 4 4 4",
            "data/model4_session3_sample4 4 4 4",
            "data/model3_session3_sample1 4 4 3",
            "data/model3_session3_sample2 4 4 3",
            "data/model4_session3_sample1 3 3 4",
            "data/model4_session3_sample2 3 3 4",
        ],
    );
    fixture.write(
        &at("dev/for_probes.lst"),
        &[
            "data/model3_session3_sample1 3",
            "data/model3_session3_sample2 3",
            "data/model3_session3_sample3 3",
            "data/model3_session3_sample4 3",
            "data/model4_session3_sample1 4",
            "data/model4_session3_sample2 4",
            "data/model4_session3_sample3 4",
            "data/model4_session3_sample4 4",
        ],
    );
    fixture.write(
        &at("dev/for_tnorm.lst"),
        &[
            "data/model7_session1_sample1 7 7",
            "data/model7_session1_sample2 7 7",
            "data/model7_session2_sample1 7 7",
            "data/model7_session2_sample2 7 7",
            "data/model8_session1_sample1 8 8",
            "data/model8_session1_sample2 8 8",
            "data/model8_session2_sample1 8 8",
            "data/model8_session2_sample2 8 8",
        ],
    );
    fixture.write(
        &at("dev/for_znorm.lst"),
        &[
            "data/model9_session1_sample1 9",
            "data/model9_session1_sample2 9",
            "data/model9_session2_sample1 9",
            "data/model9_session2_sample2 9",
            "data/model10_session1_sample1 10",
            "data/model10_session1_sample2 10",
            "data/model10_session2_sample1 10",
            "data/model10_session2_sample2 10",
        ],
    );

    fixture.write(
        &at("eval/for_models.lst"),
        &[
            "data/model5_session1_sample1 5 5",
            "data/model5_session1_sample2 5 5",
            "data/model6_session1_sample1 6 6",
            "data/model6_session1_sample2 6 6",
        ],
    );
    fixture.write(
        &at("eval/for_scores.lst"),
        &[
            "data/model5_session2_sample1 5 5 5",
            "data/model5_session2_sample1 6 6 5",
            "data/model6_session2_sample1 6 6 6",
            "data/model6_session2_sample1 5 5 6",
        ],
    );
    fixture.write(
        &at("eval/for_probes.lst"),
        &["data/model5_session2_sample1 5", "data/model6_session2_sample1 6"],
    );
}
