use arrow::array::AsArray;

use crate::utils::{ProjectFixture, column_names, int_column, set_modified};
use ukb_reader::{UkbError, read_fam, read_fam_file};

#[test]
fn test_reads_most_recently_modified_fam() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    let old = project.write("genotyped/ukb_cal_chr1_v1.fam", "1\t1\t0\t0\t1\tBatch_b001\n");
    let new = project.write(
        "genotyped/ukb_cal_chr1_v2.fam",
        "1000015\t1000015\t0\t0\t2\tUKBiLEVEAX_b1\n1000027\t1000027\t0\t0\t1\tBatch_b050\n",
    );
    set_modified(&old, 200);
    set_modified(&new, 100);
    // Newest by mtime wins even though its name sorts first
    let fam = read_fam_file(project.root())?;
    assert_eq!(fam.num_rows(), 1);

    set_modified(&new, 300);
    let fam = read_fam(&project.layout())?;
    assert_eq!(column_names(&fam), vec!["FID", "IID", "PID", "MID", "SEX", "BATCH"]);
    assert_eq!(int_column(&fam, "IID"), vec![Some(1_000_015), Some(1_000_027)]);
    assert_eq!(int_column(&fam, "SEX"), vec![Some(2), Some(1)]);
    assert_eq!(
        fam.column_by_name("BATCH").unwrap().as_string::<i32>().value(1),
        "Batch_b050"
    );
    Ok(())
}

#[test]
fn test_equal_mtimes_pick_greatest_name() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    let a = project.write("genotyped/a.fam", "1 1 0 0 1 b1\n");
    let b = project.write("genotyped/b.fam", "2 2 0 0 2 b1\n3 3 0 0 1 b2\n");
    set_modified(&a, 50);
    set_modified(&b, 50);

    let fam = read_fam_file(project.root())?;
    assert_eq!(int_column(&fam, "IID"), vec![Some(2), Some(3)]);
    Ok(())
}

#[test]
fn test_comma_delimited_fam() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write("genotyped/ukb.fam", "-1,-1,0,0,0,redacted3\n5,5,0,0,2,Batch_b002\n");

    let fam = read_fam_file(project.root())?;
    assert_eq!(int_column(&fam, "FID"), vec![Some(-1), Some(5)]);
    Ok(())
}

#[test]
fn test_missing_fam_file() {
    let project = ProjectFixture::new();
    project.write("genotyped/ukb.bim", "1\trs1\t0\t100\tA\tG\n");

    assert!(matches!(
        read_fam_file(project.root()),
        Err(UkbError::NoMatchingFiles { .. })
    ));
}

#[test]
fn test_missing_genotyped_dir() {
    let project = ProjectFixture::new();
    std::fs::remove_dir(project.root().join("genotyped")).unwrap();

    match read_fam_file(project.root()) {
        Err(UkbError::PathNotFound { path, .. }) => {
            assert_eq!(path, project.root().join("genotyped"));
        }
        other => panic!("expected PathNotFound, got {other:?}"),
    }
}
