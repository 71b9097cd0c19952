use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float64Type, TimeUnit};

use crate::utils::{ProjectFixture, column_names, int_column};
use ukb_reader::{
    ColumnType, PhenotypeLoader, TypeMapping, UkbError, read_ukb_phenotype_fields,
};

/// Two baskets where `31-0.0` was exported twice
fn two_basket_project() -> ProjectFixture {
    let project = ProjectFixture::new();
    project.write_manifest(
        "ukb11111",
        &[("eid", "Encoded anonymised participant ID", "Sequence"), ("31-0.0", "Sex", "Integer")],
    );
    project.write_basket("ukb11111", "eid,31-0.0\n1,0\n2,1\n");
    project.write_manifest(
        "ukb22222",
        &[
            ("eid", "Encoded anonymised participant ID", "Sequence"),
            ("31-0.0", "Sex", "Integer"),
            ("21022-0.0", "Age at recruitment", "Continuous"),
        ],
    );
    project.write_basket("ukb22222", "eid,31-0.0,21022-0.0\n2,1,54.5\n3,0,61.2\n");
    project
}

#[test]
fn test_duplicate_fields_are_suffixed_with_basket() -> ukb_reader::Result<()> {
    let project = two_basket_project();
    let phenotypes = read_ukb_phenotype_fields(project.root(), &["31-0.0", "21022-0.0"], "phenotypes")?;

    assert_eq!(
        column_names(&phenotypes),
        vec!["eid", "31-0.0_ukb11111", "31-0.0_ukb22222", "21022-0.0"]
    );
    assert_eq!(int_column(&phenotypes, "eid"), vec![Some(1), Some(2), Some(3)]);
    assert_eq!(
        int_column(&phenotypes, "31-0.0_ukb11111"),
        vec![Some(0), Some(1), None]
    );
    assert_eq!(
        int_column(&phenotypes, "31-0.0_ukb22222"),
        vec![None, Some(1), Some(0)]
    );

    let age = phenotypes
        .column_by_name("21022-0.0")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert!(age.is_null(0));
    assert_eq!(age.value(1), 54.5);
    assert_eq!(age.value(2), 61.2);
    Ok(())
}

#[test]
fn test_single_basket_field_is_not_suffixed() -> ukb_reader::Result<()> {
    let project = two_basket_project();
    let phenotypes = PhenotypeLoader::new(project.layout()).load(&["21022-0.0"])?;

    assert_eq!(column_names(&phenotypes), vec!["eid", "21022-0.0"]);
    assert_eq!(int_column(&phenotypes, "eid"), vec![Some(2), Some(3)]);
    Ok(())
}

#[test]
fn test_outer_join_keeps_every_participant() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write_manifest("ukb10001", &[("50-0.0", "Standing height", "Continuous")]);
    project.write_basket("ukb10001", "eid,50-0.0\n1,170.2\n2,\n3,181.0\n");
    project.write_manifest("ukb10002", &[("21001-0.0", "Body mass index", "Continuous")]);
    project.write_basket("ukb10002", "eid,21001-0.0\n3,24.1\n4,NA\n");
    project.write_manifest("ukb10003", &[("20116-0.0", "Smoking status", "Categorical (single)")]);
    project.write_basket("ukb10003", "eid,20116-0.0\n5,0\n");

    let phenotypes = PhenotypeLoader::new(project.layout())
        .load(&["50-0.0", "21001-0.0", "20116-0.0"])?;

    assert_eq!(
        int_column(&phenotypes, "eid"),
        vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
    );
    let bmi = phenotypes.column_by_name("21001-0.0").unwrap();
    assert_eq!(bmi.null_count(), 4);
    let smoking = phenotypes.column_by_name("20116-0.0").unwrap();
    assert_eq!(smoking.data_type(), &DataType::Utf8);
    assert_eq!(smoking.as_string::<i32>().value(4), "0");
    Ok(())
}

#[test]
fn test_columns_follow_type_tags() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write_manifest(
        "ukb55555",
        &[
            ("53-0.0", "Date of attending assessment centre", "Date"),
            ("20006-0.0", "Interpolated time", "Time"),
            ("31-0.0", "Sex", "Categorical (single)"),
            ("41270-0.0", "Diagnoses", "Categorical (multiple)"),
            ("30000-0.0", "White blood cell count", "Continuous"),
            ("90001-0.0", "Accelerometer", "Hologram"),
        ],
    );
    project.write_basket(
        "ukb55555",
        "eid,53-0.0,20006-0.0,31-0.0,41270-0.0,30000-0.0,90001-0.0\n\
         1,2008-05-01,08:30:00,1,I10,6.5,12\n\
         2,2009-11-23,,0,,7,\n",
    );

    let phenotypes = PhenotypeLoader::new(project.layout()).load(&[
        "53-0.0", "20006-0.0", "31-0.0", "41270-0.0", "30000-0.0", "90001-0.0",
    ])?;
    let schema = phenotypes.schema();
    let type_of = |name: &str| schema.field_with_name(name).unwrap().data_type().clone();

    assert_eq!(type_of("eid"), DataType::Int64);
    assert_eq!(type_of("53-0.0"), DataType::Date32);
    assert_eq!(type_of("20006-0.0"), DataType::Time64(TimeUnit::Microsecond));
    assert_eq!(type_of("31-0.0"), DataType::Utf8);
    assert_eq!(type_of("41270-0.0"), DataType::Utf8);
    assert_eq!(type_of("30000-0.0"), DataType::Float64);
    // Unknown tag: inferred from the data
    assert_eq!(type_of("90001-0.0"), DataType::Int64);

    let dates = phenotypes
        .column_by_name("53-0.0")
        .unwrap()
        .as_primitive::<Date32Type>();
    assert_eq!(dates.value_as_date(0).unwrap().to_string(), "2008-05-01");
    assert!(phenotypes.column_by_name("20006-0.0").unwrap().is_null(1));
    Ok(())
}

#[test]
fn test_custom_type_mapping() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write_manifest("ukb66666", &[("90001-0.0", "Accelerometer", "Hologram")]);
    project.write_basket("ukb66666", "eid,90001-0.0\n1,12\n");

    let loader = PhenotypeLoader::new(project.layout())
        .with_type_mapping(TypeMapping::default().with_tag("Hologram", ColumnType::Text));
    let phenotypes = loader.load(&["90001-0.0"])?;
    assert_eq!(
        phenotypes.column_by_name("90001-0.0").unwrap().data_type(),
        &DataType::Utf8
    );
    Ok(())
}

#[test]
fn test_untagged_column_outgrowing_the_sample_is_read_as_text() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write_manifest(
        "ukb77777",
        &[("31-0.0", "Sex", "Integer"), ("90-0.0", "Accelerometer", "Hologram")],
    );
    let mut contents = String::from("eid,31-0.0,90-0.0\n");
    for eid in 1..=1500 {
        let value = if eid == 1200 { "1.5".to_string() } else { eid.to_string() };
        contents.push_str(&format!("{eid},{},{value}\n", eid % 2));
    }
    project.write_basket("ukb77777", &contents);

    let phenotypes = PhenotypeLoader::new(project.layout()).load(&["31-0.0", "90-0.0"])?;

    assert_eq!(phenotypes.num_rows(), 1500);
    let schema = phenotypes.schema();
    assert_eq!(schema.field_with_name("eid").unwrap().data_type(), &DataType::Int64);
    assert_eq!(schema.field_with_name("31-0.0").unwrap().data_type(), &DataType::Int64);
    assert_eq!(schema.field_with_name("90-0.0").unwrap().data_type(), &DataType::Utf8);

    let values = phenotypes.column_by_name("90-0.0").unwrap().as_string::<i32>();
    assert_eq!(values.value(0), "1");
    assert_eq!(values.value(1199), "1.5");
    assert_eq!(values.value(1499), "1500");
    Ok(())
}

#[test]
fn test_unknown_fields_are_omitted() -> ukb_reader::Result<()> {
    let project = two_basket_project();
    let loader = PhenotypeLoader::new(project.layout());

    let nothing = loader.load(&["99999-0.0"])?;
    assert_eq!(column_names(&nothing), vec!["eid"]);
    assert_eq!(nothing.num_rows(), 0);

    let partial = loader.load(&["99999-0.0", "21022-0.0"])?;
    assert_eq!(column_names(&partial), vec!["eid", "21022-0.0"]);

    // Matching is exact, a bare field id does not select its instances
    let bare = loader.load(&["21022"])?;
    assert_eq!(column_names(&bare), vec!["eid"]);
    Ok(())
}

#[test]
fn test_empty_project_gives_identifier_only() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    let phenotypes = PhenotypeLoader::new(project.layout()).load(&["31-0.0"])?;
    assert_eq!(column_names(&phenotypes), vec!["eid"]);
    assert_eq!(phenotypes.num_rows(), 0);
    Ok(())
}

#[test]
fn test_missing_project_dir_is_named() {
    let project = ProjectFixture::new();
    let missing = project.root().join("ukb00000");

    match read_ukb_phenotype_fields(&missing, &["31-0.0"], "phenotypes") {
        Err(UkbError::PathNotFound { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected PathNotFound, got {other:?}"),
    }
}

#[test]
fn test_custom_phenotype_subdir() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write("pheno/ukb77777_field_finder.txt", "field\tukb_type\n31-0.0\tInteger\n");
    project.write("pheno/ukb77777.csv", "eid,31-0.0\n9,1\n");

    let phenotypes = read_ukb_phenotype_fields(project.root(), &["31-0.0"], "pheno")?;
    assert_eq!(int_column(&phenotypes, "31-0.0"), vec![Some(1)]);

    match read_ukb_phenotype_fields(project.root(), &["31-0.0"], "phenotypes_v2") {
        Err(UkbError::PathNotFound { path, .. }) => {
            assert_eq!(path, project.root().join("phenotypes_v2"));
        }
        other => panic!("expected PathNotFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_basket_missing_listed_column() {
    let project = ProjectFixture::new();
    project.write_manifest("ukb88888", &[("31-0.0", "Sex", "Integer")]);
    let data = project.write_basket("ukb88888", "eid,34-0.0\n1,1950\n");

    match PhenotypeLoader::new(project.layout()).load(&["31-0.0"]) {
        Err(UkbError::MissingColumn { column, path }) => {
            assert_eq!(column, "31-0.0");
            assert_eq!(path, data);
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}
