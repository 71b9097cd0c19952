use arrow::array::AsArray;
use arrow::datatypes::{DataType, Float64Type};

use crate::utils::{ProjectFixture, column_names, int_column};
use ukb_reader::{UkbError, read_relatedness, read_relatedness_files};

#[test]
fn test_relatedness_files_are_concatenated() -> ukb_reader::Result<()> {
    let project = ProjectFixture::new();
    project.write(
        "imputed/ukb_rel_a.dat",
        "ID1 ID2 HetHet IBS0 Kinship\n1000015 1000027 0.016 0.0012 0.2\n",
    );
    project.write(
        "imputed/ukb_rel_b.dat",
        "ID1 ID2 HetHet IBS0 Kinship\n1000039 1000041 0.1 0 0.25\n1000052 1000064 0.03 0 0.0625\n",
    );
    project.write("imputed/ukb_sqc_v2.txt", "");

    let relatedness = read_relatedness_files(project.root())?;
    assert_eq!(
        column_names(&relatedness),
        vec!["ID1", "ID2", "HetHet", "IBS0", "Kinship"]
    );
    assert_eq!(relatedness.num_rows(), 3);
    assert_eq!(
        int_column(&relatedness, "ID1"),
        vec![Some(1_000_015), Some(1_000_039), Some(1_000_052)]
    );

    // IBS0 is integral in one file and fractional in the other
    let schema = relatedness.schema();
    assert_eq!(schema.field_with_name("IBS0")?.data_type(), &DataType::Float64);
    let kinship = relatedness
        .column_by_name("Kinship")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert_eq!(kinship.value(2), 0.0625);
    Ok(())
}

#[test]
fn test_no_relatedness_files() {
    let project = ProjectFixture::new();
    assert!(matches!(
        read_relatedness(&project.layout()),
        Err(UkbError::NoMatchingFiles { .. })
    ));
}
