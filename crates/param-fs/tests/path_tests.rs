use param_fs::{FileFormat, ParamFile};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("params.yaml", FileFormat::Yaml)]
#[case("params.yml", FileFormat::Yaml)]
#[case("dir/params.JSON", FileFormat::Json)]
#[case("dir/params", FileFormat::Yaml)]
fn test_format_detection(#[case] input: &str, #[case] expected: FileFormat) {
    assert_eq!(ParamFile::new(input).format().unwrap(), expected);
}

#[test]
fn test_unsupported_format() {
    let result = ParamFile::new("params.toml").format();
    assert!(matches!(
        result,
        Err(param_fs::Error::UnsupportedFormat { ref extension }) if extension == "toml"
    ));
}

#[rstest]
#[case("configs/train.yaml", Some("train.yaml"))]
#[case("train.yaml", Some("train.yaml"))]
#[case("configs/", Some("configs"))]
fn test_file_name(#[case] input: &str, #[case] expected: Option<&str>) {
    assert_eq!(ParamFile::new(input).file_name(), expected);
}

proptest! {
    #[test]
    fn test_normalized_paths_have_no_backslashes_or_double_slashes(s in "\\PC*") {
        let path = ParamFile::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
        prop_assert!(!path.as_str().contains("//"));

        let roundtripped = ParamFile::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }
}
