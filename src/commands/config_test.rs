use super::*;
use tempfile::TempDir;

#[test]
fn test_init_writes_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nest-arrange.toml");

    init(&path, false).unwrap();
    assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nest-arrange.toml");
    std::fs::write(&path, "ppi = 300.0\n").unwrap();

    let err = init(&path, false).unwrap_err();
    assert!(matches!(err, ArrangeError::InvalidConfig(_)));
    assert_eq!(Settings::load_from(&path).unwrap().ppi, 300.0);
}

#[test]
fn test_init_force_overwrites() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nest-arrange.toml");
    std::fs::write(&path, "ppi = 300.0\n").unwrap();

    init(&path, true).unwrap();
    assert_eq!(Settings::load_from(&path).unwrap().ppi, 600.0);
}
