//! Tests to ensure error messages name what went wrong and where.

use std::path::PathBuf;

use cdn_check::error_handling::{
    DatasetError, ExportError, InitializationError, IpDbError, ProbeError,
};

#[test]
fn test_initialization_errors_name_the_input() {
    let err = InitializationError::InputError {
        path: PathBuf::from("asset/resolvers.txt"),
        message: "No such file or directory".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("asset/resolvers.txt"), "{text}");
    assert!(text.contains("No such file"), "{text}");

    let text = InitializationError::ResolverConfigError("resolvers.txt:3: bad".to_string()).to_string();
    assert!(text.contains("resolvers.txt:3"), "{text}");
}

#[test]
fn test_dataset_error_names_provider_and_value() {
    let text = DatasetError::InvalidCidr {
        provider: "Acme".to_string(),
        value: "300.0.0.0/8".to_string(),
    }
    .to_string();
    assert!(text.contains("Acme") && text.contains("300.0.0.0/8"), "{text}");
}

#[test]
fn test_ip_database_error_names_path() {
    let text = IpDbError::ParseError {
        path: PathBuf::from("GeoLite2-ASN.mmdb"),
        message: "invalid metadata".to_string(),
    }
    .to_string();
    assert!(text.contains("GeoLite2-ASN.mmdb"), "{text}");
}

#[test]
fn test_probe_and_export_errors() {
    let text = ProbeError::IdMismatch {
        resolver: "192.0.2.1:53".parse().unwrap(),
        expected: 1,
        actual: 2,
    }
    .to_string();
    assert!(text.contains("192.0.2.1:53"), "{text}");

    let text = ExportError::MissingOutputFile("csv".to_string()).to_string();
    assert!(text.contains("csv"), "{text}");
}
