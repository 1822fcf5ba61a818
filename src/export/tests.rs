use super::*;
use crate::dns::{DnsResult, ProbeAnswer};
use crate::fingerprint::{Category, Classifier, FingerprintDataset};
use crate::geoip::{AsnInfo, IpInfo};
use crate::target::classify_target;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

fn sample() -> (Vec<CheckInfo>, Vec<CheckResult>) {
    let mut dns = DnsResult::default();
    dns.absorb(ProbeAnswer {
        a: vec![Ipv4Addr::new(198, 51, 100, 7)],
        aaaa: Vec::new(),
        cname: vec![
            "www.example.org.cdn.acme.test".to_string(),
            "d111.edge.acme.test".to_string(),
        ],
    });
    let mut domain = CheckInfo::from_domain(&classify_target("www.example.org", true), Some(&dns));
    domain.ip_info.insert(
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7)),
        IpInfo {
            location: None,
            asn: Some(AsnInfo {
                number: 64500,
                organization: Some("Acme Edge".to_string()),
            }),
        },
    );
    let ip = CheckInfo::from_ip(&classify_target("192.0.2.1", true));
    let infos = vec![domain, ip];

    let mut dataset = FingerprintDataset::default();
    dataset.cdn.add_cname("Acme", "acme.test");
    let results = Classifier::new(Arc::new(dataset)).classify(&infos);
    (infos, results)
}

#[test]
fn test_shapes_follow_output_level() {
    let (infos, results) = sample();

    match shape_output(OutputLevel::Default, &infos, results.clone()) {
        OutputRows::Results(rows) => assert_eq!(rows.len(), 2),
        other => panic!("unexpected shape {other:?}"),
    }

    match shape_output(OutputLevel::Quiet, &infos, results.clone()) {
        OutputRows::Results(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].target, "192.0.2.1");
            assert!(rows[0].category.is_none());
        }
        other => panic!("unexpected shape {other:?}"),
    }

    match shape_output(OutputLevel::Detail, &infos, results) {
        OutputRows::Details(rows) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].category, Some(Category::Cdn));
            assert_eq!(rows[0].info.cname.len(), 2);
            assert_eq!(rows[0].providers(), vec!["Acme"]);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn test_merge_details_drops_unpaired_entries() {
    let (infos, results) = sample();
    assert_eq!(merge_details(&infos, &results[..1]).len(), 1);
}

#[test]
fn test_json_output() {
    let (infos, results) = sample();
    let rows = shape_output(OutputLevel::Detail, &infos, results);

    let mut buffer = Vec::new();
    assert_eq!(write_json(&rows, &mut buffer).unwrap(), 2);

    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    let first = &value[0];
    assert_eq!(first["formatted"], "www.example.org");
    assert_eq!(first["category"], "CDN");
    assert_eq!(first["matches"][0]["provider"], "Acme");
    assert_eq!(first["matches"][0]["signal"], "cname");
    assert_eq!(first["ip_info"]["198.51.100.7"]["asn"]["number"], 64500);
    assert!(value[1]["category"].is_null());
}

#[test]
fn test_csv_output_flattens_lists() {
    let (infos, results) = sample();
    let rows = shape_output(OutputLevel::Detail, &infos, results);

    let mut buffer = Vec::new();
    write_csv(&rows, &mut buffer).unwrap();

    let mut reader = ::csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().unwrap().clone();
    let records: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);

    let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
    assert_eq!(
        &records[0][column("cname")],
        "www.example.org.cdn.acme.test|d111.edge.acme.test"
    );
    assert_eq!(&records[0][column("category")], "CDN");
    assert_eq!(&records[0][column("asn")], "198.51.100.7=AS64500 Acme Edge");
    assert_eq!(&records[1][column("category")], "None");
    assert_eq!(&records[1][column("kind")], "ipv4");
}

#[test]
fn test_txt_output() {
    let (infos, results) = sample();
    let rows = shape_output(OutputLevel::Default, &infos, results);

    let mut buffer = Vec::new();
    write_txt(&rows, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["www.example.org\tCDN\tAcme", "192.0.2.1\tNone\t"]);
}

#[test]
fn test_file_output_requires_path() {
    let (infos, results) = sample();
    let rows = shape_output(OutputLevel::Default, &infos, results);
    assert!(matches!(
        write_output(&rows, OutputType::Csv, None),
        Err(ExportError::MissingOutputFile(t)) if t == "csv"
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.txt");
    assert_eq!(write_output(&rows, OutputType::Txt, Some(&path)).unwrap(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
}
