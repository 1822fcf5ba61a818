//! Flat row building shared by the CSV and text writers.

use std::collections::BTreeMap;
use std::net::IpAddr;

use super::types::{CheckDetail, OutputRows};
use crate::config::CSV_LIST_SEPARATOR;
use crate::fingerprint::{Category, CheckResult};
use crate::geoip::IpInfo;

const RESULT_HEADER: [&str; 6] = ["raw", "target", "category", "providers", "signals", "evidence"];

const DETAIL_HEADER: [&str; 13] = [
    "raw",
    "target",
    "kind",
    "from_batch_source",
    "category",
    "providers",
    "signals",
    "evidence",
    "cname",
    "a",
    "aaaa",
    "asn",
    "location",
];

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(CSV_LIST_SEPARATOR)
}

pub(crate) fn category_label(category: Option<Category>) -> &'static str {
    category.map(|c| c.as_str()).unwrap_or("None")
}

/// `number organization` per address that has ASN data.
fn asn_column(ip_info: &BTreeMap<IpAddr, IpInfo>) -> String {
    join(ip_info.iter().filter_map(|(ip, info)| {
        info.asn.as_ref().map(|asn| match &asn.organization {
            Some(org) => format!("{ip}=AS{} {org}", asn.number),
            None => format!("{ip}=AS{}", asn.number),
        })
    }))
}

/// `country/region/city` per address that has location data.
fn location_column(ip_info: &BTreeMap<IpAddr, IpInfo>) -> String {
    join(ip_info.iter().filter_map(|(ip, info)| {
        info.location.as_ref().map(|loc| {
            let parts: Vec<&str> = [&loc.country, &loc.region, &loc.city]
                .into_iter()
                .filter_map(|part| part.as_deref())
                .collect();
            format!("{ip}={}", parts.join("/"))
        })
    }))
}

fn result_record(result: &CheckResult) -> Vec<String> {
    vec![
        result.raw.clone(),
        result.target.clone(),
        category_label(result.category).to_string(),
        join(result.providers()),
        join(result.matches.iter().map(|m| m.signal)),
        join(result.matches.iter().map(|m| &m.evidence)),
    ]
}

fn detail_record(detail: &CheckDetail) -> Vec<String> {
    let info = &detail.info;
    vec![
        info.raw.clone(),
        info.formatted.clone(),
        format!("{:?}", info.kind).to_lowercase(),
        info.from_batch_source.to_string(),
        category_label(detail.category).to_string(),
        join(detail.providers()),
        join(detail.matches.iter().map(|m| m.signal)),
        join(detail.matches.iter().map(|m| &m.evidence)),
        join(&info.cname),
        join(&info.a),
        join(&info.aaaa),
        asn_column(&info.ip_info),
        location_column(&info.ip_info),
    ]
}

/// Column names for the shape.
pub(crate) fn header(rows: &OutputRows) -> &'static [&'static str] {
    match rows {
        OutputRows::Results(_) => &RESULT_HEADER,
        OutputRows::Details(_) => &DETAIL_HEADER,
    }
}

/// One flat record per row, list fields joined with the list separator.
pub(crate) fn records(rows: &OutputRows) -> Vec<Vec<String>> {
    match rows {
        OutputRows::Results(results) => results.iter().map(result_record).collect(),
        OutputRows::Details(details) => details.iter().map(detail_record).collect(),
    }
}
