//! DNS wire encoding for probes.
//!
//! Builds recursive queries (optionally carrying an EDNS Client Subnet option)
//! and extracts A/AAAA/CNAME data from responses, using `hickory-proto` message
//! types.

use std::net::SocketAddr;

use hickory_resolver::proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_resolver::proto::rr::rdata::opt::EdnsOption;
use hickory_resolver::proto::rr::{Name, RData};

use super::types::{ProbeAnswer, ProbeRequest};
use crate::config::{EDNS_CLIENT_SUBNET_CODE, EDNS_UDP_PAYLOAD};
use crate::error_handling::ProbeError;

/// Decoded response outcome.
#[derive(Debug)]
pub(crate) enum ResponseOutcome {
    Answer(ProbeAnswer),
    /// TC bit set: the answer must be fetched again over TCP
    Truncated,
}

/// Builds the query message for a probe.
pub(crate) fn build_query(request: &ProbeRequest, id: u16) -> Result<Message, ProbeError> {
    let name = Name::from_ascii(format!("{}.", request.domain.trim_end_matches('.')))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(name, request.record_type));

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_UDP_PAYLOAD);
    if let Some(subnet) = &request.client_subnet {
        edns.options_mut().insert(EdnsOption::Unknown(
            EDNS_CLIENT_SUBNET_CODE,
            subnet.to_option_data(),
        ));
    }
    message.set_edns(edns);

    Ok(message)
}

/// Encodes the query message for a probe.
pub(crate) fn encode_query(request: &ProbeRequest, id: u16) -> Result<Vec<u8>, ProbeError> {
    Ok(build_query(request, id)?.to_vec()?)
}

/// Decodes a response and checks it answers query `expected_id`.
///
/// NXDOMAIN is a successful, empty answer; any other non-NOERROR code is an error.
pub(crate) fn parse_response(
    bytes: &[u8],
    expected_id: u16,
    resolver: SocketAddr,
) -> Result<ResponseOutcome, ProbeError> {
    let message = Message::from_vec(bytes)?;

    if message.id() != expected_id {
        return Err(ProbeError::IdMismatch {
            resolver,
            expected: expected_id,
            actual: message.id(),
        });
    }
    if message.truncated() {
        return Ok(ResponseOutcome::Truncated);
    }
    match message.response_code() {
        ResponseCode::NoError | ResponseCode::NXDomain => {}
        other => return Err(ProbeError::ResponseCode(format!("{other:?}"))),
    }

    Ok(ResponseOutcome::Answer(extract_answer(&message)))
}

/// Collects A, AAAA and CNAME data from the answer section, in order.
pub(crate) fn extract_answer(message: &Message) -> ProbeAnswer {
    let mut answer = ProbeAnswer::default();
    for record in message.answers() {
        match record.data() {
            Some(RData::A(a)) => answer.a.push(a.0),
            Some(RData::AAAA(aaaa)) => answer.aaaa.push(aaaa.0),
            Some(RData::CNAME(cname)) => {
                let target = normalize_name(&cname.0.to_utf8());
                if !target.is_empty() && !answer.cname.contains(&target) {
                    answer.cname.push(target);
                }
            }
            _ => {}
        }
    }
    answer
}

fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
