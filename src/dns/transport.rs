//! Probe transports.
//!
//! The probe engine only needs "send this query to that resolver and give me the
//! records back". `DnsTransport` is that seam; `UdpTransport` is the network
//! implementation and tests substitute scripted transports.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use super::message::{encode_query, parse_response, ResponseOutcome};
use super::types::{ProbeAnswer, ProbeRequest};
use crate::config::MAX_UDP_RESPONSE_SIZE;
use crate::error_handling::{InfoType, ProbeError, ProcessingStats};

/// Sends one probe and returns the records it produced.
///
/// Implementations must not apply their own overall timeout: the engine bounds
/// every call with the configured per-query timeout.
pub trait DnsTransport: Send + Sync + 'static {
    fn exchange(
        &self,
        request: &ProbeRequest,
    ) -> impl Future<Output = Result<ProbeAnswer, ProbeError>> + Send;
}

/// Plain DNS over UDP, retried over TCP when the response is truncated.
pub struct UdpTransport {
    stats: Arc<ProcessingStats>,
}

impl UdpTransport {
    pub fn new(stats: Arc<ProcessingStats>) -> Self {
        Self { stats }
    }

    /// Sends `query` and waits for the datagram answering transaction `id`.
    ///
    /// Late replies to earlier queries and runt datagrams are dropped and the
    /// socket read again; the caller's per-query timeout bounds the wait.
    async fn send_udp(&self, resolver: SocketAddr, query: &[u8], id: u16) -> io::Result<Vec<u8>> {
        let bind_addr: SocketAddr = if resolver.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(resolver).await?;
        socket.send(query).await?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let len = socket.recv(&mut buf).await?;
            match reply_id(&buf[..len]) {
                Some(reply) if reply == id => {
                    buf.truncate(len);
                    return Ok(buf);
                }
                other => {
                    log::debug!(
                        "Discarding stray reply from {resolver} (id {other:?}, expected {id})"
                    );
                    self.stats.increment_info(InfoType::StrayReplyDiscarded);
                }
            }
        }
    }

    /// RFC 1035 4.2.2: TCP messages carry a two-byte length prefix.
    async fn send_tcp(resolver: SocketAddr, query: &[u8]) -> io::Result<Vec<u8>> {
        let len = u16::try_from(query.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "query too large"))?;

        let mut stream = TcpStream::connect(resolver).await?;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(query).await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        stream.read_exact(&mut buf).await?;
        Ok(buf)
    }
}

impl DnsTransport for UdpTransport {
    async fn exchange(&self, request: &ProbeRequest) -> Result<ProbeAnswer, ProbeError> {
        let id: u16 = rand::random();
        let query = encode_query(request, id)?;

        let response = self.send_udp(request.resolver, &query, id).await?;
        match parse_response(&response, id, request.resolver)? {
            ResponseOutcome::Answer(answer) => Ok(answer),
            ResponseOutcome::Truncated => {
                log::debug!("Truncated response for {request}, retrying over TCP");
                self.stats.increment_info(InfoType::TruncatedRetriedOverTcp);
                let response = Self::send_tcp(request.resolver, &query).await?;
                match parse_response(&response, id, request.resolver)? {
                    ResponseOutcome::Answer(answer) => Ok(answer),
                    ResponseOutcome::Truncated => Err(ProbeError::ResponseCode(
                        "truncated over TCP".to_string(),
                    )),
                }
            }
        }
    }
}

/// Transaction id from the first two header bytes.
fn reply_id(datagram: &[u8]) -> Option<u16> {
    match datagram {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::types::ProbePhase;
    use hickory_resolver::proto::op::{Message, MessageType, OpCode, ResponseCode};
    use hickory_resolver::proto::rr::rdata::A;
    use hickory_resolver::proto::rr::{RData, Record, RecordType};
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn request(resolver: SocketAddr) -> ProbeRequest {
        ProbeRequest {
            domain: "www.example.org".to_string(),
            record_type: RecordType::A,
            resolver,
            client_subnet: None,
            phase: ProbePhase::Standard,
        }
    }

    fn reply(query: &Message, id: u16, addr: Ipv4Addr, truncated: bool) -> Vec<u8> {
        let mut response = Message::new();
        response
            .set_id(id)
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_response_code(ResponseCode::NoError)
            .set_truncated(truncated);
        for q in query.queries() {
            response.add_query(q.clone());
        }
        if !truncated {
            let owner = query.queries()[0].name().clone();
            response.add_answer(Record::from_rdata(owner, 60, RData::A(A(addr))));
        }
        response.to_vec().unwrap()
    }

    #[test]
    fn test_reply_id() {
        assert_eq!(reply_id(&[0x12, 0x34, 0x01]), Some(0x1234));
        assert_eq!(reply_id(&[0x12]), None);
        assert_eq!(reply_id(&[]), None);
    }

    #[tokio::test]
    async fn test_udp_skips_replies_for_other_transactions() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let resolver = server.local_addr().unwrap();

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            let query = Message::from_vec(&buf[..len]).unwrap();

            let late = reply(
                &query,
                query.id().wrapping_add(1),
                Ipv4Addr::new(192, 0, 2, 66),
                false,
            );
            server.send_to(&late, peer).await.unwrap();
            server.send_to(&[0u8], peer).await.unwrap();
            let valid = reply(&query, query.id(), Ipv4Addr::new(198, 51, 100, 7), false);
            server.send_to(&valid, peer).await.unwrap();
        });

        let stats = Arc::new(ProcessingStats::new());
        let transport = UdpTransport::new(Arc::clone(&stats));
        let answer = tokio::time::timeout(Duration::from_secs(5), transport.exchange(&request(resolver)))
            .await
            .expect("exchange should finish")
            .expect("the matching reply should be accepted");

        assert_eq!(answer.a, vec![Ipv4Addr::new(198, 51, 100, 7)]);
        assert_eq!(stats.get_info_count(InfoType::StrayReplyDiscarded), 2);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_truncated_udp_reply_is_retried_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let resolver = listener.local_addr().unwrap();
        let server = UdpSocket::bind(resolver).await.unwrap();

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            let query = Message::from_vec(&buf[..len]).unwrap();
            let truncated = reply(&query, query.id(), Ipv4Addr::UNSPECIFIED, true);
            server.send_to(&truncated, peer).await.unwrap();

            let (mut stream, _) = listener.accept().await.unwrap();
            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).await.unwrap();
            let mut query_buf = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
            stream.read_exact(&mut query_buf).await.unwrap();
            let query = Message::from_vec(&query_buf).unwrap();

            let full = reply(&query, query.id(), Ipv4Addr::new(203, 0, 113, 9), false);
            stream
                .write_all(&(full.len() as u16).to_be_bytes())
                .await
                .unwrap();
            stream.write_all(&full).await.unwrap();
        });

        let stats = Arc::new(ProcessingStats::new());
        let transport = UdpTransport::new(Arc::clone(&stats));
        let answer = tokio::time::timeout(Duration::from_secs(5), transport.exchange(&request(resolver)))
            .await
            .expect("exchange should finish")
            .expect("TCP retry should succeed");

        assert_eq!(answer.a, vec![Ipv4Addr::new(203, 0, 113, 9)]);
        assert_eq!(stats.get_info_count(InfoType::TruncatedRetriedOverTcp), 1);
        responder.await.unwrap();
    }
}
