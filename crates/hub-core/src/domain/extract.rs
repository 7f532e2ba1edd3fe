//! Turns one decoded multicast DNS response into at most one [`Candidate`].
//!
//! A DNS-SD responder spreads what we need over several records: the PTR
//! names the service instance, the SRV carries port and target host, TXT
//! holds `key=value` metadata and A/AAAA resolve the target. Records may sit
//! in the answer or the additional section and arrive in any order, so the
//! extractor accumulates a draft across one pass and only builds the
//! candidate at the end.

use std::net::{Ipv4Addr, Ipv6Addr};

use hickory_proto::op::Message;
use hickory_proto::rr::rdata::TXT;
use hickory_proto::rr::{Name, RData};
use tracing::trace;

use crate::domain::candidate::{Candidate, HubAttributes};

/// Fields collected while scanning the records of one message.
#[derive(Debug, Default)]
struct Draft {
    attributes: HubAttributes,
    srv: Option<(u16, String)>,
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
}

impl Draft {
    fn apply_txt(&mut self, txt: &TXT) {
        for entry in txt.iter() {
            let entry = String::from_utf8_lossy(entry);
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            let slot = match key {
                "id" => &mut self.attributes.hub_id,
                "name" => &mut self.attributes.name,
                "model" => &mut self.attributes.model,
                "version" => &mut self.attributes.version,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
    }

    fn finish(self) -> Option<Candidate> {
        let (port, target) = self.srv?;

        // IPv4 beats IPv6; the SRV target is the fallback.
        let host = match (self.ipv4, self.ipv6) {
            (Some(v4), _) => v4.to_string(),
            (None, Some(v6)) => v6.to_string(),
            (None, None) => target,
        };

        match Candidate::new(host, port, self.attributes) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                trace!("discarding advertisement: {e}");
                None
            }
        }
    }
}

/// Extracts a candidate from the answer and additional sections of `msg`.
///
/// Returns `None` when the message has no SRV record, when the SRV port is
/// 0, or when no host can be resolved.
///
/// Within one address family the last record wins. An IPv4 address always
/// wins over an IPv6 one regardless of order.
pub fn extract_candidate(msg: &Message) -> Option<Candidate> {
    let mut draft = Draft::default();

    for record in msg.answers().iter().chain(msg.additionals()) {
        match record.data() {
            Some(RData::PTR(ptr)) => {
                draft.attributes.instance_label = Some(dotted(&ptr.0));
            }
            Some(RData::TXT(txt)) => draft.apply_txt(txt),
            Some(RData::SRV(srv)) => draft.srv = Some((srv.port(), dotted(srv.target()))),
            Some(RData::A(a)) => draft.ipv4 = Some(a.0),
            Some(RData::AAAA(aaaa)) => draft.ipv6 = Some(aaaa.0),
            _ => {}
        }
    }

    draft.finish()
}

/// Joins the raw labels of `name` with dots, without the trailing root dot.
///
/// Labels are read as lossy UTF-8 and never escaped, so an instance called
/// `Kitchen Hub` stays `Kitchen Hub`. The root name becomes `""`.
fn dotted(name: &Name) -> String {
    name.iter()
        .map(|label| String::from_utf8_lossy(label))
        .collect::<Vec<_>>()
        .join(".")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
