//! Shared HTTP agent construction and bounded response helpers.

use std::io::{self, Read};
use std::time::Duration;

/// Timeouts applied to every request issued through an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentTimeouts {
    /// Upper bound for establishing the TCP/TLS connection.
    pub connect: Duration,
    /// Optional bound on the whole request; `None` waits indefinitely.
    pub overall: Option<Duration>,
}

impl Default for AgentTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            overall: None,
        }
    }
}

/// Build an HTTP agent with the given timeouts.
pub(crate) fn build_agent(timeouts: AgentTimeouts) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new().timeout_connect(timeouts.connect);
    if let Some(overall) = timeouts.overall {
        builder = builder.timeout(overall);
    }
    builder.build()
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    check_content_length(&response, max_bytes)?;
    let reader = response.into_reader();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// Read a response body as UTF-8 text, enforcing a maximum byte size.
pub(crate) fn read_response_text(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<String, io::Error> {
    let bytes = read_response_bytes(response, max_bytes)?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn check_content_length(response: &ureq::Response, max_bytes: usize) -> Result<(), io::Error> {
    let Some(length) = response.header("Content-Length") else {
        return Ok(());
    };
    let Ok(length) = length.parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    Ok(())
}
