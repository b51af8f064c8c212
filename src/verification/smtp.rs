use super::email::EmailAddress;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::debug;

pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the conversation with one host stands. Used for diagnostics when a
/// step fails; the probe never retries a command within the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Connecting,
    Greeted,
    HeloSent,
    MailFromSent,
    RcptToSent,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connecting => "connect",
            Self::Greeted => "greeting",
            Self::HeloSent => "EHLO",
            Self::MailFromSent => "MAIL FROM",
            Self::RcptToSent => "RCPT TO",
        };
        f.write_str(label)
    }
}

/// Overall outcome of walking the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A server answered `250` to `RCPT TO` for the address.
    Accepted { host: String, response: String },
    /// A server explicitly refused the recipient. Authoritative: no further
    /// hosts are tried once any server rejects the address.
    Rejected { host: String, response: String },
    /// Every candidate was unreachable, timed out, or balked before the
    /// decisive step. Evidence of nothing, so never reported as invalid.
    Unreachable {
        attempts: usize,
        last_error: Option<String>,
    },
}

/// Outcome of one host's conversation.
enum HostOutcome {
    Accepted(String),
    Rejected(String),
    Failed(String),
}

struct Reply {
    code: u16,
    text: String,
}

/// # SMTP Probe
///
/// Drives the fixed command sequence `EHLO` → `MAIL FROM` → `RCPT TO` → `QUIT`
/// against each candidate mail exchanger in turn. `MAIL FROM` uses
/// `postmaster@<domain>`, a mailbox assumed to exist on any compliant domain,
/// plausible enough to avoid immediate rejection. The `RCPT TO` response is
/// the decisive step: `250` accepts, anything else rejects.
///
/// Hosts are tried strictly in MX-preference order, one at a time. Racing all
/// hosts concurrently is deliberately avoided: an early false-accept from a
/// lenient server must not mask an authoritative rejection from the preferred
/// one. A timeout or connection error at any step fails that host only and
/// advances to the next candidate; commands are never resent within a session.
pub struct SmtpProbe {
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for SmtpProbe {
    fn default() -> Self {
        Self {
            port: DEFAULT_SMTP_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl SmtpProbe {
    /// Walk `hosts` in order until one yields a definitive accept or reject.
    pub async fn run<'a>(
        &self,
        hosts: impl IntoIterator<Item = &'a str>,
        email: &EmailAddress,
        helo: &str,
    ) -> ProbeOutcome {
        let mut attempts = 0;
        let mut last_error = None;

        for host in hosts {
            attempts += 1;
            match self.probe_host(host, email, helo).await {
                HostOutcome::Accepted(response) => {
                    return ProbeOutcome::Accepted {
                        host: host.to_string(),
                        response,
                    };
                }
                HostOutcome::Rejected(response) => {
                    return ProbeOutcome::Rejected {
                        host: host.to_string(),
                        response,
                    };
                }
                HostOutcome::Failed(error) => {
                    debug!(host, %error, "mail exchanger failed, advancing to next candidate");
                    last_error = Some(format!("{host}: {error}"));
                }
            }
        }

        ProbeOutcome::Unreachable {
            attempts,
            last_error,
        }
    }

    async fn probe_host(&self, host: &str, email: &EmailAddress, helo: &str) -> HostOutcome {
        let mut state = ProbeState::Connecting;

        let stream = match timeout(self.connect_timeout, TcpStream::connect((host, self.port))).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return HostOutcome::Failed(format!("{state} failed: {err}")),
            Err(_) => return HostOutcome::Failed(format!("{state} timed out")),
        };
        // Splitting lets the reader buffer without borrowing the writer; both
        // halves drop (and the socket closes) on every exit path below.
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        // Connecting -> Greeted: the server speaks first.
        let greeting = match self.read_reply(&mut reader).await {
            Ok(reply) => reply,
            Err(err) => return HostOutcome::Failed(format!("{state}: {err}")),
        };
        if greeting.code / 100 != 2 {
            return HostOutcome::Failed(format!("unexpected greeting: {}", greeting.text));
        }
        state = ProbeState::Greeted;
        debug!(host, greeting = %greeting.text, "mail exchanger greeted us");

        let script = [
            (ProbeState::HeloSent, format!("EHLO {helo}")),
            (
                ProbeState::MailFromSent,
                format!("MAIL FROM:<postmaster@{}>", email.domain()),
            ),
            (ProbeState::RcptToSent, format!("RCPT TO:<{email}>")),
        ];

        let mut last_reply = greeting;
        for (next_state, command) in script {
            if let Err(err) = self.send_line(&mut writer, &command).await {
                return HostOutcome::Failed(format!("{state}: {err}"));
            }
            state = next_state;
            last_reply = match self.read_reply(&mut reader).await {
                Ok(reply) => reply,
                Err(err) => return HostOutcome::Failed(format!("{state}: {err}")),
            };
            if last_reply.code != 250 {
                let _ = self.quit(&mut writer).await;
                // Only RCPT TO is decisive; earlier refusals prove nothing
                // about the address and just fail this host.
                return if state == ProbeState::RcptToSent {
                    HostOutcome::Rejected(last_reply.text)
                } else {
                    HostOutcome::Failed(format!("{state} not accepted: {}", last_reply.text))
                };
            }
        }

        let _ = self.quit(&mut writer).await;
        HostOutcome::Accepted(last_reply.text)
    }

    /// Read one full SMTP reply, consuming multi-line continuations
    /// (`250-...`) until the final line (`250 ...`). The last line's status
    /// code classifies the reply.
    async fn read_reply(&self, reader: &mut BufReader<OwnedReadHalf>) -> Result<Reply, String> {
        loop {
            let mut line = String::new();
            let read = timeout(self.read_timeout, reader.read_line(&mut line))
                .await
                .map_err(|_| "read timed out".to_string())?
                .map_err(|err| format!("read failed: {err}"))?;
            if read == 0 {
                return Err("connection closed by server".to_string());
            }

            let line = line.trim_end().to_string();
            // .get covers both a short line and a byte-3 boundary that
            // falls inside a multibyte character.
            let Some(code_str) = line.get(..3) else {
                return Err(format!("malformed reply line: {line:?}"));
            };
            let code: u16 = code_str
                .parse()
                .map_err(|_| format!("malformed status code in reply: {line:?}"))?;
            if line.as_bytes().get(3) == Some(&b'-') {
                continue;
            }
            return Ok(Reply { code, text: line });
        }
    }

    async fn send_line(&self, writer: &mut OwnedWriteHalf, line: &str) -> Result<(), String> {
        writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .map_err(|err| format!("write failed: {err}"))?;
        writer
            .flush()
            .await
            .map_err(|err| format!("flush failed: {err}"))
    }

    /// Best-effort goodbye; the outcome is already decided by the time this
    /// runs and the socket closes regardless.
    async fn quit(&self, writer: &mut OwnedWriteHalf) -> Result<(), String> {
        self.send_line(writer, "QUIT").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{email, tld::TldSet};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn test_email() -> EmailAddress {
        let tlds = TldSet::from_text("COM\n");
        email::validate("user@example.com", &tlds).unwrap()
    }

    fn probe(port: u16) -> SmtpProbe {
        SmtpProbe {
            port,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
        }
    }

    /// One-shot scripted mail exchanger on loopback: sends `replies[0]` as
    /// the greeting, then answers each client command with the next entry.
    /// Returns the bound port and the commands the client sent.
    async fn scripted_server(replies: Vec<&'static str>) -> (u16, JoinHandle<Vec<String>>) {
        scripted_server_at("127.0.0.1:0", replies).await
    }

    async fn scripted_server_at(
        addr: &str,
        replies: Vec<&'static str>,
    ) -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut writer) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let mut replies = replies.into_iter();
            let mut seen = Vec::new();

            writer
                .write_all(replies.next().unwrap().as_bytes())
                .await
                .unwrap();
            while let Ok(Some(line)) = lines.next_line().await {
                seen.push(line.clone());
                if line.starts_with("QUIT") {
                    let _ = writer.write_all(b"221 bye\r\n").await;
                    break;
                }
                match replies.next() {
                    Some(reply) => writer.write_all(reply.as_bytes()).await.unwrap(),
                    None => break,
                }
            }
            seen
        });
        (port, handle)
    }

    #[tokio::test]
    async fn accepts_when_rcpt_to_gets_250() {
        let (port, server) = scripted_server(vec![
            "220 mx.example.com ESMTP\r\n",
            "250-mx.example.com\r\n250-PIPELINING\r\n250 SIZE 20480000\r\n",
            "250 2.1.0 Ok\r\n",
            "250 2.1.5 Ok\r\n",
        ])
        .await;

        let outcome = probe(port)
            .run(["127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Accepted {
                host: "127.0.0.1".to_string(),
                response: "250 2.1.5 Ok".to_string(),
            }
        );

        let seen = server.await.unwrap();
        assert_eq!(
            seen,
            vec![
                "EHLO verifier.example.net",
                "MAIL FROM:<postmaster@example.com>",
                "RCPT TO:<user@example.com>",
                "QUIT",
            ]
        );
    }

    #[tokio::test]
    async fn rejection_at_rcpt_to_is_authoritative() {
        let (port, server) = scripted_server(vec![
            "220 mx.example.com ESMTP\r\n",
            "250 mx.example.com\r\n",
            "250 2.1.0 Ok\r\n",
            "550 5.1.1 User unknown\r\n",
        ])
        .await;

        // A second candidate follows, but a rejection must short-circuit:
        // had the probe advanced, the outcome would be Unreachable.
        let outcome = probe(port)
            .run(["127.0.0.1", "127.0.0.2"], &test_email(), "verifier.example.net")
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Rejected {
                host: "127.0.0.1".to_string(),
                response: "550 5.1.1 User unknown".to_string(),
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_first_host_falls_back_to_second() {
        let (port, _server) = scripted_server(vec![
            "220 mx.example.com ESMTP\r\n",
            "250 mx.example.com\r\n",
            "250 2.1.0 Ok\r\n",
            "250 2.1.5 Ok\r\n",
        ])
        .await;

        // Nothing listens on 127.0.0.2 at this port: connect is refused and
        // the probe advances to the second candidate.
        let outcome = probe(port)
            .run(["127.0.0.2", "127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Accepted { host, .. } => assert_eq!(host, "127.0.0.1"),
            other => panic!("expected acceptance via the second host, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_hosts_unreachable_is_not_a_rejection() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = probe(port)
            .run(["127.0.0.1", "127.0.0.2"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Unreachable {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.is_some());
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn multibyte_garbage_reply_is_reported_as_malformed() {
        // A reply whose third byte lands inside a multibyte character must
        // fail the host cleanly, not tear down the caller.
        let (port, _server) = scripted_server(vec!["abé hello\r\n"]).await;

        let outcome = probe(port)
            .run(["127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Unreachable {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 1);
                let error = last_error.unwrap();
                assert!(error.contains("malformed reply line"), "got: {error}");
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stalled_reply_times_out_and_advances_to_next_host() {
        // First candidate greets, then holds the connection open without
        // ever answering EHLO; the read timeout must fail that host only.
        let stall = TcpListener::bind("127.0.0.2:0").await.unwrap();
        let port = stall.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = stall.accept().await.unwrap();
            let (read_half, mut writer) = stream.into_split();
            writer
                .write_all(b"220 mx.example.com ESMTP\r\n")
                .await
                .unwrap();
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(_)) = lines.next_line().await {}
        });
        let (_, _server) = scripted_server_at(
            &format!("127.0.0.1:{port}"),
            vec![
                "220 mx.example.com ESMTP\r\n",
                "250 mx.example.com\r\n",
                "250 2.1.0 Ok\r\n",
                "250 2.1.5 Ok\r\n",
            ],
        )
        .await;

        let quick = SmtpProbe {
            port,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_millis(200),
        };
        let outcome = quick
            .run(["127.0.0.2", "127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Accepted { host, .. } => assert_eq!(host, "127.0.0.1"),
            other => panic!("expected acceptance via the second host, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_2xx_greeting_fails_the_host() {
        let (port, _server) = scripted_server(vec!["554 not accepting mail\r\n"]).await;

        let outcome = probe(port)
            .run(["127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Unreachable { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ehlo_refusal_fails_the_host_without_rejecting_the_address() {
        let (port, _server) = scripted_server(vec![
            "220 mx.example.com ESMTP\r\n",
            "502 command not implemented\r\n",
        ])
        .await;

        let outcome = probe(port)
            .run(["127.0.0.1"], &test_email(), "verifier.example.net")
            .await;

        match outcome {
            ProbeOutcome::Unreachable { last_error, .. } => {
                let error = last_error.unwrap();
                assert!(error.contains("EHLO"), "unexpected error text: {error}");
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }
}
