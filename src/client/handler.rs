use log::{debug, error, info};
use std::io;
use std::net::SocketAddr;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::client::Session;
use crate::protocol::responses::{self, Reply, send_reply};
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::server::config::ServerConfig;
use crate::storage::FileSystem;
use crate::transfer::Transport;

/// Runs one FTP session over `cmd_stream` until QUIT, EOF or an I/O error.
///
/// - Sends the 220 greeting, then reads one command line at a time.
/// - Each command completes (including any data transfer) before the next
///   line is read.
/// - Control-connection read/write failures end the session and are returned.
pub async fn handle_client<S, F, T>(
    cmd_stream: S,
    mut session: Session<T::Listener>,
    fs: &F,
    transport: &T,
    config: &ServerConfig,
    client_addr: SocketAddr,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FileSystem,
    T: Transport,
{
    let (read_half, mut write_half) = tokio::io::split(cmd_stream);
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();
    // Room for the CRLF terminator on top of the command itself.
    let read_limit = config.max_command_length as u64 + 2;

    send_reply(
        &mut write_half,
        &Reply::new(responses::READY, "Service ready for new user."),
    )
    .await?;

    loop {
        line.clear();
        let n = match (&mut reader).take(read_limit).read_until(b'\n', &mut line).await {
            Ok(n) => n,
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                return Err(e);
            }
        };
        if n == 0 {
            info!("Connection closed by client {}", client_addr);
            break;
        }

        // Enforce command length limit
        let truncated = n as u64 == read_limit && !line.ends_with(b"\n");
        if truncated {
            discard_rest_of_line(&mut reader).await?;
        }
        let text = String::from_utf8_lossy(&line);
        let trimmed = text.trim_end_matches(['\r', '\n']);
        if truncated || trimmed.len() > config.max_command_length {
            debug!("Rejected overlong command from {}", client_addr);
            send_reply(
                &mut write_half,
                &Reply::new(responses::UNKNOWN_COMMAND, "Command too long."),
            )
            .await?;
            continue;
        }
        if trimmed.trim().is_empty() {
            continue;
        }

        let command = parse_command(trimmed);
        if command.verb == "PASS" {
            info!("Received from {}: PASS ****", client_addr);
        } else {
            info!("Received from {}: {} {}", client_addr, command.verb, command.argument);
        }

        let result = handle_command(&mut session, &command, fs, transport, config).await;
        if let CommandStatus::Failure(reason) = &result.status {
            debug!("{} failed for {}: {}", command.verb, client_addr, reason);
        }
        send_reply(&mut write_half, &result.reply).await?;

        if result.status == CommandStatus::CloseConnection {
            info!("Client {} requested to quit", client_addr);
            write_half.shutdown().await?;
            break;
        }
    }

    // Drops any passive listener still pending.
    session.reset_transfer_mode();
    info!("Client {} disconnected", client_addr);
    Ok(())
}

/// Skips input up to and including the next `\n` (or EOF) without buffering it.
async fn discard_rest_of_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryFs;
    use crate::transfer::TcpTransport;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;
    use tokio::io::duplex;

    fn client_addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    /// Feeds `input` to a session and returns everything it wrote back.
    async fn run_session(input: &[u8], config: ServerConfig) -> String {
        let base = PathBuf::from("/srv/ftp");
        let fs = MemoryFs::new(&base);
        let transport = TcpTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let (server_side, mut client_side) = duplex(64 * 1024);

        client_side.write_all(input).await.unwrap();
        client_side.shutdown().await.unwrap();

        let session = Session::new(base, Some(Ipv4Addr::LOCALHOST));
        handle_client(server_side, session, &fs, &transport, &config, client_addr())
            .await
            .unwrap();

        let mut output = String::new();
        client_side.read_to_string(&mut output).await.unwrap();
        output
    }

    #[tokio::test]
    async fn test_greeting_and_quit() {
        let input = b"USER anonymous\r\nQUIT\r\nNOOP\r\n";
        let output = run_session(input, ServerConfig::default()).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             230 User logged in, proceed.\r\n\
             221 Service closing control connection.\r\n"
        );
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let input = b"USER alice\r\nPASS pw\r\nPWD\r\n";
        let output = run_session(input, ServerConfig::default()).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             331 User name okay, need password.\r\n\
             230 User logged in, proceed.\r\n\
             257 \"/\" is current directory.\r\n"
        );
    }

    #[tokio::test]
    async fn test_blank_lines_are_ignored() {
        let output = run_session(b"\r\n   \r\nSYST\r\n", ServerConfig::default()).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n530 Please login with USER and PASS.\r\n"
        );
    }

    #[tokio::test]
    async fn test_overlong_line_rejected() {
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        let long = format!("USER {}\r\nUSER anonymous\r\n", "x".repeat(32));
        let output = run_session(long.as_bytes(), config).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             500 Command too long.\r\n\
             230 User logged in, proceed.\r\n"
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_end_session() {
        let input = b"USER caf\xe9\r\nUSER anonymous\r\nPWD\r\n";
        let output = run_session(input, ServerConfig::default()).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             331 User name okay, need password.\r\n\
             230 User logged in, proceed.\r\n\
             257 \"/\" is current directory.\r\n"
        );
    }

    #[tokio::test]
    async fn test_unterminated_overlong_line_is_bounded() {
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        // Far more than the limit, never terminated before EOF.
        let input = "A".repeat(40_000);
        let output = run_session(input.as_bytes(), config).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n500 Command too long.\r\n"
        );
    }

    #[tokio::test]
    async fn test_overlong_line_skipped_to_next_command() {
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        let input = format!("STOR {}\r\nUSER anonymous\r\nSYST\r\n", "y".repeat(30_000));
        let output = run_session(input.as_bytes(), config).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             500 Command too long.\r\n\
             230 User logged in, proceed.\r\n\
             215 UNIX Type: L8\r\n"
        );
    }

    #[tokio::test]
    async fn test_line_just_over_limit_rejected() {
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        // 17 characters plus a bare LF fits the read window but exceeds the limit.
        let input = format!("{}\nUSER anonymous\r\n", "N".repeat(17));
        let output = run_session(input.as_bytes(), config).await;
        assert_eq!(
            output,
            "220 Service ready for new user.\r\n\
             500 Command too long.\r\n\
             230 User logged in, proceed.\r\n"
        );
    }

    #[tokio::test]
    async fn test_replies_strictly_follow_commands() {
        let output = run_session(
            b"USER anonymous\r\nMKD a\r\nMKD a\r\nCWD a\r\nPWD\r\nLIST\r\n",
            ServerConfig::default(),
        )
        .await;
        let codes: Vec<&str> = output.lines().map(|l| &l[..3]).collect();
        assert_eq!(codes, ["220", "230", "200", "550", "250", "257", "425"]);
    }
}
