//! End-to-end client flows against a scripted mock server.

mod common;

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::time::timeout;

use common::{test_config, TestServer};
use ursa_proto::Kind;
use ursabot::Client;

#[tokio::test]
async fn registration_handshake_order() {
    let server = TestServer::bind().await.unwrap();
    let mut config = test_config(server.addr);
    config.password = Some("hunter2".to_string());

    let server_side = async {
        let mut conn = server.accept().await?;
        conn.expect("PASS hunter2").await?;
        conn.expect("NICK testbear").await?;
        let user = conn.expect("USER ursa 0 * :").await?;
        anyhow::ensure!(user.ends_with("integration test bear"), "bad USER line: {user}");
        Ok::<_, anyhow::Error>(conn)
    };

    let (client, conn) = tokio::join!(Client::connect(&config), server_side);
    client.unwrap();
    conn.unwrap();
}

#[tokio::test]
async fn join_tracks_only_acknowledged_channels() {
    let server = TestServer::bind().await.unwrap();
    let config = test_config(server.addr);

    let client_side = async {
        let mut client = Client::connect(&config).await?;
        let failures = client
            .join(&["#a".to_string(), "#b".to_string()])
            .await?;
        Ok::<_, ursabot::ClientError>((client, failures))
    };

    let server_side = async {
        let mut conn = server.accept().await?;
        conn.expect_registration("testbear").await?;

        conn.expect("JOIN #a").await?;
        // Unrelated traffic keeps flowing through normal dispatch while
        // the join wait is pumping.
        conn.send_raw(":srv NOTICE testbear :looking good").await?;
        conn.send_raw(":srv 353 testbear = #a :@testbear").await?;

        conn.expect("JOIN #b").await?;
        conn.send_raw(":srv 473 testbear #b :Cannot join channel (+i)")
            .await?;
        Ok::<_, anyhow::Error>(conn)
    };

    let (client_res, server_res) = tokio::join!(client_side, server_side);
    server_res.unwrap();
    let (client, failures) = client_res.unwrap();

    assert!(client.session.channels.contains("#a"));
    assert!(!client.session.channels.contains("#b"));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].command, "473");
    assert!(failures[0].middle.contains("#b"));
}

#[tokio::test]
async fn who_collects_rows_until_terminator() {
    let server = TestServer::bind().await.unwrap();
    let config = test_config(server.addr);

    let client_side = async {
        let mut client = Client::connect(&config).await?;
        let replies = client.who("#a").await?;
        Ok::<_, ursabot::ClientError>(replies)
    };

    let server_side = async {
        let mut conn = server.accept().await?;
        conn.expect_registration("testbear").await?;

        conn.expect("WHO #a").await?;
        conn.send_raw(":srv 352 testbear #a u1 h1 * One H :0 One Real")
            .await?;
        // A user command arriving mid-wait is still dispatched normally
        // (and answered), without being yielded by the wait.
        conn.send_raw(":visitor!v@h PRIVMSG #a :.bots").await?;
        conn.send_raw(":srv 352 testbear #a u2 h2 * Two H :0 Two Real")
            .await?;
        conn.send_raw(":srv 315 testbear #a :End of /WHO list.").await?;

        conn.expect("PRIVMSG #a :Reporting in.").await?;
        Ok::<_, anyhow::Error>(conn)
    };

    let (client_res, server_res) = tokio::join!(client_side, server_side);
    server_res.unwrap();
    let replies = client_res.unwrap();

    assert_eq!(replies.len(), 3, "two rows plus the terminator");
    assert!(matches!(replies[0].kind, Kind::WhoReply(_)));
    assert!(matches!(replies[1].kind, Kind::WhoReply(_)));
    assert_eq!(replies[2].command, "315");
}

#[tokio::test]
async fn ping_is_answered_with_pong() -> Result<()> {
    let server = TestServer::bind().await.unwrap();
    let config = test_config(server.addr);

    let connect = Client::connect(&config);
    let accept = async {
        let mut conn = server.accept().await?;
        conn.expect_registration("testbear").await?;
        Ok::<_, anyhow::Error>(conn)
    };
    let (client, conn) = tokio::join!(connect, accept);
    let mut client = client?;
    let mut conn = conn?;

    let loop_handle = tokio::spawn(async move { client.run().await });

    conn.send_raw("PING :12345").await?;
    conn.expect("PONG :12345").await?;

    // Server closing the connection ends the loop cleanly.
    drop(conn);
    timeout(Duration::from_secs(5), loop_handle).await???;
    Ok(())
}

#[tokio::test]
async fn flood_control_spaces_consecutive_sends() -> Result<()> {
    let server = TestServer::bind().await.unwrap();
    let mut config = test_config(server.addr);
    config.msg_delay_ms = 50;

    let connect = Client::connect(&config);
    let accept = async {
        let mut conn = server.accept().await?;
        conn.expect_registration("testbear").await?;
        Ok::<_, anyhow::Error>(conn)
    };
    let (client, conn) = tokio::join!(connect, accept);
    let mut client = client?;
    let _conn = conn?;

    let start = Instant::now();
    for _ in 0..3 {
        client.session.say("#a", "spacing test").await?;
    }
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(100),
        "three sends with a 50ms delay finished in {elapsed:?}"
    );
    Ok(())
}
