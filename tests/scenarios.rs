//! End-to-end scenarios over a real spawned server, one client per role.

mod common;

use common::{TestClient, TestServer};

#[tokio::test]
async fn host_and_echo() {
    let server = TestServer::spawn(18201).await.expect("spawn server");
    let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");

    c1.send("/host alpha\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Created alpha\n");

    c1.send("hello\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Guest 1: hello\n");
}

#[tokio::test]
async fn two_member_fan_out() {
    let server = TestServer::spawn(18202).await.expect("spawn server");
    let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");
    let mut c2 = TestClient::connect(&server.address()).await.expect("connect c2");

    c1.send("/host alpha\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Created alpha\n");

    c2.send("/join alpha\n").await.unwrap();
    assert_eq!(c2.recv().await.unwrap(), "Joined alpha\n");

    c1.send("hi\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Guest 1: hi\n");
    assert_eq!(c2.recv().await.unwrap(), "Guest 1: hi\n");
}

#[tokio::test]
async fn room_auto_delete() {
    let server = TestServer::spawn(18203).await.expect("spawn server");
    let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");
    let mut c2 = TestClient::connect(&server.address()).await.expect("connect c2");

    c1.send("/host alpha\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Created alpha\n");

    c1.send("/leave\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Left alpha\n");

    c2.send("/join alpha\n").await.unwrap();
    assert_eq!(c2.recv().await.unwrap(), "alpha does not exist\n");
}

#[tokio::test]
async fn credentials_login_then_chat_uses_username() {
    let server = TestServer::spawn(18204).await.expect("spawn server");
    let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");

    c1.send("/create alice pw\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Created account alice\n");

    c1.send("/login alice pw\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Logged in as alice\n");

    c1.send("hi\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "alice: hi\n");
}

#[tokio::test]
async fn duplicate_room_name_rejected() {
    let server = TestServer::spawn(18205).await.expect("spawn server");
    let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");

    c1.send("/host alpha\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Created alpha\n");

    c1.send("/host alpha\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "alpha exists already\n");

    // Still a member of alpha: a chat message relays with no room-change reply.
    c1.send("still here\n").await.unwrap();
    assert_eq!(c1.recv().await.unwrap(), "Guest 1: still here\n");
}

#[tokio::test]
async fn login_persists_across_reconnect() {
    let server = TestServer::spawn(18206).await.expect("spawn server");

    {
        let mut c1 = TestClient::connect(&server.address()).await.expect("connect c1");
        c1.send("/create bob pw\n").await.unwrap();
        assert_eq!(c1.recv().await.unwrap(), "Created account bob\n");
    }

    let mut c2 = TestClient::connect(&server.address()).await.expect("connect c2");
    c2.send("/login bob pw\n").await.unwrap();
    assert_eq!(c2.recv().await.unwrap(), "Logged in as bob\n");
}
